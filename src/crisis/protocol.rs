//! Static crisis protocols and their one-pass dispatch.
//!
//! A protocol is an ordered list of steps chosen by severity. Dispatch walks
//! the steps once and records what was done; notification steps are skipped
//! when there is nobody to notify. Nothing here talks to the outside world.

use serde::Serialize;
use time::OffsetDateTime;
use uuid::Uuid;

use super::repo_types::Severity;
use crate::{contacts::repo_types::EmergencyContact, professionals::repo_types as professionals};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProtocolAction {
    ImmediateEscalation,
    NotifyContacts,
    ProfessionalBackup,
    AssessSafety,
    SupportiveIntervention,
    SafetyPlanning,
    FollowUp,
    ActiveListening,
    GroundingTechniques,
    ResourceSharing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ProtocolStep {
    pub step: u8,
    pub action: ProtocolAction,
    pub description: &'static str,
}

const fn step(step: u8, action: ProtocolAction, description: &'static str) -> ProtocolStep {
    ProtocolStep {
        step,
        action,
        description,
    }
}

use ProtocolAction::*;

const CRITICAL: [ProtocolStep; 3] = [
    step(1, ImmediateEscalation, "Contact emergency services immediately"),
    step(2, NotifyContacts, "Alert primary emergency contacts"),
    step(3, ProfessionalBackup, "Activate professional backup network"),
];

const HIGH: [ProtocolStep; 3] = [
    step(1, AssessSafety, "Conduct immediate safety assessment"),
    step(2, ProfessionalBackup, "Notify professional backup network"),
    step(3, NotifyContacts, "Alert emergency contacts if needed"),
];

const MEDIUM: [ProtocolStep; 3] = [
    step(1, SupportiveIntervention, "Provide immediate emotional support"),
    step(2, SafetyPlanning, "Create safety plan together"),
    step(3, FollowUp, "Schedule follow-up check-in"),
];

const LOW: [ProtocolStep; 3] = [
    step(1, ActiveListening, "Provide empathetic listening"),
    step(2, GroundingTechniques, "Suggest grounding exercises"),
    step(3, ResourceSharing, "Share relevant support resources"),
];

pub fn protocol_for(severity: Severity) -> &'static [ProtocolStep] {
    match severity {
        Severity::Critical => &CRITICAL,
        Severity::High => &HIGH,
        Severity::Medium => &MEDIUM,
        Severity::Low => &LOW,
    }
}

pub fn protocol_name(severity: Severity) -> String {
    format!("CRISIS_{}_PROTOCOL", severity.as_str())
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProtocolDescriptor {
    pub name: String,
    pub severity: Severity,
    pub steps: &'static [ProtocolStep],
}

/// Every protocol, most severe first.
pub fn all_protocols() -> Vec<ProtocolDescriptor> {
    Severity::ALL
        .into_iter()
        .map(|severity| ProtocolDescriptor {
            name: protocol_name(severity),
            severity,
            steps: protocol_for(severity),
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Hotline {
    pub region: &'static str,
    pub purpose: &'static str,
    pub name: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub website: Option<&'static str>,
    pub available: &'static str,
}

pub const EMERGENCY_RESOURCES: &[Hotline] = &[
    Hotline {
        region: "india",
        purpose: "suicide_prevention",
        name: "iCall",
        phone: Some("9152987821"),
        website: None,
        available: "24/7",
    },
    Hotline {
        region: "india",
        purpose: "mental_health",
        name: "Vandrevala Foundation",
        phone: Some("18602662345"),
        website: None,
        available: "24/7",
    },
    Hotline {
        region: "india",
        purpose: "domestic_violence",
        name: "National Domestic Violence Helpline",
        phone: Some("181"),
        website: None,
        available: "24/7",
    },
    Hotline {
        region: "global",
        purpose: "international",
        name: "International Association for Suicide Prevention",
        phone: None,
        website: Some("https://www.iasp.info/resources/Crisis_Centres/"),
        available: "Find crisis centers worldwide",
    },
];

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NotifiedContact {
    pub id: Uuid,
    pub name: String,
    pub relationship: String,
    pub phone: String,
}

impl From<&EmergencyContact> for NotifiedContact {
    fn from(c: &EmergencyContact) -> Self {
        Self {
            id: c.id,
            name: c.name.clone(),
            relationship: c.relationship.clone(),
            phone: c.phone.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NotifiedProfessional {
    pub id: Uuid,
    pub name: String,
    pub profession: String,
    pub phone: String,
    pub specialization: Option<String>,
    pub response_time_minutes: Option<i32>,
}

impl From<&professionals::ProfessionalBackup> for NotifiedProfessional {
    fn from(p: &professionals::ProfessionalBackup) -> Self {
        Self {
            id: p.id,
            name: p.name.clone(),
            profession: p.profession.clone(),
            phone: p.phone.clone(),
            specialization: p.specialization.clone(),
            response_time_minutes: p.response_time_minutes,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionTaken {
    pub action: ProtocolAction,
    pub description: &'static str,
    pub executed: bool,
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resources: Option<&'static [Hotline]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contacts_notified: Option<Vec<NotifiedContact>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub professionals_notified: Option<Vec<NotifiedProfessional>>,
}

impl ActionTaken {
    fn executed(step: &ProtocolStep, at: OffsetDateTime) -> Self {
        Self {
            action: step.action,
            description: step.description,
            executed: true,
            timestamp: at,
            resources: None,
            contacts_notified: None,
            professionals_notified: None,
        }
    }
}

/// Walks the protocol for `severity` once and returns the actions taken.
pub fn dispatch(
    severity: Severity,
    contacts: &[NotifiedContact],
    professionals: &[NotifiedProfessional],
    at: OffsetDateTime,
) -> Vec<ActionTaken> {
    let mut actions = Vec::with_capacity(3);
    for step in protocol_for(severity) {
        let mut taken = ActionTaken::executed(step, at);
        match step.action {
            ImmediateEscalation => taken.resources = Some(EMERGENCY_RESOURCES),
            NotifyContacts if contacts.is_empty() => continue,
            NotifyContacts => taken.contacts_notified = Some(contacts.to_vec()),
            ProfessionalBackup if professionals.is_empty() => continue,
            ProfessionalBackup => taken.professionals_notified = Some(professionals.to_vec()),
            _ => {}
        }
        actions.push(taken);
    }
    actions
}

#[cfg(test)]
mod tests {
    use super::*;

    fn contact(name: &str) -> NotifiedContact {
        NotifiedContact {
            id: Uuid::new_v4(),
            name: name.into(),
            relationship: "friend".into(),
            phone: "100".into(),
        }
    }

    fn professional(name: &str) -> NotifiedProfessional {
        NotifiedProfessional {
            id: Uuid::new_v4(),
            name: name.into(),
            profession: "Counsellor".into(),
            phone: "200".into(),
            specialization: None,
            response_time_minutes: Some(10),
        }
    }

    fn actions(list: &[ActionTaken]) -> Vec<ProtocolAction> {
        list.iter().map(|a| a.action).collect()
    }

    #[test]
    fn every_severity_has_three_numbered_steps() {
        for severity in Severity::ALL {
            let steps = protocol_for(severity);
            let numbers: Vec<u8> = steps.iter().map(|s| s.step).collect();
            assert_eq!(numbers, vec![1, 2, 3], "{severity:?}");
        }
    }

    #[test]
    fn names_protocol_after_severity() {
        assert_eq!(protocol_name(Severity::Critical), "CRISIS_CRITICAL_PROTOCOL");
        assert_eq!(protocol_name(Severity::Low), "CRISIS_LOW_PROTOCOL");
    }

    #[test]
    fn critical_with_everyone_available_runs_all_steps() {
        let out = dispatch(
            Severity::Critical,
            &[contact("a"), contact("b")],
            &[professional("p")],
            OffsetDateTime::UNIX_EPOCH,
        );
        assert_eq!(
            actions(&out),
            vec![ImmediateEscalation, NotifyContacts, ProfessionalBackup]
        );
        assert_eq!(out[0].resources.map(<[_]>::len), Some(EMERGENCY_RESOURCES.len()));
        assert_eq!(out[1].contacts_notified.as_ref().map(Vec::len), Some(2));
        assert_eq!(out[2].professionals_notified.as_ref().map(Vec::len), Some(1));
    }

    #[test]
    fn critical_without_contacts_or_professionals_only_escalates() {
        let out = dispatch(Severity::Critical, &[], &[], OffsetDateTime::UNIX_EPOCH);
        assert_eq!(actions(&out), vec![ImmediateEscalation]);
    }

    #[test]
    fn high_keeps_step_order_and_skips_missing_contacts() {
        let out = dispatch(
            Severity::High,
            &[],
            &[professional("p")],
            OffsetDateTime::UNIX_EPOCH,
        );
        assert_eq!(actions(&out), vec![AssessSafety, ProfessionalBackup]);
        assert!(out[0].resources.is_none());
    }

    #[test]
    fn low_and_medium_never_notify_anyone() {
        let contacts = [contact("a")];
        let pros = [professional("p")];
        for severity in [Severity::Low, Severity::Medium] {
            let out = dispatch(severity, &contacts, &pros, OffsetDateTime::UNIX_EPOCH);
            assert_eq!(out.len(), 3);
            assert!(out
                .iter()
                .all(|a| a.executed && a.contacts_notified.is_none() && a.professionals_notified.is_none()));
        }
    }

    #[test]
    fn serializes_actions_in_camel_case_without_empty_fields() {
        let out = dispatch(Severity::Low, &[], &[], OffsetDateTime::UNIX_EPOCH);
        let v = serde_json::to_value(&out[0]).unwrap();
        assert_eq!(v["action"], "ACTIVE_LISTENING");
        assert_eq!(v["timestamp"], "1970-01-01T00:00:00Z");
        assert!(v.get("contactsNotified").is_none());
    }

    #[test]
    fn lists_protocols_most_severe_first() {
        let all = all_protocols();
        assert_eq!(all[0].severity, Severity::Critical);
        assert_eq!(all[3].name, "CRISIS_LOW_PROTOCOL");
    }
}
