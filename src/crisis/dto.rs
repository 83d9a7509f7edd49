use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{
    protocol::{ActionTaken, Hotline, NotifiedContact, NotifiedProfessional, ProtocolDescriptor},
    repo_types::{CrisisReport, CrisisStatus, CrisisType, Severity},
};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InterventionRequest {
    pub session_id: Option<Uuid>,
    pub severity: Severity,
    #[serde(alias = "type")]
    pub crisis_type: CrisisType,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InterventionResponse {
    pub success: bool,
    pub crisis_report: CrisisReport,
    pub protocol_activated: String,
    pub actions_taken: Vec<ActionTaken>,
    pub emergency_resources: &'static [Hotline],
    pub emergency_contacts: Vec<NotifiedContact>,
    pub professional_support: Vec<NotifiedProfessional>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CrisisOverview {
    pub active_crises: Vec<CrisisReport>,
    pub available_protocols: Vec<ProtocolDescriptor>,
    pub emergency_resources: &'static [Hotline],
}

#[derive(Debug, Deserialize)]
pub struct UpdateCrisisRequest {
    pub status: CrisisStatus,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_short_type_field() {
        let body: InterventionRequest = serde_json::from_value(serde_json::json!({
            "severity": "HIGH",
            "type": "PANIC_ATTACK",
            "description": "racing heart"
        }))
        .unwrap();
        assert_eq!(body.severity, Severity::High);
        assert_eq!(body.crisis_type, CrisisType::PanicAttack);
        assert!(body.session_id.is_none());
    }

    #[test]
    fn rejects_unknown_severity() {
        let res = serde_json::from_value::<InterventionRequest>(serde_json::json!({
            "severity": "EXTREME",
            "crisisType": "OTHER",
            "description": "x"
        }));
        assert!(res.is_err());
    }
}
