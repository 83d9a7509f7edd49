use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::repo_types::{ModerationStatus, SystemSetting};

/// Account action requested through `PUT /admin/users/:id`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserAction {
    Ban,
    Suspend,
    Verify,
    Update,
    Disable,
    Enable,
}

/// Flag changes an action applies; `None` leaves the flag as is.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FlagChange {
    pub is_available: Option<bool>,
    pub is_disabled: Option<bool>,
}

impl UserAction {
    pub fn action_type(self) -> &'static str {
        match self {
            UserAction::Ban => "USER_BAN",
            UserAction::Suspend => "USER_SUSPEND",
            UserAction::Verify | UserAction::Update => "USER_VERIFICATION",
            UserAction::Disable => "USER_DISABLE",
            UserAction::Enable => "USER_ENABLE",
        }
    }

    pub fn flags(self) -> FlagChange {
        match self {
            UserAction::Ban => FlagChange {
                is_available: Some(false),
                is_disabled: Some(true),
            },
            UserAction::Suspend => FlagChange {
                is_available: Some(false),
                is_disabled: None,
            },
            UserAction::Verify => FlagChange {
                is_available: Some(true),
                is_disabled: None,
            },
            UserAction::Disable => FlagChange {
                is_available: None,
                is_disabled: Some(true),
            },
            UserAction::Enable => FlagChange {
                is_available: None,
                is_disabled: Some(false),
            },
            UserAction::Update => FlagChange::default(),
        }
    }

    /// Actions an admin may not apply to their own account.
    pub fn locks_out(self) -> bool {
        matches!(
            self,
            UserAction::Ban | UserAction::Suspend | UserAction::Disable
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModerationAction {
    Approve,
    Reject,
}

impl ModerationAction {
    pub fn status(self) -> ModerationStatus {
        match self {
            ModerationAction::Approve => ModerationStatus::Approved,
            ModerationAction::Reject => ModerationStatus::Rejected,
        }
    }

    pub fn action_type(self) -> &'static str {
        match self {
            ModerationAction::Approve => "CONTENT_APPROVE",
            ModerationAction::Reject => "CONTENT_DELETE",
        }
    }
}

/// Settings keyed by category, each list kept in the order given.
pub fn group_settings(settings: &[SystemSetting]) -> BTreeMap<String, Vec<SystemSetting>> {
    let mut grouped: BTreeMap<String, Vec<SystemSetting>> = BTreeMap::new();
    for s in settings {
        grouped.entry(s.category.clone()).or_default().push(s.clone());
    }
    grouped
}

#[cfg(test)]
mod tests {
    use time::OffsetDateTime;
    use uuid::Uuid;

    use super::*;

    fn setting(key: &str, category: &str) -> SystemSetting {
        SystemSetting {
            id: Uuid::new_v4(),
            key: key.into(),
            value: serde_json::json!(true),
            description: None,
            category: category.into(),
            is_public: false,
            updated_by: None,
            created_at: OffsetDateTime::UNIX_EPOCH,
            updated_at: OffsetDateTime::UNIX_EPOCH,
        }
    }

    #[test]
    fn ban_disables_and_hides_the_account() {
        let f = UserAction::Ban.flags();
        assert_eq!(f.is_available, Some(false));
        assert_eq!(f.is_disabled, Some(true));
        assert_eq!(UserAction::Ban.action_type(), "USER_BAN");
    }

    #[test]
    fn update_touches_no_flags() {
        assert_eq!(UserAction::Update.flags(), FlagChange::default());
        assert!(!UserAction::Update.locks_out());
        assert!(!UserAction::Enable.locks_out());
        assert!(UserAction::Suspend.locks_out());
    }

    #[test]
    fn actions_parse_lowercase() {
        let a: UserAction = serde_json::from_str("\"verify\"").unwrap();
        assert_eq!(a, UserAction::Verify);
        assert!(serde_json::from_str::<UserAction>("\"VERIFY\"").is_err());

        let m: ModerationAction = serde_json::from_str("\"reject\"").unwrap();
        assert_eq!(m.status(), ModerationStatus::Rejected);
        assert_eq!(m.action_type(), "CONTENT_DELETE");
    }

    #[test]
    fn settings_group_by_category() {
        let all = vec![
            setting("fee", "payments"),
            setting("max_duration", "sessions"),
            setting("min_withdrawal", "payments"),
        ];
        let grouped = group_settings(&all);
        assert_eq!(grouped.len(), 2);
        let keys: Vec<_> = grouped["payments"].iter().map(|s| s.key.as_str()).collect();
        assert_eq!(keys, ["fee", "min_withdrawal"]);
        assert_eq!(grouped["sessions"].len(), 1);
    }
}
