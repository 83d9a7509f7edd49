use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{
    repo_types::{
        ContentType, Counts, ManagedUser, ModerationItem, ModerationStatus, SessionStat,
        SystemLog, SystemSetting,
    },
    services::{ModerationAction, UserAction},
};
use crate::{
    db::{PageMeta, PageQuery},
    users::repo_types::{ProfileChanges, Role},
};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Overview {
    #[serde(flatten)]
    pub counts: Counts,
    pub total_revenue: i64,
    pub active_crisis_reports: i64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardResponse {
    pub overview: Overview,
    pub session_stats: Vec<SessionStat>,
    pub recent_logs: Vec<SystemLog>,
}

/// `?status=` filter on the user list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivityFilter {
    Active,
    Inactive,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub search: Option<String>,
    pub role: Option<Role>,
    pub status: Option<ActivityFilter>,
}

impl UserQuery {
    pub fn paging(&self) -> PageQuery {
        let d = PageQuery::default();
        PageQuery {
            page: self.page.unwrap_or(d.page),
            limit: self.limit.unwrap_or(d.limit),
        }
    }

    pub fn available(&self) -> Option<bool> {
        self.status.map(|s| s == ActivityFilter::Active)
    }
}

#[derive(Debug, Serialize)]
pub struct UserList {
    pub users: Vec<ManagedUser>,
    pub pagination: PageMeta,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserRequest {
    pub email: String,
    pub password: String,
    pub name: Option<String>,
    pub role: Role,
    pub hourly_rate: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct UserActionRequest {
    pub action: UserAction,
    #[serde(default)]
    pub data: Option<ProfileChanges>,
}

#[derive(Debug, Default, Deserialize)]
pub struct SettingsQuery {
    pub category: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SettingsResponse {
    pub settings: BTreeMap<String, Vec<SystemSetting>>,
    pub flat: Vec<SystemSetting>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSettingRequest {
    pub key: String,
    pub value: serde_json::Value,
    pub description: Option<String>,
    pub category: String,
    #[serde(default)]
    pub is_public: bool,
}

impl CreateSettingRequest {
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.key.trim().is_empty() || self.category.trim().is_empty() || self.value.is_null() {
            return Err("Key, value, and category are required");
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSettingRequest {
    pub value: serde_json::Value,
    pub description: Option<String>,
    pub is_public: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModerationQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub status: Option<ModerationStatus>,
    pub content_type: Option<ContentType>,
}

impl ModerationQuery {
    pub fn paging(&self) -> PageQuery {
        let d = PageQuery::default();
        PageQuery {
            page: self.page.unwrap_or(d.page),
            limit: self.limit.unwrap_or(d.limit),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ModerationList {
    pub items: Vec<ModerationItem>,
    pub pagination: PageMeta,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModerateRequest {
    pub content_id: Uuid,
    pub content_type: ContentType,
    pub action: ModerationAction,
    pub reason: Option<String>,
    pub admin_notes: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_query_maps_status_to_availability() {
        let q: UserQuery = serde_json::from_value(serde_json::json!({
            "status": "inactive",
            "role": "TIME_GIVER"
        }))
        .unwrap();
        assert_eq!(q.available(), Some(false));
        assert_eq!(q.role, Some(Role::TimeGiver));
        assert_eq!(q.paging().page(), 1);
        assert_eq!(UserQuery::default().available(), None);
    }

    #[test]
    fn setting_requires_key_value_and_category() {
        let mut req: CreateSettingRequest = serde_json::from_value(serde_json::json!({
            "key": "platform_fee",
            "value": 20,
            "category": "payments"
        }))
        .unwrap();
        assert!(!req.is_public);
        assert!(req.validate().is_ok());

        req.value = serde_json::Value::Null;
        assert!(req.validate().is_err());
    }

    #[test]
    fn moderation_request_uses_screaming_content_type() {
        let req: ModerateRequest = serde_json::from_value(serde_json::json!({
            "contentId": "6f1c1d38-8a3f-4c1e-9f0e-2b1f4c9a7d11",
            "contentType": "FORUM_POST",
            "action": "approve"
        }))
        .unwrap();
        assert_eq!(req.content_type, ContentType::ForumPost);
        assert_eq!(req.action, ModerationAction::Approve);
    }
}
