use serde::Deserialize;

pub const DEFAULT_LIST_LIMIT: i64 = 10;
pub const MAX_LIST_LIMIT: i64 = 50;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListQuery {
    pub specialization: Option<String>,
    pub available: Option<bool>,
    pub limit: Option<i64>,
}

impl ListQuery {
    pub fn limit(&self) -> i64 {
        self.limit
            .unwrap_or(DEFAULT_LIST_LIMIT)
            .clamp(1, MAX_LIST_LIMIT)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateProfessionalRequest {
    pub name: String,
    pub profession: String,
    pub organization: Option<String>,
    pub phone: String,
    pub email: Option<String>,
    pub specialization: Option<String>,
    pub response_time_minutes: Option<i32>,
    pub timezone: Option<String>,
    #[serde(default = "default_priority")]
    pub priority: i32,
}

fn default_priority() -> i32 {
    1
}

impl CreateProfessionalRequest {
    pub fn validate(&self) -> Result<(), &'static str> {
        if [&self.name, &self.profession, &self.phone]
            .iter()
            .any(|f| f.trim().is_empty())
        {
            return Err("Name, profession and phone are required");
        }
        if self.priority < 1 {
            return Err("Priority must be at least 1");
        }
        if matches!(self.response_time_minutes, Some(m) if m < 0) {
            return Err("Response time cannot be negative");
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfessionalRequest {
    pub name: Option<String>,
    pub profession: Option<String>,
    pub organization: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub specialization: Option<String>,
    pub response_time_minutes: Option<i32>,
    pub timezone: Option<String>,
    pub priority: Option<i32>,
    pub is_available: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn list_limit_defaults_and_clamps() {
        assert_eq!(ListQuery::default().limit(), 10);
        let big = ListQuery {
            limit: Some(1_000),
            ..Default::default()
        };
        assert_eq!(big.limit(), MAX_LIST_LIMIT);
        let zero = ListQuery {
            limit: Some(0),
            ..Default::default()
        };
        assert_eq!(zero.limit(), 1);
    }

    #[test]
    fn create_defaults_priority_to_one() {
        let body: CreateProfessionalRequest = serde_json::from_value(serde_json::json!({
            "name": "Dr. Mehta",
            "profession": "Psychiatrist",
            "phone": "+91 11 2345 6789",
            "responseTimeMinutes": 15
        }))
        .unwrap();
        assert_eq!(body.priority, 1);
        assert!(body.validate().is_ok());
    }

    #[test]
    fn rejects_negative_response_time() {
        let body: CreateProfessionalRequest = serde_json::from_value(serde_json::json!({
            "name": "Dr. Mehta",
            "profession": "Psychiatrist",
            "phone": "+91 11 2345 6789",
            "responseTimeMinutes": -1
        }))
        .unwrap();
        assert!(body.validate().is_err());
    }
}
