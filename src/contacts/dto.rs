use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateContactRequest {
    pub name: String,
    pub relationship: String,
    pub phone: String,
    pub email: Option<String>,
    #[serde(default)]
    pub is_primary: bool,
}

impl CreateContactRequest {
    pub fn validate(&self) -> Result<(), &'static str> {
        if [&self.name, &self.relationship, &self.phone]
            .iter()
            .any(|f| f.trim().is_empty())
        {
            return Err("Name, relationship and phone are required");
        }
        Ok(())
    }

    /// Primary contacts are tried first during a crisis.
    pub fn priority(&self) -> i32 {
        if self.is_primary {
            1
        } else {
            2
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateContactRequest {
    pub name: Option<String>,
    pub relationship: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub is_primary: Option<bool>,
    pub priority: Option<i32>,
}

impl UpdateContactRequest {
    pub fn validate(&self) -> Result<(), &'static str> {
        let blank = |f: &Option<String>| f.as_deref().is_some_and(|v| v.trim().is_empty());
        if blank(&self.name) || blank(&self.relationship) || blank(&self.phone) {
            return Err("Name, relationship and phone cannot be empty");
        }
        if matches!(self.priority, Some(p) if p < 1) {
            return Err("Priority must be at least 1");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn contact(is_primary: bool) -> CreateContactRequest {
        CreateContactRequest {
            name: "Asha".into(),
            relationship: "sister".into(),
            phone: "+91 98100 00000".into(),
            email: None,
            is_primary,
        }
    }

    #[test]
    fn primary_contacts_get_top_priority() {
        assert_eq!(contact(true).priority(), 1);
        assert_eq!(contact(false).priority(), 2);
    }

    #[test]
    fn requires_name_relationship_and_phone() {
        assert!(contact(false).validate().is_ok());
        let mut c = contact(false);
        c.phone = "  ".into();
        assert!(c.validate().is_err());
    }

    #[test]
    fn update_rejects_blank_fields_and_zero_priority() {
        assert!(UpdateContactRequest::default().validate().is_ok());
        let blank = UpdateContactRequest {
            name: Some(String::new()),
            ..Default::default()
        };
        assert!(blank.validate().is_err());
        let zero = UpdateContactRequest {
            priority: Some(0),
            ..Default::default()
        };
        assert!(zero.validate().is_err());
    }
}
