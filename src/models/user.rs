use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRecord {
    pub id: String,
    pub email: Option<String>,
    pub fcm_token: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    pub id: String,
    pub email: Option<String>,
    pub has_token: bool,
}

impl UserRecord {
    /// The registration token, if present and non-empty. Empty strings count as absent.
    pub fn delivery_token(&self) -> Option<&str> {
        self.fcm_token.as_deref().filter(|token| !token.is_empty())
    }

    pub fn has_token(&self) -> bool {
        self.delivery_token().is_some()
    }

    pub fn summary(&self) -> UserSummary {
        UserSummary {
            id: self.id.clone(),
            email: self.email.clone(),
            has_token: self.has_token(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(token: Option<&str>) -> UserRecord {
        UserRecord {
            id: "u1".to_string(),
            email: Some("u1@example.com".to_string()),
            fcm_token: token.map(str::to_string),
        }
    }

    #[test]
    fn test_empty_token_is_treated_as_absent() {
        assert_eq!(record(Some("")).delivery_token(), None);
        assert!(!record(Some("")).has_token());
        assert!(!record(None).has_token());
    }

    #[test]
    fn test_summary_projects_token_presence() {
        let summary = record(Some("tok123")).summary();

        assert_eq!(summary.id, "u1");
        assert_eq!(summary.email.as_deref(), Some("u1@example.com"));
        assert!(summary.has_token);

        let json = serde_json::to_value(record(None).summary()).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"id": "u1", "email": "u1@example.com", "hasToken": false})
        );
    }
}
