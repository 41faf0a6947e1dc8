use crate::errors::GatewayError;

/// Collects required string fields of a request body, remembering which were absent or empty.
pub struct RequiredFields {
    required: &'static [&'static str],
    missing: Vec<&'static str>,
}

impl RequiredFields {
    pub fn new(required: &'static [&'static str]) -> Self {
        Self {
            required,
            missing: Vec::new(),
        }
    }

    pub fn take(&mut self, name: &'static str, value: Option<String>) -> String {
        match value {
            Some(value) if !value.is_empty() => value,
            _ => {
                self.missing.push(name);
                String::new()
            }
        }
    }

    pub fn finish(self) -> Result<(), GatewayError> {
        if self.missing.is_empty() {
            Ok(())
        } else {
            Err(GatewayError::Validation {
                required: self.required.to_vec(),
                missing: self.missing,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const REQUIRED: &[&str] = &["userId", "title", "body"];

    #[test]
    fn test_all_present() {
        let mut fields = RequiredFields::new(REQUIRED);

        let user_id = fields.take("userId", Some("u1".to_string()));
        let title = fields.take("title", Some("Hi".to_string()));
        let body = fields.take("body", Some("There".to_string()));

        assert!(fields.finish().is_ok());
        assert_eq!((user_id.as_str(), title.as_str(), body.as_str()), ("u1", "Hi", "There"));
    }

    #[test]
    fn test_absent_and_empty_fields_are_reported() {
        let mut fields = RequiredFields::new(REQUIRED);

        fields.take("userId", None);
        fields.take("title", Some(String::new()));
        fields.take("body", Some("There".to_string()));

        match fields.finish() {
            Err(GatewayError::Validation { required, missing }) => {
                assert_eq!(required, vec!["userId", "title", "body"]);
                assert_eq!(missing, vec!["userId", "title"]);
            }
            other => panic!("expected validation error, got {:?}", other),
        }
    }
}
