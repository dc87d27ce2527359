use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Field name -> list of validation messages, as rendered under `errors`.
pub type FieldErrors = BTreeMap<String, Vec<String>>;

/// Uniform JSON wrapper around every API response:
/// `{status, statusCode, message, data?, errors?}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub status: bool,
    #[serde(rename = "statusCode")]
    pub status_code: u16,
    pub message: String,
    #[serde(default = "Option::default", skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub errors: Option<FieldErrors>,
}

impl<T> Envelope<T> {
    pub fn ok(status_code: u16, message: impl Into<String>, data: T) -> Self {
        Self {
            status: true,
            status_code,
            message: message.into(),
            data: Some(data),
            errors: None,
        }
    }

    pub fn ok_empty(status_code: u16, message: impl Into<String>) -> Self {
        Self {
            status: true,
            status_code,
            message: message.into(),
            data: None,
            errors: None,
        }
    }

    pub fn error(status_code: u16, message: impl Into<String>, errors: Option<FieldErrors>) -> Self {
        Self {
            status: false,
            status_code,
            message: message.into(),
            data: None,
            errors,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_envelope_shape() {
        let envelope = Envelope::ok(201, "Document created successfully", 7);
        let json = serde_json::to_value(&envelope).unwrap();
        assert_eq!(json["status"], true);
        assert_eq!(json["statusCode"], 201);
        assert_eq!(json["data"], 7);
        assert!(json.get("errors").is_none());
    }

    #[test]
    fn error_envelope_carries_field_errors() {
        let mut errors = FieldErrors::new();
        errors.insert("status".into(), vec!["The status field is required.".into()]);
        let envelope = Envelope::<()>::error(422, "Validation failed", Some(errors));
        let json = serde_json::to_value(&envelope).unwrap();
        assert_eq!(json["status"], false);
        assert_eq!(json["statusCode"], 422);
        assert!(json.get("data").is_none());
        assert_eq!(json["errors"]["status"][0], "The status field is required.");
    }
}
