//! Acknowledgements returned by the control endpoints.

use serde::{Deserialize, Serialize};

/// Generic acknowledgement body.
///
/// Control endpoints answer with a loose `{status, message, ...}` object, or
/// with nothing at all. Unknown fields are kept in `extra`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Ack {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl Ack {
    /// Human-readable one-liner.
    pub fn describe(&self) -> String {
        match (&self.status, &self.message) {
            (Some(status), Some(message)) => format!("{}: {}", status, message),
            (Some(status), None) => status.clone(),
            (None, Some(message)) => message.clone(),
            (None, None) if self.extra.is_empty() => "ok".to_string(),
            (None, None) => serde_json::Value::Object(self.extra.clone()).to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ack_keeps_extra_fields() {
        let json = r#"{"status": "success", "message": "created", "model_path": "outputs/models/m1.pth"}"#;
        let ack: Ack = serde_json::from_str(json).unwrap();
        assert_eq!(ack.describe(), "success: created");
        assert_eq!(ack.extra["model_path"], "outputs/models/m1.pth");
    }

    #[test]
    fn test_empty_ack() {
        let ack: Ack = serde_json::from_str("{}").unwrap();
        assert_eq!(ack.describe(), "ok");
    }
}
