//! Engine error taxonomy

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    /// A checklist or rule file failed to parse. Directory loaders log and
    /// skip the file instead; this surfaces only when a caller loads one
    /// file directly.
    #[error("invalid configuration in {path}: {source}")]
    Configuration {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// No checklist qualified for the detected process and entity type.
    /// Reportable, not a crash; carries the table keys so the caller can
    /// present alternatives.
    #[error("no applicable checklist found for process: {process}, entity_type: {entity_type}")]
    NoApplicableChecklist {
        process: String,
        entity_type: String,
        available_checklists: Vec<String>,
    },

    /// Every document in the batch failed to parse.
    #[error("no documents parsed successfully")]
    NoValidDocuments,

    #[error(transparent)]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl EngineError {
    /// Error payload in the shape API callers consume:
    /// `{"error": ..., "available_checklists": [...]}` where applicable.
    pub fn to_payload(&self) -> serde_json::Value {
        match self {
            EngineError::NoApplicableChecklist {
                available_checklists,
                ..
            } => serde_json::json!({
                "error": self.to_string(),
                "available_checklists": available_checklists,
            }),
            other => serde_json::json!({ "error": other.to_string() }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_checklist_payload_lists_alternatives() {
        let err = EngineError::NoApplicableChecklist {
            process: "Liquidation".to_string(),
            entity_type: "Branch (Non-Financial)".to_string(),
            available_checklists: vec![
                "Company Incorporation".to_string(),
                "Employment".to_string(),
            ],
        };
        let payload = err.to_payload();
        assert_eq!(
            payload["available_checklists"],
            serde_json::json!(["Company Incorporation", "Employment"])
        );
        let message = payload["error"].as_str().unwrap();
        assert!(message.contains("Liquidation"));
        assert!(message.contains("Branch (Non-Financial)"));
    }

    #[test]
    fn test_io_payload_has_error_only() {
        let err = EngineError::from(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "missing rules dir",
        ));
        let payload = err.to_payload();
        assert!(payload.get("available_checklists").is_none());
        assert!(payload["error"].as_str().unwrap().contains("missing rules dir"));
    }
}
