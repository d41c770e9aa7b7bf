use thiserror::Error;

/// Failure taxonomy for the action execution core.
///
/// Every failure surfaced to a caller is one of three kinds, matching the
/// stage it arose at: locating/loading the module (`Module`), checking the
/// request before any process exists (`RequestValidation`), or anything
/// after a process was spawned (`RequestProcessing`). Callers translate
/// these into protocol-level responses; nothing here terminates the agent.
#[derive(Debug, Error)]
pub enum AgentError {
    /// The module cannot be loaded, its metadata is malformed, or the
    /// requested action does not exist. Raised before any action process
    /// is spawned.
    #[error("module error: {0}")]
    Module(String),

    /// The supplied params fail the action's input schema. Raised before
    /// any process is spawned; carries the full violation list.
    #[error("request validation failed: {}", .violations.join("; "))]
    RequestValidation { violations: Vec<String> },

    /// Non-zero exit, missing/crashed process, malformed output, or an
    /// output schema violation. Raw stdout/stderr travel with the error so
    /// the caller can always inspect what the module actually produced.
    #[error("request processing failed: {reason}")]
    RequestProcessing {
        reason: String,
        stdout: String,
        stderr: String,
        exit_code: Option<i32>,
    },
}

/// Result type alias for core operations.
pub type Result<T> = std::result::Result<T, AgentError>;

/// Errors from the status spool itself, as opposed to the action whose
/// status it records.
#[derive(Debug, Error)]
pub enum SpoolError {
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("malformed status record: {0}")]
    Json(#[from] serde_json::Error),

    #[error("status record for request {0} is already terminal")]
    AlreadyTerminal(String),

    #[error("refusing to write a non-terminal record as the terminal state")]
    NotTerminal,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_error_lists_all_violations() {
        let err = AgentError::RequestValidation {
            violations: vec!["\"a\" is required".into(), "\"b\" is not a string".into()],
        };
        let msg = err.to_string();
        assert!(msg.contains("\"a\" is required"));
        assert!(msg.contains("\"b\" is not a string"));
    }

    #[test]
    fn processing_error_keeps_reason_in_display() {
        let err = AgentError::RequestProcessing {
            reason: "module process exited with code 2".into(),
            stdout: "partial".into(),
            stderr: "boom".into(),
            exit_code: Some(2),
        };
        assert_eq!(
            err.to_string(),
            "request processing failed: module process exited with code 2"
        );
    }
}
