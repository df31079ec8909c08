use crate::types::StepKind;
use thiserror::Error;

/// Core error type for the replyflow engine
///
/// Incomplete user input is never reported through this type; it is
/// collected in a [`ValidationReport`](crate::domain::assembler::ValidationReport).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// Step identifier does not name a catalog step
    #[error("Unknown step: {0}")]
    UnknownStep(String),

    /// Step exists in the catalog but has no node in this flow instance
    #[error("Step not instantiated: {0}")]
    StepNotInstantiated(StepKind),

    /// Payload variant does not belong to the step it was submitted for
    #[error("Payload mismatch: expected {expected} payload, found {found}")]
    PayloadMismatch {
        /// Step the caller targeted
        expected: StepKind,
        /// Step the payload belongs to
        found: StepKind,
    },

    /// Operation requires a started flow
    #[error("Flow has not been started")]
    FlowNotStarted,

    /// Raw step data could not be decoded into the step's payload shape
    #[error("Invalid step payload: {0}")]
    InvalidPayload(String),

    /// The automation-creation collaborator rejected the payload
    #[error("Submission error: {0}")]
    SubmissionError(String),

    /// A lookup collaborator failed
    #[error("External dependency error: {0}")]
    ExternalDependencyError(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    /// Input/output error
    #[error("Input/output error: {0}")]
    IOError(String),
}

impl CoreError {
    /// True for errors caused by invalid use of the flow graph API.
    ///
    /// These indicate a caller bug and are not fixed by retrying.
    pub fn is_topology_error(&self) -> bool {
        matches!(
            self,
            CoreError::UnknownStep(_)
                | CoreError::StepNotInstantiated(_)
                | CoreError::PayloadMismatch { .. }
                | CoreError::FlowNotStarted
        )
    }
}

impl From<serde_json::Error> for CoreError {
    fn from(err: serde_json::Error) -> Self {
        CoreError::SerializationError(err.to_string())
    }
}

impl From<std::io::Error> for CoreError {
    fn from(err: std::io::Error) -> Self {
        CoreError::IOError(err.to_string())
    }
}

/// Failure reported by an external collaborator service
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct CollaboratorError {
    /// Message as returned by the collaborator
    pub message: String,
}

impl CollaboratorError {
    /// Create a collaborator error from its message
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Error as IoError, ErrorKind};

    #[test]
    fn test_error_display() {
        let errors = vec![
            (CoreError::UnknownStep("bogus".to_string()), "Unknown step: bogus"),
            (CoreError::StepNotInstantiated(StepKind::Post), "Step not instantiated: post"),
            (
                CoreError::PayloadMismatch {
                    expected: StepKind::Page,
                    found: StepKind::Platform,
                },
                "Payload mismatch: expected page payload, found platform",
            ),
            (CoreError::FlowNotStarted, "Flow has not been started"),
            (CoreError::InvalidPayload("keywords".to_string()), "Invalid step payload: keywords"),
            (CoreError::SubmissionError("quota exceeded".to_string()), "Submission error: quota exceeded"),
            (CoreError::ExternalDependencyError("timeout".to_string()), "External dependency error: timeout"),
            (CoreError::SerializationError("ser_err".to_string()), "Serialization error: ser_err"),
            (CoreError::ConfigurationError("config_err".to_string()), "Configuration error: config_err"),
            (CoreError::IOError("io_err".to_string()), "Input/output error: io_err"),
        ];

        for (error, expected_msg) in errors {
            assert_eq!(error.to_string(), expected_msg);
        }
    }

    #[test]
    fn test_topology_classification() {
        assert!(CoreError::UnknownStep("x".to_string()).is_topology_error());
        assert!(CoreError::StepNotInstantiated(StepKind::Config).is_topology_error());
        assert!(CoreError::FlowNotStarted.is_topology_error());
        assert!(!CoreError::SubmissionError("down".to_string()).is_topology_error());
        assert!(!CoreError::InvalidPayload("bad".to_string()).is_topology_error());
    }

    #[test]
    fn test_from_serde_json_error() {
        let json_error = serde_json::from_str::<serde_json::Value>("invalid json").unwrap_err();
        let error: CoreError = json_error.into();

        match error {
            CoreError::SerializationError(msg) => {
                assert!(msg.contains("expected value"));
            }
            _ => panic!("Expected SerializationError variant"),
        }
    }

    #[test]
    fn test_from_io_error() {
        let io_error = IoError::new(ErrorKind::NotFound, "file not found");
        let error: CoreError = io_error.into();

        match error {
            CoreError::IOError(msg) => {
                assert!(msg.contains("file not found"));
            }
            _ => panic!("Expected IOError variant"),
        }
    }

    #[test]
    fn test_collaborator_error_keeps_message() {
        let err = CollaboratorError::new("page token expired");
        assert_eq!(err.to_string(), "page token expired");
        assert_eq!(err.message, "page token expired");
    }
}
