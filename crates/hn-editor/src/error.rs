//! Error and outcome types for the editing layer.

use hn_model::ModelError;

/// Conditions that stop the caller's flow. Everything else is an outcome.
#[derive(Debug, thiserror::Error)]
pub enum EditorError {
    #[error("Invalid model: {0}")]
    InvalidModel(#[from] ModelError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type EditorResult<T> = Result<T, EditorError>;

/// Why a connection request was refused.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConnectError {
    #[error("A pipe cannot start and end at the same node ('{id}')")]
    IdenticalEndpoints { id: String },

    #[error("Node '{id}' does not exist")]
    MissingNode { id: String },

    #[error("Nodes '{from}' and '{to}' are already connected")]
    DuplicateConnection { from: String, to: String },
}

/// Result of `add_pipe`: a structured value, never an `Err`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipeOutcome {
    pub success: bool,
    pub error: Option<String>,
    pub pipe_id: Option<String>,
    reason: Option<ConnectError>,
}

impl PipeOutcome {
    pub fn connected(pipe_id: impl Into<String>) -> Self {
        Self {
            success: true,
            error: None,
            pipe_id: Some(pipe_id.into()),
            reason: None,
        }
    }

    pub fn rejected(reason: ConnectError) -> Self {
        Self {
            success: false,
            error: Some(reason.to_string()),
            pipe_id: None,
            reason: Some(reason),
        }
    }

    pub fn reason(&self) -> Option<&ConnectError> {
        self.reason.as_ref()
    }
}

/// Whether a mutation changed the live state (and recorded history).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationOutcome {
    Applied,
    Unchanged,
}

impl MutationOutcome {
    pub fn is_applied(self) -> bool {
        matches!(self, MutationOutcome::Applied)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejected_outcome_carries_message_and_reason() {
        let out = PipeOutcome::rejected(ConnectError::MissingNode { id: "n9".into() });
        assert!(!out.success);
        assert_eq!(out.error.as_deref(), Some("Node 'n9' does not exist"));
        assert!(matches!(out.reason(), Some(ConnectError::MissingNode { .. })));
        assert!(out.pipe_id.is_none());
    }

    #[test]
    fn connected_outcome() {
        let out = PipeOutcome::connected("p1");
        assert!(out.success);
        assert_eq!(out.pipe_id.as_deref(), Some("p1"));
        assert!(out.reason().is_none());
    }
}
