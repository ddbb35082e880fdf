use crate::wizard::Stage;

/// Errors surfaced by the authoring engine to its host.
///
/// Validation and busy errors are raised locally before any external call is
/// made. Collaborator and transport errors come from the external services
/// and leave the wizard in the stage it was in.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AuthoringError {
    #[error("{0}")]
    Validation(String),
    #[error("collaborator error: {0}")]
    Collaborator(String),
    #[error("transport error: {0}")]
    Transport(String),
    #[error("canonical content could not be decoded: {0}")]
    Serialization(String),
    #[error("another request is already in flight")]
    Busy,
    #[error("action not available in the {0:?} stage")]
    InvalidStage(Stage),
}

impl AuthoringError {
    pub(crate) fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// True for errors produced by an external call (as opposed to local checks).
    pub fn is_external(&self) -> bool {
        matches!(self, Self::Collaborator(_) | Self::Transport(_))
    }
}

/// Failure reported by an external collaborator call.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CallError {
    /// The service answered but refused the request.
    #[error("{0}")]
    Rejected(String),
    /// The request never produced an answer.
    #[error("{0}")]
    Transport(String),
}

impl From<CallError> for AuthoringError {
    fn from(err: CallError) -> Self {
        match err {
            CallError::Rejected(msg) => AuthoringError::Collaborator(msg),
            CallError::Transport(msg) => AuthoringError::Transport(msg),
        }
    }
}

pub type Result<T, E = AuthoringError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn call_errors_map_onto_taxonomy() {
        let rejected: AuthoringError = CallError::Rejected("bad brief".into()).into();
        let transport: AuthoringError = CallError::Transport("connection reset".into()).into();

        assert_eq!(rejected, AuthoringError::Collaborator("bad brief".into()));
        assert_eq!(transport, AuthoringError::Transport("connection reset".into()));
        assert!(rejected.is_external());
        assert!(transport.is_external());
        assert!(!AuthoringError::Busy.is_external());
    }

    #[test]
    fn display_messages() {
        assert_eq!(
            AuthoringError::validation("brief is empty").to_string(),
            "brief is empty"
        );
        assert_eq!(
            AuthoringError::InvalidStage(Stage::Brief).to_string(),
            "action not available in the Brief stage"
        );
    }
}
