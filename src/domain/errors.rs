/// Failure taxonomy for the analysis coordinator.
///
/// `Cancelled` is deliberately its own variant: an aborted request is a
/// normal outcome that must never surface as a user-visible error, while a
/// transport failure must. `Serialization` never escapes the cache layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CoordinatorError {
    Transport(String),
    Cancelled,
    Serialization(String),
}

impl std::fmt::Display for CoordinatorError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CoordinatorError::Transport(msg) => write!(f, "Transport Error: {}", msg),
            CoordinatorError::Cancelled => write!(f, "Operation Cancelled"),
            CoordinatorError::Serialization(msg) => write!(f, "Serialization Error: {}", msg),
        }
    }
}

impl std::error::Error for CoordinatorError {}

impl CoordinatorError {
    pub fn is_cancellation(&self) -> bool {
        matches!(self, CoordinatorError::Cancelled)
    }
}

// Simple convenience type alias
pub type TransportResult<T> = Result<T, CoordinatorError>;
