//! Engine error types
//!
//! Only validation failures surface to callers. Soft paths (unknown
//! stream id, per-recipient delivery failure) are logged inside the
//! engine and never propagate as errors.

/// Result alias for engine operations
pub type Result<T> = std::result::Result<T, RelayError>;

/// Caller-facing validation error
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RelayError {
    /// A participant id was empty or blank
    EmptyParticipantId,
    /// A required field was empty or blank
    EmptyField(&'static str),
    /// A scope string was neither "user" nor "group"
    InvalidScope(String),
}

impl std::fmt::Display for RelayError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RelayError::EmptyParticipantId => write!(f, "Participant id must not be empty"),
            RelayError::EmptyField(field) => write!(f, "Required field must not be empty: {}", field),
            RelayError::InvalidScope(s) => write!(f, "Invalid scope: {:?} (expected \"user\" or \"group\")", s),
        }
    }
}

impl std::error::Error for RelayError {}
