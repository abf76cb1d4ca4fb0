use thiserror::Error;

/// Errors raised by the estimation and matching engine
///
/// An empty match set is a normal outcome and is never reported through this type.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EngineError {
    /// Negative counts, out-of-range coordinates, malformed rate tables
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The geocoding boundary could not turn a location string into coordinates
    #[error("Location could not be resolved: {0}")]
    LocationUnresolved(String),
}

impl EngineError {
    pub fn invalid(message: impl Into<String>) -> Self {
        EngineError::InvalidInput(message.into())
    }

    pub fn unresolved(location: impl Into<String>) -> Self {
        EngineError::LocationUnresolved(location.into())
    }

    /// Stable machine-readable code used in error responses
    pub fn code(&self) -> &'static str {
        match self {
            EngineError::InvalidInput(_) => "invalid_input",
            EngineError::LocationUnresolved(_) => "location_unresolved",
        }
    }
}

pub type EngineResult<T> = Result<T, EngineError>;
