use thiserror::Error;

/// Convenient result alias for the restaurant library.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level library error type.
#[derive(Debug, Error)]
pub enum Error {
    /// A query parameter was missing or could not be parsed.
    #[error("{0}")]
    InvalidParameter(String),

    /// A request body failed validation.
    #[error("{0}")]
    InvalidRequest(String),

    /// Identity claims were missing, malformed, or credentials were rejected.
    #[error("{0}")]
    Unauthorized(String),

    /// The caller is authenticated but lacks the required group.
    #[error("{0}")]
    Forbidden(String),

    /// Raised when a location id does not resolve to a stored location.
    #[error("location {id} not found")]
    LocationNotFound { id: String },

    /// Raised when no table matches the lookup.
    #[error("{message}")]
    TableNotFound { message: String },

    /// Raised when the local user record is absent.
    #[error("{message}")]
    UserNotFound { message: String },

    /// Requested window overlaps a confirmed reservation, or the id already exists.
    #[error("{0}")]
    ReservationConflict(String),

    /// Sign-up for an email that the identity provider already knows.
    #[error("Email already exists")]
    EmailAlreadyExists,

    /// Identity provider rejected the password policy.
    #[error("Password does not meet complexity requirements")]
    WeakPassword,

    /// Wrapper for data store failures.
    #[error("storage failure during {operation}: {message}")]
    Storage { operation: String, message: String },

    /// Wrapper for identity provider failures.
    #[error("identity provider failure during {operation}: {message}")]
    Identity { operation: String, message: String },

    /// Raised when a stored item or cursor cannot be (de)serialized.
    #[error("serialization failure: {0}")]
    Serialization(String),
}

impl Error {
    pub fn invalid_parameter(message: impl Into<String>) -> Self {
        Error::InvalidParameter(message.into())
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        Error::InvalidRequest(message.into())
    }

    pub fn storage(operation: impl Into<String>, message: impl ToString) -> Self {
        Error::Storage {
            operation: operation.into(),
            message: message.to_string(),
        }
    }

    pub fn identity(operation: impl Into<String>, message: impl ToString) -> Self {
        Error::Identity {
            operation: operation.into(),
            message: message.to_string(),
        }
    }

    /// Returns true for failures caused by infrastructure rather than the caller.
    pub fn is_internal(&self) -> bool {
        matches!(
            self,
            Error::Storage { .. } | Error::Identity { .. } | Error::Serialization(_)
        )
    }
}

impl From<serde_json::Error> for Error {
    fn from(value: serde_json::Error) -> Self {
        Error::Serialization(value.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_messages_are_passed_through() {
        let err = Error::invalid_request("Date is required");
        assert_eq!(err.to_string(), "Date is required");
        assert!(!err.is_internal());
    }

    #[test]
    fn storage_errors_are_internal() {
        let err = Error::storage("put reservation", "throttled");
        assert!(err.is_internal());
        assert!(err.to_string().contains("put reservation"));
    }
}
