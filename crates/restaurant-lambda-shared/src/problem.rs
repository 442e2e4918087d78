//! RFC 9457 Problem Details for HTTP APIs.
//!
//! Provides structured error responses following the Problem Details standard.
//! See: <https://www.rfc-editor.org/rfc/rfc9457.html>

use http::StatusCode;
use serde::{Deserialize, Serialize};
use tracing::error;

use restaurant_lib::Error as LibError;

/// Problem type URI for invalid query parameters or request bodies.
pub const PROBLEM_INVALID_REQUEST: &str = "/problems/invalid-request";

/// Problem type URI for missing or rejected credentials.
pub const PROBLEM_UNAUTHORIZED: &str = "/problems/unauthorized";

/// Problem type URI for callers without the required group.
pub const PROBLEM_FORBIDDEN: &str = "/problems/forbidden";

/// Problem type URI for absent locations, tables and users.
pub const PROBLEM_NOT_FOUND: &str = "/problems/not-found";

/// Problem type URI for overlapping or duplicate reservations.
pub const PROBLEM_CONFLICT: &str = "/problems/reservation-conflict";

/// Problem type URI for internal server errors.
pub const PROBLEM_INTERNAL_ERROR: &str = "/problems/internal-error";

const GENERIC_INTERNAL_DETAIL: &str = "An unexpected error occurred";

/// RFC 9457 Problem Details response structure.
///
/// # Example
///
/// ```
/// use http::StatusCode;
/// use restaurant_lambda_shared::{ProblemDetails, PROBLEM_NOT_FOUND};
///
/// let problem = ProblemDetails::new(PROBLEM_NOT_FOUND, "Not Found", StatusCode::NOT_FOUND)
///     .with_detail("location 7 not found")
///     .with_request_id("req-12345");
/// assert_eq!(problem.status, 404);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProblemDetails {
    /// URI reference identifying the problem type (relative).
    #[serde(rename = "type")]
    pub type_uri: String,

    /// Short, human-readable summary of the problem.
    pub title: String,

    /// HTTP status code for this problem.
    pub status: u16,

    /// Human-readable explanation specific to this occurrence.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,

    /// Request identifier of the failing invocation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instance: Option<String>,
}

impl ProblemDetails {
    pub fn new(type_uri: impl Into<String>, title: impl Into<String>, status: StatusCode) -> Self {
        Self {
            type_uri: type_uri.into(),
            title: title.into(),
            status: status.as_u16(),
            detail: None,
            instance: None,
        }
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    pub fn with_request_id(mut self, request_id: impl Into<String>) -> Self {
        self.instance = Some(request_id.into());
        self
    }

    /// 400 for malformed or missing input.
    pub fn bad_request(detail: impl Into<String>, request_id: impl Into<String>) -> Self {
        Self::new(
            PROBLEM_INVALID_REQUEST,
            "Invalid Request",
            StatusCode::BAD_REQUEST,
        )
        .with_detail(detail)
        .with_request_id(request_id)
    }

    pub fn unauthorized(detail: impl Into<String>, request_id: impl Into<String>) -> Self {
        Self::new(PROBLEM_UNAUTHORIZED, "Unauthorized", StatusCode::UNAUTHORIZED)
            .with_detail(detail)
            .with_request_id(request_id)
    }

    pub fn forbidden(detail: impl Into<String>, request_id: impl Into<String>) -> Self {
        Self::new(PROBLEM_FORBIDDEN, "Forbidden", StatusCode::FORBIDDEN)
            .with_detail(detail)
            .with_request_id(request_id)
    }

    pub fn not_found(detail: impl Into<String>, request_id: impl Into<String>) -> Self {
        Self::new(PROBLEM_NOT_FOUND, "Not Found", StatusCode::NOT_FOUND)
            .with_detail(detail)
            .with_request_id(request_id)
    }

    pub fn conflict(detail: impl Into<String>, request_id: impl Into<String>) -> Self {
        Self::new(PROBLEM_CONFLICT, "Conflict", StatusCode::CONFLICT)
            .with_detail(detail)
            .with_request_id(request_id)
    }

    /// 500 with a caller-safe detail.
    pub fn internal_error(detail: impl Into<String>, request_id: impl Into<String>) -> Self {
        Self::new(
            PROBLEM_INTERNAL_ERROR,
            "Internal Error",
            StatusCode::INTERNAL_SERVER_ERROR,
        )
        .with_detail(detail)
        .with_request_id(request_id)
    }

    pub fn status_code(&self) -> StatusCode {
        StatusCode::from_u16(self.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }
}

impl std::fmt::Display for ProblemDetails {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}: {}",
            self.title,
            self.detail.as_deref().unwrap_or("")
        )
    }
}

impl std::error::Error for ProblemDetails {}

/// Convert library errors to ProblemDetails.
///
/// Infrastructure failures are logged in full and answered with a generic
/// detail so store or provider internals never reach the caller.
pub fn from_lib_error(error: &LibError, request_id: &str) -> ProblemDetails {
    match error {
        LibError::InvalidParameter(_)
        | LibError::InvalidRequest(_)
        | LibError::EmailAlreadyExists
        | LibError::WeakPassword => ProblemDetails::bad_request(error.to_string(), request_id),
        LibError::Unauthorized(_) => ProblemDetails::unauthorized(error.to_string(), request_id),
        LibError::Forbidden(_) => ProblemDetails::forbidden(error.to_string(), request_id),
        LibError::LocationNotFound { .. }
        | LibError::TableNotFound { .. }
        | LibError::UserNotFound { .. } => ProblemDetails::not_found(error.to_string(), request_id),
        LibError::ReservationConflict(_) => ProblemDetails::conflict(error.to_string(), request_id),
        LibError::Storage { .. } | LibError::Identity { .. } | LibError::Serialization(_) => {
            error!(request_id = %request_id, error = %error, "request failed");
            ProblemDetails::internal_error(GENERIC_INTERNAL_DETAIL, request_id)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_problem_details_new() {
        let problem = ProblemDetails::new(PROBLEM_NOT_FOUND, "Not Found", StatusCode::NOT_FOUND);
        assert_eq!(problem.type_uri, PROBLEM_NOT_FOUND);
        assert_eq!(problem.title, "Not Found");
        assert_eq!(problem.status, 404);
        assert!(problem.detail.is_none());
    }

    #[test]
    fn test_problem_details_bad_request() {
        let problem = ProblemDetails::bad_request("Invalid JSON", "req-123");
        assert_eq!(problem.status, 400);
        assert_eq!(problem.instance.as_deref(), Some("req-123"));
    }

    #[test]
    fn test_problem_details_serialization() {
        let problem = ProblemDetails::bad_request("Test error", "req-test");
        let json = serde_json::to_string(&problem).unwrap();

        assert!(json.contains("\"type\":\"/problems/invalid-request\""));
        assert!(json.contains("\"title\":\"Invalid Request\""));
        assert!(json.contains("\"status\":400"));
        assert!(json.contains("\"detail\":\"Test error\""));
        assert!(json.contains("\"instance\":\"req-test\""));
    }

    #[test]
    fn test_from_lib_error_status_mapping() {
        let cases = [
            (LibError::invalid_parameter("Invalid cursor"), 400),
            (LibError::EmailAlreadyExists, 400),
            (LibError::WeakPassword, 400),
            (LibError::Unauthorized("no claims".into()), 401),
            (LibError::Forbidden("no group".into()), 403),
            (LibError::LocationNotFound { id: "7".into() }, 404),
            (
                LibError::UserNotFound {
                    message: "User not found".into(),
                },
                404,
            ),
            (LibError::ReservationConflict("taken".into()), 409),
        ];
        for (error, status) in cases {
            assert_eq!(from_lib_error(&error, "req").status, status, "{error}");
        }
    }

    #[test]
    fn test_from_lib_error_hides_internal_detail() {
        let error = LibError::storage("put reservation", "ProvisionedThroughputExceeded");
        let problem = from_lib_error(&error, "req-500");

        assert_eq!(problem.status, 500);
        assert_eq!(problem.type_uri, PROBLEM_INTERNAL_ERROR);
        assert!(!problem
            .detail
            .as_deref()
            .unwrap()
            .contains("ProvisionedThroughputExceeded"));
    }
}
