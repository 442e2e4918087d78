//! Response envelope returned by every handler.

use std::collections::BTreeMap;

use http::StatusCode;
use serde::Serialize;
use tracing::error;

use crate::problem::ProblemDetails;

const JSON: &str = "application/json";
const PROBLEM_JSON: &str = "application/problem+json";

const CORS_HEADERS: [(&str, &str); 4] = [
    (
        "Access-Control-Allow-Headers",
        "Content-Type,X-Amz-Date,Authorization,X-Api-Key,X-Amz-Security-Token",
    ),
    ("Access-Control-Allow-Origin", "*"),
    ("Access-Control-Allow-Methods", "*"),
    ("Accept-Version", "*"),
];

/// Status, headers and a serialized JSON body.
///
/// # Example
///
/// ```
/// use restaurant_lambda_shared::ApiResponse;
///
/// let response = ApiResponse::not_found().with_cors();
/// assert_eq!(response.status, 404);
/// assert_eq!(response.header("Access-Control-Allow-Origin"), Some("*"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResponse {
    pub status: u16,
    pub headers: BTreeMap<String, String>,
    pub body: String,
    content_type: &'static str,
}

impl ApiResponse {
    /// Serialize `data` as the body.
    pub fn json<T: Serialize>(status: StatusCode, data: &T) -> Self {
        match serde_json::to_string(data) {
            Ok(body) => Self::raw(status, body, JSON),
            Err(e) => {
                error!(error = %e, "failed to serialize response body");
                Self::problem(&ProblemDetails::internal_error(
                    "Failed to serialize response",
                    "",
                ))
            }
        }
    }

    pub fn ok<T: Serialize>(data: &T) -> Self {
        Self::json(StatusCode::OK, data)
    }

    pub fn created<T: Serialize>(data: &T) -> Self {
        Self::json(StatusCode::CREATED, data)
    }

    /// `{"message": ...}` body with the given status.
    pub fn message(status: StatusCode, message: &str) -> Self {
        Self::json(status, &serde_json::json!({ "message": message }))
    }

    /// Default answer for unmatched routes.
    pub fn not_found() -> Self {
        Self::message(StatusCode::NOT_FOUND, "Not Found")
    }

    pub fn problem(problem: &ProblemDetails) -> Self {
        let body = serde_json::to_string(problem).unwrap_or_else(|_| {
            format!(
                r#"{{"type":"{}","title":"Internal Error","status":500}}"#,
                crate::problem::PROBLEM_INTERNAL_ERROR
            )
        });
        Self::raw(problem.status_code(), body, PROBLEM_JSON)
    }

    fn raw(status: StatusCode, body: String, content_type: &'static str) -> Self {
        Self {
            status: status.as_u16(),
            headers: BTreeMap::new(),
            body,
            content_type,
        }
    }

    /// Add the CORS headers and the body's content type.
    pub fn with_cors(mut self) -> Self {
        for (name, value) in CORS_HEADERS {
            self.headers.insert(name.to_string(), value.to_string());
        }
        self.headers
            .insert("Content-Type".to_string(), self.content_type.to_string());
        self
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    pub fn is_problem(&self) -> bool {
        self.content_type == PROBLEM_JSON
    }

    /// Parse the body back into JSON.
    pub fn json_body(&self) -> serde_json::Result<serde_json::Value> {
        serde_json::from_str(&self.body)
    }
}

impl From<ProblemDetails> for ApiResponse {
    fn from(problem: ProblemDetails) -> Self {
        Self::problem(&problem)
    }
}
