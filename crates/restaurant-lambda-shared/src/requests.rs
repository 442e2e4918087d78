//! Query and body types with validation for the HTTP endpoints.

use std::collections::HashMap;

use serde::de::DeserializeOwned;

use restaurant_lib::{AvailabilityQuery, FeedbackQuery};

use crate::problem::{from_lib_error, ProblemDetails};

/// Validation trait for request types.
///
/// Implementations check presence and shape of the caller's input and return
/// a `ProblemDetails` error for invalid input.
pub trait Validate {
    /// The `request_id` populates the `instance` field of any returned
    /// `ProblemDetails`.
    ///
    /// Returns a boxed `ProblemDetails` to avoid large `Result::Err` variants.
    fn validate(&self, request_id: &str) -> Result<(), Box<ProblemDetails>>;
}

fn param(query: &HashMap<String, String>, name: &str) -> Option<String> {
    query.get(name).cloned()
}

fn is_blank(value: &Option<String>) -> bool {
    value.as_deref().map_or(true, |v| v.trim().is_empty())
}

/// `GET /bookings/tables` query string.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AvailableTablesParams {
    pub location_id: Option<String>,
    pub date: Option<String>,
    pub time: Option<String>,
    pub guests: Option<String>,
}

impl AvailableTablesParams {
    pub fn from_query(query: &HashMap<String, String>) -> Self {
        Self {
            location_id: param(query, "locationId"),
            date: param(query, "date"),
            time: param(query, "time"),
            guests: param(query, "guests"),
        }
    }

    /// Parse into the resolver's query; format errors become 400s.
    pub fn to_query(&self, request_id: &str) -> Result<AvailabilityQuery, Box<ProblemDetails>> {
        AvailabilityQuery::parse(
            self.location_id.as_deref(),
            self.date.as_deref(),
            self.time.as_deref(),
            self.guests.as_deref(),
        )
        .map_err(|e| Box::new(from_lib_error(&e, request_id)))
    }
}

impl Validate for AvailableTablesParams {
    fn validate(&self, request_id: &str) -> Result<(), Box<ProblemDetails>> {
        if is_blank(&self.location_id) {
            return Err(Box::new(ProblemDetails::bad_request(
                "Location ID is required.",
                request_id,
            )));
        }
        Ok(())
    }
}

/// `GET /locations/{id}/feedbacks` query string.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeedbackParams {
    pub feedback_type: Option<String>,
    pub page: Option<String>,
    pub size: Option<String>,
    pub sort: Option<String>,
    pub cursor: Option<String>,
}

impl FeedbackParams {
    pub fn from_query(query: &HashMap<String, String>) -> Self {
        Self {
            feedback_type: param(query, "type"),
            page: param(query, "page"),
            size: param(query, "size"),
            sort: param(query, "sort"),
            cursor: param(query, "cursor"),
        }
    }

    pub fn to_query(
        &self,
        location_id: &str,
        request_id: &str,
    ) -> Result<FeedbackQuery, Box<ProblemDetails>> {
        FeedbackQuery::parse(
            location_id,
            self.feedback_type.as_deref(),
            self.page.as_deref(),
            self.size.as_deref(),
            self.sort.as_deref(),
            self.cursor.as_deref(),
        )
        .map_err(|e| Box::new(from_lib_error(&e, request_id)))
    }
}

impl Validate for FeedbackParams {
    fn validate(&self, request_id: &str) -> Result<(), Box<ProblemDetails>> {
        if is_blank(&self.feedback_type) {
            return Err(Box::new(ProblemDetails::bad_request(
                "Feedback type is required",
                request_id,
            )));
        }
        Ok(())
    }
}

/// Deserialize a JSON request body.
pub fn parse_json_body<T: DeserializeOwned>(
    body: Option<&str>,
    request_id: &str,
) -> Result<T, Box<ProblemDetails>> {
    let body = body.ok_or_else(|| {
        Box::new(ProblemDetails::bad_request(
            "Request body is required",
            request_id,
        ))
    })?;
    serde_json::from_str(body).map_err(|e| {
        Box::new(ProblemDetails::bad_request(
            format!("Invalid request body: {e}"),
            request_id,
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use restaurant_lib::SignInRequest;

    fn query(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn available_tables_requires_location() {
        let params = AvailableTablesParams::from_query(&query(&[("guests", "2")]));
        let problem = params.validate("req-1").unwrap_err();
        assert_eq!(problem.status, 400);
        assert_eq!(problem.detail.as_deref(), Some("Location ID is required."));
    }

    #[test]
    fn available_tables_rejects_bad_time() {
        let params =
            AvailableTablesParams::from_query(&query(&[("locationId", "1"), ("time", "noon")]));
        assert!(params.validate("req-2").is_ok());
        let problem = params.to_query("req-2").unwrap_err();
        assert_eq!(
            problem.detail.as_deref(),
            Some("Invalid time format. Expected format: HH:mm")
        );
    }

    #[test]
    fn feedback_requires_type() {
        let params = FeedbackParams::from_query(&query(&[("type", "  ")]));
        assert!(params.validate("req-3").is_err());

        let params = FeedbackParams::from_query(&query(&[("type", "SERVICE"), ("size", "500")]));
        let problem = params.to_query("7", "req-3").unwrap_err();
        assert_eq!(problem.detail.as_deref(), Some("Size must be between 1 and 100"));
    }

    #[test]
    fn json_body_errors_are_bad_requests() {
        let missing = parse_json_body::<SignInRequest>(None, "req-4").unwrap_err();
        assert_eq!(missing.detail.as_deref(), Some("Request body is required"));

        let broken = parse_json_body::<SignInRequest>(Some("{not json"), "req-4").unwrap_err();
        assert_eq!(broken.status, 400);

        let parsed: SignInRequest =
            parse_json_body(Some(r#"{"email":"a@b.c","password":"pw"}"#), "req-4").unwrap();
        assert_eq!(parsed.email, "a@b.c");
    }
}
