//! Transport-neutral view of an inbound gateway request.
//!
//! The Lambda binary converts each gateway event into an [`ApiRequest`]
//! exactly once; handlers never touch the raw event.

use std::collections::HashMap;

use http::Method;

use restaurant_lib::Claims;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiRequest {
    pub method: Method,
    /// Path as received, before template normalization.
    pub path: String,
    pub query: HashMap<String, String>,
    pub body: Option<String>,
    pub request_id: String,
    /// Authorizer claims, present only on authenticated routes.
    pub claims: Option<Claims>,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: HashMap::new(),
            body: None,
            request_id: resolve_request_id(None, None),
            claims: None,
        }
    }

    pub fn with_query(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.insert(name.into(), value.into());
        self
    }

    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    pub fn with_request_id(mut self, request_id: impl Into<String>) -> Self {
        self.request_id = request_id.into();
        self
    }

    pub fn with_claims(mut self, claims: Claims) -> Self {
        self.claims = Some(claims);
        self
    }

    pub fn query_param(&self, name: &str) -> Option<&str> {
        self.query.get(name).map(String::as_str)
    }

    /// Body text, treating an empty body as absent.
    pub fn body_text(&self) -> Option<&str> {
        self.body.as_deref().filter(|b| !b.trim().is_empty())
    }
}

/// Pick the request id: Lambda context id, then the `x-request-id` header,
/// then a fresh UUID.
pub fn resolve_request_id(context_id: Option<&str>, header: Option<&str>) -> String {
    [context_id, header]
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|id| !id.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| uuid::Uuid::new_v4().to_string())
}
