//! Typed route table and request dispatcher.
//!
//! Raw paths are normalized into templates by replacing the numeric id that
//! precedes a known suffix with `{id}`; the `(method, template)` pair then
//! selects a [`Route`]. Unmatched requests get a 404 `{"message":"Not Found"}`.

use std::fmt;

use http::Method;
use tracing::info;

use restaurant_lambda_shared::{ApiRequest, ApiResponse};

use crate::handlers;
use crate::AppContext;

const ID_PLACEHOLDER: &str = "{id}";

/// Path segments that follow a location id.
const ID_SUFFIXES: [&str; 2] = ["speciality-dishes", "feedbacks"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    ListLocations,
    LocationSelectOptions,
    SpecialityDishes,
    LocationFeedbacks,
    AvailableTables,
    CreateReservation,
    SignUp,
    SignIn,
    UserProfile,
    PopularDishes,
}

impl Route {
    pub const ALL: [Route; 10] = [
        Route::ListLocations,
        Route::LocationSelectOptions,
        Route::SpecialityDishes,
        Route::LocationFeedbacks,
        Route::AvailableTables,
        Route::CreateReservation,
        Route::SignUp,
        Route::SignIn,
        Route::UserProfile,
        Route::PopularDishes,
    ];

    pub fn method(&self) -> Method {
        match self {
            Route::CreateReservation | Route::SignUp | Route::SignIn => Method::POST,
            _ => Method::GET,
        }
    }

    pub fn template(&self) -> &'static str {
        match self {
            Route::ListLocations => "/locations",
            Route::LocationSelectOptions => "/locations/select-options",
            Route::SpecialityDishes => "/locations/{id}/speciality-dishes",
            Route::LocationFeedbacks => "/locations/{id}/feedbacks",
            Route::AvailableTables => "/bookings/tables",
            Route::CreateReservation => "/bookings/client",
            Route::SignUp => "/auth/sign-up",
            Route::SignIn => "/auth/sign-in",
            Route::UserProfile => "/users/profile",
            Route::PopularDishes => "/dishes/popular",
        }
    }

    /// Exact match on method and normalized template.
    pub fn resolve(method: &Method, template: &str) -> Option<Route> {
        Route::ALL
            .into_iter()
            .find(|route| route.method() == *method && route.template() == template)
    }
}

/// A raw path reduced to its route template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedPath {
    pub template: String,
    /// The segment that was replaced by `{id}`, if any.
    pub id: Option<String>,
}

pub fn normalize_path(raw: &str) -> NormalizedPath {
    let path = raw.split('?').next().unwrap_or_default();
    let path = match path.strip_suffix('/') {
        Some(trimmed) if !trimmed.is_empty() => trimmed,
        _ => path,
    };

    let segments: Vec<&str> = path.split('/').collect();
    let mut id = None;
    let normalized: Vec<&str> = segments
        .iter()
        .enumerate()
        .map(|(i, segment)| {
            let precedes_suffix = segments
                .get(i + 1)
                .is_some_and(|next| ID_SUFFIXES.contains(next));
            if id.is_none() && precedes_suffix && is_numeric(segment) {
                id = Some(segment.to_string());
                ID_PLACEHOLDER
            } else {
                *segment
            }
        })
        .collect();

    NormalizedPath {
        template: normalized.join("/"),
        id,
    }
}

fn is_numeric(segment: &str) -> bool {
    !segment.is_empty() && segment.bytes().all(|b| b.is_ascii_digit())
}

/// `METHOD:template`, the key logged for every invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteKey {
    pub method: Method,
    pub template: String,
}

impl fmt::Display for RouteKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.method, self.template)
    }
}

/// Route the request, run its handler and attach CORS headers.
pub async fn dispatch(ctx: &AppContext, request: &ApiRequest) -> ApiResponse {
    let path = normalize_path(&request.path);
    let key = RouteKey {
        method: request.method.clone(),
        template: path.template.clone(),
    };
    let route = Route::resolve(&key.method, &key.template);

    info!(
        request_id = %request.request_id,
        route_key = %key,
        matched = route.is_some(),
        "dispatching request"
    );

    // Templates with `{id}` only match when an id was captured.
    let id = path.id.as_deref().unwrap_or_default();
    let response = match route {
        Some(Route::ListLocations) => handlers::locations::list(ctx, request).await,
        Some(Route::LocationSelectOptions) => handlers::locations::select_options(ctx, request).await,
        Some(Route::SpecialityDishes) => handlers::dishes::speciality(ctx, request, id).await,
        Some(Route::LocationFeedbacks) => handlers::feedback::list(ctx, request, id).await,
        Some(Route::AvailableTables) => handlers::bookings::available_tables(ctx, request).await,
        Some(Route::CreateReservation) => handlers::bookings::create(ctx, request).await,
        Some(Route::SignUp) => handlers::auth::sign_up(ctx, request).await,
        Some(Route::SignIn) => handlers::auth::sign_in(ctx, request).await,
        Some(Route::UserProfile) => handlers::users::profile(ctx, request).await,
        Some(Route::PopularDishes) => handlers::dishes::popular(ctx, request).await,
        None => ApiResponse::not_found(),
    };

    info!(
        request_id = %request.request_id,
        route_key = %key,
        status = response.status,
        "request completed"
    );
    response.with_cors()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_id_before_suffix_is_templated() {
        let path = normalize_path("/locations/7/feedbacks");
        assert_eq!(path.template, "/locations/{id}/feedbacks");
        assert_eq!(path.id.as_deref(), Some("7"));

        let path = normalize_path("/locations/42/speciality-dishes?x=1");
        assert_eq!(path.template, "/locations/{id}/speciality-dishes");
        assert_eq!(path.id.as_deref(), Some("42"));
    }

    #[test]
    fn other_segments_are_left_alone() {
        assert_eq!(normalize_path("/locations/abc/feedbacks").template, "/locations/abc/feedbacks");
        assert_eq!(normalize_path("/locations/7").template, "/locations/7");
        assert_eq!(normalize_path("/locations/").template, "/locations");
        assert_eq!(normalize_path("/").template, "/");
    }

    #[test]
    fn route_key_display() {
        let key = RouteKey {
            method: Method::GET,
            template: "/locations/{id}/feedbacks".to_string(),
        };
        assert_eq!(key.to_string(), "GET:/locations/{id}/feedbacks");
    }

    #[test]
    fn every_route_resolves_from_its_own_template() {
        for route in Route::ALL {
            assert_eq!(Route::resolve(&route.method(), route.template()), Some(route));
        }
        assert_eq!(Route::resolve(&Method::DELETE, "/locations"), None);
        assert_eq!(Route::resolve(&Method::POST, "/locations"), None);
    }
}
