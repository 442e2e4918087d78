//! Conversion between `lambda_http` types and the shared envelope.

use std::collections::HashMap;

use lambda_http::request::RequestContext;
use lambda_http::{Body, Error, Request, RequestExt, Response};
use tracing::warn;

use restaurant_lambda_shared::{resolve_request_id, ApiRequest, ApiResponse};
use restaurant_lib::Claims;

use crate::router::dispatch;
use crate::AppContext;

pub(crate) async fn handle(ctx: &AppContext, request: Request) -> Result<Response<Body>, Error> {
    let api_request = to_api_request(&request);
    let response = dispatch(ctx, &api_request).await;
    into_http_response(response)
}

fn to_api_request(request: &Request) -> ApiRequest {
    let request_id = resolve_request_id(
        request
            .lambda_context_ref()
            .map(|ctx| ctx.request_id.as_str()),
        request
            .headers()
            .get("x-request-id")
            .and_then(|v| v.to_str().ok()),
    );

    let query: HashMap<String, String> = request
        .query_string_parameters_ref()
        .map(|params| {
            params
                .iter()
                .map(|(name, value)| (name.to_string(), value.to_string()))
                .collect()
        })
        .unwrap_or_default();

    let body = std::str::from_utf8(request.body().as_ref())
        .ok()
        .filter(|b| !b.is_empty())
        .map(str::to_string);

    ApiRequest {
        method: request.method().clone(),
        path: route_path(request).to_string(),
        query,
        body,
        claims: extract_claims(request, &request_id),
        request_id,
    }
}

/// Resource path as the client sent it, without the API Gateway stage prefix.
///
/// Requests that did not come from a gateway event carry no raw path, so the
/// URI path is used as is.
fn route_path(request: &Request) -> &str {
    match request.raw_http_path() {
        "" => request.uri().path(),
        raw => raw,
    }
}

/// Claims from a REST user-pool authorizer or an HTTP API JWT authorizer.
fn extract_claims(request: &Request, request_id: &str) -> Option<Claims> {
    let parsed = match request.request_context_ref()? {
        RequestContext::ApiGatewayV1(ctx) => Claims::from_value(ctx.authorizer.fields.get("claims")?),
        RequestContext::ApiGatewayV2(ctx) => {
            let jwt = ctx.authorizer.as_ref()?.jwt.as_ref()?;
            Claims::from_string_map(&jwt.claims)
        }
        _ => return None,
    };

    match parsed {
        Ok(claims) => Some(claims),
        Err(e) => {
            warn!(request_id = %request_id, error = %e, "ignoring malformed authorizer claims");
            None
        }
    }
}

fn into_http_response(response: ApiResponse) -> Result<Response<Body>, Error> {
    let mut builder = Response::builder().status(response.status);
    for (name, value) in &response.headers {
        builder = builder.header(name.as_str(), value.as_str());
    }
    Ok(builder.body(Body::Text(response.body))?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn response_keeps_status_headers_and_body() {
        let response = into_http_response(ApiResponse::not_found().with_cors()).unwrap();
        assert_eq!(response.status(), 404);
        assert_eq!(
            response.headers().get("Access-Control-Allow-Origin").unwrap(),
            "*"
        );
        match response.body() {
            Body::Text(text) => assert_eq!(text, r#"{"message":"Not Found"}"#),
            other => panic!("unexpected body {other:?}"),
        }
    }

    #[test]
    fn plain_request_converts_without_claims() {
        let request = lambda_http::http::Request::builder()
            .method("GET")
            .uri("https://api.example.com/locations")
            .header("x-request-id", "hdr-123")
            .body(Body::Empty)
            .unwrap();
        let request: Request = request;

        let api_request = to_api_request(&request);
        assert_eq!(api_request.path, "/locations");
        assert_eq!(api_request.request_id, "hdr-123");
        assert!(api_request.claims.is_none());
        assert!(api_request.body.is_none());
    }

    const REST_EVENT_ON_DEV_STAGE: &str = r#"{
        "resource": "/locations/{id}/feedbacks",
        "path": "/locations/1/feedbacks",
        "httpMethod": "GET",
        "headers": {"x-request-id": "hdr-dev"},
        "queryStringParameters": {"type": "SERVICE", "size": "5"},
        "requestContext": {
            "stage": "dev",
            "requestId": "ctx-dev",
            "httpMethod": "GET",
            "resourcePath": "/locations/{id}/feedbacks",
            "path": "/dev/locations/1/feedbacks",
            "authorizer": {
                "claims": {
                    "sub": "user-sub-id-123",
                    "email": "john.doe@example.com",
                    "cognito:groups": "Customer"
                }
            }
        }
    }"#;

    #[test]
    fn rest_event_on_named_stage_routes_without_stage_prefix() {
        let request = lambda_http::request::from_str(REST_EVENT_ON_DEV_STAGE).unwrap();
        assert!(request.uri().path().starts_with("/dev/"));

        let api_request = to_api_request(&request);
        assert_eq!(api_request.path, "/locations/1/feedbacks");
        assert_eq!(api_request.query_param("type"), Some("SERVICE"));
        assert_eq!(api_request.request_id, "hdr-dev");

        let claims = api_request.claims.as_ref().expect("authorizer claims");
        assert_eq!(claims.sub(), "user-sub-id-123");
        assert_eq!(claims.role(), restaurant_lib::UserRole::Customer);

        let path = crate::router::normalize_path(&api_request.path);
        assert_eq!(
            crate::router::Route::resolve(&api_request.method, &path.template),
            Some(crate::router::Route::LocationFeedbacks)
        );
    }

    #[tokio::test]
    async fn staged_rest_event_is_served() {
        use restaurant_lambda_shared::test_utils::{fixture_identity, fixture_stores};
        use std::sync::Arc;

        let (_, stores) = fixture_stores();
        let ctx = AppContext::new(stores, Arc::new(fixture_identity()), 12);
        let request = lambda_http::request::from_str(REST_EVENT_ON_DEV_STAGE).unwrap();

        let response = handle(&ctx, request).await.unwrap();
        assert_eq!(response.status(), 200);
        match response.body() {
            Body::Text(text) => {
                let page: serde_json::Value = serde_json::from_str(text).unwrap();
                assert_eq!(page["numberOfElements"], 5);
            }
            other => panic!("unexpected body {other:?}"),
        }
    }
}
