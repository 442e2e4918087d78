use http::StatusCode;
use tracing::info;

use restaurant_lambda_shared::{parse_json_body, ApiRequest, ApiResponse};
use restaurant_lib::{SignInRequest, SignUpRequest};

use super::{failure, rejected};
use crate::models::{MessageDto, SessionDto};
use crate::AppContext;

pub(crate) async fn sign_up(ctx: &AppContext, request: &ApiRequest) -> ApiResponse {
    let body: SignUpRequest = match parse_json_body(request.body_text(), &request.request_id) {
        Ok(body) => body,
        Err(problem) => return rejected(problem),
    };

    match restaurant_lib::sign_up(
        &ctx.stores,
        ctx.identity.as_ref(),
        &body,
        ctx.temp_password_length,
    )
    .await
    {
        Ok(user) => {
            info!(request_id = %request.request_id, role = %user.role, "sign-up completed");
            ApiResponse::json(
                StatusCode::CREATED,
                &MessageDto::new("User registered successfully"),
            )
        }
        Err(e) => failure(&e, &request.request_id),
    }
}

pub(crate) async fn sign_in(ctx: &AppContext, request: &ApiRequest) -> ApiResponse {
    let body: SignInRequest = match parse_json_body(request.body_text(), &request.request_id) {
        Ok(body) => body,
        Err(problem) => return rejected(problem),
    };

    match restaurant_lib::sign_in(&ctx.stores, ctx.identity.as_ref(), &body).await {
        Ok(session) => ApiResponse::ok(&SessionDto::from(session)),
        Err(e) => failure(&e, &request.request_id),
    }
}
