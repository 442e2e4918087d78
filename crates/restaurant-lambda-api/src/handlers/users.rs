use restaurant_lambda_shared::{ApiRequest, ApiResponse};
use restaurant_lib::profile as load_profile;

use super::failure;
use crate::models::ProfileDto;
use crate::AppContext;

pub(crate) async fn profile(ctx: &AppContext, request: &ApiRequest) -> ApiResponse {
    match load_profile(&ctx.stores, request.claims.as_ref()).await {
        Ok(profile) => ApiResponse::ok(&ProfileDto::from(profile)),
        Err(e) => failure(&e, &request.request_id),
    }
}
