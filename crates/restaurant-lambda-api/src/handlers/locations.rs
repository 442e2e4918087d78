use restaurant_lambda_shared::{ApiRequest, ApiResponse};
use restaurant_lib::{list_locations, location_options};

use super::failure;
use crate::models::{LocationDto, LocationOptionDto};
use crate::AppContext;

pub(crate) async fn list(ctx: &AppContext, request: &ApiRequest) -> ApiResponse {
    match list_locations(&ctx.stores).await {
        Ok(locations) => {
            let body: Vec<LocationDto> = locations.into_iter().map(LocationDto::from).collect();
            ApiResponse::ok(&body)
        }
        Err(e) => failure(&e, &request.request_id),
    }
}

pub(crate) async fn select_options(ctx: &AppContext, request: &ApiRequest) -> ApiResponse {
    match location_options(&ctx.stores).await {
        Ok(options) => {
            let body: Vec<LocationOptionDto> =
                options.into_iter().map(LocationOptionDto::from).collect();
            ApiResponse::ok(&body)
        }
        Err(e) => failure(&e, &request.request_id),
    }
}
