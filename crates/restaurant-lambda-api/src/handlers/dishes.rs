use tracing::info;

use restaurant_lambda_shared::{ApiRequest, ApiResponse};
use restaurant_lib::{popular_dishes, speciality_dishes, Dish};

use super::failure;
use crate::models::DishDto;
use crate::AppContext;

fn to_body(dishes: Vec<Dish>) -> Vec<DishDto> {
    dishes.into_iter().map(DishDto::from).collect()
}

pub(crate) async fn speciality(
    ctx: &AppContext,
    request: &ApiRequest,
    location_id: &str,
) -> ApiResponse {
    match speciality_dishes(&ctx.stores, location_id).await {
        Ok(dishes) => {
            info!(
                request_id = %request.request_id,
                location_id = %location_id,
                count = dishes.len(),
                "speciality dishes loaded"
            );
            ApiResponse::ok(&to_body(dishes))
        }
        Err(e) => failure(&e, &request.request_id),
    }
}

pub(crate) async fn popular(ctx: &AppContext, request: &ApiRequest) -> ApiResponse {
    match popular_dishes(&ctx.stores).await {
        Ok(dishes) => ApiResponse::ok(&to_body(dishes)),
        Err(e) => failure(&e, &request.request_id),
    }
}
