use tracing::info;

use restaurant_lambda_shared::{ApiRequest, ApiResponse, FeedbackParams, Validate};
use restaurant_lib::get_feedbacks;

use super::{failure, rejected};
use crate::models::FeedbackPageDto;
use crate::AppContext;

pub(crate) async fn list(ctx: &AppContext, request: &ApiRequest, location_id: &str) -> ApiResponse {
    let params = FeedbackParams::from_query(&request.query);
    if let Err(problem) = params.validate(&request.request_id) {
        return rejected(problem);
    }
    let query = match params.to_query(location_id, &request.request_id) {
        Ok(query) => query,
        Err(problem) => return rejected(problem),
    };

    match get_feedbacks(&ctx.stores, &query).await {
        Ok(page) => {
            info!(
                request_id = %request.request_id,
                location_id = %location_id,
                page = page.page,
                total = page.total_elements,
                "feedback page served"
            );
            ApiResponse::ok(&FeedbackPageDto::from(page))
        }
        Err(e) => failure(&e, &request.request_id),
    }
}
