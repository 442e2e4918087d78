use tracing::info;

use restaurant_lambda_shared::{
    parse_json_body, ApiRequest, ApiResponse, AvailableTablesParams, Validate,
};
use restaurant_lib::{create_reservation, find_available_tables, Error, ReservationRequest};

use super::{failure, rejected};
use crate::models::{AvailableTableDto, ReservationDto};
use crate::AppContext;

pub(crate) async fn available_tables(ctx: &AppContext, request: &ApiRequest) -> ApiResponse {
    let params = AvailableTablesParams::from_query(&request.query);
    if let Err(problem) = params.validate(&request.request_id) {
        return rejected(problem);
    }
    let query = match params.to_query(&request.request_id) {
        Ok(query) => query,
        Err(problem) => return rejected(problem),
    };

    match find_available_tables(&ctx.stores, &query).await {
        Ok(tables) => {
            info!(
                request_id = %request.request_id,
                location_id = %query.location_id,
                available = tables.len(),
                "availability resolved"
            );
            let body: Vec<AvailableTableDto> =
                tables.into_iter().map(AvailableTableDto::from).collect();
            ApiResponse::ok(&body)
        }
        // A location without tables simply has nothing to offer.
        Err(Error::TableNotFound { .. }) => ApiResponse::ok(&Vec::<AvailableTableDto>::new()),
        Err(e) => failure(&e, &request.request_id),
    }
}

pub(crate) async fn create(ctx: &AppContext, request: &ApiRequest) -> ApiResponse {
    let body: ReservationRequest = match parse_json_body(request.body_text(), &request.request_id)
    {
        Ok(body) => body,
        Err(problem) => return rejected(problem),
    };

    match create_reservation(&ctx.stores, &body, ctx.today()).await {
        Ok(receipt) => ApiResponse::created(&ReservationDto::from(receipt)),
        Err(e) => failure(&e, &request.request_id),
    }
}
