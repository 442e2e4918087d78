//! One module per resource. Handlers always answer with an [`ApiResponse`];
//! library errors are mapped to problem details here.

pub(crate) mod auth;
pub(crate) mod bookings;
pub(crate) mod dishes;
pub(crate) mod feedback;
pub(crate) mod locations;
pub(crate) mod users;

use restaurant_lambda_shared::{from_lib_error, ApiResponse, ProblemDetails};
use restaurant_lib::Error as LibError;
use tracing::warn;

fn failure(error: &LibError, request_id: &str) -> ApiResponse {
    if !error.is_internal() {
        warn!(request_id = %request_id, error = %error, "request rejected");
    }
    ApiResponse::problem(&from_lib_error(error, request_id))
}

fn rejected(problem: Box<ProblemDetails>) -> ApiResponse {
    ApiResponse::problem(&problem)
}
