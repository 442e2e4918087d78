//! AWS Lambda entry point for the restaurant reservation API.

use lambda_http::Error;

#[tokio::main]
async fn main() -> Result<(), Error> {
    restaurant_lambda_api::run().await
}
