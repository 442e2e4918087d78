//! AWS Lambda serving the restaurant reservation REST API.
//!
//! One function handles every route: the gateway event is converted into an
//! `ApiRequest`, dispatched through the [`router`], and the handler's
//! `ApiResponse` is turned back into an HTTP response.

mod adapter;
mod handlers;
mod models;
pub mod router;

use std::sync::Arc;
use std::time::Instant;

use aws_config::{BehaviorVersion, Region};
use chrono::{NaiveDate, Utc};
use lambda_http::{run as run_http, service_fn, Error};
use tracing::{error, info, warn};

use restaurant_lambda_shared::{init_tracing, Config};
use restaurant_lib::{CognitoIdentity, DynamoStore, IdentityProvider, Stores, UserRole};

pub use models::{
    AvailableTableDto, DishDto, FeedbackDto, FeedbackPageDto, LocationDto, LocationOptionDto,
    MessageDto, PageableDto, ProfileDto, ReservationDto, SessionDto, SortDto,
};
pub use router::{dispatch, normalize_path, Route, RouteKey};

/// Everything a handler needs, built once per cold start.
pub struct AppContext {
    pub stores: Stores,
    pub identity: Arc<dyn IdentityProvider>,
    pub temp_password_length: usize,
    today: Option<NaiveDate>,
}

impl AppContext {
    pub fn new(
        stores: Stores,
        identity: Arc<dyn IdentityProvider>,
        temp_password_length: usize,
    ) -> Self {
        Self {
            stores,
            identity,
            temp_password_length,
            today: None,
        }
    }

    /// Pin the date used to reject past reservations.
    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.today = Some(today);
        self
    }

    pub fn today(&self) -> NaiveDate {
        self.today.unwrap_or_else(|| Utc::now().date_naive())
    }
}

impl std::fmt::Debug for AppContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppContext")
            .field("stores", &self.stores)
            .field("temp_password_length", &self.temp_password_length)
            .field("today", &self.today)
            .finish_non_exhaustive()
    }
}

/// Entry point used by the Lambda runtime.
pub async fn run() -> Result<(), Error> {
    let config = Config::from_env();
    init_tracing(
        config
            .as_ref()
            .map(|c| c.log_format)
            .unwrap_or_default(),
    );
    let config = config.map_err(|e| {
        error!(error = %e, "invalid configuration");
        e
    })?;

    let start = Instant::now();
    let ctx = build_context(&config).await;
    info!(
        init_ms = start.elapsed().as_millis() as u64,
        "lambda context initialized"
    );

    run_http(service_fn(|request| adapter::handle(&ctx, request))).await
}

async fn build_context(config: &Config) -> AppContext {
    let mut loader = aws_config::defaults(BehaviorVersion::latest());
    if let Some(region) = &config.region {
        loader = loader.region(Region::new(region.clone()));
    }
    let sdk_config = loader.load().await;

    let store = Arc::new(DynamoStore::new(
        aws_sdk_dynamodb::Client::new(&sdk_config),
        config.tables.clone(),
    ));
    let identity = CognitoIdentity::new(
        aws_sdk_cognitoidentityprovider::Client::new(&sdk_config),
        config.user_pool_id.clone(),
        config.client_id.clone(),
    );

    let groups: Vec<&str> = [UserRole::Customer, UserRole::Waiter]
        .iter()
        .filter_map(|role| role.group_name())
        .collect();
    if let Err(e) = identity.ensure_groups(&groups).await {
        warn!(error = %e, "could not ensure identity groups exist");
    }

    AppContext::new(
        Stores::from_backend(store),
        Arc::new(identity),
        config.temp_password_length,
    )
}
