//! Data-access interfaces, one per entity.
//!
//! Backends implement every trait on a single type and hand it to
//! [`Stores::from_backend`]; the domain functions only see the trait objects.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::model::{Dish, Feedback, Location, Reservation, Table, User};

#[async_trait]
pub trait LocationStore: Send + Sync {
    async fn list_locations(&self) -> Result<Vec<Location>>;

    async fn get_location(&self, location_id: &str) -> Result<Option<Location>>;
}

#[async_trait]
pub trait TableStore: Send + Sync {
    async fn tables_for_location(&self, location_id: &str) -> Result<Vec<Table>>;
}

#[async_trait]
pub trait ReservationStore: Send + Sync {
    /// Reservations held against any of `table_ids`, optionally narrowed to one date.
    async fn reservations_for_tables(
        &self,
        table_ids: &[String],
        date: Option<&str>,
    ) -> Result<Vec<Reservation>>;

    /// Insert-if-absent on the reservation id.
    ///
    /// Fails with [`crate::Error::ReservationConflict`] when the id is taken.
    async fn insert_reservation(&self, reservation: &Reservation) -> Result<()>;
}

#[async_trait]
pub trait DishStore: Send + Sync {
    async fn dishes_by_ids(&self, dish_ids: &[String]) -> Result<Vec<Dish>>;

    async fn popular_dishes(&self) -> Result<Vec<Dish>>;
}

#[async_trait]
pub trait FeedbackStore: Send + Sync {
    async fn count_feedback(&self, location_id: &str, feedback_type: &str) -> Result<u64>;

    /// Up to `limit` items resuming after `start`, plus the key to resume from.
    async fn feedback_page(
        &self,
        location_id: &str,
        feedback_type: &str,
        limit: usize,
        start: Option<&ContinuationKey>,
    ) -> Result<FeedbackSlice>;
}

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn get_user(&self, cognito_id: &str) -> Result<Option<User>>;

    async fn save_user(&self, user: &User) -> Result<()>;
}

#[async_trait]
pub trait WaiterStore: Send + Sync {
    async fn is_waiter(&self, email: &str) -> Result<bool>;
}

/// Opaque resume point returned by the data store.
///
/// Only string-valued key attributes are carried, which covers every index
/// the feedback table is queried through.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContinuationKey(pub BTreeMap<String, String>);

impl ContinuationKey {
    pub fn get(&self, attribute: &str) -> Option<&str> {
        self.0.get(attribute).map(String::as_str)
    }
}

/// One fetched page of feedback in store order.
#[derive(Debug, Clone, Default)]
pub struct FeedbackSlice {
    pub items: Vec<Feedback>,
    pub next: Option<ContinuationKey>,
}

/// Every data-access interface the handlers need.
#[derive(Clone)]
pub struct Stores {
    pub locations: Arc<dyn LocationStore>,
    pub tables: Arc<dyn TableStore>,
    pub reservations: Arc<dyn ReservationStore>,
    pub dishes: Arc<dyn DishStore>,
    pub feedback: Arc<dyn FeedbackStore>,
    pub users: Arc<dyn UserStore>,
    pub waiters: Arc<dyn WaiterStore>,
}

impl Stores {
    /// Wire every interface to one backend.
    pub fn from_backend<B>(backend: Arc<B>) -> Self
    where
        B: LocationStore
            + TableStore
            + ReservationStore
            + DishStore
            + FeedbackStore
            + UserStore
            + WaiterStore
            + 'static,
    {
        Self {
            locations: backend.clone(),
            tables: backend.clone(),
            reservations: backend.clone(),
            dishes: backend.clone(),
            feedback: backend.clone(),
            users: backend.clone(),
            waiters: backend,
        }
    }
}

impl std::fmt::Debug for Stores {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Stores").finish_non_exhaustive()
    }
}
