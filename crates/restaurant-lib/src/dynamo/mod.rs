//! DynamoDB storage backend.

mod attributes;

use std::future::Future;

use async_trait::async_trait;
use aws_sdk_dynamodb::error::DisplayErrorContext;
use aws_sdk_dynamodb::types::{AttributeValue, KeysAndAttributes, Select};
use aws_sdk_dynamodb::Client;
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::model::{Dish, Feedback, Location, Reservation, Table, User};
use crate::store::{
    ContinuationKey, DishStore, FeedbackSlice, FeedbackStore, LocationStore, ReservationStore,
    TableStore, UserStore, WaiterStore,
};

pub use attributes::{from_item, to_item, Item};
use attributes::{from_items, item_from_key, key_from_item};

pub const LOCATION_INDEX: &str = "LocationIndex";
pub const RESERVATIONS_BY_TABLE_INDEX: &str = "ReservationsByTableIdsIndex";
pub const FEEDBACK_BY_TYPE_INDEX: &str = "FeedbacksByTypeIndex";
pub const POPULAR_DISHES_INDEX: &str = "PopularDishesIndex";

/// `BatchGetItem` accepts at most this many keys per call.
const BATCH_GET_LIMIT: usize = 100;

/// Calls made for one chunk before leftover `UnprocessedKeys` become an error.
const BATCH_GET_ATTEMPTS: usize = 5;

/// Physical table names, one per entity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableNames {
    pub locations: String,
    pub tables: String,
    pub reservations: String,
    pub dishes: String,
    pub feedback: String,
    pub users: String,
    pub waiters: String,
}

#[derive(Debug, Clone)]
pub struct DynamoStore {
    client: Client,
    tables: TableNames,
}

fn storage_error<E: std::error::Error>(operation: &str, err: E) -> Error {
    Error::storage(operation, DisplayErrorContext(&err))
}

/// Key condition plus the placeholder bindings it refers to.
struct KeyQuery<'a> {
    table: &'a str,
    index: &'a str,
    condition: &'a str,
    names: Vec<(&'a str, &'a str)>,
    values: Vec<(&'a str, AttributeValue)>,
}

impl<'a> KeyQuery<'a> {
    fn new(table: &'a str, index: &'a str, condition: &'a str) -> Self {
        Self {
            table,
            index,
            condition,
            names: Vec::new(),
            values: Vec::new(),
        }
    }

    fn bind(mut self, name: &'a str, attribute: &'a str, value: &'a str, placeholder: &'a str) -> Self {
        self.names.push((name, attribute));
        self.values
            .push((placeholder, AttributeValue::S(value.to_string())));
        self
    }
}

impl DynamoStore {
    pub fn new(client: Client, tables: TableNames) -> Self {
        Self { client, tables }
    }

    pub fn table_names(&self) -> &TableNames {
        &self.tables
    }

    fn query_builder(
        &self,
        query: &KeyQuery<'_>,
    ) -> aws_sdk_dynamodb::operation::query::builders::QueryFluentBuilder {
        let mut request = self
            .client
            .query()
            .table_name(query.table)
            .index_name(query.index)
            .key_condition_expression(query.condition);
        for (name, attribute) in &query.names {
            request = request.expression_attribute_names(*name, *attribute);
        }
        for (placeholder, value) in &query.values {
            request = request.expression_attribute_values(*placeholder, value.clone());
        }
        request
    }

    /// Run a key query to exhaustion, following `LastEvaluatedKey`.
    async fn query_all(&self, query: KeyQuery<'_>) -> Result<Vec<Item>> {
        let mut items = Vec::new();
        let mut start: Option<Item> = None;
        loop {
            let output = self
                .query_builder(&query)
                .set_exclusive_start_key(start.take())
                .send()
                .await
                .map_err(|e| storage_error(query.index, e))?;
            items.extend(output.items.unwrap_or_default());
            match output.last_evaluated_key {
                Some(key) if !key.is_empty() => start = Some(key),
                _ => break,
            }
        }
        Ok(items)
    }

    async fn get(&self, table: &str, key: &str, value: &str) -> Result<Option<Item>> {
        let output = self
            .client
            .get_item()
            .table_name(table)
            .key(key, AttributeValue::S(value.to_string()))
            .send()
            .await
            .map_err(|e| storage_error(table, e))?;
        Ok(output.item)
    }
}

#[async_trait]
impl LocationStore for DynamoStore {
    async fn list_locations(&self) -> Result<Vec<Location>> {
        let mut items = Vec::new();
        let mut start: Option<Item> = None;
        loop {
            let output = self
                .client
                .scan()
                .table_name(&self.tables.locations)
                .set_exclusive_start_key(start.take())
                .send()
                .await
                .map_err(|e| storage_error("scan locations", e))?;
            items.extend(output.items.unwrap_or_default());
            match output.last_evaluated_key {
                Some(key) if !key.is_empty() => start = Some(key),
                _ => break,
            }
        }
        from_items(&items)
    }

    async fn get_location(&self, location_id: &str) -> Result<Option<Location>> {
        self.get(&self.tables.locations, "locationId", location_id)
            .await?
            .map(|item| from_item(&item))
            .transpose()
    }
}

#[async_trait]
impl TableStore for DynamoStore {
    async fn tables_for_location(&self, location_id: &str) -> Result<Vec<Table>> {
        let query = KeyQuery::new(&self.tables.tables, LOCATION_INDEX, "#locationId = :locationId")
            .bind("#locationId", "locationId", location_id, ":locationId");
        let items = self.query_all(query).await?;
        debug!(location_id, count = items.len(), "loaded tables");
        from_items(&items)
    }
}

#[async_trait]
impl ReservationStore for DynamoStore {
    async fn reservations_for_tables(
        &self,
        table_ids: &[String],
        date: Option<&str>,
    ) -> Result<Vec<Reservation>> {
        let mut reservations = Vec::new();
        for table_id in table_ids {
            let query = match date {
                Some(date) => KeyQuery::new(
                    &self.tables.reservations,
                    RESERVATIONS_BY_TABLE_INDEX,
                    "#tableId = :tableId AND #date = :date",
                )
                .bind("#tableId", "tableId", table_id, ":tableId")
                .bind("#date", "date", date, ":date"),
                None => KeyQuery::new(
                    &self.tables.reservations,
                    RESERVATIONS_BY_TABLE_INDEX,
                    "#tableId = :tableId",
                )
                .bind("#tableId", "tableId", table_id, ":tableId"),
            };
            let items = self.query_all(query).await?;
            reservations.extend(from_items::<Reservation>(&items)?);
        }
        Ok(reservations)
    }

    async fn insert_reservation(&self, reservation: &Reservation) -> Result<()> {
        let result = self
            .client
            .put_item()
            .table_name(&self.tables.reservations)
            .set_item(Some(to_item(reservation)?))
            .condition_expression("attribute_not_exists(#id)")
            .expression_attribute_names("#id", "id")
            .send()
            .await;

        match result {
            Ok(_) => Ok(()),
            Err(err)
                if err
                    .as_service_error()
                    .is_some_and(|e| e.is_conditional_check_failed_exception()) =>
            {
                Err(Error::ReservationConflict(format!(
                    "Reservation {} already exists",
                    reservation.id
                )))
            }
            Err(err) => Err(storage_error("put reservation", err)),
        }
    }
}

#[async_trait]
impl DishStore for DynamoStore {
    async fn dishes_by_ids(&self, dish_ids: &[String]) -> Result<Vec<Dish>> {
        let mut dishes = Vec::new();
        for chunk in dish_ids.chunks(BATCH_GET_LIMIT) {
            let keys: Vec<Item> = chunk
                .iter()
                .map(|id| Item::from([("dishId".to_string(), AttributeValue::S(id.clone()))]))
                .collect();
            let request = KeysAndAttributes::builder()
                .set_keys(Some(keys))
                .build()
                .map_err(|e| storage_error("batch get dishes", e))?;

            let table = self.tables.dishes.as_str();
            let items = drain_batch_get(request, |pending| async move {
                let output = self
                    .client
                    .batch_get_item()
                    .request_items(table, pending)
                    .send()
                    .await
                    .map_err(|e| storage_error("batch get dishes", e))?;
                Ok(BatchGetPage {
                    items: output
                        .responses
                        .and_then(|mut responses| responses.remove(table))
                        .unwrap_or_default(),
                    unprocessed: output
                        .unprocessed_keys
                        .and_then(|mut unprocessed| unprocessed.remove(table)),
                })
            })
            .await?;
            dishes.extend(from_items::<Dish>(&items)?);
        }
        Ok(dishes)
    }

    async fn popular_dishes(&self) -> Result<Vec<Dish>> {
        let query = KeyQuery::new(
            &self.tables.dishes,
            POPULAR_DISHES_INDEX,
            "#isPopular = :isPopular",
        )
        .bind("#isPopular", "isPopular", "true", ":isPopular");
        let items = self.query_all(query).await?;
        from_items(&items)
    }
}

#[async_trait]
impl FeedbackStore for DynamoStore {
    async fn count_feedback(&self, location_id: &str, feedback_type: &str) -> Result<u64> {
        let query = feedback_query(&self.tables.feedback, location_id, feedback_type);
        let mut total: u64 = 0;
        let mut start: Option<Item> = None;
        loop {
            let output = self
                .query_builder(&query)
                .select(Select::Count)
                .set_exclusive_start_key(start.take())
                .send()
                .await
                .map_err(|e| storage_error("count feedback", e))?;
            total += u64::try_from(output.count).unwrap_or_default();
            match output.last_evaluated_key {
                Some(key) if !key.is_empty() => start = Some(key),
                _ => break,
            }
        }
        Ok(total)
    }

    async fn feedback_page(
        &self,
        location_id: &str,
        feedback_type: &str,
        limit: usize,
        start: Option<&ContinuationKey>,
    ) -> Result<FeedbackSlice> {
        let query = feedback_query(&self.tables.feedback, location_id, feedback_type);
        let limit = i32::try_from(limit).unwrap_or(i32::MAX);
        let output = self
            .query_builder(&query)
            .limit(limit)
            .set_exclusive_start_key(start.map(item_from_key))
            .send()
            .await
            .map_err(|e| storage_error("page feedback", e))?;

        let items: Vec<Feedback> = from_items(&output.items.unwrap_or_default())?;
        let next = match output.last_evaluated_key {
            Some(key) if !key.is_empty() => Some(key_from_item(&key)?),
            _ => None,
        };
        Ok(FeedbackSlice { items, next })
    }
}

/// One `BatchGetItem` response for a single table.
struct BatchGetPage {
    items: Vec<Item>,
    unprocessed: Option<KeysAndAttributes>,
}

/// Resubmit `UnprocessedKeys` until every key has been read.
///
/// Fails when keys are still unprocessed after [`BATCH_GET_ATTEMPTS`] calls.
async fn drain_batch_get<F, Fut>(request: KeysAndAttributes, mut fetch: F) -> Result<Vec<Item>>
where
    F: FnMut(KeysAndAttributes) -> Fut,
    Fut: Future<Output = Result<BatchGetPage>>,
{
    let mut items = Vec::new();
    let mut pending = request;
    for attempt in 1..=BATCH_GET_ATTEMPTS {
        let page = fetch(pending).await?;
        items.extend(page.items);
        match page.unprocessed {
            Some(rest) if !rest.keys().is_empty() => {
                warn!(
                    attempt,
                    unprocessed = rest.keys().len(),
                    "resubmitting unprocessed batch get keys"
                );
                pending = rest;
            }
            _ => return Ok(items),
        }
    }
    Err(Error::storage(
        "batch get",
        format!(
            "{} keys still unprocessed after {BATCH_GET_ATTEMPTS} attempts",
            pending.keys().len()
        ),
    ))
}

fn feedback_query<'a>(table: &'a str, location_id: &'a str, feedback_type: &'a str) -> KeyQuery<'a> {
    KeyQuery::new(
        table,
        FEEDBACK_BY_TYPE_INDEX,
        "#locationId = :locationId AND #type = :type",
    )
    .bind("#locationId", "locationId", location_id, ":locationId")
    .bind("#type", "type", feedback_type, ":type")
}

#[async_trait]
impl UserStore for DynamoStore {
    async fn get_user(&self, cognito_id: &str) -> Result<Option<User>> {
        self.get(&self.tables.users, "cognitoId", cognito_id)
            .await?
            .map(|item| from_item(&item))
            .transpose()
    }

    async fn save_user(&self, user: &User) -> Result<()> {
        self.client
            .put_item()
            .table_name(&self.tables.users)
            .set_item(Some(to_item(user)?))
            .send()
            .await
            .map_err(|e| storage_error("put user", e))?;
        Ok(())
    }
}

#[async_trait]
impl WaiterStore for DynamoStore {
    async fn is_waiter(&self, email: &str) -> Result<bool> {
        Ok(self
            .get(&self.tables.waiters, "email", email)
            .await?
            .is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dish_key(id: &str) -> Item {
        Item::from([("dishId".to_string(), AttributeValue::S(id.to_string()))])
    }

    fn keys(ids: &[&str]) -> KeysAndAttributes {
        KeysAndAttributes::builder()
            .set_keys(Some(ids.iter().map(|id| dish_key(id)).collect()))
            .build()
            .unwrap()
    }

    /// Answers the first pending key and leaves the rest unprocessed.
    fn one_key_per_call(
        calls: &mut usize,
    ) -> impl FnMut(KeysAndAttributes) -> std::future::Ready<Result<BatchGetPage>> + '_ {
        move |pending| {
            *calls += 1;
            let (first, rest) = pending.keys().split_first().unwrap();
            let unprocessed = (!rest.is_empty()).then(|| {
                KeysAndAttributes::builder()
                    .set_keys(Some(rest.to_vec()))
                    .build()
                    .unwrap()
            });
            std::future::ready(Ok(BatchGetPage {
                items: vec![first.clone()],
                unprocessed,
            }))
        }
    }

    #[tokio::test]
    async fn unprocessed_keys_are_resubmitted() {
        let mut calls = 0;
        let request = keys(&["dish-1", "dish-2", "dish-3"]);
        let items = drain_batch_get(request, one_key_per_call(&mut calls))
            .await
            .unwrap();

        assert_eq!(
            items,
            vec![dish_key("dish-1"), dish_key("dish-2"), dish_key("dish-3")]
        );
        assert_eq!(calls, 3);
    }

    #[tokio::test]
    async fn keys_left_after_last_attempt_fail() {
        let ids: Vec<String> = (0..=BATCH_GET_ATTEMPTS).map(|i| format!("dish-{i}")).collect();
        let ids: Vec<&str> = ids.iter().map(String::as_str).collect();

        let mut calls = 0;
        let err = drain_batch_get(keys(&ids), one_key_per_call(&mut calls))
            .await
            .unwrap_err();

        assert!(matches!(err, Error::Storage { .. }));
        assert!(err.to_string().contains("1 keys still unprocessed"));
        assert_eq!(calls, BATCH_GET_ATTEMPTS);
    }

    #[tokio::test]
    async fn empty_unprocessed_map_ends_the_loop() {
        let items = drain_batch_get(keys(&["dish-1"]), |pending| {
            std::future::ready(Ok(BatchGetPage {
                items: pending.keys().to_vec(),
                unprocessed: Some(
                    KeysAndAttributes::builder()
                        .set_keys(Some(Vec::new()))
                        .build()
                        .unwrap(),
                ),
            }))
        })
        .await
        .unwrap();
        assert_eq!(items.len(), 1);
    }
}
