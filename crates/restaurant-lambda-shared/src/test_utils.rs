//! Test utilities for handler testing.
//!
//! Seeded in-memory backends plus request builders, shared by every test
//! suite so fixtures stay consistent.
//!
//! # Usage
//!
//! ```ignore
//! use restaurant_lambda_shared::test_utils::{fixture_stores, get, mock_request_id};
//!
//! let (_, stores) = fixture_stores();
//! let request = get("/locations").with_request_id(mock_request_id("locations"));
//! ```

use std::sync::Arc;

use http::Method;
use serde_json::Value;

use restaurant_lib::{
    Claims, Dish, Feedback, InMemoryIdentity, InMemoryStore, Location, Stores, Table, User,
    UserRole,
};

use crate::gateway::ApiRequest;

/// Identifiers and credentials seeded by the fixtures.
pub mod fixtures {
    /// Location with tables, specialities and feedback.
    pub const LOCATION_ID: &str = "1";
    pub const LOCATION_ADDRESS: &str = "123 Main St";
    /// Location without tables.
    pub const EMPTY_LOCATION_ID: &str = "2";
    pub const EMPTY_LOCATION_ADDRESS: &str = "48 Rustaveli Ave";

    /// SERVICE feedback entries seeded for [`LOCATION_ID`].
    pub const SERVICE_FEEDBACK_COUNT: usize = 12;

    pub const CUSTOMER_EMAIL: &str = "john.doe@example.com";
    pub const CUSTOMER_PASSWORD: &str = "Password123!";
    pub const CUSTOMER_SUB: &str = "user-sub-id-123";

    /// Listed in the waiter directory but not yet registered.
    pub const WAITER_EMAIL: &str = "anna.waiter@example.com";

    pub const TABLE_SLOTS: [&str; 3] = ["10:30-12:00", "12:15-13:45", "14:00-15:30"];
}

fn location(id: &str, address: &str, specialities: &[&str]) -> Location {
    Location {
        id: id.to_string(),
        address: address.to_string(),
        description: Some(format!("Restaurant at {address}")),
        image_url: Some(format!("https://img.example.com/locations/{id}.png")),
        rating: Some(4.7),
        speciality_dish_ids: specialities.iter().map(|s| s.to_string()).collect(),
    }
}

fn table(number: u32, capacity: u32) -> Table {
    Table {
        table_id: format!("table-{number}"),
        location_id: fixtures::LOCATION_ID.to_string(),
        table_number: number,
        capacity,
        available_slots: fixtures::TABLE_SLOTS.iter().map(|s| s.to_string()).collect(),
    }
}

fn dish(id: &str, name: &str, price: f64) -> Dish {
    Dish {
        id: id.to_string(),
        name: name.to_string(),
        price,
        weight: "350 g".to_string(),
        image_url: format!("https://img.example.com/dishes/{id}.png"),
        description: None,
        dish_type: Some("Main".to_string()),
        calories: Some("420 kcal".to_string()),
        carbohydrates: None,
        fats: None,
        proteins: None,
        vitamins: None,
        state: Some("On Stop".to_string()),
    }
}

fn feedback(index: usize) -> Feedback {
    Feedback {
        id: format!("fb-{index:02}"),
        rate: (index % 5 + 1) as f64,
        comment: format!("Visit number {index}"),
        user_name: "Guest".to_string(),
        user_avatar_url: String::new(),
        date: format!("2025-03-{:02}", index % 28 + 1),
        feedback_type: "SERVICE".to_string(),
        location_id: fixtures::LOCATION_ID.to_string(),
    }
}

/// The seeded customer's local record.
pub fn customer_user() -> User {
    User {
        cognito_id: fixtures::CUSTOMER_SUB.to_string(),
        email: fixtures::CUSTOMER_EMAIL.to_string(),
        first_name: "John".to_string(),
        last_name: "Doe".to_string(),
        profile_image_url: Some("https://img.example.com/users/john.png".to_string()),
        role: UserRole::Customer,
    }
}

/// In-memory store with locations, three tables, dishes, feedback and one user.
pub fn fixture_store() -> InMemoryStore {
    let store = InMemoryStore::new()
        .with_location(location(
            fixtures::LOCATION_ID,
            fixtures::LOCATION_ADDRESS,
            &["dish-2", "dish-1"],
        ))
        .with_location(location(
            fixtures::EMPTY_LOCATION_ID,
            fixtures::EMPTY_LOCATION_ADDRESS,
            &[],
        ))
        .with_table(table(3, 6))
        .with_table(table(1, 2))
        .with_table(table(2, 4))
        .with_dish(dish("dish-1", "Fresh Avocado Salad", 12.5), true)
        .with_dish(dish("dish-2", "Spring Salad", 9.0), false)
        .with_dish(dish("dish-3", "Beef Stroganoff", 18.0), true)
        .with_user(customer_user())
        .with_waiter(fixtures::WAITER_EMAIL);

    (0..fixtures::SERVICE_FEEDBACK_COUNT).fold(store, |store, i| store.with_feedback(feedback(i)))
}

/// Seeded store plus the `Stores` bundle over it.
pub fn fixture_stores() -> (Arc<InMemoryStore>, Stores) {
    let store = Arc::new(fixture_store());
    let stores = Stores::from_backend(store.clone());
    (store, stores)
}

/// Identity provider that knows the seeded customer.
pub fn fixture_identity() -> InMemoryIdentity {
    InMemoryIdentity::new().with_account(
        fixtures::CUSTOMER_EMAIL,
        fixtures::CUSTOMER_SUB,
        fixtures::CUSTOMER_PASSWORD,
        &["Customer"],
    )
}

/// Claims the authorizer would forward for the seeded customer.
pub fn customer_claims() -> Claims {
    Claims::new(
        fixtures::CUSTOMER_SUB,
        Some(fixtures::CUSTOMER_EMAIL.to_string()),
        vec!["Customer".to_string()],
    )
}

/// Create a mock request ID for testing.
///
/// Returns a request ID string in the format "test-request-{suffix}".
pub fn mock_request_id(suffix: &str) -> String {
    format!("test-request-{}", suffix)
}

/// `GET` request with a deterministic request id.
pub fn get(path: &str) -> ApiRequest {
    ApiRequest::new(Method::GET, path).with_request_id(mock_request_id(path))
}

/// `POST` request carrying `body` as JSON.
pub fn post_json(path: &str, body: &Value) -> ApiRequest {
    ApiRequest::new(Method::POST, path)
        .with_request_id(mock_request_id(path))
        .with_body(body.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn fixture_store_is_seeded() {
        let (_, stores) = fixture_stores();
        let tables = stores
            .tables
            .tables_for_location(fixtures::LOCATION_ID)
            .await
            .unwrap();
        assert_eq!(tables.len(), 3);

        let count = stores
            .feedback
            .count_feedback(fixtures::LOCATION_ID, "SERVICE")
            .await
            .unwrap();
        assert_eq!(count as usize, fixtures::SERVICE_FEEDBACK_COUNT);
    }

    #[test]
    fn mock_request_id_has_prefix() {
        assert_eq!(mock_request_id("abc"), "test-request-abc");
    }
}
