//! Stored entities.
//!
//! Field names follow the camelCase attribute names used in the data store, so
//! the same types are (de)serialized by every storage backend.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

/// A restaurant location. Reference data, read-only from this crate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    #[serde(rename = "locationId")]
    pub id: String,
    #[serde(alias = "locationAddress")]
    pub address: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,
    #[serde(default)]
    pub speciality_dish_ids: Vec<String>,
}

/// A bookable table and the slots it is configured to offer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Table {
    pub table_id: String,
    pub location_id: String,
    #[serde(deserialize_with = "number_or_string")]
    pub table_number: u32,
    #[serde(alias = "guests", deserialize_with = "number_or_string")]
    pub capacity: u32,
    /// Slot strings in `HH:MM-HH:MM` form.
    #[serde(default)]
    pub available_slots: Vec<String>,
}

/// Lifecycle state of a reservation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReservationStatus {
    Available,
    Confirmed,
    InProgress,
    Finished,
    Cancelled,
}

impl ReservationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReservationStatus::Available => "AVAILABLE",
            ReservationStatus::Confirmed => "CONFIRMED",
            ReservationStatus::InProgress => "IN_PROGRESS",
            ReservationStatus::Finished => "FINISHED",
            ReservationStatus::Cancelled => "CANCELLED",
        }
    }

    /// Whether a reservation in this state occupies its table.
    pub fn blocks_table(&self) -> bool {
        matches!(self, ReservationStatus::Confirmed)
    }
}

impl fmt::Display for ReservationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A booking of one table for one 90 minute window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reservation {
    pub id: String,
    pub location_id: String,
    pub table_id: String,
    #[serde(deserialize_with = "number_or_string")]
    pub table_number: u32,
    /// `YYYY-MM-DD`.
    pub date: String,
    /// Start time, `HH:MM`.
    pub time: String,
    #[serde(deserialize_with = "number_or_string")]
    pub guests: u32,
    pub status: ReservationStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub waiter_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dish {
    #[serde(rename = "dishId")]
    pub id: String,
    pub name: String,
    pub price: f64,
    #[serde(default)]
    pub weight: String,
    #[serde(default)]
    pub image_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dish_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub calories: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub carbohydrates: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fats: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proteins: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vitamins: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Feedback {
    #[serde(rename = "feedbackId")]
    pub id: String,
    pub rate: f64,
    #[serde(default)]
    pub comment: String,
    #[serde(default)]
    pub user_name: String,
    #[serde(default)]
    pub user_avatar_url: String,
    /// ISO-8601 date or timestamp; sorts lexicographically.
    pub date: String,
    #[serde(rename = "type")]
    pub feedback_type: String,
    pub location_id: String,
}

/// Role a caller holds, derived from identity-provider group membership.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UserRole {
    Customer,
    Waiter,
    Visitor,
}

impl UserRole {
    /// Identity-provider group backing this role. Visitors have none.
    pub fn group_name(&self) -> Option<&'static str> {
        match self {
            UserRole::Customer => Some("Customer"),
            UserRole::Waiter => Some("Waiter"),
            UserRole::Visitor => None,
        }
    }

    pub fn from_group(group: &str) -> Option<Self> {
        match group.trim() {
            "Customer" => Some(UserRole::Customer),
            "Waiter" => Some(UserRole::Waiter),
            _ => None,
        }
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            UserRole::Customer => "Customer",
            UserRole::Waiter => "Waiter",
            UserRole::Visitor => "Visitor",
        };
        f.write_str(name)
    }
}

/// Local user record, keyed by the identity-provider subject.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub cognito_id: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_image_url: Option<String>,
    #[serde(rename = "userRole")]
    pub role: UserRole,
}

impl User {
    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }
}

/// Accepts numeric attributes that were written either as numbers or strings.
fn number_or_string<'de, D>(deserializer: D) -> std::result::Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(u32),
        Text(String),
    }

    match Raw::deserialize(deserializer)? {
        Raw::Number(n) => Ok(n),
        Raw::Text(s) => s.trim().parse().map_err(serde::de::Error::custom),
    }
}
