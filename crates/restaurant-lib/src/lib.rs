//! Restaurant reservation library entry points.
//!
//! This crate holds the domain model and every operation the API exposes:
//! table availability, reservation creation, paginated feedback, reference
//! data lookups, and identity orchestration. Storage and identity are reached
//! through traits with DynamoDB, Cognito and in-memory implementations.
//! Higher-level consumers (Lambdas) should only depend on the functions
//! exported here instead of reimplementing behavior.

pub mod auth;
pub mod availability;
pub mod booking;
pub mod catalog;
pub mod cognito;
pub mod dynamo;
pub mod error;
pub mod feedback;
pub mod identity;
pub mod memory;
pub mod model;
pub mod password;
pub mod slot;
pub mod store;

pub use auth::{profile, sign_in, sign_up, Profile, Session, SignInRequest, SignUpRequest};
pub use availability::{find_available_tables, AvailabilityQuery, TableAvailability};
pub use booking::{create_reservation, ReservationReceipt, ReservationRequest};
pub use catalog::{list_locations, location_options, popular_dishes, speciality_dishes};
pub use cognito::CognitoIdentity;
pub use dynamo::{DynamoStore, TableNames};
pub use error::{Error, Result};
pub use feedback::{get_feedbacks, FeedbackPage, FeedbackQuery, FeedbackSort};
pub use identity::{Claims, IdentityProvider};
pub use memory::{InMemoryIdentity, InMemoryStore};
pub use model::{
    Dish, Feedback, Location, Reservation, ReservationStatus, Table, User, UserRole,
};
pub use password::{generate_temporary_password, DEFAULT_TEMP_PASSWORD_LENGTH};
pub use store::Stores;
