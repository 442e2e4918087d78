//! Identity claims and the identity-provider seam.

use std::collections::HashMap;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::{Error, Result};
use crate::model::UserRole;

const GROUPS_CLAIM: &str = "cognito:groups";

/// Claims forwarded by the gateway authorizer, parsed once at the boundary.
///
/// The token itself is not re-validated here; the authorizer already did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Claims {
    sub: String,
    email: Option<String>,
    groups: Vec<String>,
}

impl Claims {
    pub fn new(sub: impl Into<String>, email: Option<String>, groups: Vec<String>) -> Self {
        Self {
            sub: sub.into(),
            email,
            groups,
        }
    }

    /// Parse the `claims` object of a REST API Cognito authorizer.
    ///
    /// `cognito:groups` arrives either as a JSON array or as a single string.
    pub fn from_value(value: &Value) -> Result<Self> {
        let object = value
            .as_object()
            .ok_or_else(|| Error::Unauthorized("Identity claims are malformed".to_string()))?;

        let sub = object
            .get("sub")
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| Error::Unauthorized("Missing subject claim".to_string()))?;

        let email = object
            .get("email")
            .and_then(Value::as_str)
            .map(str::to_string);

        let groups = match object.get(GROUPS_CLAIM) {
            Some(Value::Array(items)) => items
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect(),
            Some(Value::String(raw)) => split_groups(raw),
            _ => Vec::new(),
        };

        Ok(Self::new(sub, email, groups))
    }

    /// Parse the flattened string claims of an HTTP API JWT authorizer.
    pub fn from_string_map(claims: &HashMap<String, String>) -> Result<Self> {
        let sub = claims
            .get("sub")
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .ok_or_else(|| Error::Unauthorized("Missing subject claim".to_string()))?;
        let groups = claims
            .get(GROUPS_CLAIM)
            .map(|raw| split_groups(raw))
            .unwrap_or_default();
        Ok(Self::new(sub, claims.get("email").cloned(), groups))
    }

    pub fn sub(&self) -> &str {
        &self.sub
    }

    pub fn email(&self) -> Option<&str> {
        self.email.as_deref()
    }

    pub fn groups(&self) -> &[String] {
        &self.groups
    }

    pub fn role(&self) -> UserRole {
        role_from_groups(&self.groups)
    }
}

/// Accepts `Waiter`, `[Customer]`, `[Waiter, Customer]` and `Waiter Customer`.
fn split_groups(raw: &str) -> Vec<String> {
    raw.trim_matches(|c| c == '[' || c == ']')
        .split(|c: char| c == ',' || c.is_whitespace())
        .map(str::trim)
        .filter(|g| !g.is_empty())
        .map(str::to_string)
        .collect()
}

/// Waiter membership wins over Customer; no known group means Visitor.
pub fn role_from_groups<S: AsRef<str>>(groups: &[S]) -> UserRole {
    let roles: Vec<UserRole> = groups
        .iter()
        .filter_map(|g| UserRole::from_group(g.as_ref()))
        .collect();
    if roles.contains(&UserRole::Waiter) {
        UserRole::Waiter
    } else if roles.contains(&UserRole::Customer) {
        UserRole::Customer
    } else {
        UserRole::Visitor
    }
}

/// Attributes of an account being registered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAccount {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
}

/// Result of a successful password authentication.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthTokens {
    pub id_token: String,
    pub access_token: String,
    /// Provider subject id of the authenticated account.
    pub subject: String,
}

/// Operations this backend needs from the identity provider.
///
/// Implementations translate provider error kinds: an existing username to
/// [`Error::EmailAlreadyExists`], a rejected password policy to
/// [`Error::WeakPassword`] and failed credentials to [`Error::Unauthorized`].
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn email_exists(&self, email: &str) -> Result<bool>;

    /// Create the account with a temporary password, returning its subject id.
    async fn create_user(&self, account: &NewAccount, temporary_password: &str)
        -> Result<String>;

    async fn set_permanent_password(&self, email: &str, password: &str) -> Result<()>;

    /// Remove an account, used to undo a sign-up that failed part way.
    async fn delete_user(&self, email: &str) -> Result<()>;

    async fn add_to_group(&self, email: &str, group: &str) -> Result<()>;

    async fn authenticate(&self, email: &str, password: &str) -> Result<AuthTokens>;

    async fn groups_for_user(&self, email: &str) -> Result<Vec<String>>;

    /// Create any of `groups` that do not exist yet.
    async fn ensure_groups(&self, groups: &[&str]) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_array_groups() {
        let claims = Claims::from_value(&json!({
            "sub": "user-sub-id-123",
            "email": "john.doe@example.com",
            "cognito:groups": ["Customer"]
        }))
        .unwrap();
        assert_eq!(claims.sub(), "user-sub-id-123");
        assert_eq!(claims.email(), Some("john.doe@example.com"));
        assert_eq!(claims.role(), UserRole::Customer);
    }

    #[test]
    fn parses_string_groups() {
        let claims = Claims::from_value(&json!({
            "sub": "s",
            "cognito:groups": "[Customer, Waiter]"
        }))
        .unwrap();
        assert_eq!(claims.groups(), ["Customer", "Waiter"]);
        assert_eq!(claims.role(), UserRole::Waiter);
    }

    #[test]
    fn unknown_or_missing_groups_are_visitors() {
        let claims = Claims::from_value(&json!({"sub": "s", "cognito:groups": ["UnknownGroup"]}))
            .unwrap();
        assert_eq!(claims.role(), UserRole::Visitor);

        let claims = Claims::from_value(&json!({"sub": "s"})).unwrap();
        assert_eq!(claims.role(), UserRole::Visitor);
    }

    #[test]
    fn missing_subject_is_unauthorized() {
        let err = Claims::from_value(&json!({"email": "guest_user@example.com"})).unwrap_err();
        assert!(matches!(err, Error::Unauthorized(_)));
        assert!(Claims::from_value(&json!("token")).is_err());
    }

    #[test]
    fn string_map_claims() {
        let map = HashMap::from([
            ("sub".to_string(), "abc".to_string()),
            ("cognito:groups".to_string(), "[Waiter]".to_string()),
        ]);
        let claims = Claims::from_string_map(&map).unwrap();
        assert_eq!(claims.role(), UserRole::Waiter);
        assert_eq!(claims.email(), None);
    }
}
