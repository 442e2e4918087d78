//! Sign-up, sign-in and profile orchestration.

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{Error, Result};
use crate::identity::{role_from_groups, Claims, IdentityProvider, NewAccount};
use crate::model::{User, UserRole};
use crate::password::generate_temporary_password;
use crate::store::Stores;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignUpRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
}

impl SignUpRequest {
    pub fn validate(&self) -> Result<()> {
        let fields = [&self.email, &self.password, &self.first_name, &self.last_name];
        if fields.iter().any(|f| f.trim().is_empty()) {
            return Err(Error::invalid_request(
                "Email, password, firstName and lastName are required",
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignInRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

impl SignInRequest {
    pub fn validate(&self) -> Result<()> {
        if self.email.trim().is_empty() || self.password.is_empty() {
            return Err(Error::invalid_request("Email and password are required"));
        }
        Ok(())
    }
}

/// Outcome of a successful sign-in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    /// The provider's id token; the gateway authorizer validates it.
    pub access_token: String,
    pub username: String,
    pub role: UserRole,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Profile {
    pub first_name: String,
    pub last_name: String,
    pub role: UserRole,
    pub email: String,
    pub image_url: Option<String>,
}

/// Register a new account and its local user record.
///
/// Emails listed in the waiter directory join the `Waiter` group, everyone
/// else joins `Customer`.
pub async fn sign_up(
    stores: &Stores,
    identity: &dyn IdentityProvider,
    request: &SignUpRequest,
    temp_password_length: usize,
) -> Result<User> {
    request.validate()?;
    let email = request.email.trim();

    if identity.email_exists(email).await? {
        return Err(Error::EmailAlreadyExists);
    }

    let role = if stores.waiters.is_waiter(email).await? {
        UserRole::Waiter
    } else {
        UserRole::Customer
    };

    let account = NewAccount {
        email: email.to_string(),
        first_name: request.first_name.trim().to_string(),
        last_name: request.last_name.trim().to_string(),
    };
    let temporary = generate_temporary_password(temp_password_length);
    let subject = identity.create_user(&account, &temporary).await?;
    if let Err(err) = activate(identity, email, &request.password, role).await {
        roll_back(identity, email, &subject, &err).await;
        return Err(err);
    }

    let user = User {
        cognito_id: subject,
        email: account.email,
        first_name: account.first_name,
        last_name: account.last_name,
        profile_image_url: None,
        role,
    };
    if let Err(err) = stores.users.save_user(&user).await {
        roll_back(identity, email, &user.cognito_id, &err).await;
        return Err(err);
    }

    info!(cognito_id = %user.cognito_id, role = %role, "user registered");
    Ok(user)
}

/// Set the caller's password and join the role group.
async fn activate(
    identity: &dyn IdentityProvider,
    email: &str,
    password: &str,
    role: UserRole,
) -> Result<()> {
    identity.set_permanent_password(email, password).await?;
    if let Some(group) = role.group_name() {
        identity.add_to_group(email, group).await?;
    }
    Ok(())
}

/// Delete an account whose sign-up did not complete so the email can be reused.
async fn roll_back(identity: &dyn IdentityProvider, email: &str, subject: &str, cause: &Error) {
    match identity.delete_user(email).await {
        Ok(()) => info!(cognito_id = %subject, error = %cause, "rolled back incomplete sign-up"),
        Err(e) => warn!(
            cognito_id = %subject,
            error = %cause,
            rollback_error = %e,
            "incomplete sign-up left an orphaned identity account"
        ),
    }
}

pub async fn sign_in(
    stores: &Stores,
    identity: &dyn IdentityProvider,
    request: &SignInRequest,
) -> Result<Session> {
    request.validate()?;
    let email = request.email.trim();

    let tokens = identity.authenticate(email, &request.password).await?;

    let groups = identity.groups_for_user(email).await?;
    let role = role_from_groups(&groups);
    if role == UserRole::Visitor {
        return Err(Error::Forbidden(
            "User does not belong to any group".to_string(),
        ));
    }

    let user = stores
        .users
        .get_user(&tokens.subject)
        .await?
        .ok_or_else(|| Error::UserNotFound {
            message: "User not found in DB".to_string(),
        })?;

    Ok(Session {
        access_token: tokens.id_token,
        username: user.display_name(),
        role,
    })
}

/// Profile of the caller identified by gateway claims.
pub async fn profile(stores: &Stores, claims: Option<&Claims>) -> Result<Profile> {
    let claims =
        claims.ok_or_else(|| Error::Unauthorized("Missing identity claims".to_string()))?;

    let role = claims.role();
    if role == UserRole::Visitor {
        return Err(Error::Unauthorized(
            "User role could not be resolved".to_string(),
        ));
    }

    let user = stores
        .users
        .get_user(claims.sub())
        .await?
        .ok_or_else(|| Error::UserNotFound {
            message: "User not found".to_string(),
        })?;

    Ok(Profile {
        first_name: user.first_name,
        last_name: user.last_name,
        role,
        email: user.email,
        image_url: user.profile_image_url,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sign_up_requires_every_field() {
        let request = SignUpRequest {
            email: "a@b.c".into(),
            password: "Secret123!".into(),
            first_name: "A".into(),
            last_name: " ".into(),
        };
        let err = request.validate().unwrap_err();
        assert_eq!(
            err.to_string(),
            "Email, password, firstName and lastName are required"
        );
    }

    #[test]
    fn sign_in_requires_credentials() {
        assert!(SignInRequest::default().validate().is_err());
        let request = SignInRequest {
            email: "a@b.c".into(),
            password: "pw".into(),
        };
        assert!(request.validate().is_ok());
    }
}
