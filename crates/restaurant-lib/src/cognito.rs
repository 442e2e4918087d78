//! Amazon Cognito user-pool implementation of [`IdentityProvider`].

use async_trait::async_trait;
use aws_sdk_cognitoidentityprovider::error::DisplayErrorContext;
use aws_sdk_cognitoidentityprovider::types::{AttributeType, AuthFlowType, MessageActionType};
use aws_sdk_cognitoidentityprovider::Client;
use tracing::{info, warn};

use crate::error::{Error, Result};
use crate::identity::{AuthTokens, IdentityProvider, NewAccount};

#[derive(Debug, Clone)]
pub struct CognitoIdentity {
    client: Client,
    user_pool_id: String,
    client_id: String,
}

fn identity_error<E: std::error::Error>(operation: &str, err: E) -> Error {
    Error::identity(operation, DisplayErrorContext(&err))
}

fn attribute(name: &str, value: &str) -> Result<AttributeType> {
    AttributeType::builder()
        .name(name)
        .value(value)
        .build()
        .map_err(|e| identity_error("build attribute", e))
}

impl CognitoIdentity {
    pub fn new(client: Client, user_pool_id: impl Into<String>, client_id: impl Into<String>) -> Self {
        Self {
            client,
            user_pool_id: user_pool_id.into(),
            client_id: client_id.into(),
        }
    }

    async fn subject_of(&self, email: &str) -> Result<String> {
        let output = self
            .client
            .admin_get_user()
            .user_pool_id(&self.user_pool_id)
            .username(email)
            .send()
            .await
            .map_err(|e| identity_error("get user", e))?;
        output
            .user_attributes()
            .iter()
            .find(|a| a.name() == "sub")
            .and_then(|a| a.value())
            .map(str::to_string)
            .ok_or_else(|| Error::UserNotFound {
                message: "Could not extract Cognito user ID".to_string(),
            })
    }
}

#[async_trait]
impl IdentityProvider for CognitoIdentity {
    async fn email_exists(&self, email: &str) -> Result<bool> {
        let output = self
            .client
            .list_users()
            .user_pool_id(&self.user_pool_id)
            .filter(format!("email = \"{}\"", email.replace('"', "")))
            .limit(1)
            .send()
            .await
            .map_err(|e| identity_error("list users", e))?;
        Ok(!output.users().is_empty())
    }

    async fn create_user(
        &self,
        account: &NewAccount,
        temporary_password: &str,
    ) -> Result<String> {
        let result = self
            .client
            .admin_create_user()
            .user_pool_id(&self.user_pool_id)
            .username(&account.email)
            .temporary_password(temporary_password)
            .message_action(MessageActionType::Suppress)
            .user_attributes(attribute("email", &account.email)?)
            .user_attributes(attribute("email_verified", "true")?)
            .user_attributes(attribute("custom:firstName", &account.first_name)?)
            .user_attributes(attribute("custom:lastName", &account.last_name)?)
            .send()
            .await;

        let output = match result {
            Ok(output) => output,
            Err(err) => {
                return Err(match err.as_service_error() {
                    Some(e) if e.is_username_exists_exception() => Error::EmailAlreadyExists,
                    Some(e) if e.is_invalid_password_exception() => Error::WeakPassword,
                    _ => identity_error("create user", err),
                })
            }
        };

        let subject = output
            .user()
            .map(|user| user.attributes())
            .and_then(|attrs| attrs.iter().find(|a| a.name() == "sub"))
            .and_then(|a| a.value())
            .map(str::to_string);
        match subject {
            Some(subject) => Ok(subject),
            None => self.subject_of(&account.email).await,
        }
    }

    async fn set_permanent_password(&self, email: &str, password: &str) -> Result<()> {
        self.client
            .admin_set_user_password()
            .user_pool_id(&self.user_pool_id)
            .username(email)
            .password(password)
            .permanent(true)
            .send()
            .await
            .map_err(|err| match err.as_service_error() {
                Some(e) if e.is_invalid_password_exception() => Error::WeakPassword,
                _ => identity_error("set password", err),
            })?;
        Ok(())
    }

    async fn delete_user(&self, email: &str) -> Result<()> {
        self.client
            .admin_delete_user()
            .user_pool_id(&self.user_pool_id)
            .username(email)
            .send()
            .await
            .map_err(|e| identity_error("delete user", e))?;
        Ok(())
    }

    async fn add_to_group(&self, email: &str, group: &str) -> Result<()> {
        self.client
            .admin_add_user_to_group()
            .user_pool_id(&self.user_pool_id)
            .username(email)
            .group_name(group)
            .send()
            .await
            .map_err(|e| identity_error("add to group", e))?;
        Ok(())
    }

    async fn authenticate(&self, email: &str, password: &str) -> Result<AuthTokens> {
        let output = self
            .client
            .admin_initiate_auth()
            .user_pool_id(&self.user_pool_id)
            .client_id(&self.client_id)
            .auth_flow(AuthFlowType::AdminUserPasswordAuth)
            .auth_parameters("USERNAME", email)
            .auth_parameters("PASSWORD", password)
            .send()
            .await
            .map_err(|err| match err.as_service_error() {
                Some(e) if e.is_not_authorized_exception() || e.is_user_not_found_exception() => {
                    Error::Unauthorized("Invalid email or password".to_string())
                }
                _ => identity_error("initiate auth", err),
            })?;

        let result = output.authentication_result().ok_or_else(|| {
            Error::Unauthorized("Authentication challenge is not supported".to_string())
        })?;
        let id_token = result
            .id_token()
            .map(str::to_string)
            .ok_or_else(|| Error::identity("initiate auth", "response carried no id token"))?;
        let access_token = result.access_token().unwrap_or_default().to_string();

        let subject = self.subject_of(email).await?;
        Ok(AuthTokens {
            id_token,
            access_token,
            subject,
        })
    }

    async fn groups_for_user(&self, email: &str) -> Result<Vec<String>> {
        let output = self
            .client
            .admin_list_groups_for_user()
            .user_pool_id(&self.user_pool_id)
            .username(email)
            .send()
            .await
            .map_err(|e| identity_error("list groups", e))?;
        Ok(output
            .groups()
            .iter()
            .filter_map(|g| g.group_name())
            .map(str::to_string)
            .collect())
    }

    async fn ensure_groups(&self, groups: &[&str]) -> Result<()> {
        for group in groups {
            let existing = self
                .client
                .get_group()
                .user_pool_id(&self.user_pool_id)
                .group_name(*group)
                .send()
                .await;
            match existing {
                Ok(_) => continue,
                Err(err)
                    if err
                        .as_service_error()
                        .is_some_and(|e| e.is_resource_not_found_exception()) => {}
                Err(err) => {
                    warn!(group, error = %DisplayErrorContext(&err), "could not look up group");
                    continue;
                }
            }

            self.client
                .create_group()
                .user_pool_id(&self.user_pool_id)
                .group_name(*group)
                .send()
                .await
                .map_err(|e| identity_error("create group", e))?;
            info!(group, "created identity group");
        }
        Ok(())
    }
}
