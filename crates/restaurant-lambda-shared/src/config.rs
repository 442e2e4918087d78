//! Environment configuration, read once at cold start.

use thiserror::Error;

use restaurant_lib::password::MIN_TEMP_PASSWORD_LENGTH;
use restaurant_lib::{TableNames, DEFAULT_TEMP_PASSWORD_LENGTH};

use crate::tracing_init::LogFormat;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    Missing(&'static str),

    #[error("invalid value for {name}: {message}")]
    Invalid { name: &'static str, message: String },
}

/// Everything the Lambda needs from its environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Overrides the SDK's default region chain when set.
    pub region: Option<String>,
    pub user_pool_id: String,
    pub client_id: String,
    pub tables: TableNames,
    pub temp_password_length: usize,
    pub log_format: LogFormat,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build the configuration from any name -> value lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let optional = |name: &str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let required = |name: &'static str| optional(name).ok_or(ConfigError::Missing(name));

        let temp_password_length = match optional("TEMP_PASSWORD_LENGTH") {
            Some(raw) => raw
                .parse::<usize>()
                .map_err(|e| ConfigError::Invalid {
                    name: "TEMP_PASSWORD_LENGTH",
                    message: e.to_string(),
                })?
                .max(MIN_TEMP_PASSWORD_LENGTH),
            None => DEFAULT_TEMP_PASSWORD_LENGTH,
        };

        Ok(Self {
            region: optional("REGION"),
            user_pool_id: required("COGNITO_ID")?,
            client_id: required("CLIENT_ID")?,
            tables: TableNames {
                locations: required("LOCATIONS_TABLE")?,
                tables: required("TABLES_TABLE")?,
                reservations: required("RESERVATIONS_TABLE")?,
                dishes: required("DISHES_TABLE")?,
                feedback: required("FEEDBACK_TABLE")?,
                users: required("USERS_TABLE")?,
                waiters: required("WAITERS_TABLE")?,
            },
            temp_password_length,
            log_format: optional("LOG_FORMAT")
                .map(|v| LogFormat::parse(&v))
                .unwrap_or_default(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn full_env() -> HashMap<&'static str, &'static str> {
        HashMap::from([
            ("COGNITO_ID", "eu-west-1_pool"),
            ("CLIENT_ID", "client"),
            ("LOCATIONS_TABLE", "locations"),
            ("TABLES_TABLE", "tables"),
            ("RESERVATIONS_TABLE", "reservations"),
            ("DISHES_TABLE", "dishes"),
            ("FEEDBACK_TABLE", "feedbacks"),
            ("USERS_TABLE", "users"),
            ("WAITERS_TABLE", "waiters"),
        ])
    }

    fn load(env: &HashMap<&'static str, &'static str>) -> Result<Config, ConfigError> {
        Config::from_lookup(|name| env.get(name).map(|v| v.to_string()))
    }

    #[test]
    fn defaults_apply_to_optional_values() {
        let config = load(&full_env()).unwrap();
        assert_eq!(config.region, None);
        assert_eq!(config.tables.reservations, "reservations");
        assert_eq!(config.temp_password_length, DEFAULT_TEMP_PASSWORD_LENGTH);
        assert_eq!(config.log_format, LogFormat::Json);
    }

    #[test]
    fn blank_required_value_is_missing() {
        let mut env = full_env();
        env.insert("USERS_TABLE", "  ");
        assert_eq!(load(&env), Err(ConfigError::Missing("USERS_TABLE")));
    }

    #[test]
    fn temp_password_length_is_clamped_and_validated() {
        let mut env = full_env();
        env.insert("TEMP_PASSWORD_LENGTH", "4");
        assert_eq!(load(&env).unwrap().temp_password_length, MIN_TEMP_PASSWORD_LENGTH);

        env.insert("TEMP_PASSWORD_LENGTH", "many");
        assert!(matches!(
            load(&env),
            Err(ConfigError::Invalid {
                name: "TEMP_PASSWORD_LENGTH",
                ..
            })
        ));
    }

    #[test]
    fn region_and_log_format_are_read() {
        let mut env = full_env();
        env.insert("REGION", "eu-central-1");
        env.insert("LOG_FORMAT", "text");
        let config = load(&env).unwrap();
        assert_eq!(config.region.as_deref(), Some("eu-central-1"));
        assert_eq!(config.log_format, LogFormat::Text);
    }
}
