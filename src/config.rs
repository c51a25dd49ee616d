use std::{env, fmt::Display, str::FromStr};

use thiserror::Error;
use tracing::{info, warn};

use crate::application::desk::PaymentSettings;

pub const DEFAULT_PORT: &str = "8080";
pub const DEFAULT_CURRENCY: &str = "INR";

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Environment variable {0} must be set")]
    Missing(&'static str),
    #[error("Invalid {key} value: {reason}")]
    Invalid { key: &'static str, reason: String },
}

/// Runtime configuration, read from the environment.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub payment_secret: String,
    pub admin_token: String,
    pub currency: String,
}

impl Config {
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from an arbitrary key lookup, so tests need not
    /// touch the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        Ok(Self {
            port: try_load(&lookup, "BUDDY_PORT", DEFAULT_PORT)?,
            payment_secret: secret(&lookup, "BUDDY_PAYMENT_SECRET")?,
            admin_token: secret(&lookup, "BUDDY_ADMIN_TOKEN")?,
            currency: try_load(&lookup, "BUDDY_CURRENCY", DEFAULT_CURRENCY)?,
        })
    }

    pub fn payment_settings(&self) -> PaymentSettings {
        PaymentSettings {
            secret: self.payment_secret.clone(),
            currency: self.currency.clone(),
        }
    }
}

fn try_load<F, T>(lookup: &F, key: &'static str, default: &str) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: Display,
{
    lookup(key)
        .unwrap_or_else(|| {
            info!("{key} not set, using default: {default}");
            default.to_string()
        })
        .parse()
        .map_err(|e: T::Err| {
            warn!("Invalid {key} value: {e}");
            ConfigError::Invalid {
                key,
                reason: e.to_string(),
            }
        })
}

fn secret<F>(lookup: &F, key: &'static str) -> Result<String, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .ok_or(ConfigError::Missing(key))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_applied() {
        let config = Config::from_lookup(lookup(&[
            ("BUDDY_PAYMENT_SECRET", "pay"),
            ("BUDDY_ADMIN_TOKEN", "admin"),
        ]))
        .unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.currency, "INR");
        assert_eq!(config.payment_settings().secret, "pay");
    }

    #[test]
    fn test_missing_secret() {
        let result = Config::from_lookup(lookup(&[("BUDDY_ADMIN_TOKEN", "admin")]));
        assert_eq!(result.unwrap_err(), ConfigError::Missing("BUDDY_PAYMENT_SECRET"));
    }

    #[test]
    fn test_blank_admin_token_is_missing() {
        let result = Config::from_lookup(lookup(&[
            ("BUDDY_PAYMENT_SECRET", "pay"),
            ("BUDDY_ADMIN_TOKEN", "   "),
        ]));
        assert_eq!(result.unwrap_err(), ConfigError::Missing("BUDDY_ADMIN_TOKEN"));
    }

    #[test]
    fn test_invalid_port() {
        let result = Config::from_lookup(lookup(&[
            ("BUDDY_PORT", "eighty"),
            ("BUDDY_PAYMENT_SECRET", "pay"),
            ("BUDDY_ADMIN_TOKEN", "admin"),
        ]));
        assert!(matches!(
            result,
            Err(ConfigError::Invalid { key: "BUDDY_PORT", .. })
        ));
    }
}
