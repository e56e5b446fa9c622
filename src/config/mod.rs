use crate::error::{ErrorPageError, Result};
use dashmap::DashMap;
use std::env;
use std::str::FromStr;
use std::sync::Arc;

pub mod options;

pub use options::{
    ContextFields, ErrorLogger, ErrorLoggingFilter, ErrorLoggingSerializer, ErrorPageConfig,
    ErrorPageOptions,
};

/// Environment variable naming the deployment environment
pub const APP_ENV: &str = "APP_ENV";

/// Configuration service
///
/// A string key/value store, usually seeded from the process environment.
#[derive(Clone, Default)]
pub struct ConfigService {
    config: Arc<DashMap<String, String>>,
}

impl ConfigService {
    /// Create a service holding a snapshot of the environment
    pub fn new() -> Self {
        let service = Self::default();
        for (key, value) in env::vars() {
            service.set(&key, &value);
        }
        service
    }

    /// Create a service holding only the named environment variables
    pub fn from_env_keys<'a>(keys: impl IntoIterator<Item = &'a str>) -> Self {
        Self::from_pairs(
            keys.into_iter()
                .filter_map(|key| env::var(key).ok().map(|value| (key, value))),
        )
    }

    /// Create a service from explicit pairs, ignoring the environment
    pub fn from_pairs<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let service = Self::default();
        for (key, value) in pairs {
            service.set(key.as_ref(), value.as_ref());
        }
        service
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.config.get(key).map(|v| v.clone())
    }

    pub fn set(&self, key: &str, value: &str) {
        self.config.insert(key.to_string(), value.to_string());
    }

    /// Parse a value, `Ok(None)` when the key is unset
    pub fn get_parsed<T>(&self, key: &str) -> Result<Option<T>>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        self.get(key)
            .map(|raw| {
                raw.trim()
                    .parse::<T>()
                    .map_err(|e| ErrorPageError::config(key, e.to_string()))
            })
            .transpose()
    }

    /// Read a boolean flag; accepts true/false, 1/0, yes/no and on/off
    pub fn get_bool(&self, key: &str) -> Result<Option<bool>> {
        let Some(raw) = self.get(key) else {
            return Ok(None);
        };
        match raw.trim().to_ascii_lowercase().as_str() {
            "true" | "1" | "yes" | "on" => Ok(Some(true)),
            "false" | "0" | "no" | "off" => Ok(Some(false)),
            other => Err(ErrorPageError::config(
                key,
                format!("expected a boolean, got {other:?}"),
            )),
        }
    }

    /// Whether `APP_ENV` is set to "production"
    pub fn is_production(&self) -> bool {
        self.get(APP_ENV)
            .is_some_and(|value| value.trim().eq_ignore_ascii_case("production"))
    }
}
