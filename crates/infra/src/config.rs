//! Configuration loading and representation.
//!
//! Everything is read from environment variables; unset variables fall back
//! to defaults, malformed ones are reported instead of silently ignored.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use storefront_catalog::{DEFAULT_CURRENCY_SUFFIX, PriceFormat, ReconcileMode, SaveContext};
use storefront_observability::LogFormat;

pub const PRICING_MODE_VAR: &str = "STOREFRONT_PRICING_MODE";
pub const CURRENCY_SUFFIX_VAR: &str = "STOREFRONT_CURRENCY_SUFFIX";
pub const LOG_FORMAT_VAR: &str = "STOREFRONT_LOG_FORMAT";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid value '{value}' for {key}: {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogConfig {
    pub reconcile_mode: ReconcileMode,
    pub price_format: PriceFormat,
    pub log_format: LogFormat,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            reconcile_mode: ReconcileMode::default(),
            price_format: PriceFormat::new(DEFAULT_CURRENCY_SUFFIX),
            log_format: LogFormat::default(),
        }
    }
}

impl CatalogConfig {
    /// Load from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load using `lookup` in place of the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(value) = lookup(PRICING_MODE_VAR) {
            config.reconcile_mode = value.parse().map_err(|e: storefront_core::DomainError| {
                ConfigError::Invalid {
                    key: PRICING_MODE_VAR,
                    value: value.clone(),
                    reason: e.to_string(),
                }
            })?;
        }

        if let Some(value) = lookup(CURRENCY_SUFFIX_VAR) {
            config.price_format = PriceFormat::new(value);
        }

        if let Some(value) = lookup(LOG_FORMAT_VAR) {
            config.log_format = value.parse().map_err(|e: storefront_observability::LogFormatError| {
                ConfigError::Invalid {
                    key: LOG_FORMAT_VAR,
                    value: value.clone(),
                    reason: e.to_string(),
                }
            })?;
        }

        tracing::debug!(
            reconcile_mode = %config.reconcile_mode,
            currency_suffix = config.price_format.currency_suffix(),
            log_format = %config.log_format,
            "catalog configuration loaded"
        );

        Ok(config)
    }

    pub fn save_context(&self) -> SaveContext {
        SaveContext::new(self.reconcile_mode)
    }

    /// Install the process-wide subscriber in the configured `log_format`.
    ///
    /// Only the first call in a process takes effect.
    pub fn init_tracing(&self) {
        storefront_observability::tracing::init(self.log_format);
    }
}
