//! Runtime configuration for the catalog, read from `STOREFRONT_*` environment variables.

use std::time::Duration;

use storefront_observability::LogFormat;
use thiserror::Error;

pub const ENV_STORE_TIMEOUT_MS: &str = "STOREFRONT_STORE_TIMEOUT_MS";
pub const ENV_DEFAULT_PAGE_SIZE: &str = "STOREFRONT_DEFAULT_PAGE_SIZE";
pub const ENV_MAX_PAGE_SIZE: &str = "STOREFRONT_MAX_PAGE_SIZE";
pub const ENV_LOG_FORMAT: &str = "STOREFRONT_LOG_FORMAT";

const DEFAULT_STORE_TIMEOUT_MS: u64 = 2_000;
const DEFAULT_PAGE_SIZE: usize = 50;
const MAX_PAGE_SIZE: usize = 1_000;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{var} has invalid value '{value}': {reason}")]
    Invalid {
        var: &'static str,
        value: String,
        reason: String,
    },

    #[error("inconsistent configuration: {0}")]
    Inconsistent(String),
}

/// Catalog settings.
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogConfig {
    /// Upper bound on every individual storage call.
    pub store_timeout: Duration,
    /// Page size used when a listing does not ask for one.
    pub default_page_size: usize,
    /// Hard cap on any requested page size.
    pub max_page_size: usize,
    pub log_format: LogFormat,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            store_timeout: Duration::from_millis(DEFAULT_STORE_TIMEOUT_MS),
            default_page_size: DEFAULT_PAGE_SIZE,
            max_page_size: MAX_PAGE_SIZE,
            log_format: LogFormat::default(),
        }
    }
}

impl CatalogConfig {
    /// Load from the process environment. Unset variables keep their defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Load through an arbitrary variable lookup (tests pass a map here).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(raw) = lookup(ENV_STORE_TIMEOUT_MS) {
            config.store_timeout = Duration::from_millis(parse_number(ENV_STORE_TIMEOUT_MS, &raw)?);
        }
        if let Some(raw) = lookup(ENV_DEFAULT_PAGE_SIZE) {
            config.default_page_size = parse_number(ENV_DEFAULT_PAGE_SIZE, &raw)?;
        }
        if let Some(raw) = lookup(ENV_MAX_PAGE_SIZE) {
            config.max_page_size = parse_number(ENV_MAX_PAGE_SIZE, &raw)?;
        }
        if let Some(raw) = lookup(ENV_LOG_FORMAT) {
            config.log_format = raw.parse::<LogFormat>().map_err(|reason| ConfigError::Invalid {
                var: ENV_LOG_FORMAT,
                value: raw.clone(),
                reason,
            })?;
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.store_timeout.is_zero() {
            return Err(ConfigError::Inconsistent("store timeout must be greater than zero".into()));
        }
        if self.max_page_size == 0 {
            return Err(ConfigError::Inconsistent("max page size must be greater than zero".into()));
        }
        if self.default_page_size == 0 || self.default_page_size > self.max_page_size {
            return Err(ConfigError::Inconsistent(format!(
                "default page size {} must be between 1 and the max page size {}",
                self.default_page_size, self.max_page_size
            )));
        }
        Ok(())
    }

    /// Resolve a requested page size against the configured default and cap.
    /// A request for zero records is treated like no request.
    pub fn page_size(&self, requested: Option<usize>) -> usize {
        requested
            .filter(|&limit| limit > 0)
            .unwrap_or(self.default_page_size)
            .min(self.max_page_size)
    }

    /// Install the process-wide subscriber in the configured format.
    pub fn init_logging(&self) -> bool {
        storefront_observability::init_with(self.log_format)
    }
}

fn parse_number<T>(var: &'static str, raw: &str) -> Result<T, ConfigError>
where
    T: core::str::FromStr,
    T::Err: core::fmt::Display,
{
    raw.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
        var,
        value: raw.to_string(),
        reason: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> =
            vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |var| map.get(var).cloned()
    }

    #[test]
    fn empty_environment_yields_defaults() {
        let config = CatalogConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, CatalogConfig::default());
        assert_eq!(config.store_timeout, Duration::from_secs(2));
        assert_eq!(config.default_page_size, 50);
        assert_eq!(config.max_page_size, 1000);
    }

    #[test]
    fn overrides_are_applied() {
        let config = CatalogConfig::from_lookup(lookup(&[
            (ENV_STORE_TIMEOUT_MS, "150"),
            (ENV_DEFAULT_PAGE_SIZE, "20"),
            (ENV_MAX_PAGE_SIZE, "100"),
            (ENV_LOG_FORMAT, "Pretty"),
        ]))
        .unwrap();
        assert_eq!(config.store_timeout, Duration::from_millis(150));
        assert_eq!(config.default_page_size, 20);
        assert_eq!(config.max_page_size, 100);
        assert_eq!(config.log_format, LogFormat::Pretty);
    }

    #[test]
    fn unparsable_values_name_the_variable() {
        let err = CatalogConfig::from_lookup(lookup(&[(ENV_STORE_TIMEOUT_MS, "soon")])).unwrap_err();
        match err {
            ConfigError::Invalid { var, .. } => assert_eq!(var, ENV_STORE_TIMEOUT_MS),
            other => panic!("Expected Invalid error, got {other:?}"),
        }
    }

    #[test]
    fn zero_timeout_and_oversized_default_are_rejected() {
        assert!(CatalogConfig::from_lookup(lookup(&[(ENV_STORE_TIMEOUT_MS, "0")])).is_err());
        assert!(
            CatalogConfig::from_lookup(lookup(&[
                (ENV_DEFAULT_PAGE_SIZE, "200"),
                (ENV_MAX_PAGE_SIZE, "100"),
            ]))
            .is_err()
        );
    }

    #[test]
    fn page_size_is_defaulted_and_capped() {
        let config = CatalogConfig::default();
        assert_eq!(config.page_size(None), 50);
        assert_eq!(config.page_size(Some(10)), 10);
        assert_eq!(config.page_size(Some(5_000)), 1000);
        assert_eq!(config.page_size(Some(0)), 50);
    }

    #[test]
    fn logging_installs_once() {
        let config = CatalogConfig {
            log_format: LogFormat::Pretty,
            ..CatalogConfig::default()
        };
        config.init_logging();
        assert!(!config.init_logging());
    }
}
