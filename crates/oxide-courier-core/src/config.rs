//! Configuration management
//!
//! Shared config builder and the courier's own tuning knobs.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};

use crate::resolver::ChatResolver;

/// Default lifetime of a cached username resolution (0 disables caching).
pub const RESOLVE_CACHE_TTL_SECS: u64 = 0;
/// Default maximum number of cached username resolutions.
pub const RESOLVE_CACHE_MAX_SIZE: u64 = 10_000;

/// Build the layered configuration source.
///
/// Sources, later ones winning: `config/default`, `config/{RUN_MODE}`,
/// `config/local`, `APP__*` variables, then plain environment variables.
///
/// # Errors
///
/// Returns a `ConfigError` if a present source cannot be read.
pub fn build_config() -> Result<Config, ConfigError> {
    let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

    Config::builder()
        .add_source(File::with_name("config/default").required(false))
        .add_source(File::with_name(&format!("config/{run_mode}")).required(false))
        // Not checked into git
        .add_source(File::with_name("config/local").required(false))
        .add_source(Environment::with_prefix("APP").separator("__"))
        .add_source(Environment::default().ignore_empty(true))
        .build()
}

/// Courier tuning loaded from configuration.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct CourierSettings {
    /// Seconds a resolved username stays cached; 0 disables the cache
    #[serde(default = "default_resolve_cache_ttl_secs")]
    pub resolve_cache_ttl_secs: u64,
    /// Maximum number of cached usernames
    #[serde(default = "default_resolve_cache_max_size")]
    pub resolve_cache_max_size: u64,
}

const fn default_resolve_cache_ttl_secs() -> u64 {
    RESOLVE_CACHE_TTL_SECS
}

const fn default_resolve_cache_max_size() -> u64 {
    RESOLVE_CACHE_MAX_SIZE
}

impl Default for CourierSettings {
    fn default() -> Self {
        Self {
            resolve_cache_ttl_secs: RESOLVE_CACHE_TTL_SECS,
            resolve_cache_max_size: RESOLVE_CACHE_MAX_SIZE,
        }
    }
}

impl CourierSettings {
    /// Load settings from files and environment.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if loading fails.
    pub fn new() -> Result<Self, ConfigError> {
        build_config()?.try_deserialize()
    }

    /// Cache lifetime, or `None` when caching is disabled.
    #[must_use]
    pub fn resolve_cache_ttl(&self) -> Option<Duration> {
        (self.resolve_cache_ttl_secs > 0).then(|| Duration::from_secs(self.resolve_cache_ttl_secs))
    }
}

/// Options supplied by code when constructing a courier.
#[derive(Clone, Default)]
pub struct CourierOptions {
    /// Replaces the default username resolver
    pub resolve_chat_id: Option<Arc<dyn ChatResolver>>,
}

impl CourierOptions {
    /// Use `resolver` instead of the default username resolver.
    #[must_use]
    pub fn resolve_chat_id(mut self, resolver: impl ChatResolver + 'static) -> Self {
        self.resolve_chat_id = Some(Arc::new(resolver));
        self
    }
}

impl fmt::Debug for CourierOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CourierOptions")
            .field("resolve_chat_id", &self.resolve_chat_id.is_some())
            .finish()
    }
}
