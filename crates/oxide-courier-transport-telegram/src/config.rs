//! Telegram transport settings.

use config::ConfigError;
use oxide_courier_core::CourierSettings;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;

/// Telegram transport settings loaded from environment variables.
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct TelegramSettings {
    /// Telegram Bot API token.
    pub telegram_token: String,
    /// Comma-separated list of user IDs allowed to run moderation commands.
    #[serde(rename = "admin_users")]
    pub admin_users_str: Option<String>,
}

/// Combined settings used by the Telegram transport layer.
#[derive(Clone)]
pub struct BotSettings {
    /// Courier tuning shared across handlers.
    pub courier: Arc<CourierSettings>,
    /// Telegram-specific settings.
    pub telegram: Arc<TelegramSettings>,
}

impl BotSettings {
    /// Create a new combined settings bundle.
    #[must_use]
    pub fn new(courier: CourierSettings, telegram: TelegramSettings) -> Self {
        Self {
            courier: Arc::new(courier),
            telegram: Arc::new(telegram),
        }
    }
}

impl TelegramSettings {
    /// Create new settings by loading from environment and files.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if loading fails.
    pub fn new() -> Result<Self, ConfigError> {
        oxide_courier_core::config::build_config()?.try_deserialize()
    }

    /// Returns the set of user IDs allowed to kick or ban.
    #[must_use]
    pub fn admin_users(&self) -> HashSet<u64> {
        self.admin_users_str
            .as_ref()
            .map(|s| {
                s.split(|c: char| c == ',' || c == ';' || c.is_whitespace())
                    .filter(|token| !token.is_empty())
                    .filter_map(|id| id.parse::<u64>().ok())
                    .collect()
            })
            .unwrap_or_default()
    }
}
