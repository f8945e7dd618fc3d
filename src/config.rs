//! Configuration and settings management
//!
//! Loads settings from environment variables and optional config files.

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::collections::HashSet;

/// Default per-user cooldown between platform commands, in seconds.
pub const DEFAULT_COOLDOWN_SECS: u64 = 7;

/// Application settings loaded from environment variables
#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    /// Telegram Bot API token
    pub telegram_token: String,

    /// Base URL of the extraction API (no trailing slash required)
    pub api_base_url: String,

    /// Per-user cooldown window in seconds
    #[serde(default = "default_cooldown_secs")]
    pub command_cooldown_secs: u64,

    /// Comma-separated list of privileged (admin) user IDs
    #[serde(rename = "admin_ids")]
    pub admin_ids_str: Option<String>,
}

const fn default_cooldown_secs() -> u64 {
    DEFAULT_COOLDOWN_SECS
}

impl Settings {
    /// Create new settings by loading from environment and files.
    ///
    /// Sources are layered: `config/default`, `config/{RUN_MODE}`,
    /// `config/local`, then environment variables (which win).
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if loading or deserialization fails.
    pub fn new() -> Result<Self, ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let s = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{run_mode}")).required(false))
            // Local overrides, not checked into git
            .add_source(File::with_name("config/local").required(false))
            // Environment::default() auto-converts UPPER_SNAKE_CASE to snake_case;
            // ignore_empty treats empty env vars as unset
            .add_source(Environment::default().ignore_empty(true))
            .build()?;

        s.try_deserialize()
    }

    /// Returns the set of privileged user IDs exempt from cooldown gating
    /// and allowed to run admin commands.
    #[must_use]
    pub fn admin_ids(&self) -> HashSet<i64> {
        self.admin_ids_str
            .as_ref()
            .map(|s| {
                s.split(|c: char| c == ',' || c == ';' || c.is_whitespace())
                    .filter(|token| !token.is_empty())
                    .filter_map(|id| id.parse::<i64>().ok())
                    .collect()
            })
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings_with_admins(admins: Option<&str>) -> Settings {
        Settings {
            telegram_token: "dummy".to_string(),
            api_base_url: "http://localhost".to_string(),
            command_cooldown_secs: DEFAULT_COOLDOWN_SECS,
            admin_ids_str: admins.map(String::from),
        }
    }

    #[test]
    fn test_admin_list_parsing() {
        let settings = settings_with_admins(Some("123,456"));
        let admins = settings.admin_ids();
        assert!(admins.contains(&123));
        assert!(admins.contains(&456));
        assert_eq!(admins.len(), 2);

        // Mixed separators
        let settings = settings_with_admins(Some("333; 444, 555"));
        assert_eq!(settings.admin_ids().len(), 3);

        // Bad tokens are skipped
        let settings = settings_with_admins(Some("abc, 777"));
        let admins = settings.admin_ids();
        assert!(admins.contains(&777));
        assert_eq!(admins.len(), 1);
    }

    #[test]
    fn test_admin_list_absent() {
        let settings = settings_with_admins(None);
        assert!(settings.admin_ids().is_empty());
    }
}
