//! Application configuration
//!
//! One TOML file with a `[bot]` and an `[api]` table. The bot password is
//! never read from the file, only from [`PASSWORD_ENV`].

use serde::{Deserialize, Serialize};
use std::path::Path;
use talkbanner_core::{BotConfig, CategoryTitle, ConfigError};
use talkbanner_mediawiki::ClientConfig;

/// Environment variable holding the bot password
pub const PASSWORD_ENV: &str = "TALKBANNER_PASSWORD";

/// Complete configuration of the binary
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Pipeline settings
    pub bot: BotConfig,
    /// Wiki connection settings
    pub api: ClientConfig,
}

/// Per-invocation overrides from `run`
#[derive(Debug, Clone, Default)]
pub struct RunOverrides {
    /// Replacement seed categories
    pub categories: Vec<String>,
    /// Force dry-run mode
    pub dry_run: bool,
    /// Replacement concurrency limit
    pub max_concurrent: Option<usize>,
}

impl AppConfig {
    /// Parse from a TOML document
    ///
    /// # Errors
    ///
    /// Fails on malformed TOML or out-of-range bot settings.
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(source)?;
        config.bot.validate()?;
        Ok(config)
    }

    /// Load from `path`, or defaults when no path is given
    ///
    /// # Errors
    ///
    /// Fails if the file cannot be read or parsed.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let Some(path) = path else {
            return Ok(Self::default());
        };

        let source = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&source)
    }

    /// Apply command line overrides
    ///
    /// # Errors
    ///
    /// Fails if the result is no longer a valid bot configuration.
    pub fn apply(&mut self, overrides: &RunOverrides) -> Result<(), ConfigError> {
        if !overrides.categories.is_empty() {
            self.bot.seed_categories = overrides
                .categories
                .iter()
                .map(|c| CategoryTitle::new(c.as_str()))
                .collect();
        }
        if overrides.dry_run {
            self.bot.dry_run = true;
        }
        if let Some(max) = overrides.max_concurrent {
            self.bot.max_concurrent_pages = max;
        }
        self.bot.validate()
    }
}

/// Bot password from the environment, if set and non-empty
#[must_use]
pub fn password_from_env() -> Option<String> {
    std::env::var(PASSWORD_ENV).ok().filter(|p| !p.is_empty())
}
