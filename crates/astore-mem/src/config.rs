//! Run configuration.
//!
//! Sizing of the interning table is fixed for a whole run, so it is decided
//! once, before the session reserves anything. Values come from the
//! environment:
//!
//! - `STRING_SET_SIZE`: slot count of the interning table
//!   (default [`DEFAULT_STRING_SET_SIZE`])
//! - `ASTORE_LOG`: log level (`error`, `warn`, `info`, `debug`, `trace`)

use crate::error::{MemError, Result};
use astore_log::Level;

/// Seed of the content hash. Fixed so that hashes are stable across runs
/// and can be used as join keys by an export stage.
pub const HASH_SEED: u32 = 496_789;

/// Content bytes an owned string can hold without a heap allocation.
pub const INLINE_CAPACITY: usize = 22;

/// Interning table capacity used when `STRING_SET_SIZE` is not set.
pub const DEFAULT_STRING_SET_SIZE: usize = 10_099;

/// Environment variable holding the interning table capacity.
pub const STRING_SET_SIZE_VAR: &str = "STRING_SET_SIZE";

/// Environment variable holding the log level.
pub const LOG_LEVEL_VAR: &str = "ASTORE_LOG";

/// Settings for one ingestion run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Number of slots in the interning table. Never grows during the run.
    pub string_set_size: usize,
    /// Threshold for diagnostics.
    pub log_level: Level,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            string_set_size: DEFAULT_STRING_SET_SIZE,
            log_level: Level::Info,
        }
    }
}

impl Config {
    /// Reads the configuration from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a configuration from an arbitrary key lookup.
    ///
    /// Missing keys fall back to the defaults; present but malformed values
    /// are rejected.
    ///
    /// ```
    /// use astore_mem::Config;
    ///
    /// let config = Config::from_lookup(|key| match key {
    ///     "STRING_SET_SIZE" => Some("17".to_string()),
    ///     _ => None,
    /// })
    /// .unwrap();
    /// assert_eq!(config.string_set_size, 17);
    /// ```
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();

        if let Some(raw) = lookup(STRING_SET_SIZE_VAR) {
            config.string_set_size = match raw.trim().parse::<usize>() {
                Ok(size) if size > 0 => size,
                _ => {
                    return Err(MemError::InvalidConfig {
                        key: STRING_SET_SIZE_VAR,
                        value: raw,
                    });
                }
            };
        }

        if let Some(raw) = lookup(LOG_LEVEL_VAR) {
            config.log_level = raw.parse().map_err(|_| MemError::InvalidConfig {
                key: LOG_LEVEL_VAR,
                value: raw,
            })?;
        }

        Ok(config)
    }

    /// Sets the given string table size.
    #[must_use]
    pub fn with_string_set_size(mut self, size: usize) -> Self {
        self.string_set_size = size;
        self
    }

    /// Applies the log level to the global logger.
    pub fn apply_logging(&self) {
        astore_log::set_level(self.log_level);
    }
}
