//! Engine configuration.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::error::ConfigError;

/// Where uploaded files live when `UPLOAD_DIR` is unset.
pub const DEFAULT_UPLOAD_DIR: &str = "./web/static/uploads";

/// Deadline applied to every transactional operation when
/// `OPERATION_TIMEOUT_SECS` is unset.
pub const DEFAULT_OPERATION_TIMEOUT: Duration = Duration::from_secs(10);

/// Tunables for an [`EventStore`](crate::EventStore).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// Directory emptied (files only) after a committed reset.
    pub upload_dir: PathBuf,
    /// Upper bound for one enrollment, reset or catalog transaction.
    pub operation_timeout: Duration,
    /// Values written to `event_date_1` / `event_date_2` by a reset.
    pub default_event_dates: (String, String),
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            upload_dir: PathBuf::from(DEFAULT_UPLOAD_DIR),
            operation_timeout: DEFAULT_OPERATION_TIMEOUT,
            default_event_dates: ("2025-08-01".to_string(), "2025-08-02".to_string()),
        }
    }
}

impl EngineConfig {
    /// Builds a configuration from the process environment.
    ///
    /// | Variable                 | Default                |
    /// |--------------------------|------------------------|
    /// | `UPLOAD_DIR`             | `./web/static/uploads` |
    /// | `OPERATION_TIMEOUT_SECS` | `10`                   |
    /// | `DEFAULT_EVENT_DATE_1`   | `2025-08-01`           |
    /// | `DEFAULT_EVENT_DATE_2`   | `2025-08-02`           |
    ///
    /// Empty variables count as unset.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| lookup(key).filter(|value| !value.is_empty());
        let defaults = Self::default();

        let operation_timeout = match get("OPERATION_TIMEOUT_SECS") {
            Some(raw) => parse_timeout("OPERATION_TIMEOUT_SECS", &raw)?,
            None => defaults.operation_timeout,
        };

        Ok(Self {
            upload_dir: get("UPLOAD_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.upload_dir),
            operation_timeout,
            default_event_dates: (
                get("DEFAULT_EVENT_DATE_1").unwrap_or(defaults.default_event_dates.0),
                get("DEFAULT_EVENT_DATE_2").unwrap_or(defaults.default_event_dates.1),
            ),
        })
    }
}

fn parse_timeout(var: &'static str, raw: &str) -> Result<Duration, ConfigError> {
    match raw.trim().parse::<u64>() {
        Ok(secs) if secs > 0 => Ok(Duration::from_secs(secs)),
        _ => Err(ConfigError::InvalidTimeout {
            var,
            value: raw.to_string(),
        }),
    }
}
