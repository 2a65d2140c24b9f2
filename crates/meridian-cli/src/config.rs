//! Environment configuration for the terminal host.

use std::path::PathBuf;
use std::time::Duration;

use meridian_session::EngineConfig;

use crate::error::AppError;

/// Default location of the local session snapshot.
pub const DEFAULT_SNAPSHOT_PATH: &str = ".meridian/session.json";

/// Default length of one decay time unit, in milliseconds.
pub const DEFAULT_TICK_MS: u64 = 1000;

/// Settings read from `MERIDIAN_*` environment variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CliConfig {
    /// YAML story to load instead of the bundled one.
    pub story_path: Option<PathBuf>,
    /// Where the session snapshot lives.
    pub snapshot_path: PathBuf,
    /// Fixed RNG seed for reproducible decay.
    pub seed: Option<u64>,
    /// Length of one decay time unit.
    pub tick: Duration,
    /// Start new sessions in fast mode.
    pub fast_mode: bool,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            story_path: None,
            snapshot_path: PathBuf::from(DEFAULT_SNAPSHOT_PATH),
            seed: None,
            tick: Duration::from_millis(DEFAULT_TICK_MS),
            fast_mode: false,
        }
    }
}

impl CliConfig {
    /// Reads the process environment.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if a variable is set but cannot be parsed.
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads settings through `lookup`, which maps a variable name to its
    /// value. Blank values count as unset.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if a variable is set but cannot be parsed.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AppError> {
        let var = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_owned())
                .filter(|v| !v.is_empty())
        };
        let defaults = Self::default();

        let seed = var("MERIDIAN_SEED")
            .map(|v| {
                v.parse::<u64>()
                    .map_err(|e| AppError::Config(format!("MERIDIAN_SEED must be a u64: {e}")))
            })
            .transpose()?;

        let tick = match var("MERIDIAN_TICK_MS") {
            Some(v) => {
                let millis = v.parse::<u64>().map_err(|e| {
                    AppError::Config(format!("MERIDIAN_TICK_MS must be a u64: {e}"))
                })?;
                if millis == 0 {
                    return Err(AppError::Config(
                        "MERIDIAN_TICK_MS must be positive".to_owned(),
                    ));
                }
                Duration::from_millis(millis)
            }
            None => defaults.tick,
        };

        let fast_mode = match var("MERIDIAN_FAST_MODE") {
            Some(v) => parse_flag(&v).ok_or_else(|| {
                AppError::Config(format!("MERIDIAN_FAST_MODE must be a boolean, got {v:?}"))
            })?,
            None => defaults.fast_mode,
        };

        Ok(Self {
            story_path: var("MERIDIAN_STORY_PATH").map(PathBuf::from),
            snapshot_path: var("MERIDIAN_SNAPSHOT_PATH")
                .map_or(defaults.snapshot_path, PathBuf::from),
            seed,
            tick,
            fast_mode,
        })
    }

    /// Engine settings derived from this configuration.
    #[must_use]
    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            tick_unit: self.tick,
            start_fast: self.fast_mode,
            ..EngineConfig::default()
        }
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
