//! Runtime configuration from environment variables

use crate::persistence::{DEFAULT_SAVE_DEBOUNCE, DEFAULT_STATE_PATH};
use crate::types::DEFAULT_TIMER_SECONDS;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_TICK: Duration = Duration::from_millis(400);
pub const DEFAULT_STATIC_DIR: &str = "static";

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub port: u16,
    /// Snapshot file
    pub state_path: PathBuf,
    /// Question catalog JSON; the built-in catalog is used when unset
    pub catalog_path: Option<PathBuf>,
    pub static_dir: PathBuf,
    /// Period of the timer driver
    pub tick_interval: Duration,
    pub save_debounce: Duration,
    /// Answer timer length
    pub timer_seconds: u32,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            state_path: PathBuf::from(DEFAULT_STATE_PATH),
            catalog_path: None,
            static_dir: PathBuf::from(DEFAULT_STATIC_DIR),
            tick_interval: DEFAULT_TICK,
            save_debounce: DEFAULT_SAVE_DEBOUNCE,
            timer_seconds: DEFAULT_TIMER_SECONDS,
        }
    }
}

fn env_string(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Parse a positive number, warning and falling back on anything else
fn env_positive<T>(name: &str, default: T) -> T
where
    T: FromStr + PartialOrd + Default + Copy,
{
    let Some(raw) = env_string(name) else {
        return default;
    };
    match raw.parse::<T>() {
        Ok(value) if value > T::default() => value,
        _ => {
            tracing::warn!("Ignoring invalid {}={:?}, must be a positive number", name, raw);
            default
        }
    }
}

impl AppConfig {
    /// Load config from environment variables
    /// QUIZ_PORT takes precedence over PORT
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let port = if env_string("QUIZ_PORT").is_some() {
            env_positive("QUIZ_PORT", defaults.port)
        } else {
            env_positive("PORT", defaults.port)
        };

        let tick_ms = env_positive("QUIZ_TICK_MS", DEFAULT_TICK.as_millis() as u64);
        let debounce_ms =
            env_positive("QUIZ_SAVE_DEBOUNCE_MS", DEFAULT_SAVE_DEBOUNCE.as_millis() as u64);

        Self {
            port,
            state_path: env_string("QUIZ_STATE_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.state_path),
            catalog_path: env_string("QUIZ_CATALOG_PATH").map(PathBuf::from),
            static_dir: env_string("QUIZ_STATIC_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.static_dir),
            tick_interval: Duration::from_millis(tick_ms),
            save_debounce: Duration::from_millis(debounce_ms),
            timer_seconds: env_positive("QUIZ_TIMER_SECONDS", defaults.timer_seconds),
        }
    }
}
