//! Logging setup for applications embedding satchel
//!
//! This module is only available with the `logging` feature. Without it the
//! bundler only emits tracing events and leaves the subscriber to the host.

use std::str::FromStr;
use std::sync::Once;

use satchel_config::ServiceSettings;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

static INIT: Once = Once::new();

/// Verbosity named by `ServiceSettings::log_level`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogLevel {
    Silent,
    Error,
    Warn,
    /// Published resources (default)
    #[default]
    Info,
    /// Resolution, filter and storage steps
    Debug,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Silent => LevelFilter::OFF,
            LogLevel::Error => LevelFilter::ERROR,
            LogLevel::Warn => LevelFilter::WARN,
            LogLevel::Info => LevelFilter::INFO,
            LogLevel::Debug => LevelFilter::DEBUG,
        }
    }
}

impl FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "silent" | "off" => Ok(LogLevel::Silent),
            "error" => Ok(LogLevel::Error),
            "warn" | "warning" => Ok(LogLevel::Warn),
            "info" => Ok(LogLevel::Info),
            "debug" => Ok(LogLevel::Debug),
            other => Err(format!("Invalid log level `{other}`")),
        }
    }
}

fn install(default: LevelFilter) {
    INIT.call_once(|| {
        let filter = EnvFilter::builder()
            .with_default_directive(default.into())
            .from_env_lossy();
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().compact().with_target(false).without_time())
            .init();
    });
}

/// Install a global subscriber at `level`; `RUST_LOG` directives still apply
///
/// Only the first call in a process takes effect.
///
/// ```rust,no_run
/// use satchel_bundler::logging::{init_logging, LogLevel};
///
/// init_logging(LogLevel::Debug);
/// ```
pub fn init_logging(level: LogLevel) {
    install(level.into());
}

/// Install a global subscriber driven by `RUST_LOG`, defaulting to info
pub fn init_logging_from_env() {
    install(LevelFilter::INFO);
}

/// Level configured in `settings`, if any.
fn configured_level(settings: &ServiceSettings) -> Result<Option<LogLevel>, String> {
    settings
        .log_level
        .as_deref()
        .map(LogLevel::from_str)
        .transpose()
}

/// Install a global subscriber at `settings.log_level`
///
/// An unset level falls back to `RUST_LOG`. An unknown one does too, with a
/// warning once the subscriber is up.
pub fn init_logging_from_settings(settings: &ServiceSettings) {
    match configured_level(settings) {
        Ok(Some(level)) => init_logging(level),
        Ok(None) => init_logging_from_env(),
        Err(message) => {
            init_logging_from_env();
            tracing::warn!("{message}, using RUST_LOG");
        }
    }
}
