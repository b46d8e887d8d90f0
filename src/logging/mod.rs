//! Logging setup.
//!
//! Everything in the crate logs through `tracing`. Binaries call
//! [`init_logging`] once; libraries embedding the manager may install their
//! own subscriber instead.
//!
//! ```rust,no_run
//! use btmanager::logging::{init_logging, LoggingConfig, LogFormat};
//!
//! let config = LoggingConfig::default()
//!     .with_file_logging(true)
//!     .with_format(LogFormat::Json);
//! let _guard = init_logging(&config);
//! ```

pub mod format;

use std::io;
use std::path::PathBuf;
use std::sync::Once;

use serde::{Deserialize, Serialize};
use tracing::Level;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter, Layer};

pub use format::{CompactFormatter, ManagerFormatter};

/// Name of the rolling log file inside the logging directory
pub const LOG_FILE_NAME: &str = "btmanager.log";

static INIT: Once = Once::new();

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// `YYYY-MM-DD HH:MM:SS | LEVEL | target | message`
    #[default]
    Text,
    /// Newline-delimited JSON
    Json,
    /// `LEVEL: message`
    Compact,
}

impl std::fmt::Display for LogFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogFormat::Text => write!(f, "text"),
            LogFormat::Json => write!(f, "json"),
            LogFormat::Compact => write!(f, "compact"),
        }
    }
}

impl std::str::FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(LogFormat::Text),
            "json" => Ok(LogFormat::Json),
            "compact" => Ok(LogFormat::Compact),
            _ => Err(format!(
                "Invalid log format '{}'. Valid options: text, json, compact",
                s
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Minimum level DEBUG
    pub debug: bool,
    /// Minimum level TRACE, overrides `debug`
    pub trace: bool,
    /// Also write to a daily-rotated file in `logging_dir`
    pub record_log: bool,
    /// Supports a leading `~`
    pub logging_dir: String,
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            debug: false,
            trace: false,
            record_log: false,
            logging_dir: "logs".to_string(),
            format: LogFormat::Text,
        }
    }
}

impl LoggingConfig {
    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    pub fn with_trace(mut self, trace: bool) -> Self {
        self.trace = trace;
        self
    }

    pub fn with_file_logging(mut self, enabled: bool) -> Self {
        self.record_log = enabled;
        self
    }

    pub fn with_logging_dir(mut self, dir: impl Into<String>) -> Self {
        self.logging_dir = dir.into();
        self
    }

    pub fn with_format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }

    /// Defaults overridden by environment variables
    ///
    /// - `BTM_DEBUG`, `BTM_TRACE`: raise verbosity (any value)
    /// - `BTM_RECORD_LOG`: enable the log file (any value)
    /// - `BTM_LOGGING_DIR`: log directory, implies `BTM_RECORD_LOG`
    /// - `BTM_LOG_FORMAT`: text, json or compact
    pub fn from_env() -> Self {
        Self::default().merge_env()
    }

    /// Apply the `BTM_*` logging variables on top of `self`.
    pub fn merge_env(mut self) -> Self {
        if std::env::var("BTM_DEBUG").is_ok() {
            self.debug = true;
        }
        if std::env::var("BTM_TRACE").is_ok() {
            self.debug = true;
            self.trace = true;
        }
        if std::env::var("BTM_RECORD_LOG").is_ok() {
            self.record_log = true;
        }
        if let Ok(dir) = std::env::var("BTM_LOGGING_DIR") {
            self.logging_dir = dir;
            self.record_log = true;
        }
        if let Ok(format) = std::env::var("BTM_LOG_FORMAT") {
            if let Ok(f) = format.parse() {
                self.format = f;
            }
        }
        self
    }

    pub fn level(&self) -> Level {
        if self.trace {
            Level::TRACE
        } else if self.debug {
            Level::DEBUG
        } else {
            Level::INFO
        }
    }

    /// Filter directive used when `RUST_LOG` is unset.
    pub fn filter_directive(&self) -> String {
        format!(
            "{},hyper=warn,reqwest=warn,jsonrpsee=warn,soketto=warn",
            self.level()
        )
    }

    pub fn log_dir(&self) -> PathBuf {
        crate::config::expand_home(&self.logging_dir)
    }
}

/// Install the global subscriber. Later calls do nothing and return `None`.
///
/// Console output goes to stderr so command output on stdout stays clean.
/// When file logging is on, the returned guard must be kept alive for the
/// file writer to flush.
pub fn init_logging(config: &LoggingConfig) -> Option<WorkerGuard> {
    let mut guard = None;
    INIT.call_once(|| guard = init_logging_internal(config));
    guard
}

pub fn is_initialized() -> bool {
    INIT.is_completed()
}

fn env_filter(config: &LoggingConfig) -> EnvFilter {
    if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        EnvFilter::new(config.filter_directive())
    }
}

fn init_logging_internal(config: &LoggingConfig) -> Option<WorkerGuard> {
    let mut guard = None;
    let file_writer = if config.record_log {
        let log_dir = config.log_dir();
        match std::fs::create_dir_all(&log_dir) {
            Ok(()) => {
                let appender = tracing_appender::rolling::daily(&log_dir, LOG_FILE_NAME);
                let (non_blocking, file_guard) = tracing_appender::non_blocking(appender);
                guard = Some(file_guard);
                Some(non_blocking)
            }
            Err(e) => {
                eprintln!(
                    "Warning: Failed to create log directory {:?}: {}",
                    log_dir, e
                );
                None
            }
        }
    } else {
        None
    };

    let console = match config.format {
        LogFormat::Text => fmt::layer()
            .event_format(ManagerFormatter)
            .with_writer(io::stderr)
            .boxed(),
        LogFormat::Json => fmt::layer().json().with_writer(io::stderr).boxed(),
        LogFormat::Compact => fmt::layer()
            .event_format(CompactFormatter)
            .with_writer(io::stderr)
            .boxed(),
    };

    let file = file_writer.map(|writer| match config.format {
        LogFormat::Json => fmt::layer()
            .json()
            .with_writer(writer)
            .with_ansi(false)
            .boxed(),
        _ => fmt::layer()
            .event_format(ManagerFormatter)
            .with_writer(writer)
            .with_ansi(false)
            .boxed(),
    });

    let result = tracing_subscriber::registry()
        .with(env_filter(config))
        .with(console)
        .with(file)
        .try_init();
    if let Err(e) = result {
        eprintln!("Warning: logging already initialized: {}", e);
    }
    guard
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_format_parse_and_display() {
        assert_eq!("JSON".parse::<LogFormat>().unwrap(), LogFormat::Json);
        assert_eq!("compact".parse::<LogFormat>().unwrap(), LogFormat::Compact);
        assert!("xml".parse::<LogFormat>().is_err());
        assert_eq!(LogFormat::Text.to_string(), "text");
    }

    #[test]
    fn test_levels() {
        let cfg = LoggingConfig::default();
        assert_eq!(cfg.level(), Level::INFO);
        assert_eq!(cfg.clone().with_debug(true).level(), Level::DEBUG);
        assert_eq!(cfg.with_debug(true).with_trace(true).level(), Level::TRACE);
    }

    #[test]
    fn test_filter_directive_quiets_transport_crates() {
        let directive = LoggingConfig::default().filter_directive();
        assert!(directive.starts_with("INFO,"));
        assert!(directive.contains("jsonrpsee=warn"));
    }

    #[test]
    fn test_serde_defaults() {
        let cfg: LoggingConfig = serde_json::from_str(r#"{"format":"json"}"#).unwrap();
        assert_eq!(cfg.format, LogFormat::Json);
        assert_eq!(cfg.logging_dir, "logs");
        assert!(!cfg.record_log);
    }

    #[test]
    fn test_init_is_idempotent() {
        let _ = init_logging(&LoggingConfig::default());
        assert!(init_logging(&LoggingConfig::default().with_debug(true)).is_none());
        assert!(is_initialized());
    }
}
