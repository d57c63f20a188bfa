//! Logging infrastructure.
//!
//! Structured logging with `tracing` for observability. Output goes to
//! stderr so stdout stays reserved for command results in both output
//! modes.
//!
//! ## Quick Start
//!
//! ```no_run
//! use devgate::logging::{init_logging, verbosity_to_level, LogConfig};
//!
//! let config = LogConfig {
//!     level: verbosity_to_level(1),
//!     ..LogConfig::default()
//! };
//! init_logging(&config).expect("failed to initialize logging");
//! tracing::info!("ready");
//! ```

use tracing::Level;
use tracing_subscriber::EnvFilter;

/// Error type for logging initialization failures.
#[derive(Debug, thiserror::Error)]
pub enum LogError {
    /// The subscriber could not be installed.
    #[error("failed to initialize logging: {0}")]
    InitFailed(String),
}

/// Log verbosity levels, lowest to highest.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Warnings and errors only (the default).
    Warn,
    /// Informational messages.
    Info,
    /// Debug messages.
    Debug,
    /// Everything.
    Trace,
}

impl LogLevel {
    const fn as_tracing(self) -> Level {
        match self {
            Self::Warn => Level::WARN,
            Self::Info => Level::INFO,
            Self::Debug => Level::DEBUG,
            Self::Trace => Level::TRACE,
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Minimum level to emit.
    pub level: LogLevel,
    /// Include target module paths in output.
    pub show_targets: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::Warn,
            show_targets: false,
        }
    }
}

/// Map `-v` repetition count to a log level.
///
/// # Example
///
/// ```
/// use devgate::logging::{verbosity_to_level, LogLevel};
///
/// assert_eq!(verbosity_to_level(0), LogLevel::Warn);
/// assert_eq!(verbosity_to_level(1), LogLevel::Info);
/// assert_eq!(verbosity_to_level(2), LogLevel::Debug);
/// assert_eq!(verbosity_to_level(3), LogLevel::Trace);
/// ```
#[must_use]
pub const fn verbosity_to_level(verbosity: u8) -> LogLevel {
    match verbosity {
        0 => LogLevel::Warn,
        1 => LogLevel::Info,
        2 => LogLevel::Debug,
        _ => LogLevel::Trace,
    }
}

/// Install the global tracing subscriber.
///
/// `RUST_LOG` overrides the configured level when set.
///
/// # Errors
///
/// Returns [`LogError::InitFailed`] if a subscriber is already
/// installed.
pub fn init_logging(config: &LogConfig) -> Result<(), LogError> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.level.as_tracing().to_string().to_lowercase()));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(config.show_targets)
        .compact()
        .try_init()
        .map_err(|e| LogError::InitFailed(e.to_string()))
}
