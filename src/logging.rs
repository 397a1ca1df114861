//! Logging setup from a textual log level.

use thiserror::Error;
use tracing::Level;
use tracing::subscriber::SetGlobalDefaultError;
use tracing_subscriber::FmtSubscriber;
use tracing_subscriber::fmt::MakeWriter;

#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("not a valid log level: {0:?}")]
    InvalidLevel(String),

    #[error("logging is already initialized")]
    AlreadyInitialized(#[from] SetGlobalDefaultError),
}

/// Parse a log level name, case-insensitively.
///
/// `fatal` and `panic` map to `ERROR`; the empty string maps to `INFO`.
pub fn parse_level(level: &str) -> Result<Level, LoggingError> {
    match level.to_lowercase().as_str() {
        "" | "info" => Ok(Level::INFO),
        "trace" => Ok(Level::TRACE),
        "debug" => Ok(Level::DEBUG),
        "warn" | "warning" => Ok(Level::WARN),
        "error" | "fatal" | "panic" => Ok(Level::ERROR),
        _ => Err(LoggingError::InvalidLevel(level.to_string())),
    }
}

/// Install a global subscriber writing to `writer` at `level`.
///
/// The level is validated first, so an invalid level leaves any current
/// subscriber in place. Only one global subscriber can be installed per
/// process.
pub fn setup_logging<W>(writer: W, level: &str) -> Result<(), LoggingError>
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    let level = parse_level(level)?;
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(writer)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}
