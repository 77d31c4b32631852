//! Structured logging for the environmental monitoring service.
//!
//! Provides context-rich logging with provider/dataset identifiers,
//! timestamps, and severity levels. Supports both console output and
//! file-based logging for unattended watch runs.

use chrono::Utc;
use std::fmt;
use std::fs::OpenOptions;
use std::io::Write;
use std::sync::Mutex;

use crate::model::IngestError;

// ---------------------------------------------------------------------------
// Log Levels
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Debug,
    Info,
    Warning,
    Error,
}

impl LogLevel {
    /// Parses a configuration-file level name. Case-insensitive; accepts
    /// the common "warn" shorthand.
    pub fn parse(name: &str) -> Option<LogLevel> {
        match name.to_ascii_lowercase().as_str() {
            "debug" => Some(LogLevel::Debug),
            "info" => Some(LogLevel::Info),
            "warn" | "warning" => Some(LogLevel::Warning),
            "error" => Some(LogLevel::Error),
            _ => None,
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogLevel::Debug => write!(f, "DEBUG"),
            LogLevel::Info => write!(f, "INFO"),
            LogLevel::Warning => write!(f, "WARN"),
            LogLevel::Error => write!(f, "ERROR"),
        }
    }
}

// ---------------------------------------------------------------------------
// Data Source Types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataSource {
    Moenv,
    Cwa,
    System,
}

impl fmt::Display for DataSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataSource::Moenv => write!(f, "MOENV"),
            DataSource::Cwa => write!(f, "CWA"),
            DataSource::System => write!(f, "SYS"),
        }
    }
}

// ---------------------------------------------------------------------------
// Failure Classification
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureType {
    /// Expected failure - caller error or a state the provider documents
    Expected,
    /// Unexpected failure - indicates provider degradation or a configuration issue
    Unexpected,
    /// Unknown - cannot determine if this is expected or not
    Unknown,
}

impl fmt::Display for FailureType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureType::Expected => write!(f, "EXPECTED"),
            FailureType::Unexpected => write!(f, "UNEXPECTED"),
            FailureType::Unknown => write!(f, "UNKNOWN"),
        }
    }
}

/// Classifies an ingest failure by its error variant.
pub fn classify_ingest_failure(err: &IngestError) -> FailureType {
    match err {
        // Network trouble, non-2xx statuses, and undecodable bodies all
        // point at the provider or the local configuration.
        IngestError::HttpError(_)
        | IngestError::RequestError(_)
        | IngestError::ParseError(_) => FailureType::Unexpected,
        // Datasets go briefly empty while the provider republishes them.
        IngestError::EmptyResponse(_) => FailureType::Unknown,
        // The caller asked for a location the dataset does not carry.
        IngestError::MissingLocation(_) => FailureType::Expected,
    }
}

// ---------------------------------------------------------------------------
// Logger Configuration
// ---------------------------------------------------------------------------

/// Global logger instance
static LOGGER: Mutex<Option<Logger>> = Mutex::new(None);

pub struct Logger {
    /// Minimum log level to display
    min_level: LogLevel,
    /// Optional file path for logging
    log_file: Option<String>,
    /// Whether to include timestamps in console output
    console_timestamps: bool,
}

impl Logger {
    /// Initialize the global logger
    pub fn init(min_level: LogLevel, log_file: Option<String>, console_timestamps: bool) {
        let logger = Logger {
            min_level,
            log_file,
            console_timestamps,
        };

        *LOGGER.lock().unwrap() = Some(logger);
    }

    fn log(&self, level: LogLevel, source: &DataSource, context: Option<&str>, message: &str) {
        if level < self.min_level {
            return;
        }

        let timestamp = Utc::now().format("%Y-%m-%d %H:%M:%S UTC");
        let context_part = context.map(|c| format!(" [{}]", c)).unwrap_or_default();
        let log_entry = format!(
            "{} {} {}{}: {}",
            timestamp, level, source, context_part, message
        );

        // Console output
        if self.console_timestamps {
            match level {
                LogLevel::Error => eprintln!("{}", log_entry),
                LogLevel::Warning => eprintln!("   {}", log_entry),
                LogLevel::Info => println!("   {}", message),
                LogLevel::Debug => println!("   [DEBUG] {}", message),
            }
        } else {
            match level {
                LogLevel::Error => eprintln!("   ✗ {}{}: {}", source, context_part, message),
                LogLevel::Warning => eprintln!("   ⚠ {}{}: {}", source, context_part, message),
                LogLevel::Info => println!("   {}", message),
                LogLevel::Debug => {} // Skip debug in non-timestamp mode
            }
        }

        // File output
        if let Some(ref path) = self.log_file {
            if let Err(e) = Self::append_to_file(path, &log_entry) {
                eprintln!("Failed to write to log file {}: {}", path, e);
            }
        }
    }

    fn append_to_file(path: &str, entry: &str) -> std::io::Result<()> {
        let mut file = OpenOptions::new().create(true).append(true).open(path)?;
        writeln!(file, "{}", entry)?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Public Logging Functions
// ---------------------------------------------------------------------------

/// Initialize the global logger
pub fn init_logger(min_level: LogLevel, log_file: Option<&str>, console_timestamps: bool) {
    Logger::init(min_level, log_file.map(String::from), console_timestamps);
}

/// Log a general informational message
pub fn info(source: DataSource, context: Option<&str>, message: &str) {
    if let Some(logger) = LOGGER.lock().unwrap().as_ref() {
        logger.log(LogLevel::Info, &source, context, message);
    }
}

/// Log a warning message
pub fn warn(source: DataSource, context: Option<&str>, message: &str) {
    if let Some(logger) = LOGGER.lock().unwrap().as_ref() {
        logger.log(LogLevel::Warning, &source, context, message);
    }
}

/// Log an error message
pub fn error(source: DataSource, context: Option<&str>, message: &str) {
    if let Some(logger) = LOGGER.lock().unwrap().as_ref() {
        logger.log(LogLevel::Error, &source, context, message);
    }
}

/// Log a debug message
pub fn debug(source: DataSource, context: Option<&str>, message: &str) {
    if let Some(logger) = LOGGER.lock().unwrap().as_ref() {
        logger.log(LogLevel::Debug, &source, context, message);
    }
}

// ---------------------------------------------------------------------------
// Structured Failure Logging
// ---------------------------------------------------------------------------

/// Log a MOENV dataset failure with automatic classification.
///
/// `dataset` is the dataset id (e.g. `aqx_p_432`), `operation` a short
/// description of what was being attempted.
pub fn log_moenv_failure(dataset: &str, operation: &str, err: &IngestError) {
    log_ingest_failure(DataSource::Moenv, dataset, operation, err);
}

/// Log a CWA dataset failure with automatic classification.
pub fn log_cwa_failure(dataset: &str, operation: &str, err: &IngestError) {
    log_ingest_failure(DataSource::Cwa, dataset, operation, err);
}

fn log_ingest_failure(source: DataSource, dataset: &str, operation: &str, err: &IngestError) {
    let failure_type = classify_ingest_failure(err);
    let message = format!("{} failed [{}]: {}", operation, failure_type, err);

    match failure_type {
        FailureType::Expected => debug(source, Some(dataset), &message),
        FailureType::Unexpected => error(source, Some(dataset), &message),
        FailureType::Unknown => warn(source, Some(dataset), &message),
    }
}
