//! Logging configuration and setup
//!
//! This module provides logging initialization and structured logging utilities
//! for lifecycle operations.

use tracing::{info, warn, error, debug};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use crate::config::LoggingConfig;
use crate::utils::errors::{CampusEventsError, Result};

/// Initialize logging based on configuration.
///
/// The returned guard flushes the file writer on drop and must be held for the
/// lifetime of the process.
pub fn init_logging(config: &LoggingConfig) -> Result<WorkerGuard> {
    let file_appender = tracing_appender::rolling::daily(&config.directory, &config.file_prefix);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let filter = EnvFilter::try_new(&config.level)
        .map_err(|e| CampusEventsError::Config(format!("Invalid log filter '{}': {}", config.level, e)))?;

    let registry = tracing_subscriber::registry().with(filter);
    let initialized = if config.json {
        registry
            .with(fmt::layer().json().with_writer(std::io::stdout))
            .with(fmt::layer().json().with_ansi(false).with_writer(non_blocking))
            .try_init()
    } else {
        registry
            .with(fmt::layer().with_writer(std::io::stdout))
            .with(fmt::layer().with_ansi(false).with_writer(non_blocking))
            .try_init()
    };
    initialized.map_err(|e| CampusEventsError::Config(format!("Logging already initialized: {}", e)))?;

    info!("Logging initialized with level: {}", config.level);
    Ok(guard)
}

/// Log organizer actions on an event
pub fn log_event_action(event_id: i64, action: &str, account_id: i64, details: Option<&str>) {
    info!(
        event_id = event_id,
        action = action,
        account_id = account_id,
        details = details,
        "Event action performed"
    );
}

/// Log student registration changes
pub fn log_registration(student_id: i64, event_id: i64, action: &str) {
    info!(
        student_id = student_id,
        event_id = event_id,
        action = action,
        "Registration changed"
    );
}

/// Log the outcome of a status sweep
pub fn log_sweep(examined: usize, started: usize, completed: usize, skipped: usize, failed: usize) {
    if failed > 0 {
        warn!(
            examined = examined,
            started = started,
            completed = completed,
            skipped = skipped,
            failed = failed,
            "Status sweep finished with failures"
        );
    } else if started + completed > 0 {
        info!(
            examined = examined,
            started = started,
            completed = completed,
            skipped = skipped,
            "Status sweep applied transitions"
        );
    } else {
        debug!(examined = examined, "Status sweep found nothing to do");
    }
}

/// Log store failures that the caller chose to tolerate
pub fn log_store_failure(operation: &str, event_id: Option<i64>, error: &str) {
    error!(
        operation = operation,
        event_id = event_id,
        error = error,
        "Store operation failed"
    );
}
