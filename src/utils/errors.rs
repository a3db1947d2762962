//! Error handling for campus-events
//!
//! This module defines the failure taxonomy returned by the lifecycle core and the
//! application-level error used by setup code and the maintenance binary.

use thiserror::Error;
use crate::models::event::EventStatus;

/// Failures produced by lifecycle and review operations
///
/// Every variant is recoverable at the caller. Only [`LifecycleError::StoreUnavailable`]
/// is worth retrying; the rest are terminal for the request that produced them.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LifecycleError {
    #[error("Event not found: {event_id}")]
    NotFound { event_id: i64 },

    #[error("Student {student_id} is already registered for event {event_id}")]
    AlreadyRegistered { student_id: i64, event_id: i64 },

    #[error("Event {event_id} is {status} and does not accept registrations")]
    EventClosed { event_id: i64, status: EventStatus },

    #[error("Event {event_id} has already started")]
    EventAlreadyStarted { event_id: i64 },

    #[error("Event {event_id} is full ({max_participants} participants)")]
    Full { event_id: i64, max_participants: i64 },

    #[error("Student {student_id} is not registered for event {event_id}")]
    NotRegistered { student_id: i64, event_id: i64 },

    #[error("Registration for event {event_id} can no longer be cancelled")]
    TooLateToCancel { event_id: i64 },

    #[error("Account {account_id} does not own event {event_id}")]
    Forbidden { account_id: i64, event_id: i64 },

    #[error("Event {event_id} is already completed")]
    AlreadyCompleted { event_id: i64 },

    #[error("Invalid status transition: {from} -> {to}")]
    InvalidTransition { from: EventStatus, to: EventStatus },

    #[error("Invalid time range: end time must be after start time")]
    InvalidTimeRange,

    #[error("Start time must be in the future")]
    StartInPast,

    #[error("Max participants must be greater than 0, got {0}")]
    InvalidCapacity(i64),

    #[error("Cannot lower capacity to {requested}: {registered} students are registered")]
    CapacityBelowRegistered { requested: i64, registered: i64 },

    #[error("Event {event_id} has not been completed")]
    EventNotCompleted { event_id: i64 },

    #[error("Scores must be between 1 and 5")]
    InvalidScore,

    #[error("Student {student_id} has already reviewed event {event_id}")]
    AlreadyReviewed { student_id: i64, event_id: i64 },

    #[error("Corrupt record: {0}")]
    CorruptRecord(String),

    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),
}

impl LifecycleError {
    /// Check if the caller may retry with the same arguments
    pub fn is_retryable(&self) -> bool {
        matches!(self, LifecycleError::StoreUnavailable(_))
    }

    /// Get error severity level
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            LifecycleError::StoreUnavailable(_) => ErrorSeverity::Error,
            LifecycleError::CorruptRecord(_) => ErrorSeverity::Critical,
            LifecycleError::Forbidden { .. } => ErrorSeverity::Warning,
            LifecycleError::InvalidTransition { .. } => ErrorSeverity::Warning,
            _ => ErrorSeverity::Info,
        }
    }
}

impl From<sqlx::Error> for LifecycleError {
    fn from(err: sqlx::Error) -> Self {
        LifecycleError::StoreUnavailable(err.to_string())
    }
}

/// Main error type for application setup and the maintenance binary
#[derive(Error, Debug)]
pub enum CampusEventsError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Database migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Lifecycle error: {0}")]
    Lifecycle(#[from] LifecycleError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Configuration loading error: {0}")]
    ConfigLoad(#[from] config::ConfigError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for application operations
pub type Result<T> = std::result::Result<T, CampusEventsError>;

/// Result type alias for lifecycle operations
pub type LifecycleResult<T> = std::result::Result<T, LifecycleError>;

impl CampusEventsError {
    /// Check if the error is recoverable
    pub fn is_recoverable(&self) -> bool {
        match self {
            CampusEventsError::Database(_) => false,
            CampusEventsError::Migration(_) => false,
            CampusEventsError::Lifecycle(err) => err.is_retryable(),
            CampusEventsError::Config(_) => false,
            CampusEventsError::ConfigLoad(_) => false,
            CampusEventsError::Io(_) => true,
        }
    }

    /// Get error severity level
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            CampusEventsError::Database(_) => ErrorSeverity::Critical,
            CampusEventsError::Migration(_) => ErrorSeverity::Critical,
            CampusEventsError::Config(_) => ErrorSeverity::Critical,
            CampusEventsError::ConfigLoad(_) => ErrorSeverity::Critical,
            CampusEventsError::Lifecycle(err) => err.severity(),
            CampusEventsError::Io(_) => ErrorSeverity::Error,
        }
    }
}

/// Error severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    Info,
    Warning,
    Error,
    Critical,
}

impl std::fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorSeverity::Info => write!(f, "INFO"),
            ErrorSeverity::Warning => write!(f, "WARN"),
            ErrorSeverity::Error => write!(f, "ERROR"),
            ErrorSeverity::Critical => write!(f, "CRITICAL"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_store_unavailable_is_retryable() {
        assert!(LifecycleError::StoreUnavailable("timeout".to_string()).is_retryable());

        let terminal = [
            LifecycleError::NotFound { event_id: 1 },
            LifecycleError::AlreadyRegistered { student_id: 1, event_id: 1 },
            LifecycleError::EventAlreadyStarted { event_id: 1 },
            LifecycleError::Full { event_id: 1, max_participants: 3 },
            LifecycleError::TooLateToCancel { event_id: 1 },
            LifecycleError::InvalidTimeRange,
            LifecycleError::CapacityBelowRegistered { requested: 0, registered: 1 },
        ];
        for err in terminal {
            assert!(!err.is_retryable(), "{err} should not be retryable");
        }
    }

    #[test]
    fn test_sqlx_errors_become_store_unavailable() {
        let err: LifecycleError = sqlx::Error::PoolTimedOut.into();
        assert!(matches!(err, LifecycleError::StoreUnavailable(_)));
    }

    #[test]
    fn test_lifecycle_error_wraps_into_application_error() {
        let err: CampusEventsError = LifecycleError::StoreUnavailable("busy".to_string()).into();
        assert!(err.is_recoverable());
        assert_eq!(err.severity(), ErrorSeverity::Error);

        let err: CampusEventsError = LifecycleError::Forbidden { account_id: 2, event_id: 9 }.into();
        assert!(!err.is_recoverable());
        assert_eq!(err.severity(), ErrorSeverity::Warning);
        assert_eq!(err.to_string(), "Lifecycle error: Account 2 does not own event 9");
    }
}
