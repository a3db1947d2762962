//! Campus Events
//!
//! The event lifecycle and registration core of a campus activity platform.
//! This library derives event status from the clock, applies organizer overrides,
//! enforces registration capacity and timing rules, and stores everything in SQLite.

pub mod config;
pub mod services;
pub mod models;
pub mod database;
pub mod utils;

// Re-export commonly used types
pub use config::Settings;
pub use utils::errors::{CampusEventsError, LifecycleError, LifecycleResult, Result};

// Re-export main components for easy access
pub use database::{DatabaseService, EventStore, EventTransaction, ReviewStore};
pub use models::{Event, EventStatus, Registration};
pub use services::{LifecycleService, ReviewService, ServiceFactory, SweepReport};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");

/// Get library information
pub fn info() -> String {
    format!("{} v{}", NAME, VERSION)
}
