//! Database module
//!
//! This module handles database connections, the store seam used by the
//! lifecycle core, and its SQLite implementation

pub mod connection;
pub mod repositories;
pub mod service;
pub mod store;
pub mod transaction;

// Re-export commonly used database components
pub use connection::{DatabasePool, DatabaseConfig, create_pool, run_migrations, health_check};
pub use repositories::{EventRepository, RegistrationRepository, ReviewRepository};
pub use service::DatabaseService;
pub use store::{EventStore, EventTransaction, ReviewStore};
pub use transaction::SqliteUnitOfWork;
