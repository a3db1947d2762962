//! Services module
//!
//! This module contains business logic services

pub mod lifecycle;
pub mod review;

// Re-export commonly used services
pub use lifecycle::{LifecycleService, SweepReport};
pub use review::ReviewService;

use crate::database::DatabaseService;

/// Service factory for creating and managing all services
#[derive(Debug, Clone)]
pub struct ServiceFactory {
    pub lifecycle: LifecycleService<DatabaseService>,
    pub reviews: ReviewService<DatabaseService>,
    database: DatabaseService,
}

impl ServiceFactory {
    /// Create a new ServiceFactory with all services initialized
    pub fn new(database: DatabaseService) -> Self {
        Self {
            lifecycle: LifecycleService::new(database.clone()),
            reviews: ReviewService::new(database.clone()),
            database,
        }
    }

    /// Health check for all services
    pub async fn health_check(&self) -> ServiceHealthStatus {
        ServiceHealthStatus {
            database_healthy: self.database.health_check().await.is_ok(),
        }
    }
}

/// Health status for all services
#[derive(Debug, Clone)]
pub struct ServiceHealthStatus {
    pub database_healthy: bool,
}

impl ServiceHealthStatus {
    /// Check if all critical services are healthy
    pub fn is_healthy(&self) -> bool {
        self.database_healthy
    }

    /// Get list of unhealthy services
    pub fn get_issues(&self) -> Vec<String> {
        let mut issues = Vec::new();

        if !self.database_healthy {
            issues.push("Database connection failed".to_string());
        }

        issues
    }
}
