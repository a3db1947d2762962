//! Test helpers module
//!
//! File-backed SQLite databases with migrations applied, a fixed clock and
//! event fixtures.

#![allow(dead_code)]

use chrono::{DateTime, Duration, TimeZone, Utc};
use std::sync::Once;
use tempfile::TempDir;

use campus_events::database::{create_pool, run_migrations, DatabaseConfig, DatabasePool, DatabaseService, EventStore};
use campus_events::models::{CreateEventRequest, Event};
use campus_events::services::{LifecycleService, ReviewService};

static INIT: Once = Once::new();

pub const ORGANIZER: i64 = 100;
pub const OTHER_ORGANIZER: i64 = 101;

/// Fixed "now" used across tests
pub fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 9, 2, 10, 0, 0).unwrap()
}

pub fn minutes(n: i64) -> Duration {
    Duration::minutes(n)
}

pub fn hours(n: i64) -> Duration {
    Duration::hours(n)
}

pub fn millis(n: i64) -> Duration {
    Duration::milliseconds(n)
}

/// Test database helper backed by a temporary SQLite file
pub struct TestDatabase {
    pub pool: DatabasePool,
    pub service: DatabaseService,
    _dir: TempDir,
}

impl TestDatabase {
    /// Create a new migrated database
    pub async fn new() -> Self {
        // Initialize logging once
        INIT.call_once(|| {
            let _ = tracing_subscriber::fmt().with_test_writer().try_init();
        });

        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let config = DatabaseConfig {
            url: format!("sqlite://{}", dir.path().join("events.db").display()),
            max_connections: 8,
            min_connections: 1,
            ..DatabaseConfig::default()
        };

        let pool = create_pool(&config).await.expect("Failed to create pool");
        run_migrations(&pool).await.expect("Failed to run migrations");

        Self {
            service: DatabaseService::new(pool.clone()),
            pool,
            _dir: dir,
        }
    }

    pub fn lifecycle(&self) -> LifecycleService<DatabaseService> {
        LifecycleService::new(self.service.clone())
    }

    pub fn reviews(&self) -> ReviewService<DatabaseService> {
        ReviewService::new(self.service.clone())
    }

    /// Insert an event directly, bypassing creation checks so past schedules are possible
    pub async fn seed_event(&self, start: DateTime<Utc>, end: DateTime<Utc>, max_participants: i64) -> Event {
        let request = CreateEventRequest {
            title: "Hackathon".to_string(),
            description: Some("24h of code".to_string()),
            location: "Engineering building".to_string(),
            start_time: start,
            end_time: end,
            max_participants,
        };

        self.service
            .insert_event(ORGANIZER, &request, now() - Duration::days(7))
            .await
            .expect("Failed to seed event")
    }

    /// Event starting in an hour, lasting two
    pub async fn seed_upcoming(&self, max_participants: i64) -> Event {
        self.seed_event(now() + hours(1), now() + hours(3), max_participants).await
    }

    /// Raw status column, for checking what actually got persisted
    pub async fn stored_status(&self, event_id: i64) -> String {
        let (status,): (String,) = sqlx::query_as("SELECT status FROM events WHERE id = ?")
            .bind(event_id)
            .fetch_one(&self.pool)
            .await
            .expect("Failed to read status");
        status
    }

    /// Write a status directly, standing in for an older manual update
    pub async fn force_status(&self, event_id: i64, status: &str) {
        sqlx::query("UPDATE events SET status = ? WHERE id = ?")
            .bind(status)
            .bind(event_id)
            .execute(&self.pool)
            .await
            .expect("Failed to force status");
    }
}
