//! Database service layer
//!
//! This module provides a high-level interface to database operations and is the
//! SQLite implementation of the store traits.

use chrono::{DateTime, Utc};

use crate::database::store::{EventStore, ReviewStore};
use crate::database::transaction::SqliteUnitOfWork;
use crate::database::{health_check, DatabasePool, EventRepository, RegistrationRepository, ReviewRepository};
use crate::models::*;
use crate::utils::errors::{CampusEventsError, LifecycleResult};

#[derive(Debug, Clone)]
pub struct DatabaseService {
    pub events: EventRepository,
    pub registrations: RegistrationRepository,
    pub reviews: ReviewRepository,
    pool: DatabasePool,
}

impl DatabaseService {
    pub fn new(pool: DatabasePool) -> Self {
        Self {
            events: EventRepository::new(pool.clone()),
            registrations: RegistrationRepository::new(pool.clone()),
            reviews: ReviewRepository::new(pool.clone()),
            pool,
        }
    }

    pub fn pool(&self) -> &DatabasePool {
        &self.pool
    }

    /// Check that the database answers
    pub async fn health_check(&self) -> Result<(), CampusEventsError> {
        health_check(&self.pool).await
    }
}

impl EventStore for DatabaseService {
    type Tx = SqliteUnitOfWork;

    async fn begin(&self) -> LifecycleResult<SqliteUnitOfWork> {
        let tx = self.pool.begin().await?;
        Ok(SqliteUnitOfWork::new(tx))
    }

    async fn find_event(&self, event_id: i64) -> LifecycleResult<Option<Event>> {
        self.events.find_by_id(event_id).await
    }

    async fn list_events_by_status(&self, statuses: &[EventStatus]) -> LifecycleResult<Vec<Event>> {
        self.events.list_by_status(statuses).await
    }

    async fn search_events(&self, query: &str, statuses: &[EventStatus]) -> LifecycleResult<Vec<EventListing>> {
        self.events.search(query, statuses).await
    }

    async fn transition_status(&self, event_id: i64, from: EventStatus, to: EventStatus) -> LifecycleResult<bool> {
        self.events.transition_status(event_id, from, to).await
    }

    async fn insert_event(
        &self,
        owner_id: i64,
        request: &CreateEventRequest,
        created_at: DateTime<Utc>,
    ) -> LifecycleResult<Event> {
        self.events.create(owner_id, request, created_at).await
    }

    async fn count_registrations(&self, event_id: i64) -> LifecycleResult<i64> {
        self.registrations.count(event_id).await
    }

    async fn find_registration(&self, student_id: i64, event_id: i64) -> LifecycleResult<Option<Registration>> {
        self.registrations.find(student_id, event_id).await
    }

    async fn list_registrations(&self, event_id: i64) -> LifecycleResult<Vec<Registration>> {
        self.registrations.list_for_event(event_id).await
    }
}

impl ReviewStore for DatabaseService {
    async fn insert_review(
        &self,
        student_id: i64,
        event_id: i64,
        request: &SubmitReviewRequest,
        reviewed_at: DateTime<Utc>,
    ) -> LifecycleResult<Review> {
        self.reviews.create(student_id, event_id, request, reviewed_at).await
    }

    async fn find_review(&self, student_id: i64, event_id: i64) -> LifecycleResult<Option<Review>> {
        self.reviews.find(student_id, event_id).await
    }

    async fn list_reviews(&self, event_id: i64) -> LifecycleResult<Vec<Review>> {
        self.reviews.list_for_event(event_id).await
    }

    async fn review_stats(&self, event_id: i64) -> LifecycleResult<ReviewStats> {
        self.reviews.stats(event_id).await
    }
}
