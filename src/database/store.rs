//! Store seam consumed by the lifecycle core
//!
//! The services only talk to persistence through these traits, so the same
//! logic runs against any backend that can provide an atomic unit of work.

use std::future::Future;

use chrono::{DateTime, Utc};

use crate::models::{
    CreateEventRequest, Event, EventFields, EventListing, EventStatus, Registration, Review, ReviewStats,
    SubmitReviewRequest,
};
use crate::utils::errors::LifecycleResult;

/// Event and registration storage
pub trait EventStore: Send + Sync {
    type Tx: EventTransaction;

    /// Start a unit of work
    fn begin(&self) -> impl Future<Output = LifecycleResult<Self::Tx>> + Send;

    fn find_event(&self, event_id: i64) -> impl Future<Output = LifecycleResult<Option<Event>>> + Send;

    fn list_events_by_status(
        &self,
        statuses: &[EventStatus],
    ) -> impl Future<Output = LifecycleResult<Vec<Event>>> + Send;

    /// Events in `statuses` whose title, description or location contains `query`,
    /// case-insensitively, with their registration counts. An empty query matches all.
    fn search_events(
        &self,
        query: &str,
        statuses: &[EventStatus],
    ) -> impl Future<Output = LifecycleResult<Vec<EventListing>>> + Send;

    /// Move `event_id` from `from` to `to` in a single-row update.
    ///
    /// Returns `false` when the stored status is no longer `from`.
    fn transition_status(
        &self,
        event_id: i64,
        from: EventStatus,
        to: EventStatus,
    ) -> impl Future<Output = LifecycleResult<bool>> + Send;

    /// Insert an event with status `upcoming`
    fn insert_event(
        &self,
        owner_id: i64,
        request: &CreateEventRequest,
        created_at: DateTime<Utc>,
    ) -> impl Future<Output = LifecycleResult<Event>> + Send;

    fn count_registrations(&self, event_id: i64) -> impl Future<Output = LifecycleResult<i64>> + Send;

    fn find_registration(
        &self,
        student_id: i64,
        event_id: i64,
    ) -> impl Future<Output = LifecycleResult<Option<Registration>>> + Send;

    /// Registrations for an event in sign-up order
    fn list_registrations(&self, event_id: i64) -> impl Future<Output = LifecycleResult<Vec<Registration>>> + Send;
}

/// Atomic unit of work over events and registrations.
///
/// Dropping a transaction without committing rolls it back.
pub trait EventTransaction: Send {
    /// Take the write lock on `event_id` for the rest of the transaction and read it
    fn lock_event(&mut self, event_id: i64) -> impl Future<Output = LifecycleResult<Option<Event>>> + Send;

    fn count_registrations(&mut self, event_id: i64) -> impl Future<Output = LifecycleResult<i64>> + Send;

    fn find_registration(
        &mut self,
        student_id: i64,
        event_id: i64,
    ) -> impl Future<Output = LifecycleResult<Option<Registration>>> + Send;

    /// Unique-constraint violations surface as `AlreadyRegistered`
    fn insert_registration(
        &mut self,
        student_id: i64,
        event_id: i64,
        registered_at: DateTime<Utc>,
    ) -> impl Future<Output = LifecycleResult<Registration>> + Send;

    /// Returns `false` when there was nothing to delete
    fn delete_registration(
        &mut self,
        student_id: i64,
        event_id: i64,
    ) -> impl Future<Output = LifecycleResult<bool>> + Send;

    fn update_event_fields(
        &mut self,
        event_id: i64,
        fields: &EventFields,
    ) -> impl Future<Output = LifecycleResult<()>> + Send;

    /// Overwrite the status, and the end time when given
    fn set_status(
        &mut self,
        event_id: i64,
        status: EventStatus,
        end_time: Option<DateTime<Utc>>,
    ) -> impl Future<Output = LifecycleResult<()>> + Send;

    fn commit(self) -> impl Future<Output = LifecycleResult<()>> + Send;

    fn rollback(self) -> impl Future<Output = LifecycleResult<()>> + Send;
}

/// Post-event review storage
pub trait ReviewStore: Send + Sync {
    /// Unique-constraint violations surface as `AlreadyReviewed`
    fn insert_review(
        &self,
        student_id: i64,
        event_id: i64,
        request: &SubmitReviewRequest,
        reviewed_at: DateTime<Utc>,
    ) -> impl Future<Output = LifecycleResult<Review>> + Send;

    fn find_review(
        &self,
        student_id: i64,
        event_id: i64,
    ) -> impl Future<Output = LifecycleResult<Option<Review>>> + Send;

    fn list_reviews(&self, event_id: i64) -> impl Future<Output = LifecycleResult<Vec<Review>>> + Send;

    fn review_stats(&self, event_id: i64) -> impl Future<Output = LifecycleResult<ReviewStats>> + Send;
}
