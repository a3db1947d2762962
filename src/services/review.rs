//! Review service implementation
//!
//! Students review events they attended once the event is completed; organizers
//! read the aggregated report.

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::database::store::{EventStore, ReviewStore};
use crate::models::{registration_trend, Event, EventReport, EventStatus, Review, SubmitReviewRequest, TrendPoint};
use crate::utils::errors::{LifecycleError, LifecycleResult};
use crate::utils::helpers::fill_rate;
use crate::utils::logging::log_event_action;

#[derive(Debug, Clone)]
pub struct ReviewService<S> {
    store: S,
}

impl<S: EventStore + ReviewStore> ReviewService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    async fn load_event(&self, event_id: i64, now: DateTime<Utc>) -> LifecycleResult<Event> {
        let mut event = self
            .store
            .find_event(event_id)
            .await?
            .ok_or(LifecycleError::NotFound { event_id })?;
        event.status = event.status_at(now);
        Ok(event)
    }

    /// Submit a review for a completed event the student was registered for
    pub async fn submit_review(
        &self,
        student_id: i64,
        event_id: i64,
        request: SubmitReviewRequest,
        now: DateTime<Utc>,
    ) -> LifecycleResult<Review> {
        let event = self.load_event(event_id, now).await?;
        if event.status != EventStatus::Completed {
            return Err(LifecycleError::EventNotCompleted { event_id });
        }

        if self.store.find_registration(student_id, event_id).await?.is_none() {
            return Err(LifecycleError::NotRegistered { student_id, event_id });
        }

        request.validate()?;

        if self.store.find_review(student_id, event_id).await?.is_some() {
            return Err(LifecycleError::AlreadyReviewed { student_id, event_id });
        }

        let review = self.store.insert_review(student_id, event_id, &request, now).await?;
        debug!(student_id = student_id, event_id = event_id, review_id = review.id, "Review submitted");
        Ok(review)
    }

    /// Reviews for an event, newest first
    pub async fn reviews_for_event(&self, event_id: i64) -> LifecycleResult<Vec<Review>> {
        self.store.list_reviews(event_id).await
    }

    /// Registration and review summary for the event's organizer
    pub async fn event_report(&self, owner_id: i64, event_id: i64, now: DateTime<Utc>) -> LifecycleResult<EventReport> {
        let event = self.load_event(event_id, now).await?;
        event.ensure_owner(owner_id)?;

        let registrations = self.store.list_registrations(event_id).await?;
        let reviews = self.store.review_stats(event_id).await?;
        let registration_count = registrations.len() as i64;

        log_event_action(event_id, "report", owner_id, None);
        Ok(EventReport {
            fill_rate: fill_rate(registration_count, event.max_participants),
            trend: registration_trend(&registrations),
            event,
            registrations,
            registration_count,
            reviews,
        })
    }

    /// Daily and cumulative sign-ups for the event's organizer
    pub async fn registration_trend(&self, owner_id: i64, event_id: i64) -> LifecycleResult<Vec<TrendPoint>> {
        let event = self
            .store
            .find_event(event_id)
            .await?
            .ok_or(LifecycleError::NotFound { event_id })?;
        event.ensure_owner(owner_id)?;

        let registrations = self.store.list_registrations(event_id).await?;
        Ok(registration_trend(&registrations))
    }
}
