//! Event lifecycle service
//!
//! Derives event status from the clock, applies organizer overrides and guards
//! registration capacity and timing. Callers pass `now` into every operation;
//! nothing in here reads the system clock.

use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use crate::database::store::{EventStore, EventTransaction};
use crate::models::{CreateEventRequest, Event, EventListing, EventStatus, Registration, UpdateEventRequest};
use crate::utils::errors::{LifecycleError, LifecycleResult};
use crate::utils::logging::{log_event_action, log_registration, log_store_failure, log_sweep};

/// Outcome of one status sweep
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SweepReport {
    /// Upcoming and ongoing events looked at
    pub examined: usize,
    /// Moved to ongoing
    pub started: usize,
    /// Moved to completed
    pub completed: usize,
    /// Changed by someone else between listing and update
    pub skipped: usize,
    /// Row updates that failed
    pub failed: usize,
}

impl SweepReport {
    /// Transitions actually applied
    pub fn changed(&self) -> usize {
        self.started + self.completed
    }
}

/// Status, registration and organizer operations over an [`EventStore`]
#[derive(Debug, Clone)]
pub struct LifecycleService<S> {
    store: S,
}

impl<S: EventStore> LifecycleService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Bring every upcoming or ongoing event in line with `now`.
    ///
    /// Each transition is its own conditional update; a failed row is logged and
    /// counted, and the sweep moves on to the next event.
    pub async fn recompute_statuses(&self, now: DateTime<Utc>) -> LifecycleResult<SweepReport> {
        let events = self.store.list_events_by_status(&EventStatus::ACTIVE).await?;
        let mut report = SweepReport { examined: events.len(), ..SweepReport::default() };

        for event in events {
            let next = event.status_at(now);
            if next == event.status {
                continue;
            }
            debug_assert!(event.status.can_transition_to(next));

            match self.store.transition_status(event.id, event.status, next).await {
                Ok(true) => {
                    debug!(event_id = event.id, from = %event.status, to = %next, "Status transition applied");
                    match next {
                        EventStatus::Ongoing => report.started += 1,
                        _ => report.completed += 1,
                    }
                }
                Ok(false) => {
                    debug!(event_id = event.id, "Event changed concurrently, leaving it alone");
                    report.skipped += 1;
                }
                Err(err) => {
                    log_store_failure("recompute_statuses", Some(event.id), &err.to_string());
                    report.failed += 1;
                }
            }
        }

        log_sweep(report.examined, report.started, report.completed, report.skipped, report.failed);
        Ok(report)
    }

    /// Read one event with its status brought up to date
    pub async fn get_event(&self, event_id: i64, now: DateTime<Utc>) -> LifecycleResult<Event> {
        let mut event = self
            .store
            .find_event(event_id)
            .await?
            .ok_or(LifecycleError::NotFound { event_id })?;

        let next = event.status_at(now);
        if next != event.status {
            match self.store.transition_status(event_id, event.status, next).await {
                Ok(true) => event.status = next,
                Ok(false) => {
                    if let Some(fresh) = self.store.find_event(event_id).await? {
                        event = fresh;
                    }
                }
                Err(err) => {
                    // still report what the clock says
                    log_store_failure("get_event", Some(event_id), &err.to_string());
                    event.status = next;
                }
            }
        }

        Ok(event)
    }

    /// Events still open to students, soonest first
    pub async fn open_events(&self, now: DateTime<Utc>) -> LifecycleResult<Vec<Event>> {
        if let Err(err) = self.recompute_statuses(now).await {
            log_store_failure("open_events", None, &err.to_string());
        }

        let mut events = self.store.list_events_by_status(&EventStatus::ACTIVE).await?;
        for event in &mut events {
            event.status = event.status_at(now);
        }
        events.retain(|event| event.status.accepts_registrations());
        events.sort_by_key(|event| (event.start_time, event.id));
        Ok(events)
    }

    /// Open events matching `query` in title, description or location, soonest
    /// first, each with its registration count. A blank query lists every open event.
    pub async fn search_events(&self, query: &str, now: DateTime<Utc>) -> LifecycleResult<Vec<EventListing>> {
        if let Err(err) = self.recompute_statuses(now).await {
            log_store_failure("search_events", None, &err.to_string());
        }

        let mut listings = self.store.search_events(query, &EventStatus::ACTIVE).await?;
        for listing in &mut listings {
            listing.event.status = listing.event.status_at(now);
        }
        listings.retain(|listing| listing.event.status.accepts_registrations());
        listings.sort_by_key(|listing| (listing.event.start_time, listing.event.id));
        Ok(listings)
    }

    pub async fn create_event(
        &self,
        owner_id: i64,
        request: CreateEventRequest,
        now: DateTime<Utc>,
    ) -> LifecycleResult<Event> {
        request.validate(now)?;
        let event = self.store.insert_event(owner_id, &request, now).await?;

        log_event_action(event.id, "create", owner_id, Some(&event.title));
        Ok(event)
    }

    /// Register a student.
    ///
    /// The existence, status and capacity checks run inside the same locked unit of
    /// work as the insert, so concurrent calls cannot overbook an event.
    pub async fn register(&self, student_id: i64, event_id: i64, now: DateTime<Utc>) -> LifecycleResult<Registration> {
        let mut tx = self.store.begin().await?;
        let result = register_locked(&mut tx, student_id, event_id, now).await;
        let registration = finish(tx, result).await?;

        log_registration(student_id, event_id, "register");
        Ok(registration)
    }

    pub async fn cancel_registration(&self, student_id: i64, event_id: i64, now: DateTime<Utc>) -> LifecycleResult<()> {
        let mut tx = self.store.begin().await?;
        let result = cancel_registration_locked(&mut tx, student_id, event_id, now).await;
        finish(tx, result).await?;

        log_registration(student_id, event_id, "cancel");
        Ok(())
    }

    /// Organizer ends the event now; `end_time` is pulled back to `now`.
    ///
    /// Ending an event before it starts leaves `end_time` earlier than `start_time`.
    pub async fn end_event(&self, owner_id: i64, event_id: i64, now: DateTime<Utc>) -> LifecycleResult<Event> {
        let mut tx = self.store.begin().await?;
        let result = override_locked(&mut tx, owner_id, event_id, EventStatus::Completed, now).await;
        let event = finish(tx, result).await?;

        log_event_action(event_id, "end", owner_id, None);
        Ok(event)
    }

    /// Organizer cancels an upcoming or ongoing event
    pub async fn cancel_event(&self, owner_id: i64, event_id: i64, now: DateTime<Utc>) -> LifecycleResult<Event> {
        let mut tx = self.store.begin().await?;
        let result = override_locked(&mut tx, owner_id, event_id, EventStatus::Cancelled, now).await;
        let event = finish(tx, result).await?;

        log_event_action(event_id, "cancel", owner_id, None);
        Ok(event)
    }

    /// Overwrite the editable fields of an event that has not started yet.
    ///
    /// Ongoing events fail with `EventAlreadyStarted`, completed and cancelled
    /// ones with `EventClosed`.
    pub async fn update_event(
        &self,
        owner_id: i64,
        event_id: i64,
        request: UpdateEventRequest,
        now: DateTime<Utc>,
    ) -> LifecycleResult<Event> {
        let mut tx = self.store.begin().await?;
        let result = update_locked(&mut tx, owner_id, event_id, &request, now).await;
        let event = finish(tx, result).await?;

        log_event_action(event_id, "update", owner_id, Some(&event.title));
        Ok(event)
    }
}

/// Commit on success, roll back on failure
async fn finish<T: EventTransaction, R>(tx: T, result: LifecycleResult<R>) -> LifecycleResult<R> {
    match result {
        Ok(value) => {
            tx.commit().await?;
            Ok(value)
        }
        Err(err) => {
            if let Err(rollback_err) = tx.rollback().await {
                warn!(error = %rollback_err, "Rollback failed");
            }
            Err(err)
        }
    }
}

async fn lock_existing<T: EventTransaction>(tx: &mut T, event_id: i64) -> LifecycleResult<Event> {
    tx.lock_event(event_id)
        .await?
        .ok_or(LifecycleError::NotFound { event_id })
}

/// Persist any transition the clock implies before acting on the status
async fn refresh_locked<T: EventTransaction>(tx: &mut T, mut event: Event, now: DateTime<Utc>) -> LifecycleResult<Event> {
    let next = event.status_at(now);
    if next != event.status {
        tx.set_status(event.id, next, None).await?;
        event.status = next;
    }
    Ok(event)
}

async fn register_locked<T: EventTransaction>(
    tx: &mut T,
    student_id: i64,
    event_id: i64,
    now: DateTime<Utc>,
) -> LifecycleResult<Registration> {
    let event = lock_existing(tx, event_id).await?;

    if tx.find_registration(student_id, event_id).await?.is_some() {
        return Err(LifecycleError::AlreadyRegistered { student_id, event_id });
    }

    let event = refresh_locked(tx, event, now).await?;
    if !event.status.accepts_registrations() {
        return Err(LifecycleError::EventClosed { event_id, status: event.status });
    }

    if event.has_started(now) {
        return Err(LifecycleError::EventAlreadyStarted { event_id });
    }

    let registered = tx.count_registrations(event_id).await?;
    if registered >= event.max_participants {
        return Err(LifecycleError::Full { event_id, max_participants: event.max_participants });
    }

    tx.insert_registration(student_id, event_id, now).await
}

async fn cancel_registration_locked<T: EventTransaction>(
    tx: &mut T,
    student_id: i64,
    event_id: i64,
    now: DateTime<Utc>,
) -> LifecycleResult<()> {
    let event = lock_existing(tx, event_id).await?;

    if tx.find_registration(student_id, event_id).await?.is_none() {
        return Err(LifecycleError::NotRegistered { student_id, event_id });
    }

    if event.has_started(now) {
        return Err(LifecycleError::TooLateToCancel { event_id });
    }

    tx.delete_registration(student_id, event_id).await?;
    Ok(())
}

async fn override_locked<T: EventTransaction>(
    tx: &mut T,
    owner_id: i64,
    event_id: i64,
    target: EventStatus,
    now: DateTime<Utc>,
) -> LifecycleResult<Event> {
    let event = lock_existing(tx, event_id).await?;
    event.ensure_owner(owner_id)?;

    let mut event = refresh_locked(tx, event, now).await?;
    if event.status == EventStatus::Completed {
        return Err(LifecycleError::AlreadyCompleted { event_id });
    }
    event.status = event.status.transition(target)?;

    let end_time = match target {
        EventStatus::Completed => Some(now),
        _ => None,
    };
    tx.set_status(event_id, event.status, end_time).await?;
    if let Some(end_time) = end_time {
        event.end_time = end_time;
    }

    Ok(event)
}

async fn update_locked<T: EventTransaction>(
    tx: &mut T,
    owner_id: i64,
    event_id: i64,
    request: &UpdateEventRequest,
    now: DateTime<Utc>,
) -> LifecycleResult<Event> {
    let event = lock_existing(tx, event_id).await?;
    event.ensure_owner(owner_id)?;

    // only events that have not started can be rescheduled
    let mut event = refresh_locked(tx, event, now).await?;
    match event.status {
        EventStatus::Upcoming => {}
        EventStatus::Ongoing => return Err(LifecycleError::EventAlreadyStarted { event_id }),
        status => return Err(LifecycleError::EventClosed { event_id, status }),
    }

    let fields = request.resolve(&event, now)?;

    let registered = tx.count_registrations(event_id).await?;
    if fields.max_participants < registered {
        return Err(LifecycleError::CapacityBelowRegistered {
            requested: fields.max_participants,
            registered,
        });
    }
    if fields.max_participants <= 0 {
        return Err(LifecycleError::InvalidCapacity(fields.max_participants));
    }

    tx.update_event_fields(event_id, &fields).await?;
    event.apply(&fields);
    Ok(event)
}
