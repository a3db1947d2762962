//! Event model and status state machine

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::utils::errors::{LifecycleError, LifecycleResult};
use crate::utils::helpers::whole_seconds;

/// Lifecycle status of an event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventStatus {
    Upcoming,
    Ongoing,
    Completed,
    Cancelled,
}

impl EventStatus {
    /// Statuses the sweep still has to look at
    pub const ACTIVE: [EventStatus; 2] = [EventStatus::Upcoming, EventStatus::Ongoing];

    pub fn as_str(self) -> &'static str {
        match self {
            EventStatus::Upcoming => "upcoming",
            EventStatus::Ongoing => "ongoing",
            EventStatus::Completed => "completed",
            EventStatus::Cancelled => "cancelled",
        }
    }

    /// Whether `self -> next` is in the transition table
    pub fn can_transition_to(self, next: EventStatus) -> bool {
        use EventStatus::*;
        matches!(
            (self, next),
            (Upcoming, Ongoing)
                | (Upcoming, Completed)
                | (Ongoing, Completed)
                | (Upcoming, Cancelled)
                | (Ongoing, Cancelled)
        )
    }

    /// Validate a transition against the table
    pub fn transition(self, next: EventStatus) -> LifecycleResult<EventStatus> {
        if self.can_transition_to(next) {
            Ok(next)
        } else {
            Err(LifecycleError::InvalidTransition { from: self, to: next })
        }
    }

    /// Completed and cancelled are never left again
    pub fn is_terminal(self) -> bool {
        matches!(self, EventStatus::Completed | EventStatus::Cancelled)
    }

    pub fn accepts_registrations(self) -> bool {
        matches!(self, EventStatus::Upcoming | EventStatus::Ongoing)
    }

    /// Status implied by the clock.
    ///
    /// Terminal states are pinned. Otherwise the status only moves forward:
    /// past `end` means completed, past `start` means ongoing.
    pub fn at(self, now: DateTime<Utc>, start: DateTime<Utc>, end: DateTime<Utc>) -> EventStatus {
        match self {
            EventStatus::Completed | EventStatus::Cancelled => self,
            _ if end <= now => EventStatus::Completed,
            EventStatus::Upcoming if start <= now => EventStatus::Ongoing,
            status => status,
        }
    }
}

impl fmt::Display for EventStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventStatus {
    type Err = LifecycleError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "upcoming" => Ok(EventStatus::Upcoming),
            "ongoing" => Ok(EventStatus::Ongoing),
            "completed" => Ok(EventStatus::Completed),
            "cancelled" => Ok(EventStatus::Cancelled),
            other => Err(LifecycleError::CorruptRecord(format!("unknown event status '{}'", other))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub location: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub max_participants: i64,
    pub owner_id: i64,
    pub status: EventStatus,
    pub created_at: DateTime<Utc>,
}

impl Event {
    /// Status this event should have at `now`
    pub fn status_at(&self, now: DateTime<Utc>) -> EventStatus {
        self.status.at(now, self.start_time, self.end_time)
    }

    pub fn has_started(&self, now: DateTime<Utc>) -> bool {
        now >= self.start_time
    }

    pub fn is_owned_by(&self, account_id: i64) -> bool {
        self.owner_id == account_id
    }

    /// Fail with `Forbidden` unless `account_id` organizes this event
    pub fn ensure_owner(&self, account_id: i64) -> LifecycleResult<()> {
        if self.is_owned_by(account_id) {
            Ok(())
        } else {
            Err(LifecycleError::Forbidden { account_id, event_id: self.id })
        }
    }

    pub fn apply(&mut self, fields: &EventFields) {
        self.title = fields.title.clone();
        self.description = fields.description.clone();
        self.location = fields.location.clone();
        self.start_time = fields.start_time;
        self.end_time = fields.end_time;
        self.max_participants = fields.max_participants;
    }
}

/// An event with its current sign-up count, as returned by search
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventListing {
    pub event: Event,
    pub registered_count: i64,
}

impl EventListing {
    pub fn seats_left(&self) -> i64 {
        (self.event.max_participants - self.registered_count).max(0)
    }
}

/// Compared at storage precision, so what passes here still holds once persisted
fn validate_times(start_time: DateTime<Utc>, end_time: DateTime<Utc>, now: DateTime<Utc>) -> LifecycleResult<()> {
    let (start_time, end_time, now) = (whole_seconds(start_time), whole_seconds(end_time), whole_seconds(now));
    if start_time <= now {
        return Err(LifecycleError::StartInPast);
    }
    if end_time <= start_time {
        return Err(LifecycleError::InvalidTimeRange);
    }
    Ok(())
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateEventRequest {
    pub title: String,
    pub description: Option<String>,
    pub location: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub max_participants: i64,
}

impl CreateEventRequest {
    pub fn validate(&self, now: DateTime<Utc>) -> LifecycleResult<()> {
        validate_times(self.start_time, self.end_time, now)?;
        if self.max_participants <= 0 {
            return Err(LifecycleError::InvalidCapacity(self.max_participants));
        }
        Ok(())
    }
}

/// Organizer edit of an existing event. `end_time: None` keeps the current end.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateEventRequest {
    pub title: String,
    pub description: Option<String>,
    pub location: String,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    pub max_participants: i64,
}

impl UpdateEventRequest {
    /// Resolve against the stored event and validate the schedule.
    ///
    /// Capacity is checked by the caller against the current registration count.
    pub fn resolve(&self, current: &Event, now: DateTime<Utc>) -> LifecycleResult<EventFields> {
        let fields = EventFields {
            title: self.title.clone(),
            description: self.description.clone(),
            location: self.location.clone(),
            start_time: whole_seconds(self.start_time),
            end_time: whole_seconds(self.end_time.unwrap_or(current.end_time)),
            max_participants: self.max_participants,
        };
        validate_times(fields.start_time, fields.end_time, now)?;
        Ok(fields)
    }
}

/// Mutable columns of an event as written by an edit
#[derive(Debug, Clone, PartialEq)]
pub struct EventFields {
    pub title: String,
    pub description: Option<String>,
    pub location: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub max_participants: i64,
}
