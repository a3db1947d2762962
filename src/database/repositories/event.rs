//! Event repository implementation

use chrono::{DateTime, Utc};
use sqlx::{FromRow, SqliteConnection, SqlitePool};
use tracing::warn;

use crate::models::event::{CreateEventRequest, Event, EventFields, EventListing, EventStatus};
use crate::utils::errors::{LifecycleError, LifecycleResult};
use crate::utils::helpers::{format_timestamp, parse_timestamp};

#[derive(Debug, FromRow)]
pub(crate) struct EventRow {
    id: i64,
    title: String,
    description: Option<String>,
    location: String,
    start_time: String,
    end_time: String,
    max_participants: i64,
    owner_id: i64,
    status: String,
    created_at: String,
}

impl TryFrom<EventRow> for Event {
    type Error = LifecycleError;

    fn try_from(row: EventRow) -> Result<Self, Self::Error> {
        let timestamp = |field: &str, value: &str| {
            parse_timestamp(value).ok_or_else(|| {
                LifecycleError::CorruptRecord(format!("event {}: unparseable {} '{}'", row.id, field, value))
            })
        };

        Ok(Event {
            id: row.id,
            start_time: timestamp("start_time", &row.start_time)?,
            end_time: timestamp("end_time", &row.end_time)?,
            created_at: timestamp("created_at", &row.created_at)?,
            status: row.status.parse()?,
            title: row.title,
            description: row.description,
            location: row.location,
            max_participants: row.max_participants,
            owner_id: row.owner_id,
        })
    }
}

#[derive(Debug, FromRow)]
struct EventListingRow {
    #[sqlx(flatten)]
    event: EventRow,
    registered_count: i64,
}

/// `%query%` with LIKE wildcards in the query taken literally
fn like_pattern(query: &str) -> String {
    let escaped = query.replace('\\', "\\\\").replace('%', "\\%").replace('_', "\\_");
    format!("%{}%", escaped)
}

/// Decode rows, logging and dropping the ones that fail
fn decode_skipping_corrupt<R, T>(rows: Vec<R>) -> Vec<T>
where
    T: TryFrom<R, Error = LifecycleError>,
{
    rows.into_iter()
        .filter_map(|row| match T::try_from(row) {
            Ok(value) => Some(value),
            Err(err) => {
                warn!(error = %err, "Skipping undecodable event row");
                None
            }
        })
        .collect()
}

impl TryFrom<EventListingRow> for EventListing {
    type Error = LifecycleError;

    fn try_from(row: EventListingRow) -> Result<Self, Self::Error> {
        Ok(EventListing {
            event: Event::try_from(row.event)?,
            registered_count: row.registered_count,
        })
    }
}

/// Find event by ID
pub(crate) async fn fetch_event(conn: &mut SqliteConnection, event_id: i64) -> LifecycleResult<Option<Event>> {
    let row = sqlx::query_as::<_, EventRow>(
        "SELECT id, title, description, location, start_time, end_time, max_participants, owner_id, status, created_at FROM events WHERE id = ?"
    )
    .bind(event_id)
    .fetch_optional(conn)
    .await?;

    row.map(Event::try_from).transpose()
}

/// Take the write lock before anything else is read in the transaction.
///
/// The no-op write makes SQLite acquire the database write lock up front, so the
/// reads that follow cannot go stale before the transaction writes.
pub(crate) async fn lock_event(conn: &mut SqliteConnection, event_id: i64) -> LifecycleResult<Option<Event>> {
    sqlx::query("UPDATE events SET status = status WHERE id = ?")
        .bind(event_id)
        .execute(&mut *conn)
        .await?;

    fetch_event(conn, event_id).await
}

pub(crate) async fn update_fields(conn: &mut SqliteConnection, event_id: i64, fields: &EventFields) -> LifecycleResult<()> {
    sqlx::query(
        r#"
        UPDATE events
        SET title = ?, description = ?, location = ?, start_time = ?, end_time = ?, max_participants = ?
        WHERE id = ?
        "#
    )
    .bind(&fields.title)
    .bind(&fields.description)
    .bind(&fields.location)
    .bind(format_timestamp(fields.start_time))
    .bind(format_timestamp(fields.end_time))
    .bind(fields.max_participants)
    .bind(event_id)
    .execute(conn)
    .await?;

    Ok(())
}

pub(crate) async fn set_status(
    conn: &mut SqliteConnection,
    event_id: i64,
    status: EventStatus,
    end_time: Option<DateTime<Utc>>,
) -> LifecycleResult<()> {
    sqlx::query("UPDATE events SET status = ?, end_time = COALESCE(?, end_time) WHERE id = ?")
        .bind(status.as_str())
        .bind(end_time.map(format_timestamp))
        .bind(event_id)
        .execute(conn)
        .await?;

    Ok(())
}

#[derive(Debug, Clone)]
pub struct EventRepository {
    pool: SqlitePool,
}

impl EventRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a new event with status `upcoming`
    pub async fn create(&self, owner_id: i64, request: &CreateEventRequest, created_at: DateTime<Utc>) -> LifecycleResult<Event> {
        let row = sqlx::query_as::<_, EventRow>(
            r#"
            INSERT INTO events (title, description, location, start_time, end_time, max_participants, owner_id, status, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, 'upcoming', ?)
            RETURNING id, title, description, location, start_time, end_time, max_participants, owner_id, status, created_at
            "#
        )
        .bind(&request.title)
        .bind(&request.description)
        .bind(&request.location)
        .bind(format_timestamp(request.start_time))
        .bind(format_timestamp(request.end_time))
        .bind(request.max_participants)
        .bind(owner_id)
        .bind(format_timestamp(created_at))
        .fetch_one(&self.pool)
        .await?;

        Event::try_from(row)
    }

    /// Find event by ID
    pub async fn find_by_id(&self, event_id: i64) -> LifecycleResult<Option<Event>> {
        let mut conn = self.pool.acquire().await?;
        fetch_event(&mut conn, event_id).await
    }

    /// List events in any of the given statuses.
    ///
    /// Rows that fail to decode are logged and left out.
    pub async fn list_by_status(&self, statuses: &[EventStatus]) -> LifecycleResult<Vec<Event>> {
        if statuses.is_empty() {
            return Ok(Vec::new());
        }

        let placeholders = vec!["?"; statuses.len()].join(", ");
        let sql = format!(
            "SELECT id, title, description, location, start_time, end_time, max_participants, owner_id, status, created_at FROM events WHERE status IN ({}) ORDER BY id ASC",
            placeholders
        );

        let mut query = sqlx::query_as::<_, EventRow>(&sql);
        for status in statuses {
            query = query.bind(status.as_str());
        }
        let rows = query.fetch_all(&self.pool).await?;

        Ok(decode_skipping_corrupt(rows))
    }

    /// Keyword search over title, description and location within the given statuses
    pub async fn search(&self, query: &str, statuses: &[EventStatus]) -> LifecycleResult<Vec<EventListing>> {
        if statuses.is_empty() {
            return Ok(Vec::new());
        }

        let placeholders = vec!["?"; statuses.len()].join(", ");
        let sql = format!(
            r#"
            SELECT id, title, description, location, start_time, end_time, max_participants, owner_id, status, created_at,
                   (SELECT COUNT(*) FROM registrations WHERE registrations.event_id = events.id) AS registered_count
            FROM events
            WHERE status IN ({})
              AND (? = '' OR title LIKE ? ESCAPE '\' OR IFNULL(description, '') LIKE ? ESCAPE '\' OR location LIKE ? ESCAPE '\')
            ORDER BY id ASC
            "#,
            placeholders
        );

        let query = query.trim();
        let pattern = like_pattern(query);
        let mut statement = sqlx::query_as::<_, EventListingRow>(&sql);
        for status in statuses {
            statement = statement.bind(status.as_str());
        }
        let rows = statement
            .bind(query)
            .bind(&pattern)
            .bind(&pattern)
            .bind(&pattern)
            .fetch_all(&self.pool)
            .await?;

        Ok(decode_skipping_corrupt(rows))
    }

    /// Conditional single-row status update
    pub async fn transition_status(&self, event_id: i64, from: EventStatus, to: EventStatus) -> LifecycleResult<bool> {
        let result = sqlx::query("UPDATE events SET status = ? WHERE id = ? AND status = ?")
            .bind(to.as_str())
            .bind(event_id)
            .bind(from.as_str())
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() == 1)
    }
}
