//! Registration repository implementation

use chrono::{DateTime, Utc};
use sqlx::{FromRow, SqliteConnection, SqlitePool};

use crate::models::registration::Registration;
use crate::utils::errors::{LifecycleError, LifecycleResult};
use crate::utils::helpers::{format_timestamp, parse_timestamp};

#[derive(Debug, FromRow)]
pub(crate) struct RegistrationRow {
    id: i64,
    student_id: i64,
    event_id: i64,
    registered_at: String,
}

impl TryFrom<RegistrationRow> for Registration {
    type Error = LifecycleError;

    fn try_from(row: RegistrationRow) -> Result<Self, Self::Error> {
        let registered_at = parse_timestamp(&row.registered_at).ok_or_else(|| {
            LifecycleError::CorruptRecord(format!(
                "registration {}: unparseable registered_at '{}'",
                row.id, row.registered_at
            ))
        })?;

        Ok(Registration {
            id: row.id,
            student_id: row.student_id,
            event_id: row.event_id,
            registered_at,
        })
    }
}

pub(crate) async fn count_for_event(conn: &mut SqliteConnection, event_id: i64) -> LifecycleResult<i64> {
    let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM registrations WHERE event_id = ?")
        .bind(event_id)
        .fetch_one(conn)
        .await?;

    Ok(count.0)
}

pub(crate) async fn fetch_registration(
    conn: &mut SqliteConnection,
    student_id: i64,
    event_id: i64,
) -> LifecycleResult<Option<Registration>> {
    let row = sqlx::query_as::<_, RegistrationRow>(
        "SELECT id, student_id, event_id, registered_at FROM registrations WHERE student_id = ? AND event_id = ?"
    )
    .bind(student_id)
    .bind(event_id)
    .fetch_optional(conn)
    .await?;

    row.map(Registration::try_from).transpose()
}

pub(crate) async fn insert(
    conn: &mut SqliteConnection,
    student_id: i64,
    event_id: i64,
    registered_at: DateTime<Utc>,
) -> LifecycleResult<Registration> {
    let result = sqlx::query_as::<_, RegistrationRow>(
        r#"
        INSERT INTO registrations (student_id, event_id, registered_at)
        VALUES (?, ?, ?)
        RETURNING id, student_id, event_id, registered_at
        "#
    )
    .bind(student_id)
    .bind(event_id)
    .bind(format_timestamp(registered_at))
    .fetch_one(conn)
    .await;

    match result {
        Ok(row) => Registration::try_from(row),
        Err(sqlx::Error::Database(db)) if db.is_unique_violation() => {
            Err(LifecycleError::AlreadyRegistered { student_id, event_id })
        }
        Err(err) => Err(err.into()),
    }
}

pub(crate) async fn delete(conn: &mut SqliteConnection, student_id: i64, event_id: i64) -> LifecycleResult<bool> {
    let result = sqlx::query("DELETE FROM registrations WHERE student_id = ? AND event_id = ?")
        .bind(student_id)
        .bind(event_id)
        .execute(conn)
        .await?;

    Ok(result.rows_affected() > 0)
}

#[derive(Debug, Clone)]
pub struct RegistrationRepository {
    pool: SqlitePool,
}

impl RegistrationRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Get participant count for event
    pub async fn count(&self, event_id: i64) -> LifecycleResult<i64> {
        let mut conn = self.pool.acquire().await?;
        count_for_event(&mut conn, event_id).await
    }

    /// Find a student's registration for an event
    pub async fn find(&self, student_id: i64, event_id: i64) -> LifecycleResult<Option<Registration>> {
        let mut conn = self.pool.acquire().await?;
        fetch_registration(&mut conn, student_id, event_id).await
    }

    /// Get event registrations in sign-up order
    pub async fn list_for_event(&self, event_id: i64) -> LifecycleResult<Vec<Registration>> {
        let rows = sqlx::query_as::<_, RegistrationRow>(
            "SELECT id, student_id, event_id, registered_at FROM registrations WHERE event_id = ? ORDER BY registered_at ASC, id ASC"
        )
        .bind(event_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Registration::try_from).collect()
    }
}
