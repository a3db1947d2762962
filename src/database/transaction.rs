//! SQLite unit of work

use chrono::{DateTime, Utc};
use sqlx::{Sqlite, Transaction};

use crate::database::repositories::{event, registration};
use crate::database::store::EventTransaction;
use crate::models::{Event, EventFields, EventStatus, Registration};
use crate::utils::errors::LifecycleResult;

/// A `BEGIN … COMMIT` block on one pooled connection
pub struct SqliteUnitOfWork {
    tx: Transaction<'static, Sqlite>,
}

impl SqliteUnitOfWork {
    pub fn new(tx: Transaction<'static, Sqlite>) -> Self {
        Self { tx }
    }
}

impl EventTransaction for SqliteUnitOfWork {
    async fn lock_event(&mut self, event_id: i64) -> LifecycleResult<Option<Event>> {
        event::lock_event(&mut self.tx, event_id).await
    }

    async fn count_registrations(&mut self, event_id: i64) -> LifecycleResult<i64> {
        registration::count_for_event(&mut self.tx, event_id).await
    }

    async fn find_registration(&mut self, student_id: i64, event_id: i64) -> LifecycleResult<Option<Registration>> {
        registration::fetch_registration(&mut self.tx, student_id, event_id).await
    }

    async fn insert_registration(
        &mut self,
        student_id: i64,
        event_id: i64,
        registered_at: DateTime<Utc>,
    ) -> LifecycleResult<Registration> {
        registration::insert(&mut self.tx, student_id, event_id, registered_at).await
    }

    async fn delete_registration(&mut self, student_id: i64, event_id: i64) -> LifecycleResult<bool> {
        registration::delete(&mut self.tx, student_id, event_id).await
    }

    async fn update_event_fields(&mut self, event_id: i64, fields: &EventFields) -> LifecycleResult<()> {
        event::update_fields(&mut self.tx, event_id, fields).await
    }

    async fn set_status(
        &mut self,
        event_id: i64,
        status: EventStatus,
        end_time: Option<DateTime<Utc>>,
    ) -> LifecycleResult<()> {
        event::set_status(&mut self.tx, event_id, status, end_time).await
    }

    async fn commit(self) -> LifecycleResult<()> {
        self.tx.commit().await?;
        Ok(())
    }

    async fn rollback(self) -> LifecycleResult<()> {
        self.tx.rollback().await?;
        Ok(())
    }
}
