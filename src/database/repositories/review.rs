//! Review repository implementation

use chrono::{DateTime, Utc};
use sqlx::{FromRow, SqlitePool};

use crate::models::review::{Review, ReviewStats, SubmitReviewRequest};
use crate::utils::errors::{LifecycleError, LifecycleResult};
use crate::utils::helpers::{format_timestamp, parse_timestamp, round_to};

#[derive(Debug, FromRow)]
struct ReviewRow {
    id: i64,
    student_id: i64,
    event_id: i64,
    content_score: i64,
    organization_score: i64,
    comment: Option<String>,
    reviewed_at: String,
}

impl TryFrom<ReviewRow> for Review {
    type Error = LifecycleError;

    fn try_from(row: ReviewRow) -> Result<Self, Self::Error> {
        let reviewed_at = parse_timestamp(&row.reviewed_at).ok_or_else(|| {
            LifecycleError::CorruptRecord(format!("review {}: unparseable reviewed_at '{}'", row.id, row.reviewed_at))
        })?;

        Ok(Review {
            id: row.id,
            student_id: row.student_id,
            event_id: row.event_id,
            content_score: row.content_score,
            organization_score: row.organization_score,
            comment: row.comment,
            reviewed_at,
        })
    }
}

#[derive(Debug, Clone)]
pub struct ReviewRepository {
    pool: SqlitePool,
}

impl ReviewRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a review; a second review by the same student is `AlreadyReviewed`
    pub async fn create(
        &self,
        student_id: i64,
        event_id: i64,
        request: &SubmitReviewRequest,
        reviewed_at: DateTime<Utc>,
    ) -> LifecycleResult<Review> {
        let result = sqlx::query_as::<_, ReviewRow>(
            r#"
            INSERT INTO reviews (student_id, event_id, content_score, organization_score, comment, reviewed_at)
            VALUES (?, ?, ?, ?, ?, ?)
            RETURNING id, student_id, event_id, content_score, organization_score, comment, reviewed_at
            "#
        )
        .bind(student_id)
        .bind(event_id)
        .bind(request.content_score)
        .bind(request.organization_score)
        .bind(&request.comment)
        .bind(format_timestamp(reviewed_at))
        .fetch_one(&self.pool)
        .await;

        match result {
            Ok(row) => Review::try_from(row),
            Err(sqlx::Error::Database(db)) if db.is_unique_violation() => {
                Err(LifecycleError::AlreadyReviewed { student_id, event_id })
            }
            Err(err) => Err(err.into()),
        }
    }

    pub async fn find(&self, student_id: i64, event_id: i64) -> LifecycleResult<Option<Review>> {
        let row = sqlx::query_as::<_, ReviewRow>(
            "SELECT id, student_id, event_id, content_score, organization_score, comment, reviewed_at FROM reviews WHERE student_id = ? AND event_id = ?"
        )
        .bind(student_id)
        .bind(event_id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Review::try_from).transpose()
    }

    /// Newest reviews first
    pub async fn list_for_event(&self, event_id: i64) -> LifecycleResult<Vec<Review>> {
        let rows = sqlx::query_as::<_, ReviewRow>(
            "SELECT id, student_id, event_id, content_score, organization_score, comment, reviewed_at FROM reviews WHERE event_id = ? ORDER BY reviewed_at DESC, id DESC"
        )
        .bind(event_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Review::try_from).collect()
    }

    /// Count and average scores, rounded to two places
    pub async fn stats(&self, event_id: i64) -> LifecycleResult<ReviewStats> {
        let (review_count, content, organization): (i64, Option<f64>, Option<f64>) = sqlx::query_as(
            "SELECT COUNT(*), AVG(content_score), AVG(organization_score) FROM reviews WHERE event_id = ?"
        )
        .bind(event_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(ReviewStats {
            review_count,
            average_content_score: content.map(|avg| round_to(avg, 2)),
            average_organization_score: organization.map(|avg| round_to(avg, 2)),
        })
    }
}
