//! Review and event report models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::event::Event;
use crate::models::registration::{Registration, TrendPoint};
use crate::utils::errors::{LifecycleError, LifecycleResult};

pub const MIN_SCORE: i64 = 1;
pub const MAX_SCORE: i64 = 5;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Review {
    pub id: i64,
    pub student_id: i64,
    pub event_id: i64,
    pub content_score: i64,
    pub organization_score: i64,
    pub comment: Option<String>,
    pub reviewed_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitReviewRequest {
    pub content_score: i64,
    pub organization_score: i64,
    pub comment: Option<String>,
}

impl SubmitReviewRequest {
    pub fn validate(&self) -> LifecycleResult<()> {
        let in_range = |score: i64| (MIN_SCORE..=MAX_SCORE).contains(&score);
        if in_range(self.content_score) && in_range(self.organization_score) {
            Ok(())
        } else {
            Err(LifecycleError::InvalidScore)
        }
    }
}

/// Aggregated review scores for one event
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReviewStats {
    pub review_count: i64,
    pub average_content_score: Option<f64>,
    pub average_organization_score: Option<f64>,
}

/// Organizer-facing summary of an event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventReport {
    pub event: Event,
    /// In sign-up order
    pub registrations: Vec<Registration>,
    pub registration_count: i64,
    /// Percentage of `max_participants` taken
    pub fill_rate: f64,
    /// Sign-ups per day, with running totals
    pub trend: Vec<TrendPoint>,
    pub reviews: ReviewStats,
}
