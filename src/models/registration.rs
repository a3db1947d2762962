//! Registration model

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// A student's seat at an event, unique per (student, event)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Registration {
    pub id: i64,
    pub student_id: i64,
    pub event_id: i64,
    pub registered_at: DateTime<Utc>,
}

/// Sign-ups on one calendar day (UTC)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrendPoint {
    pub date: NaiveDate,
    pub daily: i64,
    /// Running total up to and including `date`
    pub cumulative: i64,
}

/// Daily and cumulative registration counts, oldest day first.
///
/// Days without sign-ups are left out.
pub fn registration_trend(registrations: &[Registration]) -> Vec<TrendPoint> {
    let mut per_day: BTreeMap<NaiveDate, i64> = BTreeMap::new();
    for registration in registrations {
        *per_day.entry(registration.registered_at.date_naive()).or_default() += 1;
    }

    let mut total = 0;
    per_day
        .into_iter()
        .map(|(date, daily)| {
            total += daily;
            TrendPoint { date, daily, cumulative: total }
        })
        .collect()
}
