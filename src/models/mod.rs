//! Data models module
//!
//! This module contains all data structures used throughout the application

pub mod event;
pub mod registration;
pub mod review;

// Re-export commonly used models
pub use event::{Event, EventListing, EventStatus, EventFields, CreateEventRequest, UpdateEventRequest};
pub use registration::{registration_trend, Registration, TrendPoint};
pub use review::{Review, ReviewStats, EventReport, SubmitReviewRequest};
