//! Data models for the dashboard backend.
//!
//! Each response envelope pairs a serde struct with the [`Shape`] the
//! validator checks before the struct is populated:
//!
//! - `Client`: customer accounts visible to the logged-in user
//! - `StatRow`, `UserStatsResponse`: send/request counts per time bucket
//! - `LocationReview`, `ReviewsResponse`: rating buckets and profile clicks
//! - `ReportSummary`, `ReportsResponse`: generated report metadata
//!
//! [`Shape`]: crate::schema::Shape

pub mod client;
pub mod report;
pub mod review;
pub mod stats;

pub use client::{Client, ClientsResponse};
pub use report::{ReportSummary, ReportsResponse};
pub use review::{LocationReview, ReviewInsights, ReviewRatings, ReviewsResponse};
pub use stats::{StatRow, TimeGrouping, UserStatsResponse};

use serde::{Deserialize, Deserializer};

/// The backend serializes empty lists as `null` and sometimes omits them
/// entirely; either way callers get an empty `Vec`.
pub(crate) fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    let list = Option::<Vec<T>>::deserialize(deserializer)?;
    Ok(list.unwrap_or_default())
}
