use std::fmt;

use serde::{Deserialize, Serialize};

use crate::schema::{Field, Shape, Validated};

/// Time bucket the backend groups stats rows by.
///
/// Values are capitalized on the wire; anything else falls back to daily
/// grouping server-side.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeGrouping {
    Day,
    Week,
    Month,
    Year,
}

impl TimeGrouping {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Day => "Day",
            Self::Week => "Week",
            Self::Month => "Month",
            Self::Year => "Year",
        }
    }
}

impl fmt::Display for TimeGrouping {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One stats row: counts for a single client over one group period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatRow {
    pub client_id: i64,
    pub client_name: String,
    pub sent: u64,
    pub requested: u64,
    pub group_period: String,
}

const STAT_ROW: Shape = Shape::Object(&[
    Field::required("client_id", Shape::Number),
    Field::required("client_name", Shape::String),
    Field::required("sent", Shape::Number),
    Field::required("requested", Shape::Number),
    Field::required("group_period", Shape::String),
]);

/// Wire envelope for `GET /auth/userstats`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserStatsResponse {
    pub success: bool,
    /// Backend error detail; empty when `success` holds.
    #[serde(rename = "err")]
    pub error: String,
    #[serde(default, deserialize_with = "super::null_as_empty")]
    pub stats: Vec<StatRow>,
}

impl Validated for UserStatsResponse {
    const SHAPE: Shape = Shape::Object(&[
        Field::required("success", Shape::Bool),
        Field::required("err", Shape::String),
        Field::nullable_seq("stats", &STAT_ROW),
    ]);
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::schema::validate;

    #[test]
    fn parses_stats_response() {
        let raw = json!({
            "success": true,
            "err": "",
            "stats": [{
                "client_id": 3,
                "client_name": "Acme Taxis",
                "sent": 120,
                "requested": 145,
                "group_period": "2024-11-01T00:00:00Z"
            }]
        });
        let response: UserStatsResponse = validate(raw).unwrap();
        assert!(response.success);
        assert!(response.error.is_empty());
        assert_eq!(response.stats[0].sent, 120);
        assert_eq!(response.stats[0].requested, 145);
    }

    #[test]
    fn backend_failure_carries_err_detail() {
        let raw = json!({"success": false, "err": "error retrieving stats list", "stats": null});
        let response: UserStatsResponse = validate(raw).unwrap();
        assert!(!response.success);
        assert_eq!(response.error, "error retrieving stats list");
        assert!(response.stats.is_empty());
    }

    #[test]
    fn grouping_values_match_the_wire() {
        assert_eq!(TimeGrouping::Day.to_string(), "Day");
        assert_eq!(TimeGrouping::Week.to_string(), "Week");
        assert_eq!(TimeGrouping::Month.to_string(), "Month");
        assert_eq!(TimeGrouping::Year.to_string(), "Year");
    }
}
