use serde::{Deserialize, Serialize};

use crate::schema::{Field, Shape, Validated};

/// Summary row for a generated client report. Period bounds and the
/// generation timestamp stay as the backend's formatted strings; this core
/// never does date arithmetic on them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportSummary {
    pub report_id: i64,
    pub period_start: String,
    pub period_end: String,
    pub generated_at: String,
    pub client_name: String,
}

const REPORT_SUMMARY: Shape = Shape::Object(&[
    Field::required("report_id", Shape::Number),
    Field::required("period_start", Shape::String),
    Field::required("period_end", Shape::String),
    Field::required("generated_at", Shape::String),
    Field::required("client_name", Shape::String),
]);

/// Wire envelope for `GET /auth/reports`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportsResponse {
    #[serde(default, deserialize_with = "super::null_as_empty")]
    pub reports: Vec<ReportSummary>,
}

impl Validated for ReportsResponse {
    const SHAPE: Shape = Shape::Object(&[Field::nullable_seq("reports", &REPORT_SUMMARY)]);
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::schema::validate;

    #[test]
    fn parses_report_list() {
        let raw = json!({
            "reports": [{
                "report_id": 41,
                "period_start": "2024-10-01",
                "period_end": "2024-10-31",
                "generated_at": "2024-11-02T06:15:00Z",
                "client_name": "Acme Taxis"
            }]
        });
        let response: ReportsResponse = validate(raw).unwrap();
        assert_eq!(response.reports[0].report_id, 41);
        assert_eq!(response.reports[0].client_name, "Acme Taxis");
    }

    #[test]
    fn absent_reports_list_is_empty() {
        let response: ReportsResponse = validate(json!({})).unwrap();
        assert!(response.reports.is_empty());
    }
}
