use serde::{Deserialize, Serialize};

use crate::schema::{Field, Shape, Validated};

/// Star-rating histogram for one location. `unspecified` counts reviews
/// where the reviewer left no rating.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewRatings {
    pub unspecified: u64,
    pub one: u64,
    pub two: u64,
    pub three: u64,
    pub four: u64,
    pub five: u64,
}

impl ReviewRatings {
    /// Total review count including unrated reviews.
    pub fn total(&self) -> u64 {
        self.unspecified + self.one + self.two + self.three + self.four + self.five
    }

    /// Mean star rating over rated reviews, or `None` when every review is
    /// unrated.
    pub fn average(&self) -> Option<f64> {
        let rated = self.one + self.two + self.three + self.four + self.five;
        if rated == 0 {
            return None;
        }
        let weighted = self.one + 2 * self.two + 3 * self.three + 4 * self.four + 5 * self.five;
        Some(weighted as f64 / rated as f64)
    }
}

/// Business-profile interaction counters for one location.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewInsights {
    #[serde(rename = "number_of_business_profile_call_button_clicked")]
    pub call_button_clicks: u64,
    #[serde(rename = "number_of_business_profile_website_clicked")]
    pub website_clicks: u64,
}

/// Aggregated reviews and insights for one business location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationReview {
    pub location_name: String,
    pub postal_code: String,
    pub review_ratings: ReviewRatings,
    pub insights: ReviewInsights,
}

const RATINGS: Shape = Shape::Object(&[
    Field::required("unspecified", Shape::Number),
    Field::required("one", Shape::Number),
    Field::required("two", Shape::Number),
    Field::required("three", Shape::Number),
    Field::required("four", Shape::Number),
    Field::required("five", Shape::Number),
]);

const INSIGHTS: Shape = Shape::Object(&[
    Field::required("number_of_business_profile_call_button_clicked", Shape::Number),
    Field::required("number_of_business_profile_website_clicked", Shape::Number),
]);

const LOCATION_REVIEW: Shape = Shape::Object(&[
    Field::required("location_name", Shape::String),
    Field::required("postal_code", Shape::String),
    Field::required("review_ratings", RATINGS),
    Field::required("insights", INSIGHTS),
]);

/// Wire envelope for `GET /auth/reviews`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewsResponse {
    #[serde(default, deserialize_with = "super::null_as_empty")]
    pub locations: Vec<LocationReview>,
}

impl Validated for ReviewsResponse {
    const SHAPE: Shape = Shape::Object(&[Field::nullable_seq("locations", &LOCATION_REVIEW)]);
}
