use crate::models::TimeGrouping;

/// Identity of a cacheable request: the resource family plus its
/// parameters in fixed order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheKey<'a> {
    /// `GET /auth/clients`
    Clients,
    /// `GET /auth/userstats`
    UserStats {
        start_day: &'a str,
        end_day: &'a str,
        grouping: TimeGrouping,
    },
    /// `GET /auth/reviews`
    Reviews {
        start_time: &'a str,
        end_time: &'a str,
    },
    /// `GET /auth/reports`
    Reports { client_id: Option<i64> },
}

impl CacheKey<'_> {
    /// Stable string form. Identical requests always build identical keys;
    /// any differing parameter changes the key.
    pub fn build(&self) -> String {
        match self {
            Self::Clients => "clients".to_string(),
            Self::UserStats {
                start_day,
                end_day,
                grouping,
            } => format!("stats:{start_day}:{end_day}:{grouping}"),
            Self::Reviews {
                start_time,
                end_time,
            } => format!("reviews:{start_time}:{end_time}"),
            Self::Reports {
                client_id: Some(id),
            } => format!("reports:{id}"),
            Self::Reports { client_id: None } => "reports:all".to_string(),
        }
    }
}
