use thiserror::Error;

use crate::schema::SchemaMismatch;

/// Uniform error for every API client call: transport failures, non-2xx
/// statuses, and validation failures all surface through this one shape.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Unauthorized - session cleared")]
    Unauthorized,

    #[error("Access denied: {0}")]
    AccessDenied(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Server error ({status}): {body}")]
    Server { status: u16, body: String },

    #[error("Unexpected status {status}: {body}")]
    UnexpectedStatus { status: u16, body: String },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Invalid response: {0}")]
    Schema(#[from] SchemaMismatch),
}

/// Maximum length for error response bodies carried in error messages
const MAX_ERROR_BODY_LENGTH: usize = 500;

impl ApiError {
    /// Truncate a response body to avoid dragging huge payloads around
    fn truncate_body(body: &str) -> String {
        if body.len() <= MAX_ERROR_BODY_LENGTH {
            return body.to_string();
        }
        let mut end = MAX_ERROR_BODY_LENGTH;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}... (truncated, {} total bytes)", &body[..end], body.len())
    }

    pub fn from_status(status: reqwest::StatusCode, body: &str) -> Self {
        let truncated = Self::truncate_body(body);
        match status.as_u16() {
            401 => ApiError::Unauthorized,
            403 => ApiError::AccessDenied(truncated),
            404 => ApiError::NotFound(truncated),
            status @ 500..=599 => ApiError::Server {
                status,
                body: truncated,
            },
            status => ApiError::UnexpectedStatus {
                status,
                body: truncated,
            },
        }
    }

    /// HTTP status associated with this error, when one exists.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            ApiError::Unauthorized => Some(401),
            ApiError::AccessDenied(_) => Some(403),
            ApiError::NotFound(_) => Some(404),
            ApiError::Server { status, .. } | ApiError::UnexpectedStatus { status, .. } => {
                Some(*status)
            }
            ApiError::Network(err) => err.status().map(|s| s.as_u16()),
            ApiError::Schema(_) => None,
        }
    }

    /// Response body captured with this error, when one was.
    pub fn body(&self) -> Option<&str> {
        match self {
            ApiError::AccessDenied(body) | ApiError::NotFound(body) => Some(body),
            ApiError::Server { body, .. } | ApiError::UnexpectedStatus { body, .. } => Some(body),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_statuses_to_variants() {
        let status = |code: u16| reqwest::StatusCode::from_u16(code).unwrap();
        assert!(matches!(
            ApiError::from_status(status(401), ""),
            ApiError::Unauthorized
        ));
        assert!(matches!(
            ApiError::from_status(status(403), "no"),
            ApiError::AccessDenied(_)
        ));
        assert!(matches!(
            ApiError::from_status(status(404), ""),
            ApiError::NotFound(_)
        ));
        assert!(matches!(
            ApiError::from_status(status(503), ""),
            ApiError::Server { status: 503, .. }
        ));
        assert!(matches!(
            ApiError::from_status(status(418), ""),
            ApiError::UnexpectedStatus { status: 418, .. }
        ));
    }

    #[test]
    fn status_code_and_body_accessors() {
        let err = ApiError::from_status(reqwest::StatusCode::BAD_GATEWAY, "upstream down");
        assert_eq!(err.status_code(), Some(502));
        assert_eq!(err.body(), Some("upstream down"));

        assert_eq!(ApiError::Unauthorized.status_code(), Some(401));
        assert_eq!(ApiError::Unauthorized.body(), None);
    }

    #[test]
    fn long_bodies_are_truncated_on_a_char_boundary() {
        let body = "é".repeat(400); // 800 bytes of two-byte chars
        let err = ApiError::from_status(reqwest::StatusCode::INTERNAL_SERVER_ERROR, &body);
        let carried = err.body().unwrap();
        assert!(carried.contains("truncated, 800 total bytes"));
        assert!(carried.len() < body.len());
    }
}
