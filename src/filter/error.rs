//! Errors raised while filtering a response.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

/// Failure of a response filter. Converted into the error response sent to
/// the client in place of the downstream response.
#[derive(Debug, thiserror::Error)]
pub enum FilterError {
    /// The downstream body stream failed before completing.
    #[error("upstream body failed: {0}")]
    Upstream(#[source] axum::Error),

    #[error("document exceeds {limit} bytes")]
    DocumentTooLarge { limit: usize },

    #[error("document is not valid JSON: {0}")]
    InvalidDocument(#[from] serde_json::Error),

    #[error("document root is not a JSON object")]
    NotAnObject,

    #[error("failed to gzip rewritten document: {0}")]
    Compression(#[source] std::io::Error),

    /// An interceptor is bound to exactly one response.
    #[error("interceptor already consumed a body")]
    AlreadyWritten,
}

impl FilterError {
    pub fn status(&self) -> StatusCode {
        match self {
            FilterError::Upstream(_) | FilterError::DocumentTooLarge { .. } => StatusCode::BAD_GATEWAY,
            FilterError::InvalidDocument(_)
            | FilterError::NotAnObject
            | FilterError::Compression(_)
            | FilterError::AlreadyWritten => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for FilterError {
    fn into_response(self) -> Response {
        let message = match self.status() {
            StatusCode::BAD_GATEWAY => "Invalid upstream response",
            _ => "Failed to process upstream response",
        };
        (self.status(), message).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_to_status_codes() {
        assert_eq!(FilterError::DocumentTooLarge { limit: 1 }.status(), StatusCode::BAD_GATEWAY);
        assert_eq!(FilterError::NotAnObject.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let parse_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let response = FilterError::from(parse_err).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
