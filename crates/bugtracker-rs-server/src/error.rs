//! API error type and its translation to HTTP responses.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use bugtracker_rs_protocol::{ErrorBody, FieldError};
use bugtracker_rs_store::StoreError;
use thiserror::Error;

/// Errors a handler can return. Each variant maps to one status code and
/// error body.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Invalid bug ID format")]
    InvalidId,
    #[error("Bug not found")]
    NotFound,
    #[error("Route not found")]
    RouteNotFound,
    #[error("Validation failed")]
    Validation(Vec<String>),
    #[error("Invalid JSON payload")]
    MalformedJson,
    #[error("Internal server error")]
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::InvalidId | ApiError::Validation(_) | ApiError::MalformedJson => {
                StatusCode::BAD_REQUEST
            }
            ApiError::NotFound | ApiError::RouteNotFound => StatusCode::NOT_FOUND,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(_) => ApiError::NotFound,
            StoreError::InvalidId(_) => ApiError::InvalidId,
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl From<FieldError> for ApiError {
    fn from(err: FieldError) -> Self {
        ApiError::Validation(vec![err.to_string()])
    }
}

/// Detail of a 500, attached to the response so the request logger can
/// report it next to the method and URI.
#[derive(Debug, Clone)]
pub struct InternalErrorMessage(pub String);

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let mut body = ErrorBody::new(self.to_string());
        let internal = match self {
            ApiError::Validation(details) => {
                body.details = Some(details);
                None
            }
            ApiError::Internal(message) => Some(InternalErrorMessage(message)),
            _ => None,
        };
        let mut response = (status, Json(body)).into_response();
        if let Some(message) = internal {
            response.extensions_mut().insert(message);
        }
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bugtracker_rs_protocol::BugField;
    use pretty_assertions::assert_eq;

    #[test]
    fn store_errors_translate() {
        assert!(matches!(
            ApiError::from(StoreError::InvalidId("x".into())),
            ApiError::InvalidId
        ));
        let err = ApiError::from(StoreError::Serialization("boom".into()));
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(matches!(err, ApiError::Internal(message) if message.contains("boom")));
    }

    #[test]
    fn field_error_becomes_validation_detail() {
        let err = ApiError::from(FieldError::Empty(BugField::Title));
        match err {
            ApiError::Validation(details) => assert_eq!(details, vec!["Title cannot be empty"]),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn internal_detail_is_attached_not_rendered() {
        let response = ApiError::Internal("db down".into()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let detail = response.extensions().get::<InternalErrorMessage>();
        assert_eq!(detail.map(|d| d.0.as_str()), Some("db down"));
    }
}
