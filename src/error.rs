use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Classified failures surfaced to the caller as a status code plus message.
/// No partial-success states: every handler either completes or fails with
/// exactly one of these.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    Conflict(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Authentication(String),
    #[error("{0}")]
    InvalidToken(String),
    #[error("{0}")]
    Delivery(String),
    #[error("{0}")]
    InvalidState(String),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl AuthError {
    pub fn status(&self) -> StatusCode {
        match self {
            AuthError::Validation(_)
            | AuthError::Conflict(_)
            | AuthError::Authentication(_)
            | AuthError::InvalidState(_) => StatusCode::BAD_REQUEST,
            AuthError::NotFound(_) | AuthError::InvalidToken(_) => StatusCode::NOT_FOUND,
            AuthError::Delivery(_) | AuthError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<sqlx::Error> for AuthError {
    fn from(e: sqlx::Error) -> Self {
        AuthError::Internal(e.into())
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self {
            // Internal details are logged, never exposed
            AuthError::Internal(e) => {
                tracing::error!(error = %e, "internal error");
                "Something went very wrong".to_string()
            }
            AuthError::Delivery(msg) => {
                tracing::error!(error = %msg, "email delivery failed");
                msg.clone()
            }
            other => other.to_string(),
        };
        (status, Json(ErrorBody { error: message })).into_response()
    }
}
