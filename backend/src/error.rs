use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use shared::ApiError;
use thiserror::Error;

use crate::store::StoreError;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    Validation(String),
    #[error("Failed to geocode start or end")]
    Geocode,
    #[error("No route found")]
    NoRoute,
    #[error("{0}")]
    NotFound(String),
    #[error("upstream service error: {0}")]
    Upstream(String),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("failed to build GPX document: {0}")]
    Gpx(#[from] gpx::errors::GpxError),
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_) | AppError::Geocode => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) | AppError::Store(StoreError::NotFound(_)) => {
                StatusCode::NOT_FOUND
            }
            AppError::NoRoute
            | AppError::Upstream(_)
            | AppError::Store(_)
            | AppError::Gpx(_)
            | AppError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        AppError::Upstream(err.to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!("request failed: {self}");
        } else {
            tracing::debug!("request rejected: {self}");
        }

        (
            status,
            Json(ApiError {
                error: self.to_string(),
            }),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_mapping() {
        assert_eq!(AppError::Validation("x".into()).status(), StatusCode::BAD_REQUEST);
        assert_eq!(AppError::Geocode.status(), StatusCode::BAD_REQUEST);
        assert_eq!(AppError::NoRoute.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(AppError::Upstream("timeout".into()).status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            AppError::Store(StoreError::NotFound("favorites".into())).status(),
            StatusCode::NOT_FOUND
        );
    }

    #[test]
    fn stored_state_encoding_failure_is_a_server_error() {
        let err = serde_json::from_str::<Vec<String>>("{").unwrap_err();
        let app_err = AppError::from(StoreError::from(err));
        assert_eq!(app_err.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn messages_match_collaborator_contract() {
        assert_eq!(AppError::Geocode.to_string(), "Failed to geocode start or end");
        assert_eq!(AppError::NoRoute.to_string(), "No route found");
    }
}
