use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use saffron_core::StoreError;
use thiserror::Error;

use crate::api::ErrorResponse;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0} not found")]
    NotFound(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ApiError::NotFound(_) => (StatusCode::NOT_FOUND, self.to_string()),
            ApiError::Store(e) => {
                tracing::error!(error = %e, "store request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    match e {
                        StoreError::Connection(_) => "Database connection failed",
                        StoreError::Query(_) => "Database query failed",
                    }
                    .to_string(),
                )
            }
        };

        (status, Json(ErrorResponse { error: message })).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        let response = ApiError::NotFound("Category 7".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let response =
            ApiError::from(StoreError::Connection("pool timed out".to_string())).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
