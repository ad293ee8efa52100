use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

/// Shown in place of results for any failure that carries no provider message
pub const FETCH_FAILED_MESSAGE: &str = "Error fetching movies. Please try again later.";

/// Shown by the detail view for anything but a missing movie
pub const DETAIL_FAILED_MESSAGE: &str = "Failed to fetch movie details";

/// Application-level errors
#[derive(thiserror::Error, Debug)]
pub enum AppError {
    #[error("Cache error: {0}")]
    Cache(#[from] redis::RedisError),

    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Upstream answered with a non-success status
    #[error("External API error: {0}")]
    ExternalApi(String),

    /// Upstream answered 200 but flagged the request as failed
    #[error("Provider reported failure: {0}")]
    SoftFailure(String),

    #[error("Document store error: {0}")]
    DocumentStore(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl AppError {
    /// The single message a user sees for a failed fetch
    pub fn user_message(&self) -> String {
        match self {
            AppError::SoftFailure(msg) | AppError::NotFound(msg) | AppError::InvalidInput(msg) => {
                msg.clone()
            }
            _ => FETCH_FAILED_MESSAGE.to_string(),
        }
    }

    /// The message the detail view shows for a failed lookup
    pub fn detail_message(&self) -> String {
        match self {
            AppError::NotFound(msg) => msg.clone(),
            _ => DETAIL_FAILED_MESSAGE.to_string(),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            AppError::Cache(_) | AppError::DocumentStore(_) | AppError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            AppError::ExternalApi(_) | AppError::HttpClient(_) | AppError::SoftFailure(_) => {
                StatusCode::BAD_GATEWAY
            }
        }
    }

    /// Same status as [`IntoResponse`], with the detail view's message
    pub fn into_detail_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::warn!(error = %self, "Movie detail request failed");
        }
        error_body(status, self.detail_message())
    }
}

fn error_body(status: StatusCode, message: String) -> Response {
    let body = Json(json!({
        "error": message
    }));

    (status, body).into_response()
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match self {
            AppError::NotFound(msg) | AppError::InvalidInput(msg) | AppError::SoftFailure(msg) => {
                msg
            }
            AppError::Cache(_) | AppError::DocumentStore(_) | AppError::Internal(_) => {
                self.to_string()
            }
            AppError::ExternalApi(_) | AppError::HttpClient(_) => {
                tracing::warn!(error = %self, "Upstream request failed");
                FETCH_FAILED_MESSAGE.to_string()
            }
        };

        error_body(status, message)
    }
}

pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_soft_failure_keeps_provider_message() {
        let err = AppError::SoftFailure("Invalid page: Pages start at 1".to_string());
        assert_eq!(err.user_message(), "Invalid page: Pages start at 1");
    }

    #[test]
    fn test_transport_errors_share_one_message() {
        let err = AppError::ExternalApi("API returned status 500".to_string());
        assert_eq!(err.user_message(), FETCH_FAILED_MESSAGE);
        assert_eq!(
            AppError::Internal("join".to_string()).user_message(),
            FETCH_FAILED_MESSAGE
        );
    }

    #[test]
    fn test_status_mapping() {
        let response = AppError::NotFound("Movie 1 not found".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let response = AppError::InvalidInput("page must be >= 1".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response = AppError::ExternalApi("boom".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn test_detail_message() {
        assert_eq!(
            AppError::ExternalApi("500".to_string()).detail_message(),
            DETAIL_FAILED_MESSAGE
        );
        assert_eq!(
            AppError::SoftFailure("Invalid id".to_string()).detail_message(),
            DETAIL_FAILED_MESSAGE
        );
        assert_eq!(
            AppError::NotFound("Movie 1 not found".to_string()).detail_message(),
            "Movie 1 not found"
        );
    }

    #[test]
    fn test_detail_response_keeps_status() {
        let response = AppError::ExternalApi("boom".to_string()).into_detail_response();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);

        let response = AppError::NotFound("Movie 1 not found".to_string()).into_detail_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
