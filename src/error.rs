use axum::{
    http::StatusCode,
    response::{IntoResponse, Json},
};
use serde_json::json;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Missing required parameters: {0}")]
    MissingParameters(String),

    #[error("Failed to fetch {source_name}")]
    ContextFetchFailed {
        source_name: &'static str,
        #[source]
        source: sqlx::Error,
    },

    #[error("Failed to parse model output: {message}")]
    ModelParseFailed { message: String, raw_output: String },

    #[error("Failed to save generated questions")]
    PersistenceFailed(#[source] sqlx::Error),

    #[error("Database error: {0}")]
    Database(sqlx::Error),

    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),

    #[error("HTTP error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl IntoResponse for Error {
    fn into_response(self) -> axum::response::Response {
        let (status, error_message) = match self {
            Error::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg),
            Error::MissingParameters(msg) => (
                StatusCode::BAD_REQUEST,
                format!("Missing required parameters: {}", msg),
            ),
            Error::Validation(err) => (StatusCode::BAD_REQUEST, err.to_string()),
            Error::ContextFetchFailed { source_name, source } => {
                tracing::error!(error = ?source, "Error fetching {}", source_name);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    format!("Failed to fetch {}", source_name),
                )
            }
            Error::ModelParseFailed { message, raw_output } => {
                tracing::error!(%message, %raw_output, "Error parsing model response");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Failed to parse AI generated questions. Please try again.".to_string(),
                )
            }
            Error::PersistenceFailed(err) => {
                tracing::error!(error = ?err, "Error inserting generated questions");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Failed to save generated questions".to_string(),
                )
            }
            Error::Database(err) => (StatusCode::INTERNAL_SERVER_ERROR, err.to_string()),
            Error::Json(err) => (StatusCode::BAD_REQUEST, err.to_string()),
            Error::Reqwest(err) => (
                StatusCode::BAD_GATEWAY,
                format!("External service error: {}", err),
            ),
            Error::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
            Error::Io(err) => (StatusCode::INTERNAL_SERVER_ERROR, err.to_string()),
            _ => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "An unexpected error occurred".to_string(),
            ),
        };

        let body = Json(json!({ "error": error_message }));
        (status, body).into_response()
    }
}

impl From<sqlx::Error> for Error {
    fn from(err: sqlx::Error) -> Self {
        Error::Database(err)
    }
}
