use axum::{
    extract::{
        multipart::{MultipartError, MultipartRejection},
        rejection::{JsonRejection, QueryRejection},
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::{error, warn};

use crate::clients::ProviderError;

pub type Result<T> = core::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    BadRequest(String),
    /// A third-party call failed. Only the provider name reaches the client.
    #[error("{provider} request failed")]
    ExternalService {
        provider: &'static str,
        #[source]
        source: ProviderError,
    },
    #[error("Internal AI generation error.")]
    Generation(#[source] ProviderError),
    #[error("Database error")]
    DatabaseError(#[source] sqlx::Error),
    #[error("File system error")]
    Io(#[source] std::io::Error),
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("Internal server error")]
    InternalServerError,
}

impl Error {
    pub fn post_not_found(post_id: &str) -> Self {
        Self::NotFound(format!("Post with ID '{}' not found.", post_id))
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::ExternalService { .. }
            | Self::Generation(_)
            | Self::DatabaseError(_)
            | Self::Io(_)
            | Self::Config(_)
            | Self::InternalServerError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            error!(error = ?self, "Request failed: {}", self);
        } else {
            warn!(status = status.as_u16(), "Request rejected: {}", self);
        }

        let body = Json(json!({ "status": "error", "message": self.to_string() }));
        (status, body).into_response()
    }
}

impl From<sqlx::Error> for Error {
    fn from(err: sqlx::Error) -> Self {
        error!("Database error: {:?}", err);
        Self::DatabaseError(err)
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        error!("File system error: {:?}", err);
        Self::Io(err)
    }
}

impl From<validator::ValidationErrors> for Error {
    fn from(err: validator::ValidationErrors) -> Self {
        Self::BadRequest(err.to_string())
    }
}

impl From<JsonRejection> for Error {
    fn from(rejection: JsonRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for Error {
    fn from(rejection: QueryRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl From<MultipartRejection> for Error {
    fn from(rejection: MultipartRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl From<MultipartError> for Error {
    fn from(err: MultipartError) -> Self {
        Self::BadRequest(err.body_text())
    }
}
