use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};
use ontobrowse_models::{ConstraintError, PaginationError};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BrowserError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Unprocessable(String),

    #[error("{0}")]
    BuildFailed(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Template error: {0}")]
    Template(#[from] minijinja::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl BrowserError {
    fn category(&self) -> &'static str {
        match self {
            BrowserError::BadRequest(_) => "Bad Request",
            BrowserError::NotFound(_) => "Not Found",
            BrowserError::Unprocessable(_) => "Unprocessable Entity",
            BrowserError::BuildFailed(_) => "Database Build Failed",
            BrowserError::Database(_) => "Database Error",
            BrowserError::Template(_) => "Template Error",
            BrowserError::Io(_) => "IO Error",
            BrowserError::Internal(_) => "Internal Server Error",
        }
    }
}

impl ResponseError for BrowserError {
    fn status_code(&self) -> StatusCode {
        match self {
            BrowserError::BadRequest(_) => StatusCode::BAD_REQUEST,
            BrowserError::NotFound(_) => StatusCode::NOT_FOUND,
            BrowserError::Unprocessable(_) => StatusCode::UNPROCESSABLE_ENTITY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(serde_json::json!({
            "error": self.category(),
            "message": self.to_string()
        }))
    }
}

impl From<ConstraintError> for BrowserError {
    fn from(err: ConstraintError) -> Self {
        BrowserError::Unprocessable(err.to_string())
    }
}

impl From<PaginationError> for BrowserError {
    fn from(err: PaginationError) -> Self {
        BrowserError::BadRequest(err.to_string())
    }
}

pub type BrowserResult<T> = Result<T, BrowserError>;
