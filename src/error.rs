use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use log::error;
use thiserror::Error;

/// Failures a handler cannot render inline on its own page.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("failed to encode CSV export: {0}")]
    Export(#[from] csv::Error),
    #[error("malformed upload: {0}")]
    Upload(String),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Export(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Upload(_) => StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!("{}", self);
        }
        (status, self.to_string()).into_response()
    }
}
