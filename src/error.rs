//! Defines the app level error type and its conversion to JSON error responses.
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

/// The errors that may occur in the application.
#[derive(Debug, Clone, thiserror::Error, PartialEq)]
pub enum Error {
    /// The client sent malformed input, e.g. a non-positive amount, an unknown
    /// transaction type or a blank budget name.
    ///
    /// The string describes what was wrong and is safe to show to the client.
    #[error("{0}")]
    Validation(String),

    /// The requested resource was not found.
    ///
    /// For HTTP request handlers, the client should check that the parameters
    /// (e.g., ID) are correct and that the resource has been created.
    ///
    /// Internally, this error may occur when a query returns no rows.
    #[error("the requested resource could not be found")]
    NotFound,

    /// No authenticated user could be resolved for a user scoped request.
    #[error("no authenticated user for this request")]
    Unauthorized,

    /// The underlying store failed, e.g. an unhandled SQL error or a row that
    /// could not be decoded.
    ///
    /// The error string should only be logged for debugging on the server.
    /// When communicating with the application client this error should be
    /// replaced with a general error type indicating an internal server error.
    #[error("the store is unavailable: {0}")]
    StoreUnavailable(String),

    /// Transactions could not be written as CSV.
    #[error("could not write CSV: {0}")]
    InvalidCsv(String),
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound,
            error => {
                tracing::error!("an unhandled SQL error occurred: {}", error);
                Error::StoreUnavailable(error.to_string())
            }
        }
    }
}

impl<T> From<std::sync::PoisonError<T>> for Error {
    fn from(_: std::sync::PoisonError<T>) -> Self {
        tracing::error!("the database lock was poisoned");
        Error::StoreUnavailable("could not acquire the database lock".to_owned())
    }
}

impl Error {
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            Error::Validation(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            Error::NotFound => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            Error::Unauthorized => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED"),
            Error::StoreUnavailable(_) | Error::InvalidCsv(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR")
            }
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();

        let message = match &self {
            Error::Validation(_) | Error::NotFound | Error::Unauthorized => {
                tracing::warn!("Rejected request: {self}");
                self.to_string()
            }
            // Any errors that are not handled above are not intended to be shown to the client.
            error => {
                tracing::error!("An unexpected error occurred: {error}");
                "Something went wrong".to_owned()
            }
        };

        (status, Json(json!({ "error": code, "message": message }))).into_response()
    }
}
