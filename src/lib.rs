//! Finboard is the backend for a financial transactions dashboard.
//!
//! This library provides a JSON API for logging in, listing and filtering
//! transactions, exporting them as CSV and summarising them for charts.

#![warn(missing_docs)]

use std::{net::SocketAddr, time::Duration};

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_server::Handle;
use serde::Serialize;
use tokio::signal;

mod analytics;
mod app_state;
mod auth;
mod db;
mod endpoints;
mod export;
mod logging;
mod pagination;
mod routing;
mod transaction;

#[cfg(test)]
mod test_utils;

pub use analytics::{AnalyticsSummary, MonthKey, MonthlyTotals, summarize, validate_records};
pub use app_state::AppState;
pub use auth::{PasswordHash, User, UserID, ValidatedPassword};
pub use db::initialize as initialize_db;
pub use logging::{LOG_BODY_LENGTH_LIMIT, logging_middleware};
pub use pagination::PaginationConfig;
pub use routing::build_router;
pub use transaction::{
    TransactionFilter, TransactionRecord, count_transactions, create_transaction,
    delete_all_transactions, get_transactions,
};

/// An async task that waits for either the ctrl+c or terminate signal, whichever comes first, and
/// then signals the server to shut down gracefully.
///
/// `handle` is a handle to an Axum `Server`.
pub async fn graceful_shutdown(handle: Handle<SocketAddr>) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::debug!("Received ctrl+c signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
        _ = terminate => {
            tracing::debug!("Received terminate signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
    }
}

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// The username or password did not match a registered user.
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// A registration request was missing the username, email or password.
    #[error("All fields are required")]
    MissingFields,

    /// A user with the same username or email is already registered.
    #[error("User already exists")]
    UserAlreadyExists,

    /// The user provided a password that is too easy to guess.
    #[error("password is too weak: {0}")]
    TooWeak(String),

    /// An unexpected error occurred with the underlying hashing library.
    ///
    /// The error string should only be logged for debugging on the server.
    /// When communicating with the application client this error should be
    /// replaced with a general error type indicating an internal server error.
    #[error("hashing failed: {0}")]
    HashingError(String),

    /// The request did not carry a valid, unexpired auth token.
    #[error("authentication required")]
    Unauthorized,

    /// The auth token could not be serialized or its expiry could not be computed.
    #[error("could not create the auth token: {0}")]
    CookieError(String),

    /// A transaction date does not start with a valid `YYYY-MM` month key.
    ///
    /// Holds the offending date string.
    #[error("\"{0}\" is not a valid ISO date, expected it to start with YYYY-MM")]
    InvalidDate(String),

    /// A transaction with the same ID already exists in the database.
    #[error("a transaction with the ID {0} already exists")]
    DuplicateTransactionId(i64),

    /// A CSV export matched no transactions.
    #[error("No transactions found")]
    NoTransactionsFound,

    /// The requested resource was not found.
    ///
    /// Internally, this error may occur when a query returns no rows.
    #[error("the requested resource could not be found")]
    NotFound,

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),

    /// Could not acquire the database lock
    #[error("could not acquire the database lock")]
    DatabaseLockError,

    /// The CSV export could not be written.
    #[error("could not write CSV: {0}")]
    CsvError(String),
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound,
            error => {
                tracing::error!("an unhandled SQL error occurred: {}", error);
                Error::SqlError(error)
            }
        }
    }
}

/// The JSON body sent to the client when a request fails.
#[derive(Debug, Serialize)]
pub(crate) struct ErrorResponse {
    pub error: String,
}

impl Error {
    fn status_code(&self) -> StatusCode {
        match self {
            Error::InvalidCredentials
            | Error::MissingFields
            | Error::UserAlreadyExists
            | Error::TooWeak(_) => StatusCode::BAD_REQUEST,
            Error::Unauthorized => StatusCode::UNAUTHORIZED,
            Error::NotFound | Error::NoTransactionsFound => StatusCode::NOT_FOUND,
            Error::DuplicateTransactionId(_) => StatusCode::CONFLICT,
            Error::InvalidDate(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Error::HashingError(_)
            | Error::CookieError(_)
            | Error::SqlError(_)
            | Error::DatabaseLockError
            | Error::CsvError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status_code();

        let message = if status.is_server_error() {
            // Internal details are only intended for the server logs.
            tracing::error!("An unexpected error occurred: {}", self);
            "Server error".to_owned()
        } else {
            self.to_string()
        };

        (status, Json(ErrorResponse { error: message })).into_response()
    }
}

#[cfg(test)]
mod error_tests {
    use axum::{http::StatusCode, response::IntoResponse};

    use crate::Error;

    #[tokio::test]
    async fn client_errors_include_message() {
        let response = Error::NoTransactionsFound.into_response();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(body, r#"{"error":"No transactions found"}"#);
    }

    #[tokio::test]
    async fn server_errors_hide_details() {
        let response = Error::CsvError("disk on fire".to_owned()).into_response();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(body, r#"{"error":"Server error"}"#);
    }

    #[test]
    fn no_rows_maps_to_not_found() {
        assert_eq!(
            Error::from(rusqlite::Error::QueryReturnedNoRows),
            Error::NotFound
        );
    }
}
