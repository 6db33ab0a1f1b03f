//! G-Audit is a web app for tracking and auditing GCash wallet transactions.
//!
//! Employees record the transactions they make on behalf of the business and
//! owners review every employee's transactions with simple aggregations and
//! filters. This library provides a REST API that directly serves HTML pages.

#![warn(missing_docs)]

use std::{net::SocketAddr, time::Duration};

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_server::Handle;
use time::Date;
use tokio::signal;

mod alert;
mod app_state;
mod auth;
mod csv_import;
mod dashboard;
mod db;
mod employee;
mod endpoints;
mod forbidden;
mod html;
mod internal_server_error;
mod logging;
mod mock_data;
mod navigation;
mod not_found;
mod routing;
mod timezone;
mod transaction;

#[cfg(test)]
mod test_utils;

pub use app_state::AppState;
pub use auth::{
    InMemoryUserStore, Role, SQLiteUserStore, TokenClaims, User, UserID, UserStore, decode_token,
    encode_token,
};
pub use dashboard::DashboardConfig;
pub use db::initialize as initialize_db;
pub use employee::{Employee, EmployeeId};
pub use logging::{LOG_BODY_LENGTH_LIMIT, logging_middleware};
pub use mock_data::seed_mock_data;
pub use routing::build_router;
pub use transaction::{
    BalanceSummary, EmployeeFilter, EmployeeSummary, Transaction, TransactionFilter,
    TransactionId, TransactionStats, TransactionStatus, TransactionType, TypeFilter,
    apply_filters, balance_summary, compute_completed_stats, compute_stats, employee_summaries,
};

use crate::{
    alert::Alert, forbidden::get_403_forbidden_response,
    internal_server_error::InternalServerError, not_found::get_404_not_found_response,
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
    /// The log-in request did not include an email or a password.
    #[error("email and password required")]
    MissingCredentials,

    /// The password did not match the password stored for the email.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// A user with the email already exists in the user store.
    #[error("a user with the email \"{0}\" already exists")]
    DuplicateEmail(String),

    /// An unexpected error occurred with the underlying hashing library.
    ///
    /// The error string should only be logged for debugging on the server.
    /// When communicating with the application client this error should be
    /// replaced with a general error type indicating an internal server error.
    #[error("hashing failed: {0}")]
    HashingError(String),

    /// The session cookie is missing from the cookie jar in the request.
    #[error("no session cookie in the cookie jar :(")]
    CookieMissing,

    /// The session cookie could not be decoded into a complete session.
    #[error("invalid session: {0}")]
    InvalidSession(String),

    /// The session in the cookie has expired.
    #[error("the session has expired")]
    SessionExpired,

    /// An API token could not be decoded.
    #[error("invalid token: {0}")]
    InvalidToken(String),

    /// The user's role does not allow access to the resource.
    #[error("the user is not allowed to access this resource")]
    Forbidden,

    /// The requested resource was not found.
    ///
    /// For HTTP request handlers, the client should check that the parameters
    /// (e.g., ID) are correct and that the resource has been created.
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

    /// An error occurred while getting the local timezone from a canonical timezone string.
    #[error("invalid timezone {0}")]
    InvalidTimezoneError(String),

    /// A string that is not one of "inbound" or "outbound".
    #[error("\"{0}\" is not a valid transaction type, expected inbound or outbound")]
    InvalidTransactionType(String),

    /// A string that is not one of "pending", "completed" or "failed".
    #[error(
        "\"{0}\" is not a valid transaction status, expected pending, completed or failed"
    )]
    InvalidTransactionStatus(String),

    /// A string that is not one of "employee" or "owner".
    #[error("\"{0}\" is not a valid role, expected employee or owner")]
    InvalidRole(String),

    /// A transaction amount was negative (or not a number).
    ///
    /// The direction of a transaction is given by its type, so amounts are
    /// always zero or greater.
    #[error("{0} is not a valid amount, amounts must be zero or greater")]
    NegativeAmount(f64),

    /// A date could not be parsed or formatted.
    #[error("invalid date: {0}")]
    InvalidDate(String),

    /// A date in the future was used to create a transaction.
    ///
    /// Transactions record events that have already happened, therefore future
    /// dates are not allowed.
    #[error("{0} is a date in the future, which is not allowed")]
    FutureDate(Date),

    /// A transaction referenced an employee that does not exist.
    #[error("the employee does not exist")]
    UnknownEmployee,

    /// The specified employee email already exists in the database.
    #[error("the employee email \"{0}\" already exists in the database")]
    DuplicateEmployeeEmail(String),

    /// An empty string was used for an employee name.
    #[error("employee name cannot be empty")]
    EmptyEmployeeName,

    /// An empty string was used for an employee email.
    #[error("employee email cannot be empty")]
    EmptyEmployeeEmail,

    /// The multipart form could not be parsed as a list of CSV files.
    #[error("Could not parse multipart form: {0}")]
    MultipartError(String),

    /// The multipart form did not contain a CSV file.
    #[error("File is not a CSV")]
    NotCSV,

    /// The CSV had issues that prevented it from being parsed.
    #[error("Could not parse the CSV file: {0}")]
    InvalidCSV(String),

    /// An error occurred while serializing a struct as JSON
    #[error("could not serialize as JSON: {0}")]
    JSONSerializationError(String),
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            // Code 787 occurs when a FOREIGN KEY constraint failed.
            rusqlite::Error::SqliteFailure(sql_error, _) if sql_error.extended_code == 787 => {
                Error::UnknownEmployee
            }
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound,
            error => {
                tracing::error!("an unhandled SQL error occurred: {}", error);
                Error::SqlError(error)
            }
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        match self {
            Error::NotFound => get_404_not_found_response(),
            Error::Forbidden => get_403_forbidden_response(),
            Error::InvalidTimezoneError(timezone) => InternalServerError {
                description: "Invalid Timezone Settings",
                fix: &format!(
                    "Could not get local timezone \"{timezone}\". Check your server settings and \
                    ensure the timezone has been set to valid, canonical timezone string"
                ),
            }
            .into_response(),
            Error::DatabaseLockError => InternalServerError::default().into_response(),
            // Any errors that are not handled above are not intended to be shown to the client.
            error => {
                tracing::error!("An unexpected error occurred: {}", error);
                InternalServerError::default().into_response()
            }
        }
    }
}

impl Error {
    fn into_alert_response(self) -> Response {
        let (status, alert) = match self {
            Error::InvalidTimezoneError(timezone) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Alert::Error {
                    message: "Invalid Timezone Settings".to_owned(),
                    details: format!(
                        "Could not get local timezone \"{timezone}\". Check your server settings and \
                        ensure the timezone has been set to valid, canonical timezone string"
                    ),
                },
            ),
            Error::FutureDate(date) => (
                StatusCode::BAD_REQUEST,
                Alert::Error {
                    message: "Invalid transaction date".to_owned(),
                    details: format!(
                        "{date} is a date in the future, which is not allowed. \
                        Change the date to today or earlier."
                    ),
                },
            ),
            Error::NegativeAmount(amount) => (
                StatusCode::BAD_REQUEST,
                Alert::Error {
                    message: "Invalid amount".to_owned(),
                    details: format!(
                        "{amount} is not a valid amount. \
                        Enter zero or more and pick inbound or outbound for the direction."
                    ),
                },
            ),
            Error::UnknownEmployee => (
                StatusCode::BAD_REQUEST,
                Alert::Error {
                    message: "Unknown employee".to_owned(),
                    details: "Your account is not linked to an employee. \
                        Try logging out and logging in again as an employee."
                        .to_owned(),
                },
            ),
            Error::DuplicateEmployeeEmail(email) => (
                StatusCode::BAD_REQUEST,
                Alert::Error {
                    message: "Duplicate Employee Email".to_owned(),
                    details: format!(
                        "An employee with the email {email} already exists. \
                        Choose a different email address."
                    ),
                },
            ),
            Error::EmptyEmployeeName => (
                StatusCode::BAD_REQUEST,
                Alert::ErrorSimple {
                    message: "Employee name cannot be empty.".to_owned(),
                },
            ),
            Error::EmptyEmployeeEmail => (
                StatusCode::BAD_REQUEST,
                Alert::ErrorSimple {
                    message: "Employee email cannot be empty.".to_owned(),
                },
            ),
            Error::NotCSV => (
                StatusCode::BAD_REQUEST,
                Alert::ErrorSimple {
                    message: "File type must be CSV.".to_owned(),
                },
            ),
            Error::InvalidCSV(details) => (
                StatusCode::BAD_REQUEST,
                Alert::Error {
                    message: "Failed to parse CSV".to_owned(),
                    details,
                },
            ),
            Error::MultipartError(details) => (
                StatusCode::BAD_REQUEST,
                Alert::Error {
                    message: "Could not read the uploaded files".to_owned(),
                    details,
                },
            ),
            Error::Forbidden => (
                StatusCode::FORBIDDEN,
                Alert::ErrorSimple {
                    message: "You are not allowed to do that.".to_owned(),
                },
            ),
            error => {
                tracing::error!("An unexpected error occurred: {}", error);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Alert::Error {
                        message: "Something went wrong".to_owned(),
                        details: "An unexpected error occurred, check the server logs for more details."
                            .to_owned(),
                    },
                )
            }
        };

        (status, alert.into_html()).into_response()
    }
}
