//! Defines the endpoint for entering a transaction by hand.
use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
// Must use axum_extra's Form since that parses an empty string as None instead
// of crashing like axum::Form.
use axum_extra::extract::Form;
use axum_htmx::HxRedirect;
use rusqlite::Connection;
use serde::Deserialize;
use time::{Date, OffsetDateTime, PrimitiveDateTime, Time, UtcOffset};

use crate::{
    AppState, Error,
    auth::Session,
    employee::get_employee_by_email,
    endpoints,
    timezone::get_local_offset,
    transaction::{Transaction, TransactionStatus, TransactionType, core::create_transaction},
};

/// The state needed to create a transaction.
#[derive(Debug, Clone)]
pub struct CreateTransactionState {
    /// The database connection for managing transactions.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The local timezone as a canonical timezone name, e.g. "Asia/Manila".
    pub local_timezone: String,
}

impl FromRef<AppState> for CreateTransactionState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// The form data for creating a transaction.
#[derive(Debug, Deserialize)]
pub struct TransactionForm {
    /// Whether the money came in or went out.
    #[serde(rename = "type")]
    pub transaction_type: TransactionType,
    /// The amount of money that moved.
    pub amount: f64,
    /// The external reference, e.g. an invoice number.
    #[serde(default)]
    pub reference: String,
    /// Text detailing the transaction.
    #[serde(default)]
    pub description: String,
    /// The date when the transaction ocurred.
    pub date: Date,
    /// Defaults to completed when not given.
    #[serde(default)]
    pub status: Option<TransactionStatus>,
}

/// The moment to record for a transaction entered for `date`.
///
/// Transactions entered for today keep the current time so they sort above
/// earlier entries, older dates are recorded at local midnight.
fn transaction_datetime(date: Date, now_local: OffsetDateTime, offset: UtcOffset) -> OffsetDateTime {
    if date == now_local.date() {
        now_local
    } else {
        PrimitiveDateTime::new(date, Time::MIDNIGHT).assume_offset(offset)
    }
}

/// A route handler for creating a transaction for the logged-in employee,
/// redirects to the employee dashboard on success.
pub async fn create_transaction_endpoint(
    State(state): State<CreateTransactionState>,
    Extension(session): Extension<Session>,
    Form(form): Form<TransactionForm>,
) -> Response {
    let Some(local_offset) = get_local_offset(&state.local_timezone) else {
        tracing::error!("Invalid timezone {}", state.local_timezone);
        return Error::InvalidTimezoneError(state.local_timezone).into_alert_response();
    };

    let now_local = OffsetDateTime::now_utc().to_offset(local_offset);

    if form.date > now_local.date() {
        tracing::error!("Tried to create a transaction with the future date {}", form.date);
        return Error::FutureDate(form.date).into_alert_response();
    }

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    let employee = match get_employee_by_email(&session.email, &connection) {
        Ok(employee) => employee,
        Err(Error::NotFound) => {
            tracing::error!("No employee record for {}", session.email);
            return Error::UnknownEmployee.into_alert_response();
        }
        Err(error) => return error.into_alert_response(),
    };

    let transaction = Transaction::build(
        form.transaction_type,
        form.amount,
        transaction_datetime(form.date, now_local, local_offset),
    )
    .reference(form.reference.trim())
    .description(form.description.trim())
    .status(form.status.unwrap_or_default())
    .employee_id(Some(employee.id));

    match create_transaction(transaction, &connection) {
        Ok(transaction) => {
            tracing::info!(
                "{} recorded {} transaction {}",
                session.email,
                transaction.transaction_type,
                transaction.id
            );
            (
                HxRedirect(endpoints::EMPLOYEE_DASHBOARD_VIEW.to_owned()),
                StatusCode::SEE_OTHER,
            )
                .into_response()
        }
        Err(error) => {
            tracing::error!("could not create transaction: {error}");
            error.into_alert_response()
        }
    }
}
