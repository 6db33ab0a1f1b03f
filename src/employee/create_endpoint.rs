//! Defines the endpoint for adding an employee.

use std::sync::{Arc, Mutex};

use axum::{
    Form,
    extract::{FromRef, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_htmx::HxRedirect;
use rusqlite::Connection;
use serde::Deserialize;

use crate::{
    AppState, Error,
    employee::{EmployeeId, create_employee},
    endpoints,
};

/// The state needed for adding an employee.
#[derive(Debug, Clone)]
pub struct CreateEmployeeState {
    /// The database connection for managing employees.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for CreateEmployeeState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The form data for adding an employee.
#[derive(Debug, Clone, Deserialize)]
pub struct EmployeeForm {
    /// The employee's full name.
    pub name: String,
    /// The email the employee logs in with.
    pub email: String,
}

/// A route handler for adding an employee, redirects to the owner dashboard on success.
pub async fn create_employee_endpoint(
    State(state): State<CreateEmployeeState>,
    Form(form): Form<EmployeeForm>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    match create_employee(EmployeeId::generate(), &form.name, &form.email, &connection) {
        Ok(employee) => {
            tracing::info!("Added employee {} ({})", employee.name, employee.id);
            (
                HxRedirect(endpoints::OWNER_DASHBOARD_VIEW.to_owned()),
                StatusCode::SEE_OTHER,
            )
                .into_response()
        }
        Err(error) => error.into_alert_response(),
    }
}
