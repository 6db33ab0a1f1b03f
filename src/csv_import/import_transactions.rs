use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, Multipart, State, multipart::Field},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use rusqlite::Connection;
use time::OffsetDateTime;

use crate::{
    AppState, Error,
    alert::Alert,
    auth::Session,
    csv_import::csv::parse_csv,
    employee::{EmployeeId, get_employee_by_email},
    timezone::local_offset_or_error,
    transaction::{Transaction, TransactionBuilder, create_transaction},
};

/// The state needed for importing transactions.
#[derive(Debug, Clone)]
pub struct ImportState {
    /// The database connection for managing transactions.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The local timezone as a canonical timezone name, e.g. "Asia/Manila".
    pub local_timezone: String,
}

impl FromRef<AppState> for ImportState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// Route handler for importing transactions from CSV files.
///
/// Every row of every uploaded file is parsed before anything is stored, then
/// all rows are inserted for the logged-in employee in a single database
/// transaction. Nothing is imported if any file or row is invalid.
pub async fn import_transactions(
    State(state): State<ImportState>,
    Extension(session): Extension<Session>,
    mut multipart: Multipart,
) -> Result<Response, Response> {
    let local_offset =
        local_offset_or_error(&state.local_timezone).map_err(Error::into_alert_response)?;
    let today = OffsetDateTime::now_utc().to_offset(local_offset).date();

    let mut transactions = Vec::new();
    let mut file_count = 0;

    while let Some(field) = multipart
        .next_field()
        .await
        .inspect_err(|error| tracing::error!("Could not read multipart form: {error}"))
        .map_err(|error| Error::MultipartError(error.body_text()).into_alert_response())?
    {
        let csv_data = parse_multipart_field(field)
            .await
            .map_err(Error::into_alert_response)?;

        let parsed = parse_csv(&csv_data, local_offset, today)
            .inspect_err(|error| tracing::debug!("Failed to parse CSV: {}", error))
            .map_err(Error::into_alert_response)?;

        transactions.extend(parsed);
        file_count += 1;
    }

    if file_count == 0 {
        return Err(
            Error::MultipartError("No files were uploaded.".to_owned()).into_alert_response(),
        );
    }

    let connection = state.db_connection.lock().map_err(|error| {
        tracing::error!("could not acquire database lock: {error}");
        Error::DatabaseLockError.into_alert_response()
    })?;

    let employee = match get_employee_by_email(&session.email, &connection) {
        Ok(employee) => employee,
        Err(Error::NotFound) => {
            tracing::error!("No employee record for {}", session.email);
            return Err(Error::UnknownEmployee.into_alert_response());
        }
        Err(error) => return Err(error.into_alert_response()),
    };

    let tx = connection
        .unchecked_transaction()
        .inspect_err(|error| tracing::error!("could not start transaction: {error}"))
        .map_err(|_| {
            Alert::ErrorSimple {
                message: "Could not import transactions".to_owned(),
            }
            .into_response()
        })?;

    let imported_transactions = import_transaction_list(transactions, &employee.id, &tx)
        .inspect_err(|error| tracing::error!("Failed to import transactions: {}", error))
        .map_err(|_| {
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Alert::Error {
                    message: "Import failed".to_owned(),
                    details: "An unexpected error occurred, please try again later".to_owned(),
                }
                .into_html(),
            )
                .into_response()
        })?;

    tx.commit()
        .inspect_err(|error| tracing::error!("could not commit transaction: {error}"))
        .map_err(|_| {
            Alert::ErrorSimple {
                message: "Could not import transactions".to_owned(),
            }
            .into_response()
        })?;

    tracing::info!(
        "{} imported {} transactions from {} file(s)",
        session.email,
        imported_transactions.len(),
        file_count
    );

    let alert = Alert::Success {
        message: "Import successful".to_owned(),
        details: format!(
            "Imported {} transactions from {} file(s).",
            imported_transactions.len(),
            file_count
        ),
    };

    Ok((StatusCode::CREATED, alert.into_html()).into_response())
}

async fn parse_multipart_field(field: Field<'_>) -> Result<String, Error> {
    if field.content_type() != Some("text/csv") {
        return Err(Error::NotCSV);
    }

    let file_name = match field.file_name() {
        Some(file_name) => file_name.to_owned(),
        None => {
            tracing::error!("Could not get file name from multipart form field: {field:#?}");
            return Err(Error::MultipartError(
                "Could not get file name from multipart form field".to_owned(),
            ));
        }
    };

    let data = field.text().await.map_err(|error| {
        tracing::error!("Could not read data from multipart form field: {error}");
        Error::MultipartError("Could not read data from multipart form field.".to_owned())
    })?;

    tracing::debug!("Received file '{}' that is {} bytes", file_name, data.len());

    Ok(data)
}

/// Insert `builders` as transactions made by `employee_id`.
///
/// **Note**: If you want transactional integrity (all or nothing), pass in a
/// transaction for `connection`.
///
/// # Errors
/// Returns the first error from [create_transaction].
fn import_transaction_list(
    builders: Vec<TransactionBuilder>,
    employee_id: &EmployeeId,
    connection: &Connection,
) -> Result<Vec<Transaction>, Error> {
    builders
        .into_iter()
        .map(|builder| {
            create_transaction(builder.employee_id(Some(employee_id.clone())), connection)
        })
        .collect()
}

#[cfg(test)]
mod import_transactions_tests {
    use std::sync::{Arc, Mutex};

    use axum::{
        Extension,
        extract::{FromRequest, Multipart, State},
        http::{Request, StatusCode},
        response::Response,
    };
    use rusqlite::Connection;
    use scraper::Selector;

    use crate::{
        auth::Role,
        employee::{Employee, EmployeeId, create_employee},
        endpoints,
        test_utils::{
            assert_content_type, assert_valid_html, employee_session, get_test_connection,
            parse_html_fragment, test_session,
        },
        transaction::{TransactionScope, TransactionStatus, count_transactions, get_transactions},
    };

    use super::{ImportState, import_transactions};

    const FIRST_CSV: &str = "type,amount,reference,description,date,status\n\
        inbound,5000,INV-101,Client payment,2025-01-15,completed\n\
        outbound,1200.50,EXP-101,Office supplies,2025-01-16T09:30:00+08:00,pending";

    const SECOND_CSV: &str = "type,amount,reference,description,date\n\
        inbound,800,INV-102,Load top-up,2025-01-17";

    fn get_test_state() -> (ImportState, Employee) {
        let connection = get_test_connection();
        let employee = create_employee(
            EmployeeId::new("1"),
            "John Doe",
            "john@example.com",
            &connection,
        )
        .unwrap();

        let state = ImportState {
            db_connection: Arc::new(Mutex::new(connection)),
            local_timezone: "Asia/Manila".to_owned(),
        };

        (state, employee)
    }

    fn transaction_count(state: &ImportState) -> u32 {
        let connection = state.db_connection.lock().unwrap();
        count_transactions(&connection).expect("Could not count transactions")
    }

    #[tokio::test]
    async fn can_import_multiple_files() {
        let (state, employee) = get_test_state();

        let response = import_transactions(
            State(state.clone()),
            Extension(employee_session(&employee)),
            must_make_multipart_csv(&[FIRST_CSV, SECOND_CSV]).await,
        )
        .await
        .unwrap();

        assert_eq!(response.status(), StatusCode::CREATED);
        assert_alert_message(response, "Import successful").await;

        let connection = state.db_connection.lock().unwrap();
        let transactions =
            get_transactions(&TransactionScope::Employee(employee.id), &connection).unwrap();
        assert_eq!(transactions.len(), 3);
        assert_eq!(transactions[0].reference, "INV-102");
        assert_eq!(transactions[0].status, TransactionStatus::Completed);
        assert_eq!(transactions[1].reference, "EXP-101");
        assert_eq!(transactions[1].status, TransactionStatus::Pending);
        assert_eq!(transactions[2].reference, "INV-101");
        assert!(
            transactions
                .iter()
                .all(|transaction| transaction.employee_name.as_deref() == Some("John Doe"))
        );
    }

    #[tokio::test]
    async fn one_bad_file_imports_nothing() {
        let (state, employee) = get_test_state();
        let bad_csv = "type,amount,reference,description,date\ninbound,-5,INV-1,,2025-01-15";

        let response = import_transactions(
            State(state.clone()),
            Extension(employee_session(&employee)),
            must_make_multipart_csv(&[FIRST_CSV, bad_csv]).await,
        )
        .await
        .unwrap_err();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_content_type(&response, "text/html; charset=utf-8");
        assert_eq!(transaction_count(&state), 0);
        assert_alert_message(response, "Failed to parse CSV").await;
    }

    #[tokio::test]
    async fn invalid_csv_renders_error_message() {
        let (state, employee) = get_test_state();

        let response = import_transactions(
            State(state.clone()),
            Extension(employee_session(&employee)),
            must_make_multipart_csv(&[""]).await,
        )
        .await
        .unwrap_err();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(transaction_count(&state), 0);
        assert_alert_message(response, "Failed to parse CSV").await;
    }

    #[tokio::test]
    async fn invalid_file_type_renders_error_message() {
        let (state, employee) = get_test_state();

        let response = import_transactions(
            State(state.clone()),
            Extension(employee_session(&employee)),
            must_make_multipart(&["text/plain"]).await,
        )
        .await
        .unwrap_err();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(transaction_count(&state), 0);
        assert_alert_message(response, "File type must be CSV.").await;
    }

    #[tokio::test]
    async fn user_without_employee_record_is_rejected() {
        let (state, _) = get_test_state();

        let response = import_transactions(
            State(state.clone()),
            Extension(test_session("stranger@example.com", Role::Employee)),
            must_make_multipart_csv(&[FIRST_CSV]).await,
        )
        .await
        .unwrap_err();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(transaction_count(&state), 0);
        assert_alert_message(response, "Unknown employee").await;
    }

    #[tokio::test]
    async fn sql_error_renders_error_message() {
        // No tables, so the employee lookup fails.
        let conn =
            Connection::open_in_memory().expect("Could not initialise in-memory SQLite database");
        let state = ImportState {
            db_connection: Arc::new(Mutex::new(conn)),
            local_timezone: "Asia/Manila".to_owned(),
        };

        let response = import_transactions(
            State(state),
            Extension(test_session("john@example.com", Role::Employee)),
            must_make_multipart_csv(&[FIRST_CSV]).await,
        )
        .await
        .unwrap_err();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_alert_message(response, "Something went wrong").await;
    }

    async fn assert_alert_message(response: Response, expected_message: &str) {
        let html = parse_html_fragment(response).await;
        assert_valid_html(&html);

        let alert_container = html
            .select(&Selector::parse("#alert-container").unwrap())
            .next()
            .expect("No alert container found");

        let message_p = alert_container
            .select(&Selector::parse("p.text-sm.font-medium").unwrap())
            .next()
            .expect("No alert message found");

        let message = message_p.text().collect::<String>();
        assert_eq!(message.trim(), expected_message);
    }

    async fn make_multipart(parts: &[(&str, &str)]) -> Multipart {
        let boundary = "MY_BOUNDARY123456789";
        let boundary_start = format!("--{boundary}");
        let boundary_end = format!("--{boundary}--");

        let mut lines: Vec<String> = Vec::new();

        for (content_type, body) in parts {
            lines.push(boundary_start.clone());
            lines.push(
                "Content-Disposition: form-data; name=\"files\"; filename=\"transactions.csv\";"
                    .to_owned(),
            );
            lines.push(format!("Content-Type: {content_type}"));
            lines.push("".to_owned());
            lines.push((*body).to_owned());
        }

        lines.push(boundary_end);

        let data = lines.join("\r\n").into_bytes();

        let request = Request::builder()
            .method("POST")
            .uri(endpoints::IMPORT)
            .header(
                "Content-Type",
                format!("multipart/form-data; boundary={boundary}"),
            )
            .body(data.into())
            .unwrap();

        Multipart::from_request(request, &()).await.unwrap()
    }

    async fn must_make_multipart_csv(csv_strings: &[&str]) -> Multipart {
        let parts = csv_strings
            .iter()
            .map(|csv_string| ("text/csv", *csv_string))
            .collect::<Vec<_>>();

        make_multipart(&parts).await
    }

    async fn must_make_multipart(file_types: &[&str]) -> Multipart {
        let parts = file_types
            .iter()
            .map(|file_type| (*file_type, "foo"))
            .collect::<Vec<_>>();

        make_multipart(&parts).await
    }
}
