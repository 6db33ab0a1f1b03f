//! Defines the employee model and its database queries.

use std::fmt::Display;

use rusqlite::{
    Connection, Row, ToSql,
    types::{FromSql, FromSqlResult, ToSqlOutput, ValueRef},
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, auth::User};

// ============================================================================
// MODELS
// ============================================================================

/// The ID of an employee.
///
/// Seeded employees use short numeric IDs ("1", "2", ...) while employees
/// created at runtime get a random UUID.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EmployeeId(String);

impl EmployeeId {
    /// Wrap an existing ID.
    pub fn new(id: &str) -> Self {
        Self(id.to_owned())
    }

    /// Create a new, random ID.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// The ID as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for EmployeeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl ToSql for EmployeeId {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        self.0.to_sql()
    }
}

impl FromSql for EmployeeId {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        String::column_result(value).map(EmployeeId)
    }
}

/// A person who makes transactions on behalf of the business.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Employee {
    /// The employee's unique ID.
    pub id: EmployeeId,
    /// The employee's full name.
    pub name: String,
    /// The email the employee logs in with, unique across employees.
    pub email: String,
}

// ============================================================================
// DATABASE FUNCTIONS
// ============================================================================

/// Create the employee table in the database.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL error.
pub fn create_employee_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS employee (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                email TEXT NOT NULL UNIQUE
                )",
        (),
    )?;

    Ok(())
}

/// Add an employee to the database.
///
/// Leading and trailing whitespace is removed from `name` and `email`.
///
/// # Errors
/// This function will return a:
/// - [Error::EmptyEmployeeName] if `name` is empty,
/// - [Error::EmptyEmployeeEmail] if `email` is empty,
/// - [Error::DuplicateEmployeeEmail] if an employee already uses `email`,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn create_employee(
    id: EmployeeId,
    name: &str,
    email: &str,
    connection: &Connection,
) -> Result<Employee, Error> {
    let name = name.trim();
    let email = email.trim();

    if name.is_empty() {
        return Err(Error::EmptyEmployeeName);
    }

    if email.is_empty() {
        return Err(Error::EmptyEmployeeEmail);
    }

    connection
        .execute(
            "INSERT INTO employee (id, name, email) VALUES (?1, ?2, ?3)",
            (&id, name, email),
        )
        .map_err(|error| match error {
            rusqlite::Error::SqliteFailure(sql_error, Some(ref description))
                if sql_error.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
                    && description.contains("employee.email") =>
            {
                Error::DuplicateEmployeeEmail(email.to_owned())
            }
            error => error.into(),
        })?;

    Ok(Employee {
        id,
        name: name.to_owned(),
        email: email.to_owned(),
    })
}

/// Get every employee, sorted by name.
///
/// # Errors
/// Returns an [Error::SqlError] if there is an SQL error.
pub fn get_all_employees(connection: &Connection) -> Result<Vec<Employee>, Error> {
    connection
        .prepare("SELECT id, name, email FROM employee ORDER BY name ASC, id ASC")?
        .query_map([], map_employee_row)?
        .map(|maybe_employee| maybe_employee.map_err(Error::from))
        .collect()
}

/// Get the employee that logs in with `email`.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if no employee uses `email`,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn get_employee_by_email(email: &str, connection: &Connection) -> Result<Employee, Error> {
    let employee = connection
        .prepare("SELECT id, name, email FROM employee WHERE email = :email")?
        .query_one(&[(":email", &email.trim())], map_employee_row)?;

    Ok(employee)
}

/// Get the number of employees in the database.
///
/// # Errors
/// Returns an [Error::SqlError] if there is an SQL error.
pub fn count_employees(connection: &Connection) -> Result<u32, Error> {
    connection
        .query_row("SELECT COUNT(id) FROM employee;", [], |row| row.get(0))
        .map_err(|error| error.into())
}

/// Get the employee record for a user that logged in as an employee,
/// creating it with the user's ID if this is the user's first log-in.
///
/// # Errors
/// Returns an [Error::SqlError] if there is an SQL error.
pub fn ensure_employee_for_user(user: &User, connection: &Connection) -> Result<Employee, Error> {
    match get_employee_by_email(&user.email, connection) {
        Ok(employee) => Ok(employee),
        Err(Error::NotFound) => {
            tracing::info!("Creating employee record for {}", user.email);
            create_employee(
                EmployeeId::new(&user.id.to_string()),
                &user.name,
                &user.email,
                connection,
            )
        }
        Err(error) => Err(error),
    }
}

fn map_employee_row(row: &Row) -> Result<Employee, rusqlite::Error> {
    Ok(Employee {
        id: row.get(0)?,
        name: row.get(1)?,
        email: row.get(2)?,
    })
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod database_tests {
    use rusqlite::Connection;

    use crate::{
        Error,
        auth::{PasswordHash, Role, User, UserID},
        db::initialize,
    };

    use super::{
        EmployeeId, count_employees, create_employee, ensure_employee_for_user,
        get_all_employees, get_employee_by_email,
    };

    fn get_test_connection() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();
        conn
    }

    #[test]
    fn create_succeeds() {
        let conn = get_test_connection();

        let employee = create_employee(
            EmployeeId::new("1"),
            "  John Doe ",
            "john@example.com",
            &conn,
        )
        .unwrap();

        assert_eq!(employee.name, "John Doe");
        assert_eq!(
            get_employee_by_email("john@example.com", &conn),
            Ok(employee)
        );
    }

    #[test]
    fn create_fails_on_empty_name() {
        let conn = get_test_connection();

        let result = create_employee(EmployeeId::new("1"), "   ", "john@example.com", &conn);

        assert_eq!(result, Err(Error::EmptyEmployeeName));
    }

    #[test]
    fn create_fails_on_empty_email() {
        let conn = get_test_connection();

        let result = create_employee(EmployeeId::new("1"), "John Doe", "", &conn);

        assert_eq!(result, Err(Error::EmptyEmployeeEmail));
    }

    #[test]
    fn create_fails_on_duplicate_email() {
        let conn = get_test_connection();
        create_employee(EmployeeId::new("1"), "John Doe", "john@example.com", &conn).unwrap();

        let result = create_employee(EmployeeId::new("2"), "Johnny", "john@example.com", &conn);

        assert_eq!(
            result,
            Err(Error::DuplicateEmployeeEmail("john@example.com".to_owned()))
        );
    }

    #[test]
    fn get_all_sorts_by_name() {
        let conn = get_test_connection();
        create_employee(EmployeeId::new("1"), "Mike", "mike@example.com", &conn).unwrap();
        create_employee(EmployeeId::new("2"), "Jane", "jane@example.com", &conn).unwrap();

        let names = get_all_employees(&conn)
            .unwrap()
            .into_iter()
            .map(|employee| employee.name)
            .collect::<Vec<_>>();

        assert_eq!(names, vec!["Jane", "Mike"]);
    }

    #[test]
    fn get_by_unknown_email_is_not_found() {
        let conn = get_test_connection();

        assert_eq!(
            get_employee_by_email("nobody@example.com", &conn),
            Err(Error::NotFound)
        );
    }

    #[test]
    fn ensure_employee_creates_once() {
        let conn = get_test_connection();
        let user = User {
            id: UserID::generate(),
            email: "maria@example.com".to_owned(),
            name: "maria".to_owned(),
            role: Role::Employee,
            password_hash: PasswordHash::new_unchecked("hunter2"),
        };

        let first = ensure_employee_for_user(&user, &conn).unwrap();
        let second = ensure_employee_for_user(&user, &conn).unwrap();

        assert_eq!(first, second);
        assert_eq!(first.id.as_str(), user.id.to_string());
        assert_eq!(first.name, "maria");
        assert_eq!(count_employees(&conn), Ok(1));
    }
}
