//! Defines the core data models and database queries for transactions.

use std::{fmt::Display, str::FromStr};

use rusqlite::{
    Connection, Row, ToSql,
    types::{FromSql, FromSqlError, FromSqlResult, ToSqlOutput, ValueRef},
};
use serde::{Deserialize, Serialize};
use time::{OffsetDateTime, UtcOffset};
use uuid::Uuid;

use crate::{Error, employee::EmployeeId};

// ============================================================================
// MODELS
// ============================================================================

/// The ID of a transaction.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TransactionId(String);

impl TransactionId {
    /// Wrap an existing ID.
    pub fn new(id: &str) -> Self {
        Self(id.to_owned())
    }

    /// Create a new, random ID.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for TransactionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl ToSql for TransactionId {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        self.0.to_sql()
    }
}

impl FromSql for TransactionId {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        String::column_result(value).map(TransactionId)
    }
}

/// The direction money moved in a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    /// Money received into the wallet.
    Inbound,
    /// Money sent out of the wallet.
    Outbound,
}

impl TransactionType {
    /// The lowercase name used in forms, CSV files and the database.
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Inbound => "inbound",
            TransactionType::Outbound => "outbound",
        }
    }
}

impl Display for TransactionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for TransactionType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "inbound" => Ok(TransactionType::Inbound),
            "outbound" => Ok(TransactionType::Outbound),
            _ => Err(Error::InvalidTransactionType(s.to_owned())),
        }
    }
}

impl ToSql for TransactionType {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for TransactionType {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()?
            .parse()
            .map_err(|error| FromSqlError::Other(Box::new(error)))
    }
}

/// Where a transaction is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionStatus {
    /// The transaction has been started but has not cleared.
    Pending,
    /// The money has moved.
    #[default]
    Completed,
    /// The transaction did not go through.
    Failed,
}

impl TransactionStatus {
    /// The lowercase name used in forms, CSV files and the database.
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionStatus::Pending => "pending",
            TransactionStatus::Completed => "completed",
            TransactionStatus::Failed => "failed",
        }
    }

    /// The capitalised name shown to users.
    pub fn label(&self) -> &'static str {
        match self {
            TransactionStatus::Pending => "Pending",
            TransactionStatus::Completed => "Completed",
            TransactionStatus::Failed => "Failed",
        }
    }
}

impl Display for TransactionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for TransactionStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pending" => Ok(TransactionStatus::Pending),
            "completed" => Ok(TransactionStatus::Completed),
            "failed" => Ok(TransactionStatus::Failed),
            _ => Err(Error::InvalidTransactionStatus(s.to_owned())),
        }
    }
}

impl ToSql for TransactionStatus {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for TransactionStatus {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()?
            .parse()
            .map_err(|error| FromSqlError::Other(Box::new(error)))
    }
}

/// A movement of money in or out of the business's GCash wallet.
///
/// To create a new `Transaction`, use [Transaction::build].
#[derive(Debug, Clone, PartialEq)]
pub struct Transaction {
    pub id: TransactionId,
    pub transaction_type: TransactionType,
    /// The amount of money moved. Never negative, the direction is given by
    /// `transaction_type`.
    pub amount: f64,
    /// The external reference, e.g. an invoice number like "INV-001".
    pub reference: String,
    pub description: String,
    /// When the transaction happened.
    pub date: OffsetDateTime,
    pub status: TransactionStatus,
    /// The employee who made the transaction.
    pub employee_id: Option<EmployeeId>,
    /// The employee's name, filled in when the transaction is read from the database.
    pub employee_name: Option<String>,
}

impl Transaction {
    /// Create a new transaction.
    ///
    /// Shortcut for [TransactionBuilder] for discoverability.
    pub fn build(
        transaction_type: TransactionType,
        amount: f64,
        date: OffsetDateTime,
    ) -> TransactionBuilder {
        TransactionBuilder {
            id: None,
            transaction_type,
            amount,
            reference: String::new(),
            description: String::new(),
            date,
            status: TransactionStatus::default(),
            employee_id: None,
        }
    }
}

/// A builder for creating [Transaction] instances.
///
/// ```ignore
/// use time::macros::datetime;
///
/// use crate::transaction::{Transaction, TransactionStatus, TransactionType};
///
/// let transaction = Transaction::build(
///         TransactionType::Inbound,
///         5000.0,
///         datetime!(2025-01-15 09:30 +8),
///     )
///     .reference("INV-001")
///     .description("Client payment")
///     .status(TransactionStatus::Completed);
/// ```
#[derive(Debug, PartialEq, Clone)]
pub struct TransactionBuilder {
    /// A fixed ID, otherwise a random ID is generated on insert.
    pub id: Option<TransactionId>,
    pub transaction_type: TransactionType,
    pub amount: f64,
    pub reference: String,
    pub description: String,
    pub date: OffsetDateTime,
    /// Defaults to [TransactionStatus::Completed].
    pub status: TransactionStatus,
    pub employee_id: Option<EmployeeId>,
}

impl TransactionBuilder {
    /// Use a fixed ID for the transaction.
    pub fn id(mut self, id: TransactionId) -> Self {
        self.id = Some(id);
        self
    }

    /// Set the external reference for the transaction.
    pub fn reference(mut self, reference: &str) -> Self {
        self.reference = reference.to_owned();
        self
    }

    /// Set the description for the transaction.
    pub fn description(mut self, description: &str) -> Self {
        self.description = description.to_owned();
        self
    }

    /// Set the status for the transaction.
    pub fn status(mut self, status: TransactionStatus) -> Self {
        self.status = status;
        self
    }

    /// Set the employee who made the transaction.
    pub fn employee_id(mut self, employee_id: Option<EmployeeId>) -> Self {
        self.employee_id = employee_id;
        self
    }

    /// Check the builder describes a valid transaction.
    ///
    /// # Errors
    /// Returns [Error::NegativeAmount] if the amount is negative or not a number.
    pub fn validate(&self) -> Result<(), Error> {
        if self.amount >= 0.0 && self.amount.is_finite() {
            Ok(())
        } else {
            Err(Error::NegativeAmount(self.amount))
        }
    }
}

/// Which transactions to read from the database.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransactionScope {
    /// Every employee's transactions.
    All,
    /// Only the transactions made by one employee.
    Employee(EmployeeId),
}

// ============================================================================
// DATABASE FUNCTIONS
// ============================================================================

/// Create a new transaction in the database from a builder.
///
/// The date is stored in UTC.
///
/// # Errors
/// This function will return a:
/// - [Error::NegativeAmount] if the amount is negative,
/// - [Error::UnknownEmployee] if the employee ID does not refer to an employee,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn create_transaction(
    builder: TransactionBuilder,
    connection: &Connection,
) -> Result<Transaction, Error> {
    builder.validate()?;

    let id = builder.id.unwrap_or_else(TransactionId::generate);

    connection.execute(
        "INSERT INTO \"transaction\" (id, type, amount, reference, description, date, status, employee_id)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        (
            &id,
            builder.transaction_type,
            builder.amount,
            &builder.reference,
            &builder.description,
            builder.date.to_offset(UtcOffset::UTC),
            builder.status,
            &builder.employee_id,
        ),
    )?;

    get_transaction(&id, connection)
}

/// Retrieve a transaction from the database by its `id`.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if `id` does not refer to a valid transaction,
/// - or [Error::SqlError] there is some other SQL error.
pub fn get_transaction(id: &TransactionId, connection: &Connection) -> Result<Transaction, Error> {
    let transaction = connection
        .prepare(&format!("{SELECT_TRANSACTIONS} WHERE t.id = :id"))?
        .query_one(&[(":id", id)], map_transaction_row)?;

    Ok(transaction)
}

/// Get the transactions in `scope`, newest first.
///
/// Transactions on the same date keep the order they were created in.
///
/// # Errors
/// Returns an [Error::SqlError] if there is an SQL error.
pub fn get_transactions(
    scope: &TransactionScope,
    connection: &Connection,
) -> Result<Vec<Transaction>, Error> {
    let mut transactions = match scope {
        TransactionScope::All => connection
            .prepare(&format!("{SELECT_TRANSACTIONS} ORDER BY t.rowid"))?
            .query_map([], map_transaction_row)?
            .collect::<Result<Vec<_>, _>>()?,
        TransactionScope::Employee(employee_id) => connection
            .prepare(&format!(
                "{SELECT_TRANSACTIONS} WHERE t.employee_id = :employee_id ORDER BY t.rowid"
            ))?
            .query_map(&[(":employee_id", employee_id)], map_transaction_row)?
            .collect::<Result<Vec<_>, _>>()?,
    };

    // Sorted here rather than in SQL since the stored date strings may have
    // different sub-second precision.
    transactions.sort_by(|a, b| b.date.cmp(&a.date));

    Ok(transactions)
}

/// Get the total number of transactions in the database.
///
/// # Errors
/// This function will return a [Error::SqlError] there is some SQL error.
pub fn count_transactions(connection: &Connection) -> Result<u32, Error> {
    connection
        .query_row("SELECT COUNT(id) FROM \"transaction\";", [], |row| {
            row.get(0)
        })
        .map_err(|error| error.into())
}

/// Create the transaction table in the database.
///
/// The employee table must be created first.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL error.
pub fn create_transaction_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS \"transaction\" (
                id TEXT PRIMARY KEY,
                type TEXT NOT NULL CHECK (type IN ('inbound', 'outbound')),
                amount REAL NOT NULL CHECK (amount >= 0),
                reference TEXT NOT NULL,
                description TEXT NOT NULL,
                date TEXT NOT NULL,
                status TEXT NOT NULL CHECK (status IN ('pending', 'completed', 'failed')),
                employee_id TEXT,
                FOREIGN KEY(employee_id) REFERENCES employee(id) ON UPDATE CASCADE ON DELETE SET NULL
                )",
        (),
    )?;

    // Used by the employee dashboard.
    connection.execute(
        "CREATE INDEX IF NOT EXISTS idx_transaction_employee ON \"transaction\"(employee_id);",
        (),
    )?;

    Ok(())
}

const SELECT_TRANSACTIONS: &str = "SELECT t.id, t.type, t.amount, t.reference, t.description, \
    t.date, t.status, t.employee_id, e.name \
    FROM \"transaction\" t LEFT JOIN employee e ON e.id = t.employee_id";

/// Map a database row to a Transaction.
pub fn map_transaction_row(row: &Row) -> Result<Transaction, rusqlite::Error> {
    Ok(Transaction {
        id: row.get(0)?,
        transaction_type: row.get(1)?,
        amount: row.get(2)?,
        reference: row.get(3)?,
        description: row.get(4)?,
        date: row.get(5)?,
        status: row.get(6)?,
        employee_id: row.get(7)?,
        employee_name: row.get(8)?,
    })
}

// ============================================================================
// TESTS
// ============================================================================
