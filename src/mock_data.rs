//! Seeds an empty database with demo employees and transactions.

use rusqlite::Connection;
use time::{Duration, OffsetDateTime};

use crate::{
    Error,
    employee::{EmployeeId, count_employees, create_employee},
    transaction::{
        Transaction, TransactionId, TransactionStatus, TransactionType, count_transactions,
        create_transaction,
    },
};

const MOCK_EMPLOYEES: [(&str, &str, &str); 3] = [
    ("1", "John Doe", "john@example.com"),
    ("2", "Jane Smith", "jane@example.com"),
    ("3", "Mike Johnson", "mike@example.com"),
];

struct MockTransaction {
    id: &'static str,
    employee_id: &'static str,
    transaction_type: TransactionType,
    amount: f64,
    reference: &'static str,
    description: &'static str,
    days_ago: i64,
    status: TransactionStatus,
}

const MOCK_TRANSACTIONS: [MockTransaction; 6] = [
    MockTransaction {
        id: "1",
        employee_id: "1",
        transaction_type: TransactionType::Inbound,
        amount: 5000.0,
        reference: "INV-001",
        description: "Client payment",
        days_ago: 3,
        status: TransactionStatus::Completed,
    },
    MockTransaction {
        id: "2",
        employee_id: "1",
        transaction_type: TransactionType::Outbound,
        amount: 1200.0,
        reference: "EXP-001",
        description: "Vendor payment",
        days_ago: 2,
        status: TransactionStatus::Completed,
    },
    MockTransaction {
        id: "3",
        employee_id: "2",
        transaction_type: TransactionType::Inbound,
        amount: 8500.0,
        reference: "INV-002",
        description: "Project payment",
        days_ago: 1,
        status: TransactionStatus::Completed,
    },
    MockTransaction {
        id: "4",
        employee_id: "2",
        transaction_type: TransactionType::Outbound,
        amount: 3200.0,
        reference: "EXP-002",
        description: "Equipment purchase",
        days_ago: 1,
        status: TransactionStatus::Completed,
    },
    MockTransaction {
        id: "5",
        employee_id: "3",
        transaction_type: TransactionType::Inbound,
        amount: 12000.0,
        reference: "INV-003",
        description: "Contract fulfillment",
        days_ago: 0,
        status: TransactionStatus::Completed,
    },
    MockTransaction {
        id: "6",
        employee_id: "3",
        transaction_type: TransactionType::Outbound,
        amount: 2500.0,
        reference: "EXP-003",
        description: "Service payment",
        days_ago: 0,
        status: TransactionStatus::Pending,
    },
];

/// Add the demo employees and their transactions if the database has no employees or transactions.
///
/// Transaction dates are relative to the current time. Returns whether the
/// data was added.
///
/// # Errors
/// Returns an error if there is an SQL error, in which case nothing is added.
pub fn seed_mock_data(connection: &Connection) -> Result<bool, Error> {
    if count_employees(connection)? > 0 || count_transactions(connection)? > 0 {
        tracing::debug!("Database already has data, skipping mock data");
        return Ok(false);
    }

    let sql_transaction = connection.unchecked_transaction()?;
    let now = OffsetDateTime::now_utc();

    for (id, name, email) in MOCK_EMPLOYEES {
        create_employee(EmployeeId::new(id), name, email, &sql_transaction)?;
    }

    for mock in MOCK_TRANSACTIONS {
        let transaction = Transaction::build(
            mock.transaction_type,
            mock.amount,
            now - Duration::days(mock.days_ago),
        )
        .id(TransactionId::new(mock.id))
        .reference(mock.reference)
        .description(mock.description)
        .status(mock.status)
        .employee_id(Some(EmployeeId::new(mock.employee_id)));

        create_transaction(transaction, &sql_transaction)?;
    }

    sql_transaction.commit()?;

    tracing::info!(
        "Added {} mock employees and {} mock transactions",
        MOCK_EMPLOYEES.len(),
        MOCK_TRANSACTIONS.len()
    );

    Ok(true)
}
