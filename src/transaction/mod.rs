//! Transactions and the calculations over them.
//!
//! This module contains everything related to transactions:
//! - The `Transaction` model and `TransactionBuilder` for creating transactions
//! - Database functions for storing and reading transactions
//! - The aggregations and filters used by the dashboards
//! - The transaction table and the page for entering transactions by hand

mod aggregation;
mod core;
mod create_endpoint;
mod create_page;
mod filter;
mod table;

pub use aggregation::{
    BalanceSummary, EmployeeSummary, EmployeeTotals, TransactionStats, balance_summary,
    compute_completed_stats, compute_stats, employee_summaries, totals_by_employee,
};
pub use core::{
    Transaction, TransactionBuilder, TransactionId, TransactionScope, TransactionStatus,
    TransactionType, count_transactions, create_transaction, create_transaction_table,
    get_transactions,
};
pub use create_endpoint::create_transaction_endpoint;
pub use create_page::get_create_transaction_page;
pub use filter::{EmployeeFilter, TransactionFilter, TypeFilter, apply_filters};
pub use table::transaction_table;
