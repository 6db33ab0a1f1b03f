//! Bulk import of transactions from CSV files uploaded by employees.

mod csv;
mod import_page;
mod import_transactions;

pub use import_page::get_import_page;
pub use import_transactions::import_transactions;
