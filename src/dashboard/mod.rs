//! Dashboard module
//!
//! Provides the employee and owner overview pages with balance summaries,
//! per-employee aggregations and the transaction tables.

mod cards;
mod charts;
mod config;
mod filter_form;
mod handlers;

pub use config::DashboardConfig;
pub use handlers::{
    get_dashboard_redirect, get_employee_dashboard_page, get_owner_dashboard_page,
    get_owner_transactions,
};
