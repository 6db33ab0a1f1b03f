//! The API endpoints URIs.

/// The root route which redirects to the dashboard or log in page.
pub const ROOT: &str = "/";
/// The landing page for logged in users, redirects to the dashboard for the user's role.
pub const DASHBOARD_VIEW: &str = "/dashboard";
/// The dashboard for employees.
pub const EMPLOYEE_DASHBOARD_VIEW: &str = "/dashboard/employee";
/// The dashboard for owners.
pub const OWNER_DASHBOARD_VIEW: &str = "/dashboard/owner";
/// The page for entering a new transaction by hand.
pub const NEW_TRANSACTION_VIEW: &str = "/transactions/new";
/// The page for importing transactions from CSV files.
pub const IMPORT_VIEW: &str = "/transactions/import";
/// The page for adding an employee.
pub const NEW_EMPLOYEE_VIEW: &str = "/employees/new";
/// The route for getting the log in page.
pub const LOG_IN_VIEW: &str = "/log_in";
/// The page to display when an internal server error occurs.
pub const INTERNAL_ERROR_VIEW: &str = "/error";
/// The route for static files.
pub const STATIC: &str = "/static";

/// The route for logging in a user from the log-in form.
pub const LOG_IN_API: &str = "/api/log_in";
/// The JSON route for logging in a user, returns the user and an API token.
pub const AUTH_LOG_IN_API: &str = "/api/auth/login";
/// The route for the client to log out the current user.
pub const LOG_OUT: &str = "/api/log_out";
/// The route to create transactions.
pub const TRANSACTIONS_API: &str = "/api/transactions";
/// The route to upload CSV files for importing transactions.
pub const IMPORT: &str = "/api/import";
/// The route to create employees.
pub const EMPLOYEES_API: &str = "/api/employees";
/// The route for the filtered transaction section of the owner dashboard.
pub const OWNER_TRANSACTIONS_API: &str = "/api/dashboard/owner/transactions";
