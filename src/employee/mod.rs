//! Employees and the pages for managing them.
//!
//! Every transaction recorded by an employee is linked to their employee
//! record. Owners can add employees, and employees that log in for the first
//! time get a record created for them.

mod core;
mod create_endpoint;
mod create_page;

pub use core::{
    Employee, EmployeeId, count_employees, create_employee, create_employee_table,
    ensure_employee_for_user, get_all_employees, get_employee_by_email,
};
pub use create_endpoint::create_employee_endpoint;
pub use create_page::get_create_employee_page;
