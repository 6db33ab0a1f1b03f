//! Summary statistics over lists of transactions.
//!
//! Every function here is pure: it reads a slice of transactions and returns
//! a new value without touching the database.

use std::collections::HashSet;

use crate::{
    employee::{Employee, EmployeeId},
    transaction::{Transaction, TransactionStatus, TransactionType},
};

/// Totals over a list of transactions.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TransactionStats {
    /// The sum of the inbound amounts.
    pub inbound: f64,
    /// The sum of the outbound amounts.
    pub outbound: f64,
    /// The number of transactions.
    pub total: usize,
    /// The number of distinct employees with at least one transaction.
    pub employee_count: usize,
}

impl TransactionStats {
    /// The money that came in minus the money that went out.
    pub fn net_flow(&self) -> f64 {
        self.inbound - self.outbound
    }
}

/// Sum the inbound and outbound amounts of `transactions` and count the
/// transactions and the distinct employees that made them.
///
/// Transactions of every status are included, see [compute_completed_stats]
/// for the variant that only includes completed transactions.
pub fn compute_stats(transactions: &[Transaction]) -> TransactionStats {
    let mut stats = TransactionStats::default();
    let mut employees: HashSet<&EmployeeId> = HashSet::new();

    for transaction in transactions {
        match transaction.transaction_type {
            TransactionType::Inbound => stats.inbound += transaction.amount,
            TransactionType::Outbound => stats.outbound += transaction.amount,
        }

        if let Some(employee_id) = &transaction.employee_id {
            employees.insert(employee_id);
        }
    }

    stats.total = transactions.len();
    stats.employee_count = employees.len();

    stats
}

/// Like [compute_stats], but only completed transactions count towards the
/// inbound and outbound totals.
///
/// The transaction and employee counts still include every transaction.
pub fn compute_completed_stats(transactions: &[Transaction]) -> TransactionStats {
    let completed = transactions
        .iter()
        .filter(|transaction| transaction.status == TransactionStatus::Completed)
        .cloned()
        .collect::<Vec<_>>();

    let all = compute_stats(transactions);

    TransactionStats {
        total: all.total,
        employee_count: all.employee_count,
        ..compute_stats(&completed)
    }
}

/// The balance of one employee's wallet activity.
#[derive(Debug, Clone, PartialEq)]
pub struct EmployeeSummary {
    pub employee_id: EmployeeId,
    pub name: String,
    /// The sum of the employee's completed inbound transactions.
    pub inbound: f64,
    /// The sum of the employee's completed outbound transactions.
    pub outbound: f64,
    /// Inbound minus outbound, negative when more went out than came in.
    pub balance: f64,
    /// The number of the employee's transactions of any status.
    pub transaction_count: usize,
}

/// Summarise the transactions of each employee in `employees`, in the same order.
pub fn employee_summaries(
    transactions: &[Transaction],
    employees: &[Employee],
) -> Vec<EmployeeSummary> {
    employees
        .iter()
        .map(|employee| {
            let employee_transactions = transactions
                .iter()
                .filter(|transaction| transaction.employee_id.as_ref() == Some(&employee.id))
                .cloned()
                .collect::<Vec<_>>();
            let stats = compute_completed_stats(&employee_transactions);

            EmployeeSummary {
                employee_id: employee.id.clone(),
                name: employee.name.clone(),
                inbound: stats.inbound,
                outbound: stats.outbound,
                balance: stats.net_flow(),
                transaction_count: stats.total,
            }
        })
        .collect()
}

/// The wallet balance from a starting amount and the activity since.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BalanceSummary {
    pub starting_balance: f64,
    pub inbound: f64,
    pub outbound: f64,
    pub current_balance: f64,
    pub transaction_count: usize,
}

/// Apply the totals in `stats` to `starting_balance`.
pub fn balance_summary(starting_balance: f64, stats: &TransactionStats) -> BalanceSummary {
    BalanceSummary {
        starting_balance,
        inbound: stats.inbound,
        outbound: stats.outbound,
        current_balance: starting_balance + stats.net_flow(),
        transaction_count: stats.total,
    }
}

/// Inbound and outbound totals for one employee, used for charting.
#[derive(Debug, Clone, PartialEq)]
pub struct EmployeeTotals {
    pub name: String,
    pub inbound: f64,
    pub outbound: f64,
}

/// Group `transactions` by employee, in order of each employee's first appearance.
///
/// Transactions without an employee are grouped under "Unassigned".
pub fn totals_by_employee(transactions: &[Transaction]) -> Vec<EmployeeTotals> {
    let mut totals: Vec<(Option<&EmployeeId>, EmployeeTotals)> = Vec::new();

    for transaction in transactions {
        let key = transaction.employee_id.as_ref();
        let index = match totals.iter().position(|(id, _)| *id == key) {
            Some(index) => index,
            None => {
                let name = transaction
                    .employee_name
                    .clone()
                    .unwrap_or_else(|| "Unassigned".to_owned());
                totals.push((
                    key,
                    EmployeeTotals {
                        name,
                        inbound: 0.0,
                        outbound: 0.0,
                    },
                ));
                totals.len() - 1
            }
        };

        let entry = &mut totals[index].1;
        match transaction.transaction_type {
            TransactionType::Inbound => entry.inbound += transaction.amount,
            TransactionType::Outbound => entry.outbound += transaction.amount,
        }
    }

    totals.into_iter().map(|(_, totals)| totals).collect()
}
