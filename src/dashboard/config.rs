//! Display settings for the dashboards.

/// How amounts are shown on the dashboards and which balances they start from.
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardConfig {
    /// The symbol in front of every amount, e.g. "₱".
    pub currency_symbol: String,
    /// The wallet balance an employee starts with before any transactions.
    pub employee_starting_balance: f64,
    /// The business's wallet balance before any transactions.
    pub owner_starting_balance: f64,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            currency_symbol: "₱".to_owned(),
            employee_starting_balance: 10_000.0,
            owner_starting_balance: 50_000.0,
        }
    }
}
