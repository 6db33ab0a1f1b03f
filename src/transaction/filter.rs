//! Narrowing a list of transactions by employee, type and search text.

use serde::Deserialize;

use crate::{
    employee::EmployeeId,
    transaction::{Transaction, TransactionType},
};

/// Which employee's transactions to keep.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(from = "String")]
pub enum EmployeeFilter {
    /// Keep every transaction.
    #[default]
    All,
    /// Keep the transactions made by one employee.
    Only(EmployeeId),
}

impl From<String> for EmployeeFilter {
    fn from(value: String) -> Self {
        match value.as_str() {
            "" | "all" => EmployeeFilter::All,
            id => EmployeeFilter::Only(EmployeeId::new(id)),
        }
    }
}

impl EmployeeFilter {
    /// The value used for this filter in query strings.
    pub fn as_query_value(&self) -> &str {
        match self {
            EmployeeFilter::All => "all",
            EmployeeFilter::Only(id) => id.as_str(),
        }
    }
}

/// Which transaction type to keep.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(try_from = "String")]
pub enum TypeFilter {
    /// Keep every transaction.
    #[default]
    All,
    /// Keep inbound transactions.
    Inbound,
    /// Keep outbound transactions.
    Outbound,
}

impl TryFrom<String> for TypeFilter {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.as_str() {
            "" | "all" => Ok(TypeFilter::All),
            "inbound" => Ok(TypeFilter::Inbound),
            "outbound" => Ok(TypeFilter::Outbound),
            other => Err(format!("unknown transaction type \"{other}\"")),
        }
    }
}

impl TypeFilter {
    /// The value used for this filter in query strings.
    pub fn as_query_value(&self) -> &'static str {
        match self {
            TypeFilter::All => "all",
            TypeFilter::Inbound => "inbound",
            TypeFilter::Outbound => "outbound",
        }
    }

    fn matches(&self, transaction_type: TransactionType) -> bool {
        match self {
            TypeFilter::All => true,
            TypeFilter::Inbound => transaction_type == TransactionType::Inbound,
            TypeFilter::Outbound => transaction_type == TransactionType::Outbound,
        }
    }
}

/// The filters for the owner's transaction list, read from the query string.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(default)]
pub struct TransactionFilter {
    pub employee: EmployeeFilter,
    #[serde(rename = "type")]
    pub transaction_type: TypeFilter,
    /// Matched case-insensitively against the reference and description.
    pub search: String,
}

/// Keep the transactions that pass every filter in `filter`, in their original order.
pub fn apply_filters(transactions: &[Transaction], filter: &TransactionFilter) -> Vec<Transaction> {
    let search = filter.search.to_lowercase();

    transactions
        .iter()
        .filter(|transaction| match &filter.employee {
            EmployeeFilter::All => true,
            EmployeeFilter::Only(id) => transaction.employee_id.as_ref() == Some(id),
        })
        .filter(|transaction| filter.transaction_type.matches(transaction.transaction_type))
        .filter(|transaction| {
            search.is_empty()
                || transaction.reference.to_lowercase().contains(&search)
                || transaction.description.to_lowercase().contains(&search)
        })
        .cloned()
        .collect()
}
