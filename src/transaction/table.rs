//! The table listing transaction details, shared by both dashboards.

use maud::{Markup, html};
use time::UtcOffset;

use crate::{
    html::{
        BADGE_GREEN_STYLE, BADGE_RED_STYLE, BADGE_YELLOW_STYLE, TABLE_CELL_STYLE,
        TABLE_HEADER_STYLE, TABLE_ROW_STYLE, format_currency,
    },
    transaction::{Transaction, TransactionStatus, TransactionType},
};

/// Renders `transactions` as a table, with an employee column if `show_employee` is set.
///
/// Dates are shown in the timezone given by `local_offset`.
pub fn transaction_table(
    transactions: &[Transaction],
    show_employee: bool,
    currency_symbol: &str,
    local_offset: UtcOffset,
) -> Markup {
    if transactions.is_empty() {
        return html! {
            p
                id="transactions-empty"
                class="w-full p-6 text-center text-gray-500 dark:text-gray-400"
            {
                "No transactions found"
            }
        };
    }

    html! {
        div class="relative overflow-x-auto shadow-md sm:rounded-lg w-full"
        {
            table id="transactions-table" class="w-full text-sm text-left rtl:text-right text-gray-500 dark:text-gray-400"
            {
                thead class=(TABLE_HEADER_STYLE)
                {
                    tr
                    {
                        th scope="col" class=(TABLE_CELL_STYLE) { "Date" }
                        @if show_employee {
                            th scope="col" class=(TABLE_CELL_STYLE) { "Employee" }
                        }
                        th scope="col" class=(TABLE_CELL_STYLE) { "Type" }
                        th scope="col" class=(TABLE_CELL_STYLE) { "Reference" }
                        th scope="col" class=(TABLE_CELL_STYLE) { "Description" }
                        th scope="col" class={(TABLE_CELL_STYLE) " text-right"} { "Amount" }
                        th scope="col" class=(TABLE_CELL_STYLE) { "Status" }
                    }
                }

                tbody
                {
                    @for transaction in transactions {
                        (transaction_row(transaction, show_employee, currency_symbol, local_offset))
                    }
                }
            }
        }
    }
}

fn transaction_row(
    transaction: &Transaction,
    show_employee: bool,
    currency_symbol: &str,
    local_offset: UtcOffset,
) -> Markup {
    let (sign, type_badge, amount_style) = match transaction.transaction_type {
        TransactionType::Inbound => ("+", BADGE_GREEN_STYLE, "text-green-600 dark:text-green-400"),
        TransactionType::Outbound => ("-", BADGE_RED_STYLE, "text-red-600 dark:text-red-400"),
    };

    let status_badge = match transaction.status {
        TransactionStatus::Completed => BADGE_GREEN_STYLE,
        TransactionStatus::Pending => BADGE_YELLOW_STYLE,
        TransactionStatus::Failed => BADGE_RED_STYLE,
    };

    html! {
        tr class=(TABLE_ROW_STYLE) data-transaction-id=(transaction.id)
        {
            td class=(TABLE_CELL_STYLE) { (transaction.date.to_offset(local_offset).date()) }
            @if show_employee {
                td class=(TABLE_CELL_STYLE)
                {
                    (transaction.employee_name.as_deref().unwrap_or("Unassigned"))
                }
            }
            td class=(TABLE_CELL_STYLE)
            {
                span class=(type_badge) { (transaction.transaction_type) }
            }
            td class={(TABLE_CELL_STYLE) " font-mono"} { (transaction.reference) }
            td class=(TABLE_CELL_STYLE) { (transaction.description) }
            td class={(TABLE_CELL_STYLE) " text-right font-semibold " (amount_style)}
            {
                (sign) (format_currency(transaction.amount, currency_symbol))
            }
            td class=(TABLE_CELL_STYLE)
            {
                span class=(status_badge) { (transaction.status.label()) }
            }
        }
    }
}
