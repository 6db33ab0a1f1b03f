//! Card components for the dashboard summaries.
//!
//! Provides:
//! - Stat cards with the owner's totals across all employees
//! - Balance summary cards for a wallet's starting and current balance
//! - Employee balance cards with each employee's completed activity

use maud::{Markup, html};

use crate::{
    html::{CARD_STYLE, format_currency},
    transaction::{BalanceSummary, EmployeeSummary, TransactionStats},
};

const POSITIVE_STYLE: &str = "text-green-600 dark:text-green-400";
const NEGATIVE_STYLE: &str = "text-red-600 dark:text-red-400";
const NEUTRAL_STYLE: &str = "text-gray-900 dark:text-white";

fn signed_style(amount: f64) -> &'static str {
    if amount < 0.0 {
        NEGATIVE_STYLE
    } else {
        POSITIVE_STYLE
    }
}

/// A card with a small label above a large value.
fn stat_card(id: &str, label: &str, value: &str, value_style: &str) -> Markup {
    html! {
        div id=(id) class=(CARD_STYLE)
        {
            p class="text-sm text-gray-600 dark:text-gray-400" { (label) }
            p class={"mt-2 text-2xl font-bold " (value_style)} { (value) }
        }
    }
}

/// The owner's totals: inbound, outbound, active employees and net flow.
pub(super) fn stats_cards_view(stats: &TransactionStats, currency_symbol: &str) -> Markup {
    let net_flow = stats.net_flow();

    html! {
        section id="stats-cards" class="w-full grid grid-cols-1 sm:grid-cols-2 lg:grid-cols-4 gap-4"
        {
            (stat_card(
                "total-inbound",
                "Total Inbound",
                &format_currency(stats.inbound, currency_symbol),
                POSITIVE_STYLE,
            ))
            (stat_card(
                "total-outbound",
                "Total Outbound",
                &format_currency(stats.outbound, currency_symbol),
                NEGATIVE_STYLE,
            ))
            (stat_card(
                "active-employees",
                "Active Employees",
                &stats.employee_count.to_string(),
                NEUTRAL_STYLE,
            ))
            (stat_card(
                "net-flow",
                "Net Flow",
                &format_currency(net_flow, currency_symbol),
                signed_style(net_flow),
            ))
        }
    }
}

/// The starting balance, the money in and out since, and the resulting balance.
pub(super) fn balance_summary_view(summary: &BalanceSummary, currency_symbol: &str) -> Markup {
    html! {
        section id="balance-summary" class="w-full grid grid-cols-1 sm:grid-cols-2 lg:grid-cols-5 gap-4"
        {
            (stat_card(
                "starting-balance",
                "Starting Balance",
                &format_currency(summary.starting_balance, currency_symbol),
                NEUTRAL_STYLE,
            ))
            (stat_card(
                "inbound",
                "Inbound",
                &format!("+{}", format_currency(summary.inbound, currency_symbol)),
                POSITIVE_STYLE,
            ))
            (stat_card(
                "outbound",
                "Outbound",
                &format!("-{}", format_currency(summary.outbound, currency_symbol)),
                NEGATIVE_STYLE,
            ))
            (stat_card(
                "current-balance",
                "Current Balance",
                &format_currency(summary.current_balance, currency_symbol),
                signed_style(summary.current_balance),
            ))
            (stat_card(
                "transaction-count",
                "Transactions",
                &summary.transaction_count.to_string(),
                NEUTRAL_STYLE,
            ))
        }
    }
}

fn employee_card(summary: &EmployeeSummary, currency_symbol: &str) -> Markup {
    let sign = if summary.balance < 0.0 { "-" } else { "+" };

    html! {
        div class=(CARD_STYLE) data-employee-id=(summary.employee_id)
        {
            div class="flex justify-between items-baseline"
            {
                h4 class="text-lg font-semibold truncate" { (summary.name) }
                span class="text-xs text-gray-600 dark:text-gray-400"
                {
                    (summary.transaction_count) " transactions"
                }
            }

            p class="mt-3 text-sm text-gray-600 dark:text-gray-400" { "Current Balance" }
            p class={"text-2xl font-bold employee-balance " (signed_style(summary.balance))}
            {
                (sign) (format_currency(summary.balance.abs(), currency_symbol))
            }

            div class="mt-3 grid grid-cols-2 gap-2 text-sm"
            {
                div
                {
                    p class="text-gray-600 dark:text-gray-400" { "Inbound" }
                    p class=(POSITIVE_STYLE) { (format_currency(summary.inbound, currency_symbol)) }
                }
                div
                {
                    p class="text-gray-600 dark:text-gray-400" { "Outbound" }
                    p class=(NEGATIVE_STYLE) { (format_currency(summary.outbound, currency_symbol)) }
                }
            }
        }
    }
}

/// A card per employee with the balance of their completed transactions.
pub(super) fn employee_cards_view(summaries: &[EmployeeSummary], currency_symbol: &str) -> Markup {
    html! {
        section id="employee-cards" class="w-full"
        {
            h3 class="text-xl font-semibold mb-4" { "Employee Balances" }

            @if summaries.is_empty() {
                p class="text-gray-600 dark:text-gray-400" { "No employees yet." }
            } @else {
                div class="grid grid-cols-1 sm:grid-cols-2 lg:grid-cols-3 gap-4"
                {
                    @for summary in summaries {
                        (employee_card(summary, currency_symbol))
                    }
                }
            }
        }
    }
}
