//! Dashboard HTTP handlers and view rendering.
//!
//! This module contains:
//! - The redirect from the root route to the dashboard for the user's role
//! - The employee dashboard with the employee's own transactions
//! - The owner dashboard and the partial that re-renders its filtered results

use std::sync::{Arc, Mutex, MutexGuard};

use axum::{
    Extension,
    extract::{FromRef, Query, State},
    response::{IntoResponse, Redirect, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;
use time::{Date, OffsetDateTime, UtcOffset, macros::format_description};

use crate::{
    AppState, Error,
    auth::{Role, Session},
    dashboard::{
        DashboardConfig,
        cards::{balance_summary_view, employee_cards_view, stats_cards_view},
        charts::{DashboardChart, chart_view, echarts_script, employee_totals_chart},
        filter_form::{RESULTS_ID, filter_form},
    },
    employee::{get_all_employees, get_employee_by_email},
    endpoints,
    html::{BUTTON_SECONDARY_STYLE, CARD_STYLE, PAGE_CONTAINER_STYLE, base},
    navigation::NavBar,
    timezone::local_offset_or_error,
    transaction::{
        Transaction, TransactionFilter, TransactionScope, apply_filters, balance_summary,
        compute_stats, employee_summaries, get_transactions, totals_by_employee,
        transaction_table,
    },
};

/// The state needed for displaying the dashboards.
#[derive(Debug, Clone)]
pub struct DashboardState {
    /// The database connection for reading transactions and employees.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The local timezone as a canonical timezone name, e.g. "Asia/Manila".
    pub local_timezone: String,
    /// The currency and starting balances to display.
    pub config: DashboardConfig,
}

impl FromRef<AppState> for DashboardState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
            config: state.dashboard_config.clone(),
        }
    }
}

/// Redirect to the dashboard for the logged-in user's role.
pub async fn get_dashboard_redirect(Extension(session): Extension<Session>) -> Redirect {
    Redirect::to(session.role.dashboard_endpoint())
}

fn format_long_date(date: Date) -> Result<String, Error> {
    date.format(format_description!(
        "[weekday], [month repr:long] [day padding:none], [year]"
    ))
    .map_err(|error| Error::InvalidDate(error.to_string()))
}

fn page_header(title: &str, subtitle: &str, today: &str, actions: &[(&str, &str)]) -> Markup {
    html! {
        div class="w-full flex flex-col md:flex-row md:items-start md:justify-between gap-6"
        {
            div
            {
                h1 class="text-3xl font-bold" { (title) }
                p class="text-gray-600 dark:text-gray-400 mt-1" { (subtitle) }
                p id="today" class="text-gray-600 dark:text-gray-400" { (today) }
            }

            div class="flex flex-col gap-3"
            {
                @for (url, label) in actions {
                    a href=(url) class=(BUTTON_SECONDARY_STYLE) { (label) }
                }
            }
        }
    }
}

fn lock_connection(state: &DashboardState) -> Result<MutexGuard<'_, Connection>, Error> {
    state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)
}

/// Display the dashboard for an employee with their balance and transaction history.
pub async fn get_employee_dashboard_page(
    State(state): State<DashboardState>,
    Extension(session): Extension<Session>,
) -> Result<Response, Error> {
    let local_offset = local_offset_or_error(&state.local_timezone)?;

    let transactions = {
        let connection = lock_connection(&state)?;

        match get_employee_by_email(&session.email, &connection) {
            Ok(employee) => {
                get_transactions(&TransactionScope::Employee(employee.id), &connection)
                    .inspect_err(|error| {
                        tracing::error!("Could not get transactions for {}: {error}", session.email)
                    })?
            }
            Err(Error::NotFound) => {
                tracing::warn!("No employee record for {}", session.email);
                Vec::new()
            }
            Err(error) => return Err(error),
        }
    };

    let today = OffsetDateTime::now_utc().to_offset(local_offset).date();
    let summary = balance_summary(
        state.config.employee_starting_balance,
        &compute_stats(&transactions),
    );
    let currency_symbol = &state.config.currency_symbol;

    let header = page_header(
        "Employee Dashboard",
        &format!("Welcome, {}", session.name),
        &format_long_date(today)?,
        &[
            (endpoints::NEW_TRANSACTION_VIEW, "Enter Data"),
            (endpoints::IMPORT_VIEW, "Upload CSV"),
        ],
    );

    let content = html! {
        (NavBar::new(endpoints::EMPLOYEE_DASHBOARD_VIEW, Role::Employee).into_html())

        div class={(PAGE_CONTAINER_STYLE) " max-w-screen-xl space-y-8"}
        {
            (header)
            (balance_summary_view(&summary, currency_symbol))

            section class={(CARD_STYLE) " w-full"}
            {
                h3 class="text-xl font-semibold" { "Transaction History" }
                p class="text-sm text-gray-600 dark:text-gray-400 mb-4"
                {
                    "Your transactions (" (transactions.len()) ")"
                }

                (transaction_table(&transactions, false, currency_symbol, local_offset))
            }
        }
    };

    Ok(base("Dashboard", &[], &content).into_response())
}

/// The chart and table for the owner's filtered transactions.
fn owner_results_view(
    filtered: &[Transaction],
    currency_symbol: &str,
    local_offset: UtcOffset,
) -> Markup {
    let chart = DashboardChart {
        id: "employee-totals-chart",
        options: employee_totals_chart(&totals_by_employee(filtered), currency_symbol)
            .to_string(),
    };

    html! {
        div id=(RESULTS_ID) class="w-full space-y-8"
        {
            section class={(CARD_STYLE) " w-full"}
            {
                (chart_view(&chart))
            }

            section class={(CARD_STYLE) " w-full"}
            {
                h3 class="text-xl font-semibold" { "Transaction Details" }
                p id="filtered-count" class="text-sm text-gray-600 dark:text-gray-400 mb-4"
                {
                    "All transactions (" (filtered.len()) ")"
                }

                (transaction_table(filtered, true, currency_symbol, local_offset))
            }
        }
    }
}

/// Display the owner dashboard with totals across all employees and the filtered transactions.
pub async fn get_owner_dashboard_page(
    State(state): State<DashboardState>,
    Extension(session): Extension<Session>,
    Query(filter): Query<TransactionFilter>,
) -> Result<Response, Error> {
    let local_offset = local_offset_or_error(&state.local_timezone)?;

    let (employees, transactions) = {
        let connection = lock_connection(&state)?;
        let employees = get_all_employees(&connection)
            .inspect_err(|error| tracing::error!("Could not get employees: {error}"))?;
        let transactions = get_transactions(&TransactionScope::All, &connection)
            .inspect_err(|error| tracing::error!("Could not get transactions: {error}"))?;

        (employees, transactions)
    };

    let today = OffsetDateTime::now_utc().to_offset(local_offset).date();
    let stats = compute_stats(&transactions);
    let summary = balance_summary(state.config.owner_starting_balance, &stats);
    let summaries = employee_summaries(&transactions, &employees);
    let filtered = apply_filters(&transactions, &filter);
    let currency_symbol = &state.config.currency_symbol;

    let header = page_header(
        "Owner Dashboard",
        &format!("Welcome, {}", session.name),
        &format_long_date(today)?,
        &[(endpoints::NEW_EMPLOYEE_VIEW, "Add Employee")],
    );

    let content = html! {
        (NavBar::new(endpoints::OWNER_DASHBOARD_VIEW, Role::Owner).into_html())

        div class={(PAGE_CONTAINER_STYLE) " max-w-screen-xl space-y-8"}
        {
            (header)
            (stats_cards_view(&stats, currency_symbol))
            (balance_summary_view(&summary, currency_symbol))
            (employee_cards_view(&summaries, currency_symbol))

            section class={(CARD_STYLE) " w-full"}
            {
                h3 class="text-xl font-semibold" { "Filtering & Search" }
                p class="text-sm text-gray-600 dark:text-gray-400 mb-4"
                {
                    "Filter transactions by employee, type, or reference"
                }

                (filter_form(&employees, &filter))
            }

            (owner_results_view(&filtered, currency_symbol, local_offset))
        }
    };

    Ok(base("Dashboard", &[echarts_script()], &content).into_response())
}

/// Re-render the owner dashboard's chart and table for the filter in the query string.
pub async fn get_owner_transactions(
    State(state): State<DashboardState>,
    Query(filter): Query<TransactionFilter>,
) -> Response {
    let local_offset = match local_offset_or_error(&state.local_timezone) {
        Ok(offset) => offset,
        Err(error) => return error.into_alert_response(),
    };

    let transactions = {
        let connection = match lock_connection(&state) {
            Ok(connection) => connection,
            Err(error) => return error.into_alert_response(),
        };

        match get_transactions(&TransactionScope::All, &connection) {
            Ok(transactions) => transactions,
            Err(error) => {
                tracing::error!("Could not get transactions: {error}");
                return error.into_alert_response();
            }
        }
    };

    let filtered = apply_filters(&transactions, &filter);

    owner_results_view(&filtered, &state.config.currency_symbol, local_offset).into_response()
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::{
        Extension,
        extract::{Query, State},
        http::StatusCode,
        response::IntoResponse,
    };
    use scraper::{Html, Selector};
    use time::macros::date;

    use crate::{
        auth::Role,
        dashboard::DashboardConfig,
        employee::{EmployeeId, get_employee_by_email},
        endpoints,
        mock_data::seed_mock_data,
        test_utils::{
            assert_valid_html, employee_session, get_test_connection, owner_session,
            parse_html_document, parse_html_fragment, test_session,
        },
        transaction::{EmployeeFilter, TransactionFilter, TypeFilter},
    };

    use super::{
        DashboardState, format_long_date, get_dashboard_redirect, get_employee_dashboard_page,
        get_owner_dashboard_page, get_owner_transactions,
    };

    fn get_test_state() -> DashboardState {
        let connection = get_test_connection();
        seed_mock_data(&connection).unwrap();

        DashboardState {
            db_connection: Arc::new(Mutex::new(connection)),
            local_timezone: "Etc/UTC".to_owned(),
            config: DashboardConfig::default(),
        }
    }

    fn row_ids(html: &Html) -> Vec<String> {
        html.select(&Selector::parse("tr[data-transaction-id]").unwrap())
            .map(|row| {
                row.value()
                    .attr("data-transaction-id")
                    .unwrap_or_default()
                    .to_owned()
            })
            .collect()
    }

    fn text_of(html: &Html, selector: &str) -> String {
        html.select(&Selector::parse(selector).unwrap())
            .next()
            .unwrap_or_else(|| panic!("nothing matched {selector}"))
            .text()
            .collect::<String>()
            .trim()
            .to_owned()
    }

    #[tokio::test]
    async fn redirects_to_dashboard_for_role() {
        let response = get_dashboard_redirect(Extension(owner_session()))
            .await
            .into_response();
        assert_eq!(
            response.headers().get("location").unwrap(),
            endpoints::OWNER_DASHBOARD_VIEW
        );

        let response = get_dashboard_redirect(Extension(test_session(
            "jane@example.com",
            Role::Employee,
        )))
        .await
        .into_response();
        assert_eq!(
            response.headers().get("location").unwrap(),
            endpoints::EMPLOYEE_DASHBOARD_VIEW
        );
    }

    #[tokio::test]
    async fn employee_sees_only_own_transactions() {
        let state = get_test_state();
        let employee = {
            let connection = state.db_connection.lock().unwrap();
            get_employee_by_email("jane@example.com", &connection).unwrap()
        };

        let response =
            get_employee_dashboard_page(State(state), Extension(employee_session(&employee)))
                .await
                .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let html = parse_html_document(response).await;
        assert_valid_html(&html);

        let mut ids = row_ids(&html);
        ids.sort();
        assert_eq!(ids, vec!["3", "4"]);
        // 10,000 + 8,500 - 3,200
        assert!(text_of(&html, "#current-balance p + p").starts_with("₱15,300"));
        assert!(text_of(&html, "body").contains("Welcome, jane"));
    }

    #[tokio::test]
    async fn employee_without_record_sees_empty_table() {
        let state = get_test_state();

        let response = get_employee_dashboard_page(
            State(state),
            Extension(test_session("new@example.com", Role::Employee)),
        )
        .await
        .unwrap();

        let html = parse_html_document(response).await;
        assert_eq!(text_of(&html, "#transactions-empty"), "No transactions found");
    }

    #[tokio::test]
    async fn owner_sees_totals_and_all_transactions() {
        let state = get_test_state();

        let response = get_owner_dashboard_page(
            State(state),
            Extension(owner_session()),
            Query(TransactionFilter::default()),
        )
        .await
        .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let html = parse_html_document(response).await;
        assert_valid_html(&html);

        assert_eq!(row_ids(&html).len(), 6);
        assert_eq!(text_of(&html, "#active-employees p + p"), "3");
        assert!(text_of(&html, "#total-inbound p + p").starts_with("₱25,500"));
        assert!(text_of(&html, "#total-outbound p + p").starts_with("₱6,900"));
        assert_eq!(
            html.select(&Selector::parse("#employee-cards [data-employee-id]").unwrap())
                .count(),
            3
        );
        assert!(
            html.select(&Selector::parse("#employee-totals-chart").unwrap())
                .next()
                .is_some()
        );
    }

    #[tokio::test]
    async fn owner_page_applies_filter_from_query() {
        let state = get_test_state();
        let filter = TransactionFilter {
            employee: EmployeeFilter::Only(EmployeeId::new("1")),
            transaction_type: TypeFilter::Inbound,
            search: String::new(),
        };

        let response =
            get_owner_dashboard_page(State(state), Extension(owner_session()), Query(filter))
                .await
                .unwrap();

        let html = parse_html_document(response).await;
        assert_eq!(row_ids(&html), vec!["1"]);
        // The stat cards still cover every transaction.
        assert_eq!(text_of(&html, "#active-employees p + p"), "3");
    }

    #[tokio::test]
    async fn owner_transactions_partial_filters_by_search() {
        let state = get_test_state();
        let filter = TransactionFilter {
            search: "inv".to_owned(),
            ..Default::default()
        };

        let response = get_owner_transactions(State(state), Query(filter)).await;

        assert_eq!(response.status(), StatusCode::OK);
        let html = parse_html_fragment(response).await;
        let mut ids = row_ids(&html);
        ids.sort();
        assert_eq!(ids, vec!["1", "3", "5"]);
        assert_eq!(text_of(&html, "#filtered-count"), "All transactions (3)");
    }

    #[tokio::test]
    async fn owner_transactions_partial_shows_empty_message() {
        let state = get_test_state();
        let filter = TransactionFilter {
            search: "no such reference".to_owned(),
            ..Default::default()
        };

        let response = get_owner_transactions(State(state), Query(filter)).await;

        let html = parse_html_fragment(response).await;
        assert_eq!(text_of(&html, "#transactions-empty"), "No transactions found");
    }

    #[test]
    fn long_date_format() {
        assert_eq!(
            format_long_date(date!(2025 - 10 - 06)).unwrap(),
            "Monday, October 6, 2025"
        );
    }
}
