//! The owner dashboard's form for filtering transactions by employee, type and search text.

use maud::{Markup, html};

use crate::{
    employee::Employee,
    endpoints,
    html::{FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE},
    transaction::{EmployeeFilter, TransactionFilter, TypeFilter},
};

/// The ID of the element the filtered results are swapped into.
pub(super) const RESULTS_ID: &str = "owner-transactions";

/// Renders the filter form, any change re-renders the results section.
pub(super) fn filter_form(employees: &[Employee], filter: &TransactionFilter) -> Markup {
    let type_options = [
        (TypeFilter::All, "All Types"),
        (TypeFilter::Inbound, "Inbound"),
        (TypeFilter::Outbound, "Outbound"),
    ];

    html! {
        form
            id="filter-form"
            hx-get=(endpoints::OWNER_TRANSACTIONS_API)
            hx-target={"#" (RESULTS_ID)}
            hx-target-error="#alert-container"
            hx-swap="outerHTML"
            hx-trigger="change, keyup changed delay:300ms from:#search"
            class="w-full grid gap-4 md:grid-cols-3"
        {
            div
            {
                label for="employee" class=(FORM_LABEL_STYLE) { "Employee" }

                select name="employee" id="employee" class=(FORM_TEXT_INPUT_STYLE)
                {
                    option
                        value=(EmployeeFilter::All.as_query_value())
                        selected[filter.employee == EmployeeFilter::All]
                    {
                        "All Employees"
                    }

                    @for employee in employees {
                        option
                            value=(employee.id)
                            selected[filter.employee == EmployeeFilter::Only(employee.id.clone())]
                        {
                            (employee.name)
                        }
                    }
                }
            }

            div
            {
                label for="type" class=(FORM_LABEL_STYLE) { "Transaction Type" }

                select name="type" id="type" class=(FORM_TEXT_INPUT_STYLE)
                {
                    @for (type_filter, label) in type_options {
                        option
                            value=(type_filter.as_query_value())
                            selected[filter.transaction_type == type_filter]
                        {
                            (label)
                        }
                    }
                }
            }

            div
            {
                label for="search" class=(FORM_LABEL_STYLE) { "Search Reference" }

                input
                    name="search"
                    id="search"
                    type="search"
                    placeholder="INV-001, EXP-001..."
                    value=(filter.search)
                    class=(FORM_TEXT_INPUT_STYLE);
            }
        }
    }
}
