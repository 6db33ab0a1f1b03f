//! Defines the route handler for the page for adding an employee.

use axum::response::{IntoResponse, Response};
use maud::{Markup, html};

use crate::{
    auth::Role,
    endpoints,
    html::{
        BUTTON_PRIMARY_STYLE, FORM_CONTAINER_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE, base,
        loading_spinner,
    },
    navigation::NavBar,
};

fn create_employee_view() -> Markup {
    let nav_bar = NavBar::new(endpoints::NEW_EMPLOYEE_VIEW, Role::Owner).into_html();
    let spinner = loading_spinner();

    let content = html! {
        (nav_bar)

        div class=(FORM_CONTAINER_STYLE)
        {
            form
                hx-post=(endpoints::EMPLOYEES_API)
                hx-target-error="#alert-container"
                class="w-full space-y-4 md:space-y-6"
            {
                h2 class="text-xl font-bold" { "Add Employee" }

                div
                {
                    label for="name" class=(FORM_LABEL_STYLE) { "Name" }

                    input
                        name="name"
                        id="name"
                        type="text"
                        placeholder="Juan Dela Cruz"
                        required
                        autofocus
                        class=(FORM_TEXT_INPUT_STYLE);
                }

                div
                {
                    label for="email" class=(FORM_LABEL_STYLE) { "Email" }

                    input
                        name="email"
                        id="email"
                        type="email"
                        placeholder="juan@example.com"
                        required
                        class=(FORM_TEXT_INPUT_STYLE);
                }

                button type="submit" id="submit-button" tabindex="0" class=(BUTTON_PRIMARY_STYLE)
                {
                    span id="indicator" class="inline htmx-indicator" { (spinner) }
                    " Add Employee"
                }
            }
        }
    };

    base("Add Employee", &[], &content)
}

/// Renders the page for adding an employee.
pub async fn get_create_employee_page() -> Response {
    create_employee_view().into_response()
}

#[cfg(test)]
mod view_tests {
    use crate::{
        endpoints,
        test_utils::{
            assert_content_type, assert_form_input, assert_form_submit_button, assert_hx_endpoint,
            assert_status_ok, assert_valid_html, must_get_form, parse_html_document,
        },
    };

    use super::get_create_employee_page;

    #[tokio::test]
    async fn render_page() {
        let response = get_create_employee_page().await;

        assert_status_ok(&response);
        assert_content_type(&response, "text/html; charset=utf-8");

        let html = parse_html_document(response).await;
        assert_valid_html(&html);

        let form = must_get_form(&html);
        assert_hx_endpoint(&form, endpoints::EMPLOYEES_API, "hx-post");
        assert_form_input(&form, "name", "text");
        assert_form_input(&form, "email", "email");
        assert_form_submit_button(&form);
    }
}
