use axum::response::{IntoResponse, Response};
use maud::{Markup, html};

use crate::{
    auth::Role,
    endpoints,
    html::{BUTTON_PRIMARY_STYLE, FORM_CONTAINER_STYLE, FORM_TEXT_INPUT_STYLE, base, loading_spinner},
    navigation::NavBar,
};

const EXPECTED_HEADER: &str = "type,amount,reference,description,date,status";

fn import_form_view() -> Markup {
    let spinner = loading_spinner();

    html! {
        form
            hx-post=(endpoints::IMPORT)
            hx-encoding="multipart/form-data"
            enctype="multipart/form-data"
            hx-disabled-elt="#files, #submit-button"
            hx-indicator="#indicator"
            hx-target-error="#alert-container"
            class="w-full space-y-4 md:space-y-6"
        {
            h2 class="text-xl font-bold" { "Upload CSV" }

            div
            {
                label
                    for="files"
                    class="block mb-2 text-sm font-medium text-gray-900 dark:text-white"
                {
                    "Choose file(s) to upload"
                }

                input
                    id="files"
                    type="file"
                    name="files"
                    accept=".csv,text/csv"
                    multiple
                    required
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            div class="text-sm text-gray-600 dark:text-gray-400 space-y-2"
            {
                p { "Each file needs a header row with the columns:" }
                code class="block p-2 rounded bg-gray-100 dark:bg-gray-700" { (EXPECTED_HEADER) }
                p
                {
                    "Dates can be written as YYYY-MM-DD or as a full date and time. "
                    "Leave the status empty for completed transactions."
                }
            }

            button
                type="submit"
                id="submit-button"
                class=(BUTTON_PRIMARY_STYLE)
            {
                span class="inline htmx-indicator" id="indicator" { (spinner) }
                " Upload Files"
            }
        }
    }
}

fn import_view() -> Markup {
    let nav_bar = NavBar::new(endpoints::IMPORT_VIEW, Role::Employee).into_html();
    let form = import_form_view();

    let content = html! {
        (nav_bar)

        div class=(FORM_CONTAINER_STYLE)
        {
            (form)
        }
    };

    base("Upload CSV", &[], &content)
}

/// Route handler for the CSV upload page.
pub async fn get_import_page() -> Response {
    import_view().into_response()
}
