//! Alert system for displaying success and error messages to users.
//!
//! Alerts are rendered as an out-of-band swap for the `#alert-container`
//! element in the base page, so any HTMX response can show one.

use axum::response::{IntoResponse, Response};
use maud::{Markup, html};

/// A message to show the user after an action.
#[derive(Debug, Clone, PartialEq)]
pub enum Alert {
    /// The action worked, `details` explains what happened.
    Success {
        /// The headline of the alert.
        message: String,
        /// More information about the result.
        details: String,
    },
    /// The action failed, `details` explains how to fix it.
    Error {
        /// The headline of the alert.
        message: String,
        /// More information about the error.
        details: String,
    },
    /// The action failed and the message says it all.
    ErrorSimple {
        /// The headline of the alert.
        message: String,
    },
}

impl Alert {
    /// Render the alert as a replacement for the page's alert container.
    pub fn into_html(self) -> Markup {
        let (container_style, icon, message, details) = match self {
            Alert::Success { message, details } => (
                "text-green-800 bg-green-50 border-green-300 \
                dark:bg-gray-800 dark:text-green-400 dark:border-green-800",
                "✓",
                message,
                Some(details),
            ),
            Alert::Error { message, details } => (
                "text-red-800 bg-red-50 border-red-300 \
                dark:bg-gray-800 dark:text-red-400 dark:border-red-800",
                "!",
                message,
                Some(details),
            ),
            Alert::ErrorSimple { message } => (
                "text-red-800 bg-red-50 border-red-300 \
                dark:bg-gray-800 dark:text-red-400 dark:border-red-800",
                "!",
                message,
                None,
            ),
        };

        html! {
            div
                id="alert-container"
                hx-swap-oob="true"
                class="w-full max-w-md px-4"
                style="position: fixed; bottom: 1rem; left: 50%; transform: translateX(-50%); z-index: 9999;"
            {
                div
                    role="alert"
                    class={"flex items-start gap-3 p-4 border rounded-lg shadow " (container_style)}
                {
                    span class="font-bold" aria-hidden="true" { (icon) }

                    div class="flex-1"
                    {
                        p class="text-sm font-medium" { (message) }

                        @if let Some(details) = details {
                            @if !details.is_empty() {
                                p class="mt-1 text-sm opacity-80" { (details) }
                            }
                        }
                    }

                    button
                        type="button"
                        aria-label="Dismiss"
                        class="ms-auto text-sm font-semibold"
                        onclick="this.closest('[role=alert]').remove()"
                    {
                        "×"
                    }
                }
            }
        }
    }
}

impl IntoResponse for Alert {
    fn into_response(self) -> Response {
        self.into_html().into_response()
    }
}
