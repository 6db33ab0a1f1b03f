//! The page shown when a user's role does not allow them to see a page.

use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};

use crate::html::error_view;

pub fn get_403_forbidden_response() -> Response {
    (
        StatusCode::FORBIDDEN,
        Html(
            error_view(
                "Forbidden",
                "403",
                "You can't go there.",
                "Your role does not have access to this page. Head back to your dashboard.",
            )
            .into_string(),
        ),
    )
        .into_response()
}
