//! The JSON log-in endpoint for API clients.

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_extra::extract::PrivateCookieJar;
use serde::Serialize;
use serde_json::json;

use crate::{
    Error,
    auth::{
        Credentials, Role, Session, UserID,
        api_token::{TokenClaims, encode_token},
        cookie::set_session_cookie,
        log_in::{LoginState, log_in_user},
    },
};

/// The user details returned by a successful log-in.
#[derive(Debug, Serialize)]
struct UserResponse<'a> {
    id: UserID,
    email: &'a str,
    name: &'a str,
    role: Role,
}

fn error_response(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "error": message }))).into_response()
}

fn authentication_failed() -> Response {
    error_response(StatusCode::INTERNAL_SERVER_ERROR, "Authentication failed")
}

fn success_response(session: &Session, jar: PrivateCookieJar) -> Result<Response, Error> {
    let token = encode_token(&TokenClaims::from(session))?;
    let jar = set_session_cookie(jar, session)?;

    let body = json!({
        "user": UserResponse {
            id: session.user_id,
            email: &session.email,
            name: &session.name,
            role: session.role,
        },
        "token": token,
    });

    Ok((StatusCode::OK, jar, Json(body)).into_response())
}

/// Log in with a JSON body `{"email", "password", "role"}`.
///
/// Responds with the user and an API token, and sets the session cookie.
/// Unknown emails are registered on the spot.
pub async fn post_log_in_api(
    State(state): State<LoginState>,
    jar: PrivateCookieJar,
    body: Result<Json<Credentials>, JsonRejection>,
) -> Response {
    let Json(credentials) = match body {
        Ok(credentials) => credentials,
        Err(rejection) => {
            tracing::error!("Could not read log-in request body: {rejection}");
            return authentication_failed();
        }
    };

    let session = match log_in_user(&state, &credentials) {
        Ok(session) => session,
        Err(Error::MissingCredentials) => {
            return error_response(StatusCode::BAD_REQUEST, "Email and password required");
        }
        Err(Error::InvalidCredentials) => {
            return error_response(StatusCode::UNAUTHORIZED, "Invalid credentials");
        }
        Err(error) => {
            tracing::error!("Unhandled error while logging in: {error}");
            return authentication_failed();
        }
    };

    success_response(&session, jar).unwrap_or_else(|error| {
        tracing::error!("Could not create log-in response: {error}");
        authentication_failed()
    })
}
