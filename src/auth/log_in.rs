//! This file defines the routes for displaying the log-in page and handling log-in requests.
//! The rest of the auth module handles the lower level authentication and cookie logic.

use std::sync::{Arc, Mutex};

use axum::{
    Form,
    extract::{FromRef, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_extra::extract::{PrivateCookieJar, cookie::Key};
use axum_htmx::HxRedirect;
use maud::{Markup, html};
use rusqlite::Connection;
use serde::Deserialize;
use time::Duration;

use crate::{
    AppState, Error,
    auth::{
        Credentials, Role, Session, UserStore, authenticate,
        cookie::{invalidate_session_cookie, set_session_cookie},
        normalize_redirect_url,
    },
    employee::ensure_employee_for_user,
    endpoints,
    html::{
        BUTTON_PRIMARY_STYLE, FORM_LABEL_STYLE, FORM_RADIO_GROUP_STYLE, FORM_RADIO_INPUT_STYLE,
        FORM_RADIO_LABEL_STYLE, FORM_TEXT_INPUT_STYLE, base, loading_spinner, log_in_card,
    },
};

/// How long the session cookie should last if the user selects "remember me" at log-in.
pub(crate) const REMEMBER_ME_COOKIE_DURATION: Duration = Duration::days(7);

pub(crate) const MISSING_CREDENTIALS_ERROR_MSG: &str = "Email and password required";
pub(crate) const INVALID_CREDENTIALS_ERROR_MSG: &str = "Invalid credentials";
const INTERNAL_ERROR_MSG: &str = "An internal error occurred. Please try again later.";

fn role_option(role: Role, label: &str, selected_role: Role) -> Markup {
    let id = format!("role-{role}");

    html! {
        div class="flex items-center gap-3"
        {
            input
                name="role"
                id=(id)
                type="radio"
                value=(role)
                checked[role == selected_role]
                required
                tabindex="0"
                class=(FORM_RADIO_INPUT_STYLE);

            label for=(id) class=(FORM_RADIO_LABEL_STYLE) { (label) }
        }
    }
}

fn log_in_form(
    email: &str,
    role: Role,
    error_message: Option<&str>,
    redirect_url: Option<&str>,
) -> Markup {
    html! {
        form
            hx-post=(endpoints::LOG_IN_API)
            hx-swap="outerHTML"
            hx-indicator="#indicator"
            hx-disabled-elt="#email, #password, #submit-button"
            class="space-y-4 md:space-y-6"
        {
            @if let Some(redirect_url) = redirect_url {
                input type="hidden" name="redirect_url" value=(redirect_url);
            }

            fieldset class="space-y-2"
            {
                legend class=(FORM_LABEL_STYLE) { "Log in as" }

                div class=(FORM_RADIO_GROUP_STYLE)
                {
                    (role_option(Role::Employee, "Employee", role))
                    (role_option(Role::Owner, "Owner", role))
                }
            }

            div
            {
                label for="email" class=(FORM_LABEL_STYLE) { "Email" }

                input
                    type="email"
                    name="email"
                    id="email"
                    placeholder="you@example.com"
                    value=(email)
                    required
                    autofocus
                    tabindex="0"
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            div
            {
                label for="password" class=(FORM_LABEL_STYLE) { "Password" }

                input
                    type="password"
                    name="password"
                    id="password"
                    placeholder="••••••••"
                    required
                    tabindex="0"
                    class=(FORM_TEXT_INPUT_STYLE);

                @if let Some(error_message) = error_message {
                    p class="text-red-500 text-base" { (error_message) }
                }
            }

            div class="flex items-center gap-x-3"
            {
                input
                    type="checkbox"
                    name="remember_me"
                    id="remember_me"
                    tabindex="0"
                    class="rounded-xs";

                label for="remember_me" class=(FORM_LABEL_STYLE)
                {
                    "Keep me logged in for one week"
                }
            }

            button type="submit" id="submit-button" tabindex="0" class=(BUTTON_PRIMARY_STYLE)
            {
                span class="inline htmx-indicator" id="indicator" { (loading_spinner()) }
                "Log in"
            }
        }
    }
}

fn parse_redirect_url(raw_url: Option<&str>, source: &str) -> Option<String> {
    let redirect_url = raw_url.and_then(normalize_redirect_url);

    if redirect_url.is_none()
        && let Some(raw_url) = raw_url
    {
        tracing::warn!("Invalid redirect URL from {source}: {raw_url}");
    }

    redirect_url
}

#[derive(Deserialize)]
pub struct RedirectQuery {
    pub redirect_url: Option<String>,
}

/// Display the log-in page.
pub async fn get_log_in_page(Query(query): Query<RedirectQuery>) -> Response {
    let redirect_url = parse_redirect_url(query.redirect_url.as_deref(), "log-in query");
    let form = log_in_form("", Role::Employee, None, redirect_url.as_deref());
    let content = log_in_card("Log in to G-Audit", &form);

    base("Log In", &[], &content).into_response()
}

/// The state needed to perform a login.
#[derive(Debug, Clone)]
pub struct LoginState {
    /// The key to be used for signing and encrypting private cookies.
    pub cookie_key: Key,
    /// The duration for which session cookies are valid.
    pub cookie_duration: Duration,
    pub user_store: Arc<dyn UserStore>,
    /// Used to link employee users to their employee record.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The bcrypt cost for hashing the passwords of new users.
    pub password_hash_cost: u32,
}

impl FromRef<AppState> for LoginState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            cookie_key: state.cookie_key.clone(),
            cookie_duration: state.cookie_duration,
            user_store: state.user_store.clone(),
            db_connection: state.db_connection.clone(),
            password_hash_cost: state.password_hash_cost,
        }
    }
}

// this impl tells `PrivateCookieJar` how to access the key from our state
impl FromRef<LoginState> for Key {
    fn from_ref(state: &LoginState) -> Self {
        state.cookie_key.clone()
    }
}

/// The raw data entered by the user in the log-in form.
#[derive(Clone, Deserialize)]
pub struct LogInData {
    #[serde(default)]
    pub email: String,

    #[serde(default)]
    pub password: String,

    /// The role to register as if the email is new.
    pub role: Option<Role>,

    /// Whether to extend the initial session cookie duration.
    ///
    /// This value comes from a checkbox, so it either has a string value or is not set
    /// (see the [MDN docs](https://developer.mozilla.org/en-US/docs/Web/HTML/Element/input/checkbox#value_2)).
    pub remember_me: Option<String>,

    /// Optional URL to redirect to after logging in.
    pub redirect_url: Option<String>,
}

/// Log in `credentials` and link employee users to their employee record.
///
/// Shared by the log-in form and the JSON log-in API.
pub(crate) fn log_in_user(state: &LoginState, credentials: &Credentials) -> Result<Session, Error> {
    let user = authenticate(
        state.user_store.as_ref(),
        credentials,
        state.password_hash_cost,
    )?;

    if user.role == Role::Employee {
        let connection = state
            .db_connection
            .lock()
            .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
            .map_err(|_| Error::DatabaseLockError)?;
        ensure_employee_for_user(&user, &connection)?;
    }

    Ok(Session::new(&user, state.cookie_duration))
}

/// Handler for log-in requests via the POST method.
///
/// On a successful log-in request, the session cookie is set and the client
/// is redirected to their dashboard, or the page they were trying to reach.
/// Otherwise, the form is returned with an error message explaining the problem.
pub async fn post_log_in(
    State(state): State<LoginState>,
    jar: PrivateCookieJar,
    Form(form): Form<LogInData>,
) -> Response {
    let redirect_url = parse_redirect_url(form.redirect_url.as_deref(), "log-in form");
    let redirect_url = redirect_url.as_deref();
    let requested_role = form.role.unwrap_or_default();

    let credentials = Credentials {
        email: form.email.clone(),
        password: form.password,
        role: form.role,
    };

    let mut session = match log_in_user(&state, &credentials) {
        Ok(session) => session,
        Err(error) => {
            let message = match error {
                Error::MissingCredentials => MISSING_CREDENTIALS_ERROR_MSG,
                Error::InvalidCredentials => INVALID_CREDENTIALS_ERROR_MSG,
                error => {
                    tracing::error!("Unhandled error while logging in: {error}");
                    INTERNAL_ERROR_MSG
                }
            };

            return log_in_form(&form.email, requested_role, Some(message), redirect_url)
                .into_response();
        }
    };

    if form.remember_me.is_some() {
        session.expires_at += REMEMBER_ME_COOKIE_DURATION - state.cookie_duration;
    }

    let redirect_url = redirect_url.unwrap_or(session.role.dashboard_endpoint());
    tracing::info!("{} logged in as {}", session.email, session.role);

    set_session_cookie(jar.clone(), &session)
        .map(|updated_jar| {
            (
                StatusCode::SEE_OTHER,
                HxRedirect(redirect_url.to_owned()),
                updated_jar,
            )
        })
        .map_err(|error| {
            tracing::error!("Error setting session cookie: {error}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                HxRedirect(endpoints::INTERNAL_ERROR_VIEW.to_owned()),
                invalidate_session_cookie(jar),
            )
        })
        .into_response()
}
