//! Authentication middleware that validates the session cookie, extends
//! sessions, checks roles and handles redirects to the log-in page.

use axum::{
    extract::{FromRef, FromRequestParts, Request, State},
    http::{StatusCode, header::SET_COOKIE},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::{PrivateCookieJar, cookie::Key};
use axum_htmx::HxRedirect;
use time::Duration;

use crate::{
    AppState, Error,
    auth::{
        Role, Session,
        cookie::{extend_session_cookie_duration_if_needed, get_session_from_cookies},
        redirect::{build_log_in_redirect_url, build_log_in_redirect_url_from_target},
    },
    endpoints,
};

/// How far each authenticated request pushes back the session expiry, at least.
const SESSION_EXTENSION: Duration = Duration::minutes(5);

/// The state needed for the auth middleware
#[derive(Clone)]
pub struct AuthState {
    /// The key to be used for signing and encrypting private cookies.
    pub cookie_key: Key,
}

impl FromRef<AppState> for AuthState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            cookie_key: state.cookie_key.clone(),
        }
    }
}

// this impl tells `PrivateCookieJar` how to access the key from our state
impl FromRef<AuthState> for Key {
    fn from_ref(state: &AuthState) -> Self {
        state.cookie_key.clone()
    }
}

#[inline]
async fn auth_guard_internal(
    state: AuthState,
    request: Request,
    next: Next,
    get_redirect: impl Fn(&str) -> Response,
) -> Response {
    let log_in_redirect_url = build_log_in_redirect_url(&request).unwrap_or_else(|| {
        build_log_in_redirect_url_from_target(endpoints::DASHBOARD_VIEW)
            .unwrap_or_else(|| endpoints::LOG_IN_VIEW.to_owned())
    });

    let (mut parts, body) = request.into_parts();
    let jar = match PrivateCookieJar::from_request_parts(&mut parts, &state).await {
        Ok(jar) => jar,
        Err(error) => {
            tracing::error!("Error getting cookie jar: {error:?}. Redirecting to log in page.");
            return get_redirect(&log_in_redirect_url);
        }
    };

    let session = match get_session_from_cookies(&jar) {
        Ok(session) => session,
        Err(Error::CookieMissing) => return get_redirect(&log_in_redirect_url),
        Err(error) => {
            tracing::info!("Rejected session: {error}. Redirecting to log in page.");
            return get_redirect(&log_in_redirect_url);
        }
    };

    parts.extensions.insert(session);
    let request = Request::from_parts(parts, body);
    let response = next.run(request).await;

    let (mut parts, body) = response.into_parts();

    // A handler that changed the session cookie (e.g. log out) has the final say.
    if parts.headers.contains_key(SET_COOKIE) {
        return Response::from_parts(parts, body);
    }

    let jar = match extend_session_cookie_duration_if_needed(jar.clone(), SESSION_EXTENSION) {
        Ok(updated_jar) => updated_jar,
        Err(error) => {
            tracing::error!("Error extending cookie duration: {error}. Rolling back cookie jar.");
            jar
        }
    };

    for (key, value) in jar.into_response().headers().iter() {
        if key == SET_COOKIE {
            parts.headers.append(key, value.to_owned());
        }
    }

    Response::from_parts(parts, body)
}

/// Middleware function that checks for a valid session cookie.
///
/// The [Session] is placed into the request and then the request executed
/// normally if the cookie is valid, otherwise a redirect to the log-in page is returned.
///
/// **Note**: Route handlers can use the function argument `Extension(session): Extension<Session>` to receive the session.
pub async fn auth_guard(State(state): State<AuthState>, request: Request, next: Next) -> Response {
    auth_guard_internal(state, request, next, |redirect_url| {
        Redirect::to(redirect_url).into_response()
    })
    .await
}

/// Like [auth_guard], but responds with a HTMX redirect for requests made by HTMX.
pub async fn auth_guard_hx(
    State(state): State<AuthState>,
    request: Request,
    next: Next,
) -> Response {
    auth_guard_internal(state, request, next, |redirect_url| {
        (HxRedirect(redirect_url.to_owned()), StatusCode::OK).into_response()
    })
    .await
}

#[inline]
async fn role_guard_internal(
    role: Role,
    request: Request,
    next: Next,
    get_forbidden: impl Fn() -> Response,
) -> Response {
    match request.extensions().get::<Session>() {
        Some(session) if session.role == role => next.run(request).await,
        Some(session) => {
            tracing::warn!(
                "{} ({}) tried to access {} which needs the {role} role",
                session.email,
                session.role,
                request.uri().path()
            );
            get_forbidden()
        }
        None => {
            tracing::error!(
                "No session for {}, the role guard must run after the auth guard",
                request.uri().path()
            );
            get_forbidden()
        }
    }
}

/// Middleware function that only lets owners through, employees get a 403 page.
///
/// Must be layered inside [auth_guard].
pub async fn owner_guard(request: Request, next: Next) -> Response {
    role_guard_internal(Role::Owner, request, next, || {
        Error::Forbidden.into_response()
    })
    .await
}

/// Middleware function that only lets employees through, owners get a 403 page.
///
/// Must be layered inside [auth_guard].
pub async fn employee_guard(request: Request, next: Next) -> Response {
    role_guard_internal(Role::Employee, request, next, || {
        Error::Forbidden.into_response()
    })
    .await
}

/// Like [owner_guard], but responds with an alert for HTMX requests.
pub async fn owner_guard_hx(request: Request, next: Next) -> Response {
    role_guard_internal(Role::Owner, request, next, || {
        Error::Forbidden.into_alert_response()
    })
    .await
}

/// Like [employee_guard], but responds with an alert for HTMX requests.
pub async fn employee_guard_hx(request: Request, next: Next) -> Response {
    role_guard_internal(Role::Employee, request, next, || {
        Error::Forbidden.into_alert_response()
    })
    .await
}
