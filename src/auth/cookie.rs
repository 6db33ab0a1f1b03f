//! Defines functions for storing the session in a private cookie.

use std::cmp::max;

use axum_extra::extract::{
    PrivateCookieJar,
    cookie::{Cookie, SameSite},
};
use time::{Duration, OffsetDateTime};

use crate::{Error, auth::Session};

pub(crate) const COOKIE_SESSION: &str = "session";
/// The default duration for which session cookies are valid.
pub const DEFAULT_COOKIE_DURATION: Duration = Duration::minutes(5);

/// Add the session cookie to the cookie jar, indicating that a user is logged in.
///
/// The cookie expires at the same time as `session`.
///
/// # Errors
///
/// Returns a [Error::JSONSerializationError] if the session could not be serialized.
pub(crate) fn set_session_cookie(
    jar: PrivateCookieJar,
    session: &Session,
) -> Result<PrivateCookieJar, Error> {
    let session_string = serde_json::to_string(session)
        .map_err(|error| Error::JSONSerializationError(error.to_string()))?;

    Ok(jar.add(
        Cookie::build((COOKIE_SESSION, session_string))
            .expires(session.expires_at)
            .http_only(true)
            .same_site(SameSite::Strict)
            .secure(true),
    ))
}

/// Set the session cookie to an invalid value and set its max age to zero,
/// which should delete the cookie on the client side.
pub(crate) fn invalidate_session_cookie(jar: PrivateCookieJar) -> PrivateCookieJar {
    jar.add(
        Cookie::build((COOKIE_SESSION, "deleted"))
            .expires(OffsetDateTime::UNIX_EPOCH)
            .max_age(Duration::ZERO)
            .http_only(true)
            .same_site(SameSite::Strict)
            .secure(true),
    )
}

/// Read the session from the session cookie in `jar`.
///
/// # Errors
///
/// Returns a:
/// - [Error::CookieMissing] if there is no session cookie,
/// - [Error::InvalidSession] if the cookie does not hold a complete session,
/// - [Error::SessionExpired] if the session has expired.
pub(crate) fn get_session_from_cookies(jar: &PrivateCookieJar) -> Result<Session, Error> {
    let cookie = jar.get(COOKIE_SESSION).ok_or(Error::CookieMissing)?;
    let session: Session = serde_json::from_str(cookie.value_trimmed())
        .map_err(|error| Error::InvalidSession(error.to_string()))?;

    if session.is_expired() {
        return Err(Error::SessionExpired);
    }

    Ok(session)
}

/// Set the expiry of the session in `jar` to the latest of UTC now plus
/// `duration` and the session's current expiry.
///
/// # Errors
///
/// The cookie jar is not modified if an error is returned.
///
/// Returns any error from [get_session_from_cookies] or [set_session_cookie],
/// or [Error::InvalidDate] if adding `duration` would overflow the date time.
pub(crate) fn extend_session_cookie_duration_if_needed(
    jar: PrivateCookieJar,
    duration: Duration,
) -> Result<PrivateCookieJar, Error> {
    let mut session = get_session_from_cookies(&jar)?;

    let new_expiry = OffsetDateTime::now_utc()
        .checked_add(duration)
        .ok_or_else(|| Error::InvalidDate("session expiry out of range".to_owned()))?;

    session.expires_at = max(session.expires_at, new_expiry);

    set_session_cookie(jar, &session)
}
