//! Logging in, sessions and access control.
//!
//! Users log in with an email and password. The first log-in with an email
//! registers it with the chosen role, later log-ins must use the same password.
//! The logged-in user's [Session] is kept in an encrypted cookie.

mod api;
mod api_token;
mod authenticate;
mod cookie;
mod log_in;
mod log_out;
mod middleware;
mod password;
mod redirect;
mod role;
mod session;
mod user;

pub use api::post_log_in_api;
pub use api_token::{TokenClaims, decode_token, encode_token};
pub use authenticate::{Credentials, authenticate};
pub use cookie::DEFAULT_COOKIE_DURATION;
pub use log_in::{get_log_in_page, post_log_in};
pub use log_out::get_log_out;
pub use middleware::{
    auth_guard, auth_guard_hx, employee_guard, employee_guard_hx, owner_guard, owner_guard_hx,
};
pub use password::PasswordHash;
pub use redirect::normalize_redirect_url;
pub use role::Role;
pub use session::Session;
pub use user::{InMemoryUserStore, SQLiteUserStore, User, UserID, UserStore, create_user_table};

#[cfg(test)]
pub(crate) use cookie::{COOKIE_SESSION, set_session_cookie};
