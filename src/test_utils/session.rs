use time::OffsetDateTime;

use crate::{
    auth::{DEFAULT_COOKIE_DURATION, Role, Session, UserID},
    employee::Employee,
};

/// A session for `email`, valid for the default cookie duration.
pub(crate) fn test_session(email: &str, role: Role) -> Session {
    Session {
        user_id: UserID::generate(),
        email: email.to_owned(),
        name: email.split('@').next().unwrap_or_default().to_owned(),
        role,
        expires_at: OffsetDateTime::now_utc() + DEFAULT_COOKIE_DURATION,
    }
}

/// A session for the user linked to `employee`.
pub(crate) fn employee_session(employee: &Employee) -> Session {
    test_session(&employee.email, Role::Employee)
}

pub(crate) fn owner_session() -> Session {
    test_session("owner@example.com", Role::Owner)
}
