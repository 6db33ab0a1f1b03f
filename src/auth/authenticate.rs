//! Checks log-in credentials against the user store, registering new users on first log-in.

use serde::Deserialize;

use crate::{
    Error,
    auth::{PasswordHash, Role, User, UserStore},
};

/// The details a user logs in with.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Credentials {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    /// The role to register with if the email is new.
    #[serde(default)]
    pub role: Option<Role>,
}

/// Log in with `credentials`.
///
/// An email that has not been seen before is registered on the spot with the
/// requested role (employee if none was given). For a known email, the
/// password must match the one it was registered with and the stored role is
/// used, whatever role was requested.
///
/// # Errors
///
/// Returns a:
/// - [Error::MissingCredentials] if the email is blank or the password is empty,
/// - [Error::InvalidCredentials] if the password does not match,
/// - [Error::HashingError] if the password could not be hashed or verified,
/// - or any error from the user store.
pub fn authenticate(
    store: &dyn UserStore,
    credentials: &Credentials,
    hash_cost: u32,
) -> Result<User, Error> {
    let email = credentials.email.trim();

    if email.is_empty() || credentials.password.is_empty() {
        return Err(Error::MissingCredentials);
    }

    let user = match store.get_by_email(email) {
        Ok(user) => user,
        Err(Error::NotFound) => {
            let password_hash = PasswordHash::new(&credentials.password, hash_cost)?;
            let role = credentials.role.unwrap_or_default();
            tracing::info!("Registering new {role} user {email}");

            match store.create(email, role, password_hash) {
                Ok(user) => return Ok(user),
                // Another log-in registered the email first, check against that user instead.
                Err(Error::DuplicateEmail(_)) => {
                    tracing::debug!("{email} was registered by a concurrent log-in");
                    store.get_by_email(email)?
                }
                Err(error) => return Err(error),
            }
        }
        Err(error) => return Err(error),
    };

    let is_password_valid = user
        .password_hash
        .verify(&credentials.password)
        .map_err(|error| Error::HashingError(error.to_string()))?;

    if !is_password_valid {
        return Err(Error::InvalidCredentials);
    }

    if let Some(requested_role) = credentials.role
        && requested_role != user.role
    {
        tracing::debug!(
            "{email} asked to log in as {requested_role} but is registered as {}",
            user.role
        );
    }

    Ok(user)
}

#[cfg(test)]
mod tests {
    use std::{sync::Barrier, thread};

    use crate::{
        Error,
        auth::{InMemoryUserStore, Role, UserStore},
    };

    use super::{Credentials, authenticate};

    fn credentials(email: &str, password: &str, role: Option<Role>) -> Credentials {
        Credentials {
            email: email.to_owned(),
            password: password.to_owned(),
            role,
        }
    }

    #[test]
    fn first_log_in_registers_user() {
        let store = InMemoryUserStore::new();

        let user = authenticate(
            &store,
            &credentials("owner@example.com", "password", Some(Role::Owner)),
            4,
        )
        .unwrap();

        assert_eq!(user.email, "owner@example.com");
        assert_eq!(user.name, "owner");
        assert_eq!(user.role, Role::Owner);
        assert_eq!(store.get_by_email("owner@example.com").unwrap(), user);
    }

    #[test]
    fn role_defaults_to_employee() {
        let store = InMemoryUserStore::new();

        let user = authenticate(&store, &credentials("a@example.com", "pw", None), 4).unwrap();

        assert_eq!(user.role, Role::Employee);
    }

    #[test]
    fn second_log_in_with_same_password_returns_same_user() {
        let store = InMemoryUserStore::new();
        let first = authenticate(&store, &credentials("a@example.com", "pw", None), 4).unwrap();

        let second = authenticate(&store, &credentials("a@example.com", "pw", None), 4).unwrap();

        assert_eq!(first, second);
    }

    #[test]
    fn wrong_password_is_rejected() {
        let store = InMemoryUserStore::new();
        authenticate(&store, &credentials("a@example.com", "pw", None), 4).unwrap();

        let result = authenticate(&store, &credentials("a@example.com", "nope", None), 4);

        assert_eq!(result, Err(Error::InvalidCredentials));
    }

    #[test]
    fn stored_role_wins() {
        let store = InMemoryUserStore::new();
        authenticate(
            &store,
            &credentials("a@example.com", "pw", Some(Role::Employee)),
            4,
        )
        .unwrap();

        let user = authenticate(
            &store,
            &credentials("a@example.com", "pw", Some(Role::Owner)),
            4,
        )
        .unwrap();

        assert_eq!(user.role, Role::Employee);
    }

    #[test]
    fn concurrent_first_log_ins_both_succeed() {
        let store = InMemoryUserStore::new();
        let barrier = Barrier::new(2);

        let results = thread::scope(|scope| {
            let handles = [0, 1].map(|_| {
                let barrier = &barrier;
                let store = &store;
                scope.spawn(move || {
                    barrier.wait();
                    authenticate(
                        store,
                        &credentials("a@example.com", "pw", Some(Role::Owner)),
                        4,
                    )
                })
            });

            handles.map(|handle| handle.join().expect("log-in thread panicked"))
        });

        let [first, second] = results;
        let first = first.expect("first log-in failed");
        let second = second.expect("second log-in failed");
        assert_eq!(first, second);
        assert_eq!(store.get_by_email("a@example.com").unwrap(), first);
    }

    #[test]
    fn concurrent_first_log_in_with_other_password_is_rejected() {
        let store = InMemoryUserStore::new();
        let barrier = Barrier::new(2);

        let results = thread::scope(|scope| {
            let handles = ["pw", "other"].map(|password| {
                let barrier = &barrier;
                let store = &store;
                scope.spawn(move || {
                    barrier.wait();
                    authenticate(store, &credentials("a@example.com", password, None), 4)
                })
            });

            handles.map(|handle| handle.join().expect("log-in thread panicked"))
        });

        let successes = results.iter().filter(|result| result.is_ok()).count();
        assert_eq!(successes, 1, "got {results:?}");
        assert!(
            results
                .iter()
                .all(|result| result.is_ok() || *result == Err(Error::InvalidCredentials)),
            "got {results:?}"
        );
    }

    #[test]
    fn missing_credentials_are_rejected() {
        let store = InMemoryUserStore::new();

        for (email, password) in [("", "pw"), ("   ", "pw"), ("a@example.com", "")] {
            assert_eq!(
                authenticate(&store, &credentials(email, password, None), 4),
                Err(Error::MissingCredentials),
                "email {email:?}, password {password:?}"
            );
        }
    }
}
