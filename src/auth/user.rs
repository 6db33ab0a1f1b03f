//! Users of the application and the stores that keep them.

use std::{
    collections::HashMap,
    fmt::{Debug, Display},
    sync::{Arc, Mutex},
};

use rusqlite::{
    Connection, Row, ToSql,
    types::{FromSql, FromSqlError, FromSqlResult, ToSqlOutput, ValueRef},
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    Error,
    auth::{PasswordHash, Role},
};

/// A newtype wrapper for user IDs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserID(Uuid);

impl UserID {
    /// Create a new, random user ID.
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Display for UserID {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        Display::fmt(&self.0, f)
    }
}

impl ToSql for UserID {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.0.to_string()))
    }
}

impl FromSql for UserID {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        Uuid::parse_str(value.as_str()?)
            .map(UserID)
            .map_err(|error| FromSqlError::Other(Box::new(error)))
    }
}

/// A user of the application.
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    pub id: UserID,
    /// The email the user logs in with, unique across users.
    pub email: String,
    /// The display name, taken from the email when the user registers.
    pub name: String,
    pub role: Role,
    pub password_hash: PasswordHash,
}

/// The display name for a new user: the part of `email` before the "@".
pub fn name_from_email(email: &str) -> String {
    email
        .split_once('@')
        .map(|(name, _)| name)
        .unwrap_or(email)
        .to_owned()
}

/// Handles the creation and retrieval of [User] objects.
pub trait UserStore: Debug + Send + Sync {
    /// Get a user by their email.
    ///
    /// Returns [Error::NotFound] if no user with the given email exists.
    fn get_by_email(&self, email: &str) -> Result<User, Error>;

    /// Create a new user.
    ///
    /// Returns [Error::DuplicateEmail] if a user with `email` already exists.
    fn create(
        &self,
        email: &str,
        role: Role,
        password_hash: PasswordHash,
    ) -> Result<User, Error>;
}

/// A user store that only lives as long as the process.
#[derive(Debug, Default)]
pub struct InMemoryUserStore {
    users: Mutex<HashMap<String, User>>,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl UserStore for InMemoryUserStore {
    fn get_by_email(&self, email: &str) -> Result<User, Error> {
        self.users
            .lock()
            .map_err(|_| Error::DatabaseLockError)?
            .get(email)
            .cloned()
            .ok_or(Error::NotFound)
    }

    fn create(
        &self,
        email: &str,
        role: Role,
        password_hash: PasswordHash,
    ) -> Result<User, Error> {
        let mut users = self.users.lock().map_err(|_| Error::DatabaseLockError)?;

        if users.contains_key(email) {
            return Err(Error::DuplicateEmail(email.to_owned()));
        }

        let user = User {
            id: UserID::generate(),
            email: email.to_owned(),
            name: name_from_email(email),
            role,
            password_hash,
        };
        users.insert(email.to_owned(), user.clone());

        Ok(user)
    }
}

/// A user store backed by the `user` table in SQLite.
#[derive(Debug, Clone)]
pub struct SQLiteUserStore {
    connection: Arc<Mutex<Connection>>,
}

impl SQLiteUserStore {
    /// Create a new user store.
    ///
    /// The user table must already exist, see [create_user_table].
    pub fn new(connection: Arc<Mutex<Connection>>) -> Self {
        Self { connection }
    }
}

impl UserStore for SQLiteUserStore {
    fn get_by_email(&self, email: &str) -> Result<User, Error> {
        let connection = self
            .connection
            .lock()
            .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
            .map_err(|_| Error::DatabaseLockError)?;

        connection
            .prepare("SELECT id, email, name, role, password FROM user WHERE email = :email")?
            .query_one(&[(":email", email)], map_user_row)
            .map_err(|error| error.into())
    }

    fn create(
        &self,
        email: &str,
        role: Role,
        password_hash: PasswordHash,
    ) -> Result<User, Error> {
        let connection = self
            .connection
            .lock()
            .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
            .map_err(|_| Error::DatabaseLockError)?;

        let user = User {
            id: UserID::generate(),
            email: email.to_owned(),
            name: name_from_email(email),
            role,
            password_hash,
        };

        connection
            .execute(
                "INSERT INTO user (id, email, name, role, password) VALUES (?1, ?2, ?3, ?4, ?5)",
                (
                    &user.id,
                    &user.email,
                    &user.name,
                    user.role,
                    user.password_hash.as_str(),
                ),
            )
            .map_err(|error| match error {
                // Code 2067 occurs when a UNIQUE constraint failed.
                rusqlite::Error::SqliteFailure(sql_error, Some(ref desc))
                    if sql_error.extended_code == 2067 && desc.contains("user.email") =>
                {
                    Error::DuplicateEmail(email.to_owned())
                }
                error => error.into(),
            })?;

        Ok(user)
    }
}

/// Create the user table.
///
/// # Errors
///
/// This function will return an error if the SQL query failed.
pub fn create_user_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS user (
                id TEXT PRIMARY KEY,
                email TEXT NOT NULL UNIQUE,
                name TEXT NOT NULL,
                role TEXT NOT NULL CHECK (role IN ('employee', 'owner')),
                password TEXT NOT NULL
                )",
        (),
    )?;

    Ok(())
}

fn map_user_row(row: &Row) -> Result<User, rusqlite::Error> {
    let raw_password_hash: String = row.get(4)?;

    Ok(User {
        id: row.get(0)?,
        email: row.get(1)?,
        name: row.get(2)?,
        role: row.get(3)?,
        password_hash: PasswordHash::new_unchecked(&raw_password_hash),
    })
}
