//! This file defines a user of the application and its supporting types.

use std::fmt::Display;

use email_address::EmailAddress;
use rusqlite::{Connection, OptionalExtension, Row};
use serde::{Deserialize, Serialize};

use crate::{
    Error,
    db::{CreateTable, MapRow},
    models::PasswordHash,
};

/// A newtype wrapper for integer user IDs.
/// This helps disambiguate user IDs from other types of IDs, leading to better compile time
/// errors, and more flexible generics that can have distinct implementations for multiple ID types.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct UserID(i64);

impl UserID {
    /// Create a user ID from a raw integer.
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    /// The raw integer value of the user ID.
    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl Display for UserID {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// A user of the application.
///
/// To create a `User` that is not yet in the application database, use
/// [User::build]. To retrieve an existing user, use [User::select_by_email] or
/// [User::select_by_id].
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    id: UserID,
    name: String,
    email: EmailAddress,
    password_hash: PasswordHash,
    refresh_token: Option<String>,
}

impl User {
    /// Build a new user.
    ///
    /// Shortcut for [UserBuilder::new] for discoverability.
    ///
    /// If you are trying to retrieve an existing user, see [User::select_by_email].
    pub fn build(name: String, email: EmailAddress, password_hash: PasswordHash) -> UserBuilder {
        UserBuilder::new(name, email, password_hash)
    }

    /// The user's ID in the database.
    pub fn id(&self) -> UserID {
        self.id
    }

    /// The display name the user registered with.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The email address associated with the user.
    pub fn email(&self) -> &EmailAddress {
        &self.email
    }

    /// The user's password hash.
    pub fn password_hash(&self) -> &PasswordHash {
        &self.password_hash
    }

    /// The refresh token most recently issued to the user, if any.
    pub fn refresh_token(&self) -> Option<&str> {
        self.refresh_token.as_deref()
    }

    /// Get the user from the database that has the specified `email` address,
    /// or `None` if no such user exists.
    ///
    /// # Errors
    /// This function will return an error if there is an SQL error.
    pub fn select_by_email(
        email: &EmailAddress,
        connection: &Connection,
    ) -> Result<Option<Self>, Error> {
        let user = connection
            .prepare(
                "SELECT id, name, email, password, refresh_token FROM user WHERE email = :email",
            )?
            .query_row(&[(":email", &email.to_string())], User::map_row)
            .optional()?;

        Ok(user)
    }

    /// Get the user from the database that has the specified `id`, or `None`
    /// if no such user exists.
    ///
    /// # Errors
    /// This function will return an error if there is an SQL error.
    pub fn select_by_id(id: UserID, connection: &Connection) -> Result<Option<Self>, Error> {
        let user = connection
            .prepare("SELECT id, name, email, password, refresh_token FROM user WHERE id = :id")?
            .query_row(&[(":id", &id.as_i64())], User::map_row)
            .optional()?;

        Ok(user)
    }

    /// Replace the refresh token stored for the user.
    ///
    /// Pass `None` to clear the stored token.
    ///
    /// # Errors
    /// This function will return an error if there is an SQL error.
    pub fn set_refresh_token(
        &mut self,
        refresh_token: Option<String>,
        connection: &Connection,
    ) -> Result<(), Error> {
        connection.execute(
            "UPDATE user SET refresh_token = ?1 WHERE id = ?2",
            (&refresh_token, self.id.as_i64()),
        )?;

        self.refresh_token = refresh_token;

        Ok(())
    }
}

impl MapRow for User {
    type ReturnType = Self;

    fn map_row_with_offset(row: &Row, offset: usize) -> Result<Self::ReturnType, rusqlite::Error> {
        let raw_id = row.get(offset)?;
        let name = row.get(offset + 1)?;
        let raw_email: String = row.get(offset + 2)?;
        let raw_password_hash: String = row.get(offset + 3)?;
        let refresh_token = row.get(offset + 4)?;

        Ok(Self {
            id: UserID::new(raw_id),
            name,
            email: EmailAddress::new_unchecked(raw_email),
            password_hash: PasswordHash::new_unchecked(&raw_password_hash),
            refresh_token,
        })
    }
}

impl CreateTable for User {
    fn create_table(connection: &Connection) -> Result<(), rusqlite::Error> {
        connection.execute(
            "CREATE TABLE IF NOT EXISTS user (
                    id INTEGER PRIMARY KEY,
                    name TEXT NOT NULL,
                    email TEXT UNIQUE NOT NULL,
                    password TEXT NOT NULL,
                    refresh_token TEXT
                    )",
            (),
        )?;

        Ok(())
    }
}

/// Builder for creating new [User]s.
///
/// The function for finalizing the builder is [UserBuilder::insert].
pub struct UserBuilder {
    name: String,
    email: EmailAddress,
    password_hash: PasswordHash,
}

impl UserBuilder {
    /// Create a new user and insert it into the application database.
    ///
    /// Finalize the builder with [UserBuilder::insert].
    pub fn new(name: String, email: EmailAddress, password_hash: PasswordHash) -> Self {
        Self {
            name,
            email,
            password_hash,
        }
    }

    /// Insert the user into the application database and return the built user.
    /// Note that this function will consume the builder.
    ///
    /// # Errors
    /// This function will return a:
    /// - [Error::DuplicateEmail] if the given email address is already in use,
    /// - [Error::SqlError] if there was an unexpected SQL error.
    pub fn insert(self, connection: &Connection) -> Result<User, Error> {
        connection.execute(
            "INSERT INTO user (name, email, password) VALUES (?1, ?2, ?3)",
            (
                &self.name,
                &self.email.to_string(),
                self.password_hash.to_string(),
            ),
        )?;

        let id = UserID::new(connection.last_insert_rowid());

        Ok(User {
            id,
            name: self.name,
            email: self.email,
            password_hash: self.password_hash,
            refresh_token: None,
        })
    }
}

#[cfg(test)]
mod user_tests {
    use std::str::FromStr;

    use email_address::EmailAddress;
    use rusqlite::Connection;

    use crate::{
        Error,
        db::initialize,
        models::{PasswordHash, User, UserID},
    };

    fn init_db() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();
        conn
    }

    fn insert_test_user(conn: &Connection) -> User {
        User::build(
            "Rooster Cogburn".to_string(),
            EmailAddress::from_str("hello@world.com").unwrap(),
            PasswordHash::new_unchecked("hunter2"),
        )
        .insert(conn)
        .unwrap()
    }

    #[test]
    fn insert_user_succeeds() {
        let conn = init_db();

        let inserted_user = insert_test_user(&conn);

        assert!(inserted_user.id().as_i64() > 0);
        assert_eq!(inserted_user.name(), "Rooster Cogburn");
        assert_eq!(inserted_user.email().as_str(), "hello@world.com");
        assert_eq!(inserted_user.refresh_token(), None);
    }

    #[test]
    fn insert_user_fails_on_duplicate_email() {
        let conn = init_db();

        insert_test_user(&conn);

        let result = User::build(
            "Someone Else".to_string(),
            EmailAddress::from_str("hello@world.com").unwrap(),
            PasswordHash::new_unchecked("hunter3"),
        )
        .insert(&conn);

        assert_eq!(result, Err(Error::DuplicateEmail));
    }

    #[test]
    fn select_user_by_email_returns_none_for_non_existent_email() {
        let conn = init_db();

        // This email is not in the database.
        let email = EmailAddress::from_str("notavalidemail@foo.bar").unwrap();

        assert_eq!(User::select_by_email(&email, &conn), Ok(None));
    }

    #[test]
    fn select_user_by_email_succeeds_with_existing_email() {
        let conn = init_db();

        let test_user = insert_test_user(&conn);

        let retrieved_user = User::select_by_email(test_user.email(), &conn).unwrap();

        assert_eq!(retrieved_user, Some(test_user));
    }

    #[test]
    fn select_user_by_id_succeeds() {
        let conn = init_db();

        let test_user = insert_test_user(&conn);

        let retrieved_user = User::select_by_id(test_user.id(), &conn).unwrap();

        assert_eq!(retrieved_user, Some(test_user));
    }

    #[test]
    fn select_user_by_id_returns_none_for_unknown_id() {
        let conn = init_db();

        assert_eq!(User::select_by_id(UserID::new(1337), &conn), Ok(None));
    }

    #[test]
    fn set_refresh_token_persists_the_token() {
        let conn = init_db();

        let mut test_user = insert_test_user(&conn);

        test_user
            .set_refresh_token(Some("a.refresh.token".to_string()), &conn)
            .unwrap();

        let retrieved_user = User::select_by_id(test_user.id(), &conn).unwrap().unwrap();

        assert_eq!(retrieved_user.refresh_token(), Some("a.refresh.token"));

        test_user.set_refresh_token(None, &conn).unwrap();

        let retrieved_user = User::select_by_id(test_user.id(), &conn).unwrap().unwrap();

        assert_eq!(retrieved_user.refresh_token(), None);
    }
}
