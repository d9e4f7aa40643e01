//! A time-bounded set of revoked access tokens.
//!
//! Logging out puts the current access token on the blacklist so that it is
//! rejected before its natural expiry. Entries only need to outlive the
//! access-token lifetime, so anything older is purged on insert.

use chrono::Utc;
use rusqlite::Connection;

use crate::{Error, auth::token::ACCESS_TOKEN_MINUTES, db::CreateTable};

/// How long a blacklist entry is kept before it is eligible for purging.
///
/// A token older than this has expired on its own and no longer needs a
/// blacklist entry.
pub const BLACKLIST_TTL_SECONDS: i64 = ACCESS_TOKEN_MINUTES * 60;

/// The set of revoked access tokens, backed by the application database.
pub struct TokenBlacklist;

impl TokenBlacklist {
    /// Add `token` to the blacklist.
    ///
    /// Entries older than [BLACKLIST_TTL_SECONDS] are purged first.
    /// Re-inserting a blacklisted token is a no-op.
    ///
    /// # Errors
    /// This function will return an error if there is an SQL error.
    pub fn insert(token: &str, connection: &Connection) -> Result<(), Error> {
        Self::purge_expired(connection)?;

        connection.execute(
            "INSERT OR IGNORE INTO blacklisted_token (token, created_at) VALUES (?1, ?2)",
            (token, Utc::now().timestamp()),
        )?;

        Ok(())
    }

    /// Check whether `token` is on the blacklist.
    ///
    /// Entries older than [BLACKLIST_TTL_SECONDS] are treated as absent even
    /// if they have not been purged yet.
    ///
    /// # Errors
    /// This function will return an error if there is an SQL error.
    pub fn contains(token: &str, connection: &Connection) -> Result<bool, Error> {
        let cutoff = Utc::now().timestamp() - BLACKLIST_TTL_SECONDS;

        let count: i64 = connection
            .prepare(
                "SELECT COUNT(*) FROM blacklisted_token \
                 WHERE token = :token AND created_at > :cutoff",
            )?
            .query_row(
                rusqlite::named_params! { ":token": token, ":cutoff": cutoff },
                |row| row.get(0),
            )?;

        Ok(count > 0)
    }

    /// Delete entries whose tokens have expired on their own.
    fn purge_expired(connection: &Connection) -> Result<(), Error> {
        let cutoff = Utc::now().timestamp() - BLACKLIST_TTL_SECONDS;

        connection.execute(
            "DELETE FROM blacklisted_token WHERE created_at <= ?1",
            (cutoff,),
        )?;

        Ok(())
    }
}

impl CreateTable for TokenBlacklist {
    fn create_table(connection: &Connection) -> Result<(), rusqlite::Error> {
        connection.execute(
            "CREATE TABLE IF NOT EXISTS blacklisted_token (
                    token TEXT PRIMARY KEY,
                    created_at INTEGER NOT NULL
                    )",
            (),
        )?;

        Ok(())
    }
}
