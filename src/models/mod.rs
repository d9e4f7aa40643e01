//! The application's domain models and their database operations.

mod password;
mod transaction;
mod user;

pub use password::{PasswordHash, ValidatedPassword};
pub use transaction::{NewTransaction, Transaction, TransactionChanges};
pub use user::{User, UserID};

/// Alias for the integer type used for database row IDs.
pub type DatabaseID = i64;
