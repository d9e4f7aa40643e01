//! This file defines the type `Transaction`, the core type of the budgeting part of the
//! application.

use rusqlite::{Connection, OptionalExtension, Row};
use serde::{Deserialize, Serialize};

use crate::{
    Error, category, date,
    db::{CreateTable, MapRow},
    models::{DatabaseID, UserID},
};

/// An expense or income, i.e. an event where money was either spent or earned.
///
/// To create a new `Transaction`, insert a [NewTransaction]. To retrieve
/// existing transactions, use [Transaction::select] to get a transaction by
/// its ID and [Transaction::select_by_user] to get transactions by user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    id: DatabaseID,
    amount: f64,
    category: String,
    date: String,
    is_income: bool,
    comment: Option<String>,
    user_id: UserID,
}

impl Transaction {
    /// The ID of the transaction.
    pub fn id(&self) -> DatabaseID {
        self.id
    }

    /// The amount of money spent or earned in this transaction.
    pub fn amount(&self) -> f64 {
        self.amount
    }

    /// The category that describes the type of the transaction.
    pub fn category(&self) -> &str {
        &self.category
    }

    /// When the transaction happened, as a canonical `DD-MM-YYYY` string.
    pub fn date(&self) -> &str {
        &self.date
    }

    /// Whether the transaction is an income (money earned) rather than an expense.
    pub fn is_income(&self) -> bool {
        self.is_income
    }

    /// An optional free-text note on the transaction.
    pub fn comment(&self) -> Option<&str> {
        self.comment.as_deref()
    }

    /// The ID of the user that owns this transaction.
    pub fn user_id(&self) -> UserID {
        self.user_id
    }

    /// Retrieve a transaction in the database by its `id`, or `None` if no
    /// such transaction exists.
    ///
    /// # Errors
    /// This function will return an error if there is an SQL error.
    pub fn select(id: DatabaseID, connection: &Connection) -> Result<Option<Self>, Error> {
        let transaction = connection
            .prepare(
                "SELECT id, amount, category, date, is_income, comment, user_id \
                 FROM \"transaction\" WHERE id = :id",
            )?
            .query_row(&[(":id", &id)], Transaction::map_row)
            .optional()?;

        Ok(transaction)
    }

    /// Retrieve the transactions in the database that are owned by `user_id`.
    ///
    /// An empty vector is returned if the specified user has no transactions.
    ///
    /// # Errors
    /// This function will return an error if there is an SQL error.
    pub fn select_by_user(
        user_id: UserID,
        connection: &Connection,
    ) -> Result<Vec<Self>, Error> {
        connection
            .prepare(
                "SELECT id, amount, category, date, is_income, comment, user_id \
                 FROM \"transaction\" WHERE user_id = :user_id",
            )?
            .query_map(&[(":user_id", &user_id.as_i64())], Transaction::map_row)?
            .map(|maybe_transaction| maybe_transaction.map_err(Error::SqlError))
            .collect()
    }

    /// Retrieve the transactions owned by `user_id` whose date falls in the
    /// given `month` and `year`.
    ///
    /// The month and year are extracted from the canonical date string.
    ///
    /// # Errors
    /// This function will return an error if there is an SQL error.
    pub fn select_by_month(
        user_id: UserID,
        month: u32,
        year: i32,
        connection: &Connection,
    ) -> Result<Vec<Self>, Error> {
        let transactions = Self::select_by_user(user_id, connection)?
            .into_iter()
            .filter(|transaction| date::month_and_year(&transaction.date) == Ok((month, year)))
            .collect();

        Ok(transactions)
    }

    /// Apply a partial update to the transaction, returning the updated copy.
    ///
    /// Fields that are `None` in `changes` keep their current value. Income
    /// transactions always end up in the synthetic income category, no matter
    /// which category the changes carry.
    ///
    /// The result is not persisted until [Transaction::update] is called.
    pub fn merge(mut self, changes: TransactionChanges) -> Self {
        if let Some(amount) = changes.amount {
            self.amount = amount;
        }

        if let Some(category) = changes.category {
            self.category = category;
        }

        if let Some(date) = changes.date {
            self.date = date;
        }

        if let Some(is_income) = changes.is_income {
            self.is_income = is_income;
        }

        if let Some(comment) = changes.comment {
            self.comment = Some(comment);
        }

        if self.is_income {
            self.category = category::INCOME.to_string();
        }

        self
    }

    /// Write the transaction's current field values to the database.
    ///
    /// # Errors
    /// This function will return a:
    /// - [Error::TransactionNotFound] if the transaction is not in the database,
    /// - [Error::SqlError] if there is some other SQL error.
    pub fn update(&self, connection: &Connection) -> Result<(), Error> {
        let rows_changed = connection.execute(
            "UPDATE \"transaction\" \
             SET amount = ?1, category = ?2, date = ?3, is_income = ?4, comment = ?5 \
             WHERE id = ?6",
            (
                self.amount,
                &self.category,
                &self.date,
                self.is_income,
                &self.comment,
                self.id,
            ),
        )?;

        if rows_changed == 0 {
            return Err(Error::TransactionNotFound);
        }

        Ok(())
    }

    /// Remove the transaction with `id` from the database.
    ///
    /// # Errors
    /// This function will return a:
    /// - [Error::TransactionNotFound] if `id` does not refer to a transaction,
    /// - [Error::SqlError] if there is some other SQL error.
    pub fn delete(id: DatabaseID, connection: &Connection) -> Result<(), Error> {
        let rows_changed =
            connection.execute("DELETE FROM \"transaction\" WHERE id = ?1", (id,))?;

        if rows_changed == 0 {
            return Err(Error::TransactionNotFound);
        }

        Ok(())
    }
}

impl CreateTable for Transaction {
    fn create_table(connection: &Connection) -> Result<(), rusqlite::Error> {
        connection.execute(
            "CREATE TABLE IF NOT EXISTS \"transaction\" (
                    id INTEGER PRIMARY KEY,
                    amount REAL NOT NULL,
                    category TEXT NOT NULL,
                    date TEXT NOT NULL,
                    is_income INTEGER NOT NULL,
                    comment TEXT,
                    user_id INTEGER NOT NULL,
                    FOREIGN KEY(user_id) REFERENCES user(id) ON UPDATE CASCADE ON DELETE CASCADE
                    )",
            (),
        )?;

        Ok(())
    }
}

impl MapRow for Transaction {
    type ReturnType = Self;

    fn map_row_with_offset(row: &Row, offset: usize) -> Result<Self, rusqlite::Error> {
        Ok(Self {
            id: row.get(offset)?,
            amount: row.get(offset + 1)?,
            category: row.get(offset + 2)?,
            date: row.get(offset + 3)?,
            is_income: row.get(offset + 4)?,
            comment: row.get(offset + 5)?,
            user_id: UserID::new(row.get(offset + 6)?),
        })
    }
}

/// A transaction that has been validated but not yet inserted into the
/// database.
///
/// The caller is expected to have canonicalized `date` and checked `category`
/// against the catalog before inserting.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTransaction {
    /// The amount of money spent or earned.
    pub amount: f64,
    /// The catalog category the transaction belongs to.
    pub category: String,
    /// When the transaction happened, as a canonical `DD-MM-YYYY` string.
    pub date: String,
    /// Whether the transaction is an income.
    pub is_income: bool,
    /// An optional free-text note.
    pub comment: Option<String>,
    /// The ID of the user that owns the transaction.
    pub user_id: UserID,
}

impl NewTransaction {
    /// Insert the transaction into the application database.
    ///
    /// # Errors
    /// This function will return an error if `user_id` does not refer to a
    /// valid user, or if there is some other SQL error.
    pub fn insert(self, connection: &Connection) -> Result<Transaction, Error> {
        connection.execute(
            "INSERT INTO \"transaction\" (amount, category, date, is_income, comment, user_id) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            (
                self.amount,
                &self.category,
                &self.date,
                self.is_income,
                &self.comment,
                self.user_id.as_i64(),
            ),
        )?;

        let transaction_id = connection.last_insert_rowid();

        Ok(Transaction {
            id: transaction_id,
            amount: self.amount,
            category: self.category,
            date: self.date,
            is_income: self.is_income,
            comment: self.comment,
            user_id: self.user_id,
        })
    }
}

/// Partial field replacement for an existing transaction.
///
/// Used with [Transaction::merge].
#[derive(Debug, Default, Clone, PartialEq)]
pub struct TransactionChanges {
    /// Replacement amount, if any.
    pub amount: Option<f64>,
    /// Replacement category, if any.
    pub category: Option<String>,
    /// Replacement canonical date, if any.
    pub date: Option<String>,
    /// Replacement income flag, if any.
    pub is_income: Option<bool>,
    /// Replacement comment, if any.
    pub comment: Option<String>,
}

#[cfg(test)]
mod transaction_tests {
    use std::str::FromStr;

    use email_address::EmailAddress;
    use rusqlite::Connection;

    use crate::{
        Error, category,
        db::initialize,
        models::{NewTransaction, PasswordHash, Transaction, TransactionChanges, User, UserID},
    };

    fn create_database_and_insert_test_user() -> (Connection, User) {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();

        let test_user = User::build(
            "Test User".to_string(),
            EmailAddress::from_str("foo@bar.baz").unwrap(),
            PasswordHash::new_unchecked("hunter2"),
        )
        .insert(&conn)
        .unwrap();

        (conn, test_user)
    }

    fn new_expense(amount: f64, date: &str, user_id: UserID) -> NewTransaction {
        NewTransaction {
            amount,
            category: "Products".to_string(),
            date: date.to_string(),
            is_income: false,
            comment: None,
            user_id,
        }
    }

    #[test]
    fn insert_transaction_succeeds() {
        let (conn, test_user) = create_database_and_insert_test_user();

        let transaction = NewTransaction {
            amount: 123.45,
            category: "Car".to_string(),
            date: "15-03-2024".to_string(),
            is_income: false,
            comment: Some("new tyres".to_string()),
            user_id: test_user.id(),
        }
        .insert(&conn)
        .unwrap();

        assert!(transaction.id() > 0);
        assert_eq!(transaction.amount(), 123.45);
        assert_eq!(transaction.category(), "Car");
        assert_eq!(transaction.date(), "15-03-2024");
        assert!(!transaction.is_income());
        assert_eq!(transaction.comment(), Some("new tyres"));
        assert_eq!(transaction.user_id(), test_user.id());
    }

    #[test]
    fn insert_transaction_fails_on_invalid_user_id() {
        let (conn, test_user) = create_database_and_insert_test_user();

        let result = new_expense(
            10.0,
            "15-03-2024",
            UserID::new(test_user.id().as_i64() + 42),
        )
        .insert(&conn);

        assert!(matches!(result, Err(Error::SqlError(_))));
    }

    #[test]
    fn select_transaction_by_id_succeeds() {
        let (conn, test_user) = create_database_and_insert_test_user();

        let inserted = new_expense(10.0, "15-03-2024", test_user.id())
            .insert(&conn)
            .unwrap();

        let selected = Transaction::select(inserted.id(), &conn).unwrap();

        assert_eq!(selected, Some(inserted));
    }

    #[test]
    fn select_transaction_returns_none_on_unknown_id() {
        let (conn, _) = create_database_and_insert_test_user();

        assert_eq!(Transaction::select(1337, &conn), Ok(None));
    }

    #[test]
    fn select_transactions_by_user_id_succeeds_with_no_transactions() {
        let (conn, test_user) = create_database_and_insert_test_user();

        let transactions = Transaction::select_by_user(test_user.id(), &conn).unwrap();

        assert_eq!(transactions, vec![]);
    }

    #[test]
    fn select_transactions_by_user_id_excludes_other_users() {
        let (conn, test_user) = create_database_and_insert_test_user();

        let other_user = User::build(
            "Someone Else".to_string(),
            EmailAddress::from_str("bar@baz.qux").unwrap(),
            PasswordHash::new_unchecked("hunter3"),
        )
        .insert(&conn)
        .unwrap();

        let expected_transactions = vec![
            new_expense(10.0, "15-03-2024", test_user.id())
                .insert(&conn)
                .unwrap(),
            new_expense(20.0, "16-03-2024", test_user.id())
                .insert(&conn)
                .unwrap(),
        ];
        new_expense(30.0, "17-03-2024", other_user.id())
            .insert(&conn)
            .unwrap();

        let transactions = Transaction::select_by_user(test_user.id(), &conn).unwrap();

        assert_eq!(transactions, expected_transactions);
    }

    #[test]
    fn select_by_month_matches_canonical_dates() {
        let (conn, test_user) = create_database_and_insert_test_user();

        let march = new_expense(10.0, "15-03-2024", test_user.id())
            .insert(&conn)
            .unwrap();
        new_expense(20.0, "20-04-2024", test_user.id())
            .insert(&conn)
            .unwrap();
        new_expense(30.0, "15-03-2023", test_user.id())
            .insert(&conn)
            .unwrap();

        let transactions =
            Transaction::select_by_month(test_user.id(), 3, 2024, &conn).unwrap();

        assert_eq!(transactions, vec![march]);
    }

    #[test]
    fn merge_replaces_only_supplied_fields() {
        let (conn, test_user) = create_database_and_insert_test_user();

        let transaction = new_expense(10.0, "15-03-2024", test_user.id())
            .insert(&conn)
            .unwrap();

        let updated = transaction.clone().merge(TransactionChanges {
            amount: Some(25.0),
            comment: Some("groceries".to_string()),
            ..Default::default()
        });

        assert_eq!(updated.amount(), 25.0);
        assert_eq!(updated.comment(), Some("groceries"));
        assert_eq!(updated.category(), transaction.category());
        assert_eq!(updated.date(), transaction.date());
        assert_eq!(updated.is_income(), transaction.is_income());
    }

    #[test]
    fn merge_forces_income_category() {
        let (conn, test_user) = create_database_and_insert_test_user();

        let transaction = new_expense(10.0, "15-03-2024", test_user.id())
            .insert(&conn)
            .unwrap();

        let updated = transaction.merge(TransactionChanges {
            category: Some("Car".to_string()),
            is_income: Some(true),
            ..Default::default()
        });

        assert_eq!(updated.category(), category::INCOME);
    }

    #[test]
    fn update_persists_merged_fields() {
        let (conn, test_user) = create_database_and_insert_test_user();

        let transaction = new_expense(10.0, "15-03-2024", test_user.id())
            .insert(&conn)
            .unwrap();

        let updated = transaction.merge(TransactionChanges {
            amount: Some(99.0),
            category: Some("Education".to_string()),
            ..Default::default()
        });
        updated.update(&conn).unwrap();

        let selected = Transaction::select(updated.id(), &conn).unwrap();

        assert_eq!(selected, Some(updated));
    }

    #[test]
    fn delete_removes_the_transaction() {
        let (conn, test_user) = create_database_and_insert_test_user();

        let transaction = new_expense(10.0, "15-03-2024", test_user.id())
            .insert(&conn)
            .unwrap();

        Transaction::delete(transaction.id(), &conn).unwrap();

        assert_eq!(Transaction::select(transaction.id(), &conn), Ok(None));
    }

    #[test]
    fn delete_fails_on_unknown_id() {
        let (conn, _) = create_database_and_insert_test_user();

        assert_eq!(
            Transaction::delete(1337, &conn),
            Err(Error::TransactionNotFound)
        );
    }
}
