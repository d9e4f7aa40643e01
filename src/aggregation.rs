//! Aggregation of a user's transactions into income/expense and per-category
//! totals.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::{
    category::{self, CATALOG},
    models::Transaction,
};

/// The aggregated totals for one catalog category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryTotal {
    /// The name of the catalog category.
    pub category: String,
    /// The absolute sum of the amounts in this category.
    pub sum: f64,
    /// The display color of the category.
    pub color: String,
}

/// Income, expense, and per-category totals over a set of transactions.
///
/// The headline totals are reported as absolute values while `difference`
/// keeps its sign. This asymmetry is part of the API contract and must not be
/// "fixed": clients rely on `difference` going negative when expenses exceed
/// income.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategorySummary {
    /// The absolute sum of all income amounts.
    pub total_income: f64,
    /// The absolute sum of all expense amounts.
    pub total_expenses: f64,
    /// The signed difference between the raw income and expense sums.
    pub difference: f64,
    /// One entry for every catalog category, zero when no transactions match.
    pub totals: Vec<CategoryTotal>,
}

/// Compute the income, expense, and per-category totals for `transactions`.
///
/// Transactions in the income category count towards `total_income`, all
/// others towards `total_expenses`. The `totals` list has one entry per
/// catalog category, in catalog order, each summed as an absolute value and
/// defaulting to zero.
pub fn summarize(transactions: &[Transaction]) -> CategorySummary {
    let mut income = 0.0;
    let mut expenses = 0.0;
    let mut sums_by_category: HashMap<&str, f64> = HashMap::new();

    for transaction in transactions {
        if transaction.category() == category::INCOME {
            income += transaction.amount();
        } else {
            expenses += transaction.amount();
        }

        *sums_by_category.entry(transaction.category()).or_insert(0.0) += transaction.amount();
    }

    let totals = CATALOG
        .iter()
        .map(|entry| CategoryTotal {
            category: entry.name.to_string(),
            sum: sums_by_category.get(entry.name).copied().unwrap_or(0.0).abs(),
            color: entry.color.to_string(),
        })
        .collect();

    CategorySummary {
        total_income: income.abs(),
        total_expenses: expenses.abs(),
        difference: income - expenses,
        totals,
    }
}

#[cfg(test)]
mod summarize_tests {
    use std::str::FromStr;

    use email_address::EmailAddress;
    use rusqlite::Connection;

    use crate::{
        category::{self, CATALOG},
        db::initialize,
        models::{NewTransaction, PasswordHash, Transaction, User, UserID},
    };

    use super::summarize;

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

    fn insert_transaction(
        conn: &Connection,
        user_id: UserID,
        amount: f64,
        category: &str,
        date: &str,
    ) -> Transaction {
        NewTransaction {
            amount,
            category: category.to_string(),
            date: date.to_string(),
            is_income: category == category::INCOME,
            comment: None,
            user_id,
        }
        .insert(conn)
        .unwrap()
    }

    #[test]
    fn empty_set_gives_all_zeroes() {
        let summary = summarize(&[]);

        assert_eq!(summary.total_income, 0.0);
        assert_eq!(summary.total_expenses, 0.0);
        assert_eq!(summary.difference, 0.0);
        assert_eq!(summary.totals.len(), CATALOG.len());
        assert!(summary.totals.iter().all(|total| total.sum == 0.0));
    }

    #[test]
    fn every_catalog_category_appears_exactly_once() {
        let (conn, user) = create_database_and_insert_test_user();
        let transactions = vec![insert_transaction(&conn, user.id(), 12.5, "Car", "15-03-2024")];

        let summary = summarize(&transactions);

        assert_eq!(summary.totals.len(), CATALOG.len());

        for (total, entry) in summary.totals.iter().zip(CATALOG.iter()) {
            assert_eq!(total.category, entry.name);
            assert_eq!(total.color, entry.color);
            assert!(total.sum >= 0.0);
        }
    }

    #[test]
    fn income_and_expenses_are_summed_separately() {
        let (conn, user) = create_database_and_insert_test_user();
        let transactions = vec![
            insert_transaction(&conn, user.id(), 100.0, category::INCOME, "15-03-2024"),
            insert_transaction(&conn, user.id(), 50.0, category::INCOME, "16-03-2024"),
            insert_transaction(&conn, user.id(), 30.0, "Products", "17-03-2024"),
            insert_transaction(&conn, user.id(), 20.0, "Car", "18-03-2024"),
        ];

        let summary = summarize(&transactions);

        assert_eq!(summary.total_income, 150.0);
        assert_eq!(summary.total_expenses, 50.0);
        assert_eq!(summary.difference, 100.0);
    }

    #[test]
    fn difference_keeps_its_sign_when_expenses_exceed_income() {
        let (conn, user) = create_database_and_insert_test_user();
        let transactions = vec![
            insert_transaction(&conn, user.id(), 100.0, category::INCOME, "15-03-2024"),
            insert_transaction(&conn, user.id(), 175.0, "Main expenses", "16-03-2024"),
        ];

        let summary = summarize(&transactions);

        assert_eq!(summary.total_income, 100.0);
        assert_eq!(summary.total_expenses, 175.0);
        assert_eq!(summary.difference, -75.0);
        assert_eq!(
            summary.total_income - summary.total_expenses,
            summary.difference
        );
    }

    #[test]
    fn per_category_sums_accumulate_and_use_absolute_values() {
        let (conn, user) = create_database_and_insert_test_user();
        let transactions = vec![
            insert_transaction(&conn, user.id(), 30.0, "Products", "15-03-2024"),
            insert_transaction(&conn, user.id(), 12.0, "Products", "16-03-2024"),
            insert_transaction(&conn, user.id(), 100.0, category::INCOME, "17-03-2024"),
        ];

        let summary = summarize(&transactions);

        let products = summary
            .totals
            .iter()
            .find(|total| total.category == "Products")
            .unwrap();
        assert_eq!(products.sum, 42.0);

        let income = summary
            .totals
            .iter()
            .find(|total| total.category == category::INCOME)
            .unwrap();
        assert_eq!(income.sum, 100.0);

        let untouched = summary
            .totals
            .iter()
            .find(|total| total.category == "Education")
            .unwrap();
        assert_eq!(untouched.sum, 0.0);
    }
}
