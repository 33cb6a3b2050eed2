//! Database queries for retrieving dashboard transaction data.
//!
//! The dashboard only needs a slim view of each transaction for its
//! aggregations, so these queries join in the category details up front.

use rusqlite::Connection;
use time::Date;

use crate::{Error, auth::UserID, range::DateRange};

/// A simplified transaction view for dashboard aggregations.
#[derive(Debug, Clone, PartialEq)]
pub(super) struct DashboardTransaction {
    pub amount: f64,
    pub date: Date,
    /// The category name, `None` for uncategorised transactions.
    pub category: Option<String>,
    /// Whether the transaction's category is marked as income.
    pub is_income: bool,
}

/// A transaction with the names needed to show it in the recent transactions table.
#[derive(Debug, Clone, PartialEq)]
pub(super) struct RecentTransaction {
    pub date: Date,
    pub description: String,
    pub amount: f64,
    pub account_name: String,
    pub category_name: Option<String>,
}

/// Gets the user's transactions, with their category, within `range`.
///
/// # Errors
/// Returns [Error::SqlError] if the SQL query fails.
pub(super) fn get_transactions_in_range(
    range: DateRange,
    user_id: UserID,
    connection: &Connection,
) -> Result<Vec<DashboardTransaction>, Error> {
    connection
        .prepare(
            "SELECT t.amount, t.date, c.name, COALESCE(c.is_income, 0)
             FROM \"transaction\" t
             LEFT JOIN category c ON c.id = t.category_id
             WHERE t.user_id = ?1 AND t.date BETWEEN ?2 AND ?3
             ORDER BY t.date ASC, t.id ASC",
        )?
        .query_map((user_id.as_i64(), range.start, range.end), |row| {
            Ok(DashboardTransaction {
                amount: row.get(0)?,
                date: row.get(1)?,
                category: row.get(2)?,
                is_income: row.get(3)?,
            })
        })?
        .map(|transaction_result| transaction_result.map_err(Error::from))
        .collect()
}

/// Gets the user's `limit` most recent transactions regardless of date range.
///
/// # Errors
/// Returns [Error::SqlError] if the SQL query fails.
pub(super) fn get_recent_transactions(
    limit: u64,
    user_id: UserID,
    connection: &Connection,
) -> Result<Vec<RecentTransaction>, Error> {
    let query = format!(
        "SELECT t.date, t.description, t.amount, a.name, c.name
         FROM \"transaction\" t
         INNER JOIN account a ON a.id = t.account_id
         LEFT JOIN category c ON c.id = t.category_id
         WHERE t.user_id = ?1
         ORDER BY t.date DESC, t.id DESC
         LIMIT {limit}"
    );

    connection
        .prepare(&query)?
        .query_map([user_id.as_i64()], |row| {
            Ok(RecentTransaction {
                date: row.get(0)?,
                description: row.get(1)?,
                amount: row.get(2)?,
                account_name: row.get(3)?,
                category_name: row.get(4)?,
            })
        })?
        .map(|transaction_result| transaction_result.map_err(Error::from))
        .collect()
}

/// Whether the user has recorded any transactions at all.
pub(super) fn has_any_transactions(user_id: UserID, connection: &Connection) -> Result<bool, Error> {
    let exists = connection.query_row(
        "SELECT EXISTS(SELECT 1 FROM \"transaction\" WHERE user_id = ?1)",
        [user_id.as_i64()],
        |row| row.get(0),
    )?;

    Ok(exists)
}
