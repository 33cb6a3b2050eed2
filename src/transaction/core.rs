//! Defines the core data models and database queries for transactions.
//!
//! Every write goes through a SQL transaction that also adjusts the balance
//! of the affected accounts, see [crate::balance].

use rusqlite::{Connection, Row};
use serde::{Deserialize, Serialize};
use time::Date;

use crate::{
    Error,
    account::AccountId,
    auth::UserID,
    balance::{
        apply_balance_changes, changes_for_create, changes_for_delete, changes_for_update,
        validate_amount,
    },
    category::CategoryId,
    database_id::DatabaseId,
};

/// Database identifier for a transaction.
pub type TransactionId = DatabaseId;

// ============================================================================
// MODELS
// ============================================================================

/// An expense or income, i.e. an event where money was either spent or earned.
///
/// To create a new `Transaction`, use [Transaction::build].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// The ID of the transaction.
    pub id: TransactionId,
    /// The account the money moved in or out of.
    pub account_id: AccountId,
    /// The ID of the category the transaction belongs to.
    pub category_id: Option<CategoryId>,
    /// The amount of money earned (positive) or spent (negative).
    pub amount: f64,
    /// When the transaction happened.
    pub date: Date,
    /// A text description of what the transaction was for.
    pub description: String,
}

impl Transaction {
    /// Create a new transaction.
    ///
    /// Shortcut for [TransactionBuilder] for discoverability.
    pub fn build(
        account_id: AccountId,
        amount: f64,
        date: Date,
        description: &str,
    ) -> TransactionBuilder {
        TransactionBuilder {
            account_id,
            amount,
            date,
            description: description.to_owned(),
            category_id: None,
        }
    }
}

/// The fields of a [Transaction] that the user chooses.
///
/// # Examples
///
/// ```ignore
/// use time::macros::date;
///
/// let builder = Transaction::build(account.id, -45.99, date!(2025-01-15), "Coffee")
///     .category_id(Some(eating_out.id));
/// let transaction = create_transaction(builder, user_id, &connection)?;
/// ```
#[derive(Debug, PartialEq, Clone)]
pub struct TransactionBuilder {
    /// The account the transaction belongs to.
    pub account_id: AccountId,

    /// The monetary amount of the transaction.
    ///
    /// Positive values represent income, negative values represent expenses.
    ///
    /// # Examples
    /// - `150.00` - Salary deposit
    /// - `-45.99` - Coffee shop purchase
    pub amount: f64,

    /// The date when the transaction occurred.
    pub date: Date,

    /// A human-readable description of the transaction.
    pub description: String,

    /// The category of the transaction, e.g. "Groceries", "Transport", "Rent".
    pub category_id: Option<CategoryId>,
}

impl TransactionBuilder {
    /// Set the category id for the transaction.
    pub fn category_id(mut self, category_id: Option<CategoryId>) -> Self {
        self.category_id = category_id;
        self
    }

    fn into_transaction(self, id: TransactionId) -> Transaction {
        Transaction {
            id,
            account_id: self.account_id,
            category_id: self.category_id,
            amount: self.amount,
            date: self.date,
            description: self.description,
        }
    }
}

// ============================================================================
// DATABASE FUNCTIONS
// ============================================================================

/// Check the parts of `builder` that the database cannot check for us.
///
/// The account and category must belong to `user_id`, which a foreign key
/// alone would not catch.
fn validate_builder(
    builder: &TransactionBuilder,
    user_id: UserID,
    connection: &Connection,
) -> Result<(), Error> {
    validate_amount(builder.amount)?;

    if builder.amount == 0.0 {
        return Err(Error::ZeroAmount);
    }

    let owns_account: bool = connection.query_row(
        "SELECT EXISTS(SELECT 1 FROM account WHERE id = ?1 AND user_id = ?2)",
        (builder.account_id, user_id.as_i64()),
        |row| row.get(0),
    )?;

    if !owns_account {
        return Err(Error::InvalidAccount(builder.account_id));
    }

    if let Some(category_id) = builder.category_id {
        let owns_category: bool = connection.query_row(
            "SELECT EXISTS(SELECT 1 FROM category WHERE id = ?1 AND user_id = ?2)",
            (category_id, user_id.as_i64()),
            |row| row.get(0),
        )?;

        if !owns_category {
            return Err(Error::InvalidCategory(builder.category_id));
        }
    }

    Ok(())
}

/// Create a new transaction and add its amount to its account's balance.
///
/// # Errors
/// This function will return a:
/// - [Error::ZeroAmount] if the amount is zero,
/// - or [Error::InvalidAmount] if the amount is not finite or too large,
/// - or [Error::InvalidAccount] if the account does not belong to `user_id`,
/// - or [Error::InvalidCategory] if the category does not belong to `user_id`,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn create_transaction(
    builder: TransactionBuilder,
    user_id: UserID,
    connection: &Connection,
) -> Result<Transaction, Error> {
    validate_builder(&builder, user_id, connection)?;

    let sql_transaction = connection.unchecked_transaction()?;

    sql_transaction.execute(
        "INSERT INTO \"transaction\" (user_id, account_id, category_id, amount, date, description)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        (
            user_id.as_i64(),
            builder.account_id,
            builder.category_id,
            builder.amount,
            builder.date,
            &builder.description,
        ),
    )?;

    let transaction = builder.into_transaction(sql_transaction.last_insert_rowid());

    apply_balance_changes(
        &changes_for_create(&transaction),
        user_id,
        &sql_transaction,
    )?;

    sql_transaction.commit()?;

    tracing::debug!(
        "Created transaction {} in account {}",
        transaction.id,
        transaction.account_id
    );

    Ok(transaction)
}

/// Replace the user-editable fields of a transaction and move the balance
/// difference onto the affected accounts.
///
/// # Errors
/// This function will return a:
/// - [Error::UpdateMissingTransaction] if `user_id` has no transaction with `id`,
/// - or any of the errors from [create_transaction] for an invalid `builder`.
pub fn update_transaction(
    id: TransactionId,
    builder: TransactionBuilder,
    user_id: UserID,
    connection: &Connection,
) -> Result<Transaction, Error> {
    let old = match get_transaction(id, user_id, connection) {
        Ok(transaction) => transaction,
        Err(Error::NotFound) => return Err(Error::UpdateMissingTransaction),
        Err(error) => return Err(error),
    };

    validate_builder(&builder, user_id, connection)?;

    let sql_transaction = connection.unchecked_transaction()?;

    sql_transaction.execute(
        "UPDATE \"transaction\"
         SET account_id = ?1, category_id = ?2, amount = ?3, date = ?4, description = ?5
         WHERE id = ?6 AND user_id = ?7",
        (
            builder.account_id,
            builder.category_id,
            builder.amount,
            builder.date,
            &builder.description,
            id,
            user_id.as_i64(),
        ),
    )?;

    let new = builder.into_transaction(id);

    apply_balance_changes(&changes_for_update(&old, &new), user_id, &sql_transaction)?;

    sql_transaction.commit()?;

    Ok(new)
}

/// Delete a transaction and take its amount back off its account's balance.
///
/// # Errors
/// This function will return a:
/// - [Error::DeleteMissingTransaction] if `user_id` has no transaction with `id`,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn delete_transaction(
    id: TransactionId,
    user_id: UserID,
    connection: &Connection,
) -> Result<(), Error> {
    let transaction = match get_transaction(id, user_id, connection) {
        Ok(transaction) => transaction,
        Err(Error::NotFound) => return Err(Error::DeleteMissingTransaction),
        Err(error) => return Err(error),
    };

    let sql_transaction = connection.unchecked_transaction()?;

    sql_transaction.execute(
        "DELETE FROM \"transaction\" WHERE id = ?1 AND user_id = ?2",
        (id, user_id.as_i64()),
    )?;

    apply_balance_changes(
        &changes_for_delete(&transaction),
        user_id,
        &sql_transaction,
    )?;

    sql_transaction.commit()?;

    Ok(())
}

/// Retrieve one of the user's transactions by its `id`.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if `id` does not refer to a transaction owned by `user_id`,
/// - or [Error::SqlError] there is some other SQL error.
pub fn get_transaction(
    id: TransactionId,
    user_id: UserID,
    connection: &Connection,
) -> Result<Transaction, Error> {
    let transaction = connection
        .prepare(
            "SELECT id, account_id, category_id, amount, date, description FROM \"transaction\"
             WHERE id = :id AND user_id = :user_id",
        )?
        .query_one(
            &[(":id", &id), (":user_id", &user_id.as_i64())],
            map_transaction_row,
        )?;

    Ok(transaction)
}

/// Create the transaction table in the database.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL error.
pub fn create_transaction_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS \"transaction\" (
                id INTEGER PRIMARY KEY,
                user_id INTEGER NOT NULL,
                account_id INTEGER NOT NULL,
                category_id INTEGER,
                amount REAL NOT NULL,
                date TEXT NOT NULL,
                description TEXT NOT NULL,
                FOREIGN KEY(user_id) REFERENCES user(id) ON DELETE CASCADE,
                FOREIGN KEY(account_id) REFERENCES account(id) ON DELETE CASCADE,
                FOREIGN KEY(category_id) REFERENCES category(id) ON DELETE SET NULL
                )",
        (),
    )?;

    // Composite index used by the dashboard and transactions page.
    connection.execute(
        "CREATE INDEX IF NOT EXISTS idx_transaction_user_date
         ON \"transaction\"(user_id, date);",
        (),
    )?;

    Ok(())
}

/// Map a database row to a Transaction.
///
/// Expects the columns `id, account_id, category_id, amount, date, description`.
pub fn map_transaction_row(row: &Row) -> Result<Transaction, rusqlite::Error> {
    let id = row.get(0)?;
    let account_id = row.get(1)?;
    let category_id = row.get(2)?;
    let amount = row.get(3)?;
    let date = row.get(4)?;
    let description = row.get(5)?;

    Ok(Transaction {
        id,
        account_id,
        category_id,
        amount,
        date,
        description,
    })
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod database_tests {
    use rusqlite::Connection;
    use time::macros::date;

    use crate::{
        Error,
        account::{Account, AccountKind, AccountName, create_account, get_account},
        auth::UserID,
        category::{CategoryName, create_category},
        test_utils::{get_test_connection, insert_test_user},
    };

    use super::{
        Transaction, create_transaction, delete_transaction, get_transaction, update_transaction,
    };

    fn setup() -> (Connection, UserID, Account) {
        let connection = get_test_connection();
        let user_id = insert_test_user("a@example.com", &connection);
        let account = create_account(
            AccountName::new_unchecked("Everyday"),
            AccountKind::Checking,
            100.0,
            user_id,
            &connection,
        )
        .unwrap();

        (connection, user_id, account)
    }

    #[track_caller]
    fn assert_balance(account: &Account, user_id: UserID, connection: &Connection, want: f64) {
        let got = get_account(account.id, user_id, connection).unwrap().balance;
        assert_eq!(got, want, "want balance {want}, got {got}");
    }

    #[test]
    fn create_applies_amount_to_balance() {
        let (connection, user_id, account) = setup();

        let transaction = create_transaction(
            Transaction::build(account.id, -12.5, date!(2025 - 10 - 05), "Lunch"),
            user_id,
            &connection,
        )
        .unwrap();

        assert_eq!(
            get_transaction(transaction.id, user_id, &connection),
            Ok(transaction)
        );
        assert_balance(&account, user_id, &connection, 87.5);
    }

    #[test]
    fn create_fails_on_zero_amount() {
        let (connection, user_id, account) = setup();

        let result = create_transaction(
            Transaction::build(account.id, 0.0, date!(2025 - 10 - 05), ""),
            user_id,
            &connection,
        );

        assert_eq!(result, Err(Error::ZeroAmount));
        assert_balance(&account, user_id, &connection, 100.0);
    }

    #[test]
    fn create_fails_on_other_users_account() {
        let (connection, owner, account) = setup();
        let other_user = insert_test_user("b@example.com", &connection);

        let result = create_transaction(
            Transaction::build(account.id, 5.0, date!(2025 - 10 - 05), ""),
            other_user,
            &connection,
        );

        assert_eq!(result, Err(Error::InvalidAccount(account.id)));
        assert_balance(&account, owner, &connection, 100.0);
    }

    #[test]
    fn create_fails_on_invalid_category_id() {
        let (connection, user_id, account) = setup();
        let category_id = Some(42);

        let result = create_transaction(
            Transaction::build(account.id, 123.45, date!(2025 - 10 - 04), "")
                .category_id(category_id),
            user_id,
            &connection,
        );

        assert_eq!(result, Err(Error::InvalidCategory(category_id)));
    }

    #[test]
    fn update_changes_fields_and_balance() {
        let (connection, user_id, account) = setup();
        let category =
            create_category(CategoryName::new_unchecked("Food"), false, user_id, &connection)
                .unwrap();
        let transaction = create_transaction(
            Transaction::build(account.id, -20.0, date!(2025 - 10 - 05), "Lunch"),
            user_id,
            &connection,
        )
        .unwrap();

        let updated = update_transaction(
            transaction.id,
            Transaction::build(account.id, -50.0, date!(2025 - 10 - 04), "Dinner")
                .category_id(Some(category.id)),
            user_id,
            &connection,
        )
        .unwrap();

        assert_eq!(
            get_transaction(transaction.id, user_id, &connection),
            Ok(updated.clone())
        );
        assert_eq!(updated.description, "Dinner");
        assert_eq!(updated.category_id, Some(category.id));
        assert_balance(&account, user_id, &connection, 50.0);
    }

    #[test]
    fn update_moving_accounts_adjusts_both_balances() {
        let (connection, user_id, everyday) = setup();
        let savings = create_account(
            AccountName::new_unchecked("Savings"),
            AccountKind::Savings,
            1000.0,
            user_id,
            &connection,
        )
        .unwrap();
        let transaction = create_transaction(
            Transaction::build(everyday.id, 40.0, date!(2025 - 10 - 05), "Refund"),
            user_id,
            &connection,
        )
        .unwrap();

        update_transaction(
            transaction.id,
            Transaction::build(savings.id, 60.0, date!(2025 - 10 - 05), "Refund"),
            user_id,
            &connection,
        )
        .unwrap();

        assert_balance(&everyday, user_id, &connection, 100.0);
        assert_balance(&savings, user_id, &connection, 1060.0);
    }

    #[test]
    fn update_missing_transaction_fails() {
        let (connection, user_id, account) = setup();

        let result = update_transaction(
            42,
            Transaction::build(account.id, 1.0, date!(2025 - 10 - 05), ""),
            user_id,
            &connection,
        );

        assert_eq!(result, Err(Error::UpdateMissingTransaction));
    }

    #[test]
    fn update_with_invalid_account_leaves_transaction_unchanged() {
        let (connection, user_id, account) = setup();
        let transaction = create_transaction(
            Transaction::build(account.id, -20.0, date!(2025 - 10 - 05), "Lunch"),
            user_id,
            &connection,
        )
        .unwrap();

        let result = update_transaction(
            transaction.id,
            Transaction::build(999, -20.0, date!(2025 - 10 - 05), "Lunch"),
            user_id,
            &connection,
        );

        assert_eq!(result, Err(Error::InvalidAccount(999)));
        assert_eq!(
            get_transaction(transaction.id, user_id, &connection),
            Ok(transaction)
        );
        assert_balance(&account, user_id, &connection, 80.0);
    }

    #[test]
    fn failed_balance_update_rolls_back_every_write() {
        let (connection, user_id, account) = setup();
        let transaction = create_transaction(
            Transaction::build(account.id, -20.0, date!(2025 - 10 - 05), "Lunch"),
            user_id,
            &connection,
        )
        .unwrap();
        connection
            .execute_batch(
                "CREATE TRIGGER fail_balance_update BEFORE UPDATE ON account
                 BEGIN SELECT RAISE(ABORT, 'balance update failed'); END;",
            )
            .unwrap();

        let created = create_transaction(
            Transaction::build(account.id, -5.0, date!(2025 - 10 - 06), "Coffee"),
            user_id,
            &connection,
        );
        let updated = update_transaction(
            transaction.id,
            Transaction::build(account.id, -50.0, date!(2025 - 10 - 07), "Dinner"),
            user_id,
            &connection,
        );
        let deleted = delete_transaction(transaction.id, user_id, &connection);

        assert!(matches!(created, Err(Error::SqlError(_))), "got {created:?}");
        assert!(matches!(updated, Err(Error::SqlError(_))), "got {updated:?}");
        assert!(matches!(deleted, Err(Error::SqlError(_))), "got {deleted:?}");
        let transaction_count: i64 = connection
            .query_row("SELECT COUNT(*) FROM \"transaction\"", [], |row| row.get(0))
            .unwrap();
        assert_eq!(transaction_count, 1);
        assert_eq!(
            get_transaction(transaction.id, user_id, &connection),
            Ok(transaction)
        );
        assert_balance(&account, user_id, &connection, 80.0);
    }

    #[test]
    fn delete_reverses_amount() {
        let (connection, user_id, account) = setup();
        let transaction = create_transaction(
            Transaction::build(account.id, -20.0, date!(2025 - 10 - 05), "Lunch"),
            user_id,
            &connection,
        )
        .unwrap();

        delete_transaction(transaction.id, user_id, &connection).unwrap();

        assert_eq!(
            get_transaction(transaction.id, user_id, &connection),
            Err(Error::NotFound)
        );
        assert_balance(&account, user_id, &connection, 100.0);
    }

    #[test]
    fn delete_missing_transaction_fails() {
        let (connection, user_id, _) = setup();

        assert_eq!(
            delete_transaction(42, user_id, &connection),
            Err(Error::DeleteMissingTransaction)
        );
    }

    #[test]
    fn cannot_delete_other_users_transaction() {
        let (connection, owner, account) = setup();
        let other_user = insert_test_user("b@example.com", &connection);
        let transaction = create_transaction(
            Transaction::build(account.id, -20.0, date!(2025 - 10 - 05), "Lunch"),
            owner,
            &connection,
        )
        .unwrap();

        assert_eq!(
            delete_transaction(transaction.id, other_user, &connection),
            Err(Error::DeleteMissingTransaction)
        );
        assert_balance(&account, owner, &connection, 80.0);
    }
}
