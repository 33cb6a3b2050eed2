//! The account model and its database queries.

use std::{fmt::Display, str::FromStr};

use rusqlite::{
    Connection, Row,
    types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef},
};
use serde::Deserialize;

use crate::{Error, auth::UserID, balance::validate_amount, database_id::DatabaseId};

pub type AccountId = DatabaseId;

/// The name of an account, e.g. "Everyday" or "Visa".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountName(String);

impl AccountName {
    /// Create an account name from a string with surrounding whitespace removed.
    ///
    /// # Errors
    ///
    /// Returns [Error::EmptyAccountName] if `name` is empty or only whitespace.
    pub fn new(name: &str) -> Result<Self, Error> {
        let name = name.trim();

        if name.is_empty() {
            Err(Error::EmptyAccountName)
        } else {
            Ok(Self(name.to_owned()))
        }
    }

    /// Create an account name without validation.
    ///
    /// The caller should ensure that `name` is not empty.
    pub fn new_unchecked(name: &str) -> Self {
        Self(name.to_owned())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for AccountName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The type of financial account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountKind {
    Checking,
    Savings,
    Credit,
    Cash,
    Investment,
}

impl AccountKind {
    /// Every kind, in the order they are listed in forms.
    pub const ALL: [AccountKind; 5] = [
        Self::Checking,
        Self::Savings,
        Self::Credit,
        Self::Cash,
        Self::Investment,
    ];

    /// The value stored in the database and sent by forms.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Checking => "checking",
            Self::Savings => "savings",
            Self::Credit => "credit",
            Self::Cash => "cash",
            Self::Investment => "investment",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Checking => "Checking",
            Self::Savings => "Savings",
            Self::Credit => "Credit Card",
            Self::Cash => "Cash",
            Self::Investment => "Investment",
        }
    }
}

impl FromStr for AccountKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| Error::InvalidAccountKind(s.to_owned()))
    }
}

impl ToSql for AccountKind {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for AccountKind {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()?
            .parse()
            .map_err(|error: Error| FromSqlError::Other(Box::new(error)))
    }
}

/// A user's financial account and its running balance.
#[derive(Debug, Clone, PartialEq)]
pub struct Account {
    /// The id for the account.
    pub id: AccountId,
    /// The name the user gave the account.
    pub name: AccountName,
    /// What type of account this is.
    pub kind: AccountKind,
    /// The balance in dollars after applying every transaction in the account.
    pub balance: f64,
}

pub fn create_account_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS account (
            id INTEGER PRIMARY KEY,
            user_id INTEGER NOT NULL,
            name TEXT NOT NULL,
            kind TEXT NOT NULL,
            balance REAL NOT NULL,
            UNIQUE(user_id, name),
            FOREIGN KEY(user_id) REFERENCES user(id) ON DELETE CASCADE
        )",
        (),
    )?;

    Ok(())
}

pub fn map_row_to_account(row: &Row) -> Result<Account, rusqlite::Error> {
    let id = row.get(0)?;
    let name: String = row.get(1)?;
    let kind = row.get(2)?;
    let balance = row.get(3)?;

    Ok(Account {
        id,
        name: AccountName::new_unchecked(&name),
        kind,
        balance,
    })
}

/// Map a failed UNIQUE constraint on the account name to [Error::DuplicateAccountName].
fn map_duplicate_name_error(error: rusqlite::Error, name: &AccountName) -> Error {
    match error {
        // Code 2067 occurs when a UNIQUE constraint failed.
        rusqlite::Error::SqliteFailure(sql_error, Some(ref desc))
            if sql_error.extended_code == 2067 && desc.contains("account.name") =>
        {
            Error::DuplicateAccountName(name.to_string())
        }
        error => error.into(),
    }
}

/// Create an account for `user_id` with an opening `balance`.
///
/// # Errors
/// This function will return a:
/// - [Error::InvalidAmount] if `balance` is not finite or too large,
/// - or [Error::DuplicateAccountName] if the user already has an account called `name`,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn create_account(
    name: AccountName,
    kind: AccountKind,
    balance: f64,
    user_id: UserID,
    connection: &Connection,
) -> Result<Account, Error> {
    validate_amount(balance)?;

    connection
        .execute(
            "INSERT INTO account (user_id, name, kind, balance) VALUES (?1, ?2, ?3, ?4)",
            (user_id.as_i64(), name.as_str(), kind, balance),
        )
        .map_err(|error| map_duplicate_name_error(error, &name))?;

    let id = connection.last_insert_rowid();

    Ok(Account {
        id,
        name,
        kind,
        balance,
    })
}

/// Retrieve one of the user's accounts by its `id`.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if `id` does not refer to an account owned by `user_id`,
/// - or [Error::SqlError] there is some other SQL error.
pub fn get_account(
    id: AccountId,
    user_id: UserID,
    connection: &Connection,
) -> Result<Account, Error> {
    let account = connection
        .prepare(
            "SELECT id, name, kind, balance FROM account WHERE id = :id AND user_id = :user_id",
        )?
        .query_one(
            &[(":id", &id), (":user_id", &user_id.as_i64())],
            map_row_to_account,
        )?;

    Ok(account)
}

/// Get all of the user's accounts ordered by name.
pub fn get_all_accounts(user_id: UserID, connection: &Connection) -> Result<Vec<Account>, Error> {
    connection
        .prepare(
            "SELECT id, name, kind, balance FROM account WHERE user_id = :user_id
            ORDER BY name COLLATE NOCASE ASC",
        )?
        .query_map(&[(":user_id", &user_id.as_i64())], map_row_to_account)?
        .map(|account_result| account_result.map_err(Error::from))
        .collect()
}

/// Get the total balance across all of the user's accounts.
///
/// # Errors
/// Returns [Error] if the SQL query preparation or execution fails.
pub fn get_total_account_balance(user_id: UserID, connection: &Connection) -> Result<f64, Error> {
    let total = connection.query_row(
        "SELECT COALESCE(SUM(balance), 0) FROM account WHERE user_id = ?1",
        [user_id.as_i64()],
        |row| row.get(0),
    )?;

    Ok(total)
}

type RowsAffected = usize;

/// Update the name, kind and balance of one of the user's accounts.
///
/// Returns the number of rows changed, which is zero if `id` does not refer
/// to an account owned by `user_id`. Returns [Error::InvalidAmount] if
/// `balance` is not finite or too large.
pub fn update_account(
    id: AccountId,
    name: &AccountName,
    kind: AccountKind,
    balance: f64,
    user_id: UserID,
    connection: &Connection,
) -> Result<RowsAffected, Error> {
    validate_amount(balance)?;

    connection
        .execute(
            "UPDATE account SET name = ?1, kind = ?2, balance = ?3 WHERE id = ?4 AND user_id = ?5",
            (name.as_str(), kind, balance, id, user_id.as_i64()),
        )
        .map_err(|error| map_duplicate_name_error(error, name))
}

/// Delete one of the user's accounts along with its transactions.
pub fn delete_account(
    id: AccountId,
    user_id: UserID,
    connection: &Connection,
) -> Result<RowsAffected, Error> {
    connection
        .execute(
            "DELETE FROM account WHERE id = ?1 AND user_id = ?2",
            (id, user_id.as_i64()),
        )
        .map_err(Error::from)
}

#[cfg(test)]
mod account_name_tests {
    use crate::Error;

    use super::{AccountKind, AccountName};

    #[test]
    fn trims_whitespace() {
        assert_eq!(AccountName::new("  Everyday ").unwrap().as_str(), "Everyday");
    }

    #[test]
    fn rejects_blank_name() {
        assert_eq!(AccountName::new("   "), Err(Error::EmptyAccountName));
    }

    #[test]
    fn parses_account_kinds() {
        for kind in AccountKind::ALL {
            assert_eq!(kind.as_str().parse::<AccountKind>(), Ok(kind));
        }

        assert_eq!(
            "loan".parse::<AccountKind>(),
            Err(Error::InvalidAccountKind("loan".to_owned()))
        );
    }
}

#[cfg(test)]
mod database_tests {
    use crate::{
        Error,
        test_utils::{get_test_connection, insert_test_user},
    };

    use super::{
        Account, AccountKind, AccountName, create_account, delete_account, get_account,
        get_all_accounts, get_total_account_balance, update_account,
    };

    #[test]
    fn create_and_get_account() {
        let connection = get_test_connection();
        let user_id = insert_test_user("a@example.com", &connection);

        let account = create_account(
            AccountName::new_unchecked("Everyday"),
            AccountKind::Checking,
            123.45,
            user_id,
            &connection,
        )
        .unwrap();

        assert_eq!(get_account(account.id, user_id, &connection), Ok(account));
    }

    #[test]
    fn create_fails_on_duplicate_name() {
        let connection = get_test_connection();
        let user_id = insert_test_user("a@example.com", &connection);
        let name = AccountName::new_unchecked("Everyday");
        create_account(name.clone(), AccountKind::Checking, 0.0, user_id, &connection).unwrap();

        let result = create_account(name, AccountKind::Savings, 0.0, user_id, &connection);

        assert_eq!(
            result,
            Err(Error::DuplicateAccountName("Everyday".to_owned()))
        );
    }

    #[test]
    fn create_rejects_non_finite_and_oversized_balances() {
        let connection = get_test_connection();
        let user_id = insert_test_user("a@example.com", &connection);

        for balance in [f64::INFINITY, f64::NEG_INFINITY, f64::NAN, 2e12] {
            let result = create_account(
                AccountName::new_unchecked("Everyday"),
                AccountKind::Checking,
                balance,
                user_id,
                &connection,
            );

            assert!(
                matches!(result, Err(Error::InvalidAmount(_))),
                "got {result:?} for balance {balance}"
            );
        }
        assert!(get_all_accounts(user_id, &connection).unwrap().is_empty());
    }

    #[test]
    fn update_rejects_non_finite_balance() {
        let connection = get_test_connection();
        let user_id = insert_test_user("a@example.com", &connection);
        let name = AccountName::new_unchecked("Everyday");
        let account =
            create_account(name.clone(), AccountKind::Checking, 10.0, user_id, &connection)
                .unwrap();

        let result = update_account(
            account.id,
            &name,
            AccountKind::Checking,
            f64::NAN,
            user_id,
            &connection,
        );

        assert!(matches!(result, Err(Error::InvalidAmount(_))), "got {result:?}");
        assert_eq!(
            get_account(account.id, user_id, &connection)
                .unwrap()
                .balance,
            10.0
        );
    }

    #[test]
    fn different_users_can_share_account_names() {
        let connection = get_test_connection();
        let name = AccountName::new_unchecked("Everyday");
        for email in ["a@example.com", "b@example.com"] {
            let user_id = insert_test_user(email, &connection);

            let result =
                create_account(name.clone(), AccountKind::Checking, 0.0, user_id, &connection);

            assert!(result.is_ok(), "could not create account for {email}");
        }
    }

    #[test]
    fn get_account_hides_other_users_accounts() {
        let connection = get_test_connection();
        let owner = insert_test_user("a@example.com", &connection);
        let other_user = insert_test_user("b@example.com", &connection);
        let account = create_account(
            AccountName::new_unchecked("Everyday"),
            AccountKind::Checking,
            0.0,
            owner,
            &connection,
        )
        .unwrap();

        assert_eq!(
            get_account(account.id, other_user, &connection),
            Err(Error::NotFound)
        );
    }

    #[test]
    fn get_all_accounts_orders_by_name() {
        let connection = get_test_connection();
        let user_id = insert_test_user("a@example.com", &connection);
        for name in ["savings", "Everyday", "Cash"] {
            create_account(
                AccountName::new_unchecked(name),
                AccountKind::Checking,
                0.0,
                user_id,
                &connection,
            )
            .unwrap();
        }

        let names: Vec<String> = get_all_accounts(user_id, &connection)
            .unwrap()
            .into_iter()
            .map(|account| account.name.to_string())
            .collect();

        assert_eq!(names, ["Cash", "Everyday", "savings"]);
    }

    #[test]
    fn total_balance_sums_only_the_users_accounts() {
        let connection = get_test_connection();
        let user_id = insert_test_user("a@example.com", &connection);
        let other_user = insert_test_user("b@example.com", &connection);
        for (name, balance) in [("A", 100.5), ("B", 250.75), ("C", -50.25)] {
            create_account(
                AccountName::new_unchecked(name),
                AccountKind::Checking,
                balance,
                user_id,
                &connection,
            )
            .unwrap();
        }
        create_account(
            AccountName::new_unchecked("A"),
            AccountKind::Checking,
            1000.0,
            other_user,
            &connection,
        )
        .unwrap();

        let total = get_total_account_balance(user_id, &connection).unwrap();

        assert_eq!(total, 301.0);
    }

    #[test]
    fn total_balance_is_zero_without_accounts() {
        let connection = get_test_connection();
        let user_id = insert_test_user("a@example.com", &connection);

        assert_eq!(get_total_account_balance(user_id, &connection), Ok(0.0));
    }

    #[test]
    fn update_changes_account() {
        let connection = get_test_connection();
        let user_id = insert_test_user("a@example.com", &connection);
        let account = create_account(
            AccountName::new_unchecked("Everyday"),
            AccountKind::Checking,
            0.0,
            user_id,
            &connection,
        )
        .unwrap();
        let new_name = AccountName::new_unchecked("Rainy Day");

        let rows_affected = update_account(
            account.id,
            &new_name,
            AccountKind::Savings,
            42.0,
            user_id,
            &connection,
        )
        .unwrap();

        assert_eq!(rows_affected, 1);
        assert_eq!(
            get_account(account.id, user_id, &connection),
            Ok(Account {
                id: account.id,
                name: new_name,
                kind: AccountKind::Savings,
                balance: 42.0,
            })
        );
    }

    #[test]
    fn delete_removes_account() {
        let connection = get_test_connection();
        let user_id = insert_test_user("a@example.com", &connection);
        let account = create_account(
            AccountName::new_unchecked("Everyday"),
            AccountKind::Checking,
            0.0,
            user_id,
            &connection,
        )
        .unwrap();

        assert_eq!(delete_account(account.id, user_id, &connection), Ok(1));
        assert_eq!(
            get_account(account.id, user_id, &connection),
            Err(Error::NotFound)
        );
    }

    #[test]
    fn delete_ignores_other_users_accounts() {
        let connection = get_test_connection();
        let owner = insert_test_user("a@example.com", &connection);
        let other_user = insert_test_user("b@example.com", &connection);
        let account = create_account(
            AccountName::new_unchecked("Everyday"),
            AccountKind::Checking,
            0.0,
            owner,
            &connection,
        )
        .unwrap();

        assert_eq!(delete_account(account.id, other_user, &connection), Ok(0));
    }
}
