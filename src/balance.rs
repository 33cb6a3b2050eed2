//! Keeps account balances in step with the transactions recorded against them.
//!
//! A transaction's signed amount is added to its account's balance when it is
//! created and taken back off when it is deleted. Updating a transaction takes
//! the old amount off the old account and adds the new amount to the new
//! account. Callers run these changes in the same SQL transaction as the write
//! to the transaction table so both succeed or fail together.

use rusqlite::Connection;

use crate::{Error, Transaction, account::AccountId, auth::UserID};

/// The largest amount, in dollars either side of zero, that a transaction or
/// an account balance may hold.
pub const MAX_AMOUNT: f64 = 1_000_000_000.0;

/// Check that `amount` is a finite number no further than [MAX_AMOUNT] from zero.
///
/// # Errors
/// Returns [Error::InvalidAmount] for infinite, NaN or oversized amounts.
pub fn validate_amount(amount: f64) -> Result<f64, Error> {
    if amount.is_finite() && amount.abs() <= MAX_AMOUNT {
        Ok(amount)
    } else {
        Err(Error::InvalidAmount(amount))
    }
}

/// The balance after money has moved in (positive `amount`) or out (negative `amount`).
pub fn apply_amount(balance: f64, amount: f64) -> f64 {
    balance + amount
}

/// The balance before a movement of `amount` was applied.
pub fn reverse_amount(balance: f64, amount: f64) -> f64 {
    balance - amount
}

/// An adjustment to make to an account's balance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BalanceChange {
    pub account_id: AccountId,
    pub delta: f64,
}

pub fn changes_for_create(transaction: &Transaction) -> Vec<BalanceChange> {
    vec![BalanceChange {
        account_id: transaction.account_id,
        delta: transaction.amount,
    }]
}

pub fn changes_for_delete(transaction: &Transaction) -> Vec<BalanceChange> {
    vec![BalanceChange {
        account_id: transaction.account_id,
        delta: -transaction.amount,
    }]
}

/// The changes needed when `old` is replaced by `new`.
///
/// Moving a transaction between accounts gives one change per account.
/// Otherwise the difference is merged into a single change, or no change at
/// all when the amount is the same.
pub fn changes_for_update(old: &Transaction, new: &Transaction) -> Vec<BalanceChange> {
    if old.account_id != new.account_id {
        return vec![
            BalanceChange {
                account_id: old.account_id,
                delta: -old.amount,
            },
            BalanceChange {
                account_id: new.account_id,
                delta: new.amount,
            },
        ];
    }

    let delta = new.amount - old.amount;

    if delta == 0.0 {
        return Vec::new();
    }

    vec![BalanceChange {
        account_id: new.account_id,
        delta,
    }]
}

/// Apply `changes` to the balances of the user's accounts.
///
/// # Errors
/// This function will return a:
/// - [Error::InvalidAccount] if a change refers to an account that `user_id` does not own,
/// - or [Error::InvalidAmount] if a new balance would be outside [MAX_AMOUNT],
/// - or [Error::SqlError] if there is some other SQL error.
pub fn apply_balance_changes(
    changes: &[BalanceChange],
    user_id: UserID,
    connection: &Connection,
) -> Result<(), Error> {
    for change in changes {
        let balance: f64 = connection
            .query_row(
                "SELECT balance FROM account WHERE id = ?1 AND user_id = ?2",
                (change.account_id, user_id.as_i64()),
                |row| row.get(0),
            )
            .map_err(|error| match error {
                rusqlite::Error::QueryReturnedNoRows => Error::InvalidAccount(change.account_id),
                error => error.into(),
            })?;

        let new_balance = validate_amount(apply_amount(balance, change.delta))?;

        connection.execute(
            "UPDATE account SET balance = ?1 WHERE id = ?2 AND user_id = ?3",
            (new_balance, change.account_id, user_id.as_i64()),
        )?;

        tracing::debug!(
            "Adjusted balance of account {} by {}",
            change.account_id,
            change.delta
        );
    }

    Ok(())
}


#[cfg(test)]
mod validate_amount_tests {
    use crate::Error;

    use super::{MAX_AMOUNT, validate_amount};

    #[test]
    fn accepts_amounts_up_to_the_limit() {
        assert_eq!(validate_amount(-12.5), Ok(-12.5));
        assert_eq!(validate_amount(MAX_AMOUNT), Ok(MAX_AMOUNT));
        assert_eq!(validate_amount(-MAX_AMOUNT), Ok(-MAX_AMOUNT));
    }

    #[test]
    fn rejects_non_finite_amounts() {
        assert_eq!(
            validate_amount(f64::INFINITY),
            Err(Error::InvalidAmount(f64::INFINITY))
        );
        assert_eq!(
            validate_amount(f64::NEG_INFINITY),
            Err(Error::InvalidAmount(f64::NEG_INFINITY))
        );
        assert!(matches!(
            validate_amount(f64::NAN),
            Err(Error::InvalidAmount(amount)) if amount.is_nan()
        ));
    }

    #[test]
    fn rejects_amounts_over_the_limit() {
        assert_eq!(
            validate_amount(MAX_AMOUNT + 0.01),
            Err(Error::InvalidAmount(MAX_AMOUNT + 0.01))
        );
        assert_eq!(validate_amount(-1e12), Err(Error::InvalidAmount(-1e12)));
    }
}


#[cfg(test)]
mod apply_balance_changes_tests {
    use crate::{
        AccountKind, AccountName, Error, create_account,
        account::get_account,
        test_utils::{get_test_connection, insert_test_user},
    };

    use super::{BalanceChange, MAX_AMOUNT, apply_balance_changes};

    #[test]
    fn applies_each_change() {
        let connection = get_test_connection();
        let user_id = insert_test_user("a@example.com", &connection);
        let everyday = create_account(
            AccountName::new_unchecked("Everyday"),
            AccountKind::Checking,
            100.0,
            user_id,
            &connection,
        )
        .unwrap();
        let savings = create_account(
            AccountName::new_unchecked("Savings"),
            AccountKind::Savings,
            0.0,
            user_id,
            &connection,
        )
        .unwrap();

        apply_balance_changes(
            &[
                BalanceChange {
                    account_id: everyday.id,
                    delta: -40.0,
                },
                BalanceChange {
                    account_id: savings.id,
                    delta: 40.0,
                },
            ],
            user_id,
            &connection,
        )
        .unwrap();

        assert_eq!(
            get_account(everyday.id, user_id, &connection)
                .unwrap()
                .balance,
            60.0
        );
        assert_eq!(
            get_account(savings.id, user_id, &connection)
                .unwrap()
                .balance,
            40.0
        );
    }

    #[test]
    fn rejects_other_users_account() {
        let connection = get_test_connection();
        let owner = insert_test_user("a@example.com", &connection);
        let other_user = insert_test_user("b@example.com", &connection);
        let account = create_account(
            AccountName::new_unchecked("Everyday"),
            AccountKind::Checking,
            100.0,
            owner,
            &connection,
        )
        .unwrap();

        let result = apply_balance_changes(
            &[BalanceChange {
                account_id: account.id,
                delta: -40.0,
            }],
            other_user,
            &connection,
        );

        assert_eq!(result, Err(Error::InvalidAccount(account.id)));
        assert_eq!(
            get_account(account.id, owner, &connection).unwrap().balance,
            100.0
        );
    }

    #[test]
    fn rejects_change_that_pushes_balance_over_the_limit() {
        let connection = get_test_connection();
        let user_id = insert_test_user("a@example.com", &connection);
        let account = create_account(
            AccountName::new_unchecked("Everyday"),
            AccountKind::Checking,
            MAX_AMOUNT,
            user_id,
            &connection,
        )
        .unwrap();

        let result = apply_balance_changes(
            &[BalanceChange {
                account_id: account.id,
                delta: 1.0,
            }],
            user_id,
            &connection,
        );

        assert_eq!(result, Err(Error::InvalidAmount(MAX_AMOUNT + 1.0)));
        assert_eq!(
            get_account(account.id, user_id, &connection)
                .unwrap()
                .balance,
            MAX_AMOUNT
        );
    }
}
