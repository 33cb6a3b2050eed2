//! Creates the application's database schema.

use rusqlite::{Connection, Transaction as SqlTransaction, TransactionBehavior};

use crate::{
    Error, account::create_account_table, auth::create_user_table,
    category::create_category_table, transaction::create_transaction_table,
};

/// Create the tables for all of the domain models if they do not exist yet.
///
/// Foreign key enforcement is switched on for `connection`, which is needed
/// for deleting an account to delete its transactions and deleting a
/// category to uncategorise its transactions.
///
/// # Errors
/// Returns an error if there is an SQL error while creating the tables.
pub fn initialize(connection: &Connection) -> Result<(), Error> {
    // Must be set outside of a transaction, otherwise it is a no-op.
    connection.pragma_update(None, "foreign_keys", "ON")?;

    let transaction = SqlTransaction::new_unchecked(connection, TransactionBehavior::Exclusive)?;

    create_user_table(&transaction)?;
    create_account_table(&transaction)?;
    create_category_table(&transaction)?;
    create_transaction_table(&transaction)?;

    transaction.commit()?;

    Ok(())
}
