//! Creates the database schema.

use rusqlite::{Connection, Transaction, TransactionBehavior};

use crate::{
    Error,
    auth::create_user_table,
    category::create_category_table,
    expense::create_expense_table,
    preferences::{create_expense_limit_table, create_user_preference_table},
};

/// Create all of the application's tables if they do not already exist.
///
/// # Errors
/// Returns an error if a table could not be created or the transaction could not be committed.
pub fn initialize(connection: &Connection) -> Result<(), Error> {
    let transaction = Transaction::new_unchecked(connection, TransactionBehavior::Exclusive)?;

    create_user_table(&transaction)?;
    create_category_table(&transaction)?;
    create_expense_table(&transaction)?;
    create_expense_limit_table(&transaction)?;
    create_user_preference_table(&transaction)?;

    transaction.commit()?;

    Ok(())
}
