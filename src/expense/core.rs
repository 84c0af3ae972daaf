//! Defines the expense model and the database queries for single expenses.

use rusqlite::{Connection, Row, params};
use time::Date;

use crate::{Error, auth::UserID, database_id::ExpenseID};

// ============================================================================
// MODELS
// ============================================================================

/// Money a user spent on a given day.
#[derive(Debug, Clone, PartialEq)]
pub struct Expense {
    /// The ID of the expense.
    pub id: ExpenseID,
    /// The user who recorded the expense.
    pub owner_id: UserID,
    /// How much was spent. Always greater than zero and a whole number of cents.
    pub amount: f64,
    /// The day the money was spent.
    pub date: Date,
    /// Free text category, e.g. "Food".
    pub category: String,
    /// What the money was spent on.
    pub description: String,
}

/// The user supplied fields of an expense, used to create or update one.
#[derive(Debug, Clone, PartialEq)]
pub struct ExpenseData {
    pub amount: f64,
    pub date: Date,
    pub category: String,
    pub description: String,
}

/// Convert a dollar amount to whole cents, rounding to the nearest cent.
///
/// Amounts are stored and summed as cents so that totals are exact.
pub fn to_cents(amount: f64) -> i64 {
    (amount * 100.0).round() as i64
}

/// Convert whole cents back to a dollar amount for display.
pub fn from_cents(cents: i64) -> f64 {
    cents as f64 / 100.0
}

// ============================================================================
// DATABASE FUNCTIONS
// ============================================================================

/// Create the expense table in the database.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL error.
pub fn create_expense_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS expense (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                owner_id INTEGER NOT NULL,
                amount_cents INTEGER NOT NULL,
                date TEXT NOT NULL,
                category TEXT NOT NULL,
                description TEXT NOT NULL,
                FOREIGN KEY(owner_id) REFERENCES user(id) ON UPDATE CASCADE ON DELETE CASCADE
                )",
        (),
    )?;

    // Used by the list page, today's total and the category summary.
    connection.execute(
        "CREATE INDEX IF NOT EXISTS idx_expense_owner_date ON expense(owner_id, date);",
        (),
    )?;

    Ok(())
}

/// Create a new expense owned by `owner_id`.
///
/// # Errors
/// This function will return an [Error::SqlError] if there is an SQL error.
pub fn create_expense(
    owner_id: UserID,
    data: ExpenseData,
    connection: &Connection,
) -> Result<Expense, Error> {
    let expense = connection
        .prepare(
            "INSERT INTO expense (owner_id, amount_cents, date, category, description)
             VALUES (?1, ?2, ?3, ?4, ?5)
             RETURNING id, owner_id, amount_cents, date, category, description",
        )?
        .query_row(
            params![
                owner_id.as_i64(),
                to_cents(data.amount),
                data.date,
                data.category,
                data.description
            ],
            map_expense_row,
        )?;

    Ok(expense)
}

/// Retrieve an expense by its `id`.
///
/// When `owner_scope` is set, expenses owned by anyone else are treated as missing.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if `id` does not refer to a visible expense,
/// - or [Error::SqlError] there is some other SQL error.
pub fn get_expense(
    id: ExpenseID,
    owner_scope: Option<UserID>,
    connection: &Connection,
) -> Result<Expense, Error> {
    let expense = connection
        .prepare(
            "SELECT id, owner_id, amount_cents, date, category, description FROM expense
             WHERE id = ?1 AND (?2 IS NULL OR owner_id = ?2)",
        )?
        .query_row(
            params![id, owner_scope.map(|owner| owner.as_i64())],
            map_expense_row,
        )?;

    Ok(expense)
}

/// Overwrite the fields of the expense `id` with `data`.
///
/// # Errors
/// This function will return a:
/// - [Error::UpdateMissingExpense] if `id` does not refer to a visible expense,
/// - or [Error::SqlError] there is some other SQL error.
pub fn update_expense(
    id: ExpenseID,
    owner_scope: Option<UserID>,
    data: &ExpenseData,
    connection: &Connection,
) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "UPDATE expense
         SET amount_cents = ?1, date = ?2, category = ?3, description = ?4
         WHERE id = ?5 AND (?6 IS NULL OR owner_id = ?6)",
        params![
            to_cents(data.amount),
            data.date,
            data.category,
            data.description,
            id,
            owner_scope.map(|owner| owner.as_i64()),
        ],
    )?;

    if rows_affected == 0 {
        return Err(Error::UpdateMissingExpense);
    }

    Ok(())
}

/// Delete the expense `id`.
///
/// # Errors
/// This function will return a:
/// - [Error::DeleteMissingExpense] if `id` does not refer to a visible expense,
/// - or [Error::SqlError] there is some other SQL error.
pub fn delete_expense(
    id: ExpenseID,
    owner_scope: Option<UserID>,
    connection: &Connection,
) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "DELETE FROM expense WHERE id = ?1 AND (?2 IS NULL OR owner_id = ?2)",
        params![id, owner_scope.map(|owner| owner.as_i64())],
    )?;

    if rows_affected == 0 {
        return Err(Error::DeleteMissingExpense);
    }

    Ok(())
}

/// Get the number of expenses owned by `owner_id`.
///
/// # Errors
/// This function will return a [Error::SqlError] there is some SQL error.
pub fn count_expenses(owner_id: UserID, connection: &Connection) -> Result<u64, Error> {
    connection
        .query_row(
            "SELECT COUNT(id) FROM expense WHERE owner_id = ?1;",
            [owner_id.as_i64()],
            |row| row.get::<_, i64>(0),
        )
        .map(|count| count as u64)
        .map_err(|error| error.into())
}

/// Map a database row to an [Expense].
///
/// Expects the columns id, owner_id, amount_cents, date, category and description in that order.
pub fn map_expense_row(row: &Row) -> Result<Expense, rusqlite::Error> {
    Ok(Expense {
        id: row.get(0)?,
        owner_id: UserID::new(row.get(1)?),
        amount: from_cents(row.get(2)?),
        date: row.get(3)?,
        category: row.get(4)?,
        description: row.get(5)?,
    })
}

// ============================================================================
// TESTS
// ============================================================================
