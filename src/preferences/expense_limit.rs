//! The per-user daily expense limit.

use rusqlite::{Connection, OptionalExtension};

use crate::{Error, auth::UserID};

/// Parse a daily limit, which must be a finite number that is zero or more.
pub fn parse_daily_limit(text: &str) -> Option<f64> {
    text.trim()
        .parse::<f64>()
        .ok()
        .filter(|limit| limit.is_finite() && *limit >= 0.0)
}

/// Create the expense limit table.
///
/// Each user has at most one limit.
pub fn create_expense_limit_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS expense_limit (
                id INTEGER PRIMARY KEY,
                owner_id INTEGER NOT NULL UNIQUE,
                daily_expense_limit REAL NOT NULL,
                FOREIGN KEY(owner_id) REFERENCES user(id) ON UPDATE CASCADE ON DELETE CASCADE
                )",
        (),
    )?;

    Ok(())
}

/// Get the daily limit `owner_id` has set, if any.
///
/// # Errors
/// This function will return a [Error::SqlError] there is some SQL error.
pub fn get_daily_limit(owner_id: UserID, connection: &Connection) -> Result<Option<f64>, Error> {
    connection
        .query_row(
            "SELECT daily_expense_limit FROM expense_limit WHERE owner_id = ?1",
            [owner_id.as_i64()],
            |row| row.get(0),
        )
        .optional()
        .map_err(Error::from)
}

/// Get the daily limit for `owner_id`, falling back to `default_limit` if they have not set one.
///
/// # Errors
/// This function will return a [Error::SqlError] there is some SQL error.
pub fn get_daily_limit_or_default(
    owner_id: UserID,
    default_limit: f64,
    connection: &Connection,
) -> Result<f64, Error> {
    Ok(get_daily_limit(owner_id, connection)?.unwrap_or(default_limit))
}

/// Set the daily limit for `owner_id`, replacing any existing limit.
///
/// # Errors
/// This function will return a [Error::SqlError] there is some SQL error.
pub fn set_daily_limit(owner_id: UserID, limit: f64, connection: &Connection) -> Result<(), Error> {
    connection.execute(
        "INSERT INTO expense_limit (owner_id, daily_expense_limit) VALUES (?1, ?2)
         ON CONFLICT(owner_id) DO UPDATE SET daily_expense_limit = excluded.daily_expense_limit",
        (owner_id.as_i64(), limit),
    )?;

    Ok(())
}
