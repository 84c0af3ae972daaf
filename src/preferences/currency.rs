//! The user's preferred currency, shown next to amounts.

use rusqlite::{Connection, OptionalExtension};

use crate::{Error, auth::UserID};

/// Create the user preference table.
pub fn create_user_preference_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS user_preference (
                id INTEGER PRIMARY KEY,
                owner_id INTEGER NOT NULL UNIQUE,
                currency TEXT NOT NULL,
                FOREIGN KEY(owner_id) REFERENCES user(id) ON UPDATE CASCADE ON DELETE CASCADE
                )",
        (),
    )?;

    Ok(())
}

/// Get the currency `owner_id` prefers, e.g. "NZD - New Zealand Dollar".
///
/// # Errors
/// This function will return a [Error::SqlError] there is some SQL error.
pub fn get_currency(owner_id: UserID, connection: &Connection) -> Result<Option<String>, Error> {
    connection
        .query_row(
            "SELECT currency FROM user_preference WHERE owner_id = ?1",
            [owner_id.as_i64()],
            |row| row.get(0),
        )
        .optional()
        .map_err(Error::from)
}

#[cfg(test)]
mod tests {
    use crate::test_utils::{create_test_user, get_test_connection};

    use super::get_currency;

    #[test]
    fn currency_is_none_until_set() {
        let connection = get_test_connection();
        let user = create_test_user("alice", &connection);

        assert_eq!(get_currency(user.id, &connection), Ok(None));

        connection
            .execute(
                "INSERT INTO user_preference (owner_id, currency) VALUES (?1, ?2)",
                (user.id.as_i64(), "NZD - New Zealand Dollar"),
            )
            .unwrap();

        assert_eq!(
            get_currency(user.id, &connection),
            Ok(Some("NZD - New Zealand Dollar".to_owned()))
        );
    }
}
