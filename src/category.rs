//! The lookup list of category names offered as suggestions in the expense forms.
//!
//! Expenses store their category as free text, so this table only drives the
//! suggestions. It is seeded by the `create_test_db` binary and read-only to
//! request handlers.

use std::fmt::Display;

use rusqlite::{Connection, Row};

use crate::{Error, database_id::DatabaseID};

/// The name of a category.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct CategoryName(String);

impl CategoryName {
    /// Create a category name.
    ///
    /// # Errors
    ///
    /// This function will return an [Error::EmptyCategoryName] if `name` is blank.
    pub fn new(name: &str) -> Result<Self, Error> {
        let name = name.trim();

        if name.is_empty() {
            Err(Error::EmptyCategoryName)
        } else {
            Ok(Self(name.to_owned()))
        }
    }
}

impl AsRef<str> for CategoryName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Display for CategoryName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A named category, e.g., 'Groceries', 'Eating Out', 'Transport'.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Category {
    pub id: DatabaseID,
    pub name: CategoryName,
}

/// Create the category table.
pub fn create_category_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS category (
                id INTEGER PRIMARY KEY,
                name TEXT NOT NULL UNIQUE
                )",
        (),
    )?;

    Ok(())
}

/// Create a category in the database.
///
/// # Errors
/// This function will return an error if there is an SQL error, e.g. the name already exists.
pub fn create_category(name: CategoryName, connection: &Connection) -> Result<Category, Error> {
    connection.execute("INSERT INTO category (name) VALUES (?1);", (name.as_ref(),))?;

    let id = connection.last_insert_rowid();

    Ok(Category { id, name })
}

/// Retrieve all categories ordered by name.
///
/// # Errors
/// This function will return an error if there is an SQL error.
pub fn get_all_categories(connection: &Connection) -> Result<Vec<Category>, Error> {
    connection
        .prepare("SELECT id, name FROM category ORDER BY name ASC;")?
        .query_map([], map_category_row)?
        .map(|maybe_category| maybe_category.map_err(Error::from))
        .collect()
}

fn map_category_row(row: &Row) -> Result<Category, rusqlite::Error> {
    let id = row.get(0)?;
    let raw_name: String = row.get(1)?;

    Ok(Category {
        id,
        name: CategoryName(raw_name),
    })
}

#[cfg(test)]
mod tests {
    use rusqlite::Connection;

    use crate::Error;

    use super::{CategoryName, create_category, create_category_table, get_all_categories};

    fn get_test_connection() -> Connection {
        let connection = Connection::open_in_memory().unwrap();
        create_category_table(&connection).unwrap();
        connection
    }

    #[test]
    fn category_name_rejects_blank() {
        assert_eq!(CategoryName::new("   "), Err(Error::EmptyCategoryName));
    }

    #[test]
    fn category_name_is_trimmed() {
        assert_eq!(CategoryName::new(" Food ").unwrap().as_ref(), "Food");
    }

    #[test]
    fn get_all_categories_sorted_by_name() {
        let connection = get_test_connection();
        for name in ["Transport", "Food", "Rent"] {
            create_category(CategoryName::new(name).unwrap(), &connection).unwrap();
        }

        let names = get_all_categories(&connection)
            .unwrap()
            .into_iter()
            .map(|category| category.name.to_string())
            .collect::<Vec<_>>();

        assert_eq!(names, ["Food", "Rent", "Transport"]);
    }

    #[test]
    fn duplicate_category_fails() {
        let connection = get_test_connection();
        create_category(CategoryName::new("Food").unwrap(), &connection).unwrap();

        let result = create_category(CategoryName::new("Food").unwrap(), &connection);

        assert!(matches!(result, Err(Error::SqlError(_))));
    }
}
