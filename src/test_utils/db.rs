use rusqlite::Connection;

use crate::{
    PasswordHash,
    auth::{User, create_user},
    db::initialize,
};

#[track_caller]
pub(crate) fn get_test_connection() -> Connection {
    let connection =
        Connection::open_in_memory().expect("Could not create in-memory SQLite database");
    initialize(&connection).expect("Could not initialize test database");

    connection
}

#[track_caller]
pub(crate) fn create_test_user(username: &str, connection: &Connection) -> User {
    create_user(
        username,
        &format!("{username}@example.com"),
        PasswordHash::new_unchecked("hunter2"),
        connection,
    )
    .expect("Could not create test user")
}
