use rusqlite::Connection;

use crate::{Email, PasswordHash, UserID, auth::create_user, db::initialize};

/// An in-memory database with all tables created.
#[track_caller]
pub(crate) fn get_test_connection() -> Connection {
    let connection = Connection::open_in_memory().expect("Could not open in-memory database");
    initialize(&connection).expect("Could not initialize database");
    connection
}

/// Insert a user with a throwaway password hash and return their ID.
#[track_caller]
pub(crate) fn insert_test_user(email: &str, connection: &Connection) -> UserID {
    let email = Email::new(email).expect("Could not create email");
    let password_hash = PasswordHash::new_unchecked("hunter2");

    create_user(email, password_hash, connection)
        .expect("Could not create user")
        .id
}
