#![allow(missing_docs)]

use rusqlite::Connection;

use crate::{
    AppState, PaginationConfig, PasswordHash, ValidatedPassword,
    auth::create_user,
    transaction::{TransactionRecord, create_transaction},
};

pub(crate) const TEST_USERNAME: &str = "test_user";
pub(crate) const TEST_EMAIL: &str = "test@example.com";
pub(crate) const TEST_PASSWORD: &str = "averysafeandsecurepassword";

/// An app state backed by an empty, initialized in-memory database.
pub(crate) fn get_test_state() -> AppState {
    let connection =
        Connection::open_in_memory().expect("Could not open in-memory SQLite database");

    AppState::new(connection, "42", PaginationConfig::default())
        .expect("Could not create app state")
}

/// Insert the test user, hashed with the minimum bcrypt cost to keep tests fast.
pub(crate) fn insert_test_user(state: &AppState) {
    let password_hash = PasswordHash::new(ValidatedPassword::new_unchecked(TEST_PASSWORD), 4)
        .expect("Could not hash test password");
    let connection = state.db_connection.lock().unwrap();

    create_user(TEST_USERNAME, TEST_EMAIL, password_hash, &connection)
        .expect("Could not create test user");
}

#[track_caller]
pub(crate) fn insert_test_transactions(state: &AppState, records: &[TransactionRecord]) {
    let connection = state.db_connection.lock().unwrap();

    for record in records {
        create_transaction(record.clone(), &connection).expect("Could not insert test transaction");
    }
}
