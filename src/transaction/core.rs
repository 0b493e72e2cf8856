//! Defines the transaction record and the database queries that store and fetch it.

use rusqlite::{Connection, Row};
use serde::{Deserialize, Serialize};

use crate::{Error, analytics::MonthKey};

// ============================================================================
// MODELS
// ============================================================================

/// A single financial transaction as stored by the dashboard.
///
/// Only `date`, `amount` and `category` carry meaning for analytics, the
/// remaining fields are passed through to clients and exports untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionRecord {
    /// The ID of the transaction, unique within the data set.
    pub id: i64,
    /// When the transaction happened as an ISO date, e.g. "2024-01-15".
    ///
    /// Longer ISO timestamps are allowed, but the first seven characters must
    /// form a `YYYY-MM` month key.
    pub date: String,
    /// The amount of money moved.
    pub amount: f64,
    /// A free-form label. "revenue" and "expense" (any casing) are treated
    /// specially by analytics.
    pub category: String,
    /// Processing status, e.g. "Paid" or "Pending".
    pub status: String,
    /// The ID of the user the transaction belongs to.
    pub user_id: String,
    /// A link to the user's profile picture.
    pub user_profile: String,
}

impl TransactionRecord {
    /// Create a record with empty status, user ID and user profile.
    pub fn new(id: i64, date: &str, amount: f64, category: &str) -> Self {
        Self {
            id,
            date: date.to_owned(),
            amount,
            category: category.to_owned(),
            status: String::new(),
            user_id: String::new(),
            user_profile: String::new(),
        }
    }

    /// Set the status of the record.
    pub fn status(mut self, status: &str) -> Self {
        self.status = status.to_owned();
        self
    }

    /// Set the user ID of the record.
    pub fn user_id(mut self, user_id: &str) -> Self {
        self.user_id = user_id.to_owned();
        self
    }

    /// Set the user profile of the record.
    pub fn user_profile(mut self, user_profile: &str) -> Self {
        self.user_profile = user_profile.to_owned();
        self
    }
}

// ============================================================================
// DATABASE FUNCTIONS
// ============================================================================

/// The columns of the transaction table in the order [map_transaction_row] expects.
pub(super) const TRANSACTION_COLUMNS: &str =
    "id, date, amount, category, status, user_id, user_profile";

/// Create the transaction table in the database.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL error.
pub fn create_transaction_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS \"transaction\" (
                id INTEGER PRIMARY KEY,
                date TEXT NOT NULL,
                amount REAL NOT NULL,
                category TEXT NOT NULL,
                status TEXT NOT NULL,
                user_id TEXT NOT NULL,
                user_profile TEXT NOT NULL
                )",
        (),
    )?;

    connection.execute(
        "CREATE INDEX IF NOT EXISTS idx_transaction_date ON \"transaction\"(date);",
        (),
    )?;

    Ok(())
}

/// Insert `record` into the database.
///
/// # Errors
/// This function will return a:
/// - [Error::InvalidDate] if the record's date does not start with a valid month key,
/// - or [Error::DuplicateTransactionId] if a transaction with the same ID already exists,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn create_transaction(
    record: TransactionRecord,
    connection: &Connection,
) -> Result<TransactionRecord, Error> {
    MonthKey::from_date(&record.date)?;

    connection
        .prepare(&format!(
            "INSERT INTO \"transaction\" ({TRANSACTION_COLUMNS})
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
             RETURNING {TRANSACTION_COLUMNS}"
        ))?
        .query_row(
            (
                record.id,
                &record.date,
                record.amount,
                &record.category,
                &record.status,
                &record.user_id,
                &record.user_profile,
            ),
            map_transaction_row,
        )
        .map_err(|error| match error {
            // SQLite reports rowid clashes as either a primary key or a unique constraint failure.
            rusqlite::Error::SqliteFailure(
                rusqlite::ffi::Error {
                    code: _,
                    extended_code:
                        rusqlite::ffi::SQLITE_CONSTRAINT_PRIMARYKEY
                        | rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE,
                },
                _,
            ) => Error::DuplicateTransactionId(record.id),
            error => error.into(),
        })
}

/// Delete every transaction in the database.
///
/// Returns the number of deleted transactions.
///
/// # Errors
/// This function will return a [Error::SqlError] there is some SQL error.
pub fn delete_all_transactions(connection: &Connection) -> Result<usize, Error> {
    connection
        .execute("DELETE FROM \"transaction\"", ())
        .map_err(|error| error.into())
}

pub(super) fn map_transaction_row(row: &Row) -> Result<TransactionRecord, rusqlite::Error> {
    Ok(TransactionRecord {
        id: row.get(0)?,
        date: row.get(1)?,
        amount: row.get(2)?,
        category: row.get(3)?,
        status: row.get(4)?,
        user_id: row.get(5)?,
        user_profile: row.get(6)?,
    })
}
