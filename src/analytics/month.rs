//! Month keys used to bucket transactions by calendar month.

use std::fmt::Display;

use serde::{Deserialize, Serialize};

use crate::{Error, transaction::TransactionRecord};

/// The number of leading characters of an ISO date that make up a month key.
const MONTH_KEY_LENGTH: usize = 7;

/// A calendar month in the form `YYYY-MM`, taken from the start of an ISO date string.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MonthKey(String);

impl MonthKey {
    /// Get the month key for an ISO date (`YYYY-MM-DD`) or timestamp.
    ///
    /// # Errors
    ///
    /// Returns [Error::InvalidDate] if `date` is shorter than seven characters
    /// or its first seven characters are not a year, a hyphen and a month
    /// between 01 and 12.
    pub fn from_date(date: &str) -> Result<Self, Error> {
        let invalid_date = || Error::InvalidDate(date.to_owned());

        let key = date.get(..MONTH_KEY_LENGTH).ok_or_else(invalid_date)?;
        let bytes = key.as_bytes();

        let (year, separator, month) = (&bytes[..4], bytes[4], &bytes[5..]);

        if !year.iter().all(u8::is_ascii_digit)
            || separator != b'-'
            || !month.iter().all(u8::is_ascii_digit)
        {
            return Err(invalid_date());
        }

        let month_number = (month[0] - b'0') * 10 + (month[1] - b'0');
        if !(1..=12).contains(&month_number) {
            return Err(invalid_date());
        }

        Ok(Self(key.to_owned()))
    }

    /// Take the first seven characters of `date` without checking them.
    ///
    /// Dates shorter than seven characters are used whole. Callers should
    /// check dates with [MonthKey::from_date] or [validate_records] first.
    pub(crate) fn from_date_unchecked(date: &str) -> Self {
        Self(date.get(..MONTH_KEY_LENGTH).unwrap_or(date).to_owned())
    }

    /// The month key as a string slice, e.g. "2024-01".
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for MonthKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// Check that every record has a date that starts with a valid month key.
///
/// Malformed records are reported, never skipped.
///
/// # Errors
///
/// Returns [Error::InvalidDate] for the first record with a malformed date.
pub fn validate_records(records: &[TransactionRecord]) -> Result<(), Error> {
    for record in records {
        if let Err(error) = MonthKey::from_date(&record.date) {
            tracing::warn!("Transaction {} has a malformed date: {error}", record.id);
            return Err(error);
        }
    }

    Ok(())
}
