//! Database query helpers for filtering, sorting and paging transactions.

use rusqlite::{Connection, ToSql};
use serde::{Deserialize, Serialize};

use crate::Error;

use super::core::{TRANSACTION_COLUMNS, TransactionRecord, map_transaction_row};

/// Exact match filters on transaction fields.
///
/// Fields that are `None` do not restrict the result.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TransactionFilter {
    /// Only include transactions with this category (case-sensitive).
    pub category: Option<String>,
    /// Only include transactions with this status.
    pub status: Option<String>,
    /// Only include transactions belonging to this user ID.
    pub user_id: Option<String>,
    /// Only include transactions with exactly this date string.
    pub date: Option<String>,
}

impl TransactionFilter {
    /// Build the `WHERE` clause for the filter and the named parameters it binds.
    ///
    /// Returns an empty clause when no filters are set.
    fn where_clause(&self) -> (String, Vec<(&'static str, &dyn ToSql)>) {
        let mut conditions = Vec::new();
        let mut params: Vec<(&'static str, &dyn ToSql)> = Vec::new();

        let fields = [
            ("category", ":category", &self.category),
            ("status", ":status", &self.status),
            ("user_id", ":user_id", &self.user_id),
            ("date", ":date", &self.date),
        ];

        for (column, param_name, value) in fields {
            if let Some(value) = value {
                conditions.push(format!("{column} = {param_name}"));
                params.push((param_name, value));
            }
        }

        if conditions.is_empty() {
            (String::new(), params)
        } else {
            (format!("WHERE {}", conditions.join(" AND ")), params)
        }
    }
}

/// The field to sort transactions by.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortField {
    /// Sort by transaction ID.
    Id,
    /// Sort by transaction date.
    #[default]
    Date,
    /// Sort by amount.
    Amount,
    /// Sort by category name.
    Category,
    /// Sort by status.
    Status,
    /// Sort by user ID.
    UserId,
}

impl SortField {
    fn column(self) -> &'static str {
        match self {
            SortField::Id => "id",
            SortField::Date => "date",
            SortField::Amount => "amount",
            SortField::Category => "category",
            SortField::Status => "status",
            SortField::UserId => "user_id",
        }
    }
}

/// The order to sort transactions in a query.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    /// Sort in order of increasing value.
    Asc,
    /// Sort in order of decreasing value.
    #[default]
    Desc,
}

impl SortOrder {
    fn keyword(self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }
}

/// Which page of transactions to fetch and how to order them.
#[derive(Debug, Clone, PartialEq)]
pub struct PageRequest {
    /// The field to sort by.
    pub sort: SortField,
    /// The direction to sort in.
    pub order: SortOrder,
    /// The page number, starting from 1.
    pub page: u64,
    /// The number of transactions per page.
    pub page_size: u64,
}

impl PageRequest {
    /// The `LIMIT` and `OFFSET` to query the page with.
    ///
    /// Returns `None` when the page starts beyond the largest offset SQLite
    /// can bind, in which case the page is empty.
    fn limit_and_offset(&self) -> Option<(i64, i64)> {
        let limit = i64::try_from(self.page_size).ok()?;
        let offset = self.page.saturating_sub(1).checked_mul(self.page_size)?;
        let offset = i64::try_from(offset).ok()?;

        Some((limit, offset))
    }
}

/// Get all transactions matching `filter`, ordered by ID.
///
/// # Errors
/// Returns [Error::SqlError] if the SQL query preparation, execution or row
/// mapping fails.
pub fn get_transactions(
    filter: &TransactionFilter,
    connection: &Connection,
) -> Result<Vec<TransactionRecord>, Error> {
    let (where_clause, params) = filter.where_clause();
    let query =
        format!("SELECT {TRANSACTION_COLUMNS} FROM \"transaction\" {where_clause} ORDER BY id ASC");

    connection
        .prepare(&query)?
        .query_map(params.as_slice(), map_transaction_row)?
        .map(|transaction_result| transaction_result.map_err(Error::SqlError))
        .collect()
}

/// Get a single page of transactions matching `filter`.
///
/// Transactions that compare equal on the sort field are ordered by ID so that
/// paging is stable. Pages past the last transaction are empty.
///
/// # Errors
/// Returns [Error::SqlError] if the SQL query preparation, execution or row
/// mapping fails.
pub fn get_transaction_page(
    filter: &TransactionFilter,
    page: &PageRequest,
    connection: &Connection,
) -> Result<Vec<TransactionRecord>, Error> {
    let Some((limit, offset)) = page.limit_and_offset() else {
        return Ok(Vec::new());
    };
    let (where_clause, mut params) = filter.where_clause();
    params.push((":limit", &limit));
    params.push((":offset", &offset));

    let query = format!(
        "SELECT {TRANSACTION_COLUMNS} FROM \"transaction\" {where_clause} \
        ORDER BY {} {}, id ASC \
        LIMIT :limit OFFSET :offset",
        page.sort.column(),
        page.order.keyword(),
    );

    connection
        .prepare(&query)?
        .query_map(params.as_slice(), map_transaction_row)?
        .map(|transaction_result| transaction_result.map_err(Error::SqlError))
        .collect()
}

/// Count the transactions matching `filter`.
///
/// # Errors
/// This function will return a [Error::SqlError] there is some SQL error.
pub fn count_transactions(filter: &TransactionFilter, connection: &Connection) -> Result<u64, Error> {
    let (where_clause, params) = filter.where_clause();
    let query = format!("SELECT COUNT(id) FROM \"transaction\" {where_clause}");

    let count: i64 = connection.query_row(&query, params.as_slice(), |row| row.get(0))?;

    Ok(u64::try_from(count).unwrap_or_default())
}
