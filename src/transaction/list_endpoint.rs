//! The endpoint for listing transactions a page at a time.

use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, Query, State},
};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};

use crate::{AppState, Error, pagination::PaginationConfig};

use super::{
    core::TransactionRecord,
    query::{
        PageRequest, SortField, SortOrder, TransactionFilter, count_transactions,
        get_transaction_page,
    },
};

/// The state needed to list transactions.
#[derive(Debug, Clone)]
pub struct TransactionsState {
    /// The database connection for managing transactions.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The config that controls how to page transactions.
    pub pagination_config: PaginationConfig,
}

impl FromRef<AppState> for TransactionsState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            pagination_config: state.pagination_config.clone(),
        }
    }
}

/// The query parameters for listing transactions.
///
/// The filter fields are spelled out rather than flattened from
/// [TransactionFilter] because flattening breaks parsing numbers from query strings.
#[derive(Debug, Default, Deserialize)]
pub struct TransactionsQuery {
    /// The page number, starting from 1.
    pub page: Option<u64>,
    /// The number of transactions per page.
    pub limit: Option<u64>,
    /// The field to sort by, defaults to the date.
    pub sort: Option<SortField>,
    /// The sort direction, defaults to descending.
    pub order: Option<SortOrder>,
    /// Only include transactions with this category.
    pub category: Option<String>,
    /// Only include transactions with this status.
    pub status: Option<String>,
    /// Only include transactions belonging to this user ID.
    pub user_id: Option<String>,
    /// Only include transactions with exactly this date.
    pub date: Option<String>,
}

/// A page of transactions and the number of transactions matching the filters.
#[derive(Debug, PartialEq, Serialize, Deserialize)]
pub struct TransactionsResponse {
    /// The transactions on the requested page.
    pub data: Vec<TransactionRecord>,
    /// The number of transactions across all pages.
    pub total: u64,
}

/// Handler for listing transactions with filtering, sorting and paging.
///
/// # Errors
///
/// Returns an error if the database lock cannot be acquired or a query fails.
pub async fn get_transactions_endpoint(
    State(state): State<TransactionsState>,
    Query(query): Query<TransactionsQuery>,
) -> Result<Json<TransactionsResponse>, Error> {
    let page = PageRequest {
        sort: query.sort.unwrap_or_default(),
        order: query.order.unwrap_or_default(),
        page: state.pagination_config.page(query.page),
        page_size: state.pagination_config.page_size(query.limit),
    };
    let filter = TransactionFilter {
        category: query.category,
        status: query.status,
        user_id: query.user_id,
        date: query.date,
    };

    let connection = state
        .db_connection
        .lock()
        .map_err(|_| Error::DatabaseLockError)?;

    let data = get_transaction_page(&filter, &page, &connection)?;
    let total = count_transactions(&filter, &connection)?;

    Ok(Json(TransactionsResponse { data, total }))
}
