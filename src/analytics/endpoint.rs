//! The endpoint that serves the analytics summary for the dashboard charts.

use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, Query, State},
};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    analytics::{AnalyticsSummary, summarize, validate_records},
    transaction::{TransactionFilter, get_transactions},
};

/// The state needed to summarise transactions.
#[derive(Debug, Clone)]
pub struct AnalyticsState {
    /// The database connection for reading transactions.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for AnalyticsState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Handler for the analytics summary.
///
/// Summarises every transaction matching the optional filters in the query
/// string, or all transactions if no filters are given.
///
/// # Errors
///
/// Returns an [Error::InvalidDate] if a stored transaction has a malformed
/// date, or an internal error if the transactions could not be read.
pub async fn get_analytics_summary(
    State(state): State<AnalyticsState>,
    Query(filter): Query<TransactionFilter>,
) -> Result<Json<AnalyticsSummary>, Error> {
    let records = {
        let connection = state
            .db_connection
            .lock()
            .map_err(|_| Error::DatabaseLockError)?;

        get_transactions(&filter, &connection)?
    };

    validate_records(&records)?;
    let summary = summarize(&records);

    tracing::debug!(
        "Summarised {} transactions over {} months",
        records.len(),
        summary.monthly_trend.len()
    );

    Ok(Json(summary))
}
