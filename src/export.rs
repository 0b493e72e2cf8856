//! Exports transactions as a CSV file for download.

use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, State},
    http::header::{CONTENT_DISPOSITION, CONTENT_TYPE},
    response::{IntoResponse, Response},
};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};

use crate::{
    AppState, Error,
    transaction::{TransactionFilter, TransactionRecord, get_transactions},
};

/// The file name suggested to the client for the exported CSV.
pub const EXPORT_FILE_NAME: &str = "transactions_export.csv";

/// A transaction field that can be included in the CSV export.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Column {
    /// The transaction ID.
    Id,
    /// The transaction date.
    Date,
    /// The transaction amount.
    Amount,
    /// The transaction category.
    Category,
    /// The transaction status.
    Status,
    /// The ID of the user the transaction belongs to.
    UserId,
    /// The user's profile link.
    UserProfile,
}

impl Column {
    fn name(self) -> &'static str {
        match self {
            Column::Id => "id",
            Column::Date => "date",
            Column::Amount => "amount",
            Column::Category => "category",
            Column::Status => "status",
            Column::UserId => "user_id",
            Column::UserProfile => "user_profile",
        }
    }

    /// The column name with its first letter capitalised, e.g. "User_id".
    fn title(self) -> String {
        let name = self.name();
        let mut chars = name.chars();

        match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => String::new(),
        }
    }

    fn value(self, record: &TransactionRecord) -> String {
        match self {
            Column::Id => record.id.to_string(),
            Column::Date => record.date.clone(),
            Column::Amount => record.amount.to_string(),
            Column::Category => record.category.clone(),
            Column::Status => record.status.clone(),
            Column::UserId => record.user_id.clone(),
            Column::UserProfile => record.user_profile.clone(),
        }
    }
}

fn default_columns() -> Vec<Column> {
    vec![
        Column::Id,
        Column::Date,
        Column::Amount,
        Column::Category,
        Column::Status,
        Column::UserId,
    ]
}

/// The body of a CSV export request.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct ExportRequest {
    /// The columns to include, in order.
    #[serde(default = "default_columns")]
    pub columns: Vec<Column>,
    /// Filters selecting which transactions to export.
    #[serde(default)]
    pub filters: TransactionFilter,
}

/// The state needed to export transactions.
#[derive(Debug, Clone)]
pub struct ExportState {
    /// The database connection for reading transactions.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for ExportState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Write `records` as CSV with a header row of column titles.
///
/// # Errors
///
/// Returns an [Error::CsvError] if a row could not be written.
pub fn write_csv(columns: &[Column], records: &[TransactionRecord]) -> Result<Vec<u8>, Error> {
    let mut writer = csv::Writer::from_writer(Vec::new());

    writer
        .write_record(columns.iter().map(|column| column.title()))
        .map_err(|error| Error::CsvError(error.to_string()))?;

    for record in records {
        writer
            .write_record(columns.iter().map(|column| column.value(record)))
            .map_err(|error| Error::CsvError(error.to_string()))?;
    }

    writer
        .into_inner()
        .map_err(|error| Error::CsvError(error.to_string()))
}

/// Handler for exporting transactions as a CSV download.
///
/// # Errors
///
/// Returns an [Error::NoTransactionsFound] if no transactions match the
/// filters, or an internal error if the transactions could not be read or
/// written.
pub async fn export_csv(
    State(state): State<ExportState>,
    Json(request): Json<ExportRequest>,
) -> Result<Response, Error> {
    let records = {
        let connection = state
            .db_connection
            .lock()
            .map_err(|_| Error::DatabaseLockError)?;

        get_transactions(&request.filters, &connection)?
    };

    if records.is_empty() {
        return Err(Error::NoTransactionsFound);
    }

    let columns = if request.columns.is_empty() {
        default_columns()
    } else {
        request.columns
    };

    let csv = write_csv(&columns, &records)?;
    tracing::info!("Exported {} transactions as CSV", records.len());

    Ok((
        [
            (CONTENT_TYPE, "text/csv; charset=utf-8".to_owned()),
            (
                CONTENT_DISPOSITION,
                format!("attachment; filename=\"{EXPORT_FILE_NAME}\""),
            ),
        ],
        csv,
    )
        .into_response())
}

#[cfg(test)]
mod export_tests {
    use axum::{Router, http::StatusCode, routing::post};
    use axum_test::TestServer;
    use serde_json::json;

    use crate::{
        AppState,
        test_utils::{get_test_state, insert_test_transactions},
        transaction::TransactionRecord,
    };

    use super::{Column, export_csv, write_csv};

    fn sample_records() -> Vec<TransactionRecord> {
        vec![
            TransactionRecord::new(1, "2024-01-15", 100.0, "Revenue")
                .status("Paid")
                .user_id("user_001")
                .user_profile("https://example.com/1.png"),
            TransactionRecord::new(2, "2024-01-20", 40.5, "Expense")
                .status("Pending")
                .user_id("user_002")
                .user_profile("https://example.com/2.png"),
        ]
    }

    fn get_test_server(state: AppState) -> TestServer {
        let app = Router::new()
            .route("/export", post(export_csv))
            .with_state(state);

        TestServer::new(app).expect("Could not create test server.")
    }

    #[test]
    fn titles_capitalise_first_letter() {
        assert_eq!(Column::Id.title(), "Id");
        assert_eq!(Column::UserId.title(), "User_id");
        assert_eq!(Column::UserProfile.title(), "User_profile");
    }

    #[test]
    fn write_csv_quotes_fields_with_commas() {
        let records = vec![TransactionRecord::new(3, "2024-02-02", 1.0, "Food, drink")];

        let got = write_csv(&[Column::Id, Column::Category], &records).unwrap();

        assert_eq!(String::from_utf8(got).unwrap(), "Id,Category\n3,\"Food, drink\"\n");
    }

    #[tokio::test]
    async fn exports_default_columns() {
        let state = get_test_state();
        insert_test_transactions(&state, &sample_records());
        let server = get_test_server(state);

        let response = server.post("/export").json(&json!({})).await;

        response.assert_status_ok();
        assert_eq!(response.header("content-type"), "text/csv; charset=utf-8");
        assert_eq!(
            response.header("content-disposition"),
            "attachment; filename=\"transactions_export.csv\""
        );
        assert_eq!(
            response.text(),
            "Id,Date,Amount,Category,Status,User_id\n\
            1,2024-01-15,100,Revenue,Paid,user_001\n\
            2,2024-01-20,40.5,Expense,Pending,user_002\n"
        );
    }

    #[tokio::test]
    async fn exports_selected_columns_with_filters() {
        let state = get_test_state();
        insert_test_transactions(&state, &sample_records());
        let server = get_test_server(state);

        let response = server
            .post("/export")
            .json(&json!({
                "columns": ["user_profile", "amount"],
                "filters": {"status": "Pending"},
            }))
            .await;

        response.assert_status_ok();
        assert_eq!(
            response.text(),
            "User_profile,Amount\nhttps://example.com/2.png,40.5\n"
        );
    }

    #[tokio::test]
    async fn no_matching_transactions_is_not_found() {
        let state = get_test_state();
        insert_test_transactions(&state, &sample_records());
        let server = get_test_server(state);

        let response = server
            .post("/export")
            .json(&json!({"filters": {"category": "Other"}}))
            .await;

        response.assert_status_not_found();
        response.assert_json(&json!({"error": "No transactions found"}));
    }

    #[tokio::test]
    async fn unknown_column_is_rejected() {
        let server = get_test_server(get_test_state());

        let response = server
            .post("/export")
            .json(&json!({"columns": ["password"]}))
            .await;

        response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
    }
}
