//! Transaction records and the queries that serve them to the dashboard.
//!
//! This module contains everything related to transactions:
//! - The `TransactionRecord` model and its database table
//! - Database functions for storing, filtering, sorting and paging transactions
//! - The endpoint for listing transactions

mod core;
mod list_endpoint;
mod query;

pub use core::{
    TransactionRecord, create_transaction, create_transaction_table, delete_all_transactions,
};
pub use list_endpoint::get_transactions_endpoint;
pub use query::{TransactionFilter, count_transactions, get_transactions};
