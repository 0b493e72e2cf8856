use std::error::Error;
use std::fs;
use std::path::Path;
use std::process::exit;

use clap::Parser;
use rusqlite::{Connection, Transaction as SqlTransaction, TransactionBehavior};

use finboard::{TransactionRecord, create_transaction, delete_all_transactions, initialize_db};

/// A utility for loading transactions from a JSON file into the finboard database.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to the SQLite database, it is created if it does not exist.
    #[arg(long)]
    db_path: String,

    /// File path to a JSON array of transactions.
    #[arg(long, default_value = "transactions.json")]
    data_path: String,

    /// Add the transactions to the existing ones instead of replacing them.
    #[arg(long)]
    keep_existing: bool,
}

/// Replace the transactions in the database with the ones in the data file.
fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    let data_path = Path::new(&args.data_path);

    if !data_path.is_file() {
        eprintln!("Could not find the data file at {data_path:#?}!");
        exit(1);
    }

    println!("Reading transactions from {data_path:#?}");
    let data = fs::read_to_string(data_path)?;
    let records: Vec<TransactionRecord> = serde_json::from_str(&data)?;

    println!("Opening database at {:#?}", args.db_path);
    let conn = Connection::open(&args.db_path)?;
    initialize_db(&conn)?;

    let transaction = SqlTransaction::new_unchecked(&conn, TransactionBehavior::Exclusive)?;

    if !args.keep_existing {
        let deleted_count = delete_all_transactions(&transaction)?;
        println!("Deleted {deleted_count} existing transactions");
    }

    let record_count = records.len();
    for record in records {
        let id = record.id;
        if let Err(error) = create_transaction(record, &transaction) {
            eprintln!("Could not insert transaction {id}: {error}");
            // Dropping the transaction rolls back any rows inserted so far.
            exit(1);
        }
    }

    transaction.commit()?;

    println!("Inserted {record_count} transactions. Success!");

    Ok(())
}
