//! Transactions: the income and expense records every report is built from.
//!
//! This module contains:
//! - The `Transaction` model and `TransactionBuilder` for creating transactions
//! - The `TransactionQuery` filter object used to read them back from a store
//! - The `TransactionService` and the JSON endpoints on top of it
//! - CSV export

mod core;
mod endpoints;
mod export;
mod query;
mod service;

pub use core::{Transaction, TransactionBuilder, TransactionKind};
pub use endpoints::{
    create_transaction_endpoint, delete_transaction_endpoint, export_transactions_endpoint,
    get_transaction_endpoint, get_transactions_endpoint, update_transaction_endpoint,
};
pub use export::export_transactions_csv;
pub use query::{SortOrder, TransactionQuery};
pub use service::TransactionService;
