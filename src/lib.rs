//! Fintrack is the backend for a personal finance tracker.
//!
//! Users record income and expense transactions, group them into categories
//! and plan spending with budgets. The [FinanceEngine] turns those records into
//! totals, budget performance figures and balance projections, and the router
//! built by [build_router] exposes everything as a JSON API.
//!
//! The server does not log users in itself. It trusts an encrypted `token`
//! cookie issued with the same secret, see [set_auth_cookie].

#![warn(missing_docs)]

use std::{net::SocketAddr, time::Duration};

use axum_server::Handle;
use tokio::signal;

mod analytics;
mod app_state;
mod auth;
mod budget;
mod category;
mod database_id;
mod db;
mod endpoints;
mod engine;
mod error;
mod logging;
mod observer;
mod rejection;
mod routing;
pub mod stores;
mod transaction;

#[cfg(test)]
mod test_utils;

pub use app_state::{AppState, SQLiteBudgetService, SQLiteFinanceEngine, SQLiteTransactionService};
pub use auth::{COOKIE_TOKEN, DEFAULT_COOKIE_DURATION, Identity, UserID, set_auth_cookie};
pub use budget::{Budget, BudgetItem, BudgetService, BudgetUpdate, NewBudget};
pub use category::{Category, DEFAULT_CATEGORIES};
pub use database_id::{BudgetId, CategoryId, DatabaseId, TransactionId};
pub use db::initialize as initialize_db;
pub use engine::{
    BudgetItemComparison, CategoryTotal, EngineConfig, FinanceEngine, MonthlyTotals,
    ProjectionConfig, RecurrencePolicy, Summary, UpcomingRecurring,
};
pub use error::Error;
pub use logging::{LOG_BODY_LENGTH_LIMIT, logging_middleware};
pub use observer::{EngineEvent, EngineObserver, NoopObserver, TracingObserver};
pub use routing::build_router;
pub use transaction::{
    SortOrder, Transaction, TransactionBuilder, TransactionKind, TransactionQuery,
    TransactionService, export_transactions_csv,
};

/// An async task that waits for either the ctrl+c or terminate signal, whichever comes first, and
/// then signals the server to shut down gracefully.
///
/// `handle` is a handle to an Axum `Server`.
pub async fn graceful_shutdown(handle: Handle<SocketAddr>) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::debug!("Received ctrl+c signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
        _ = terminate => {
            tracing::debug!("Received terminate signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
    }
}
