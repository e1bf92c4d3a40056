//! Implements a struct that holds the state of the REST server.

use std::sync::{Arc, Mutex};

use axum::extract::FromRef;
use axum_extra::extract::cookie::Key;
use rusqlite::Connection;
use sha2::{Digest, Sha512};

use crate::{
    Error,
    budget::BudgetService,
    db::initialize,
    engine::{EngineConfig, FinanceEngine},
    observer::EngineObserver,
    stores::sqlite::{SQLiteBudgetStore, SQLiteCategoryStore, SQLiteLedgerStore},
    transaction::TransactionService,
};

/// The engine backed by the SQLite stores.
pub type SQLiteFinanceEngine = FinanceEngine<SQLiteLedgerStore, SQLiteBudgetStore>;
/// The budget service backed by the SQLite stores.
pub type SQLiteBudgetService = BudgetService<SQLiteBudgetStore, SQLiteCategoryStore>;
/// The transaction service backed by the SQLite ledger.
pub type SQLiteTransactionService = TransactionService<SQLiteLedgerStore>;

/// The state of the REST server.
#[derive(Clone)]
pub struct AppState {
    /// The key to be used for signing and encrypting private cookies.
    pub cookie_key: Key,
    pub engine: SQLiteFinanceEngine,
    pub budgets: SQLiteBudgetService,
    pub transactions: SQLiteTransactionService,
    pub ledger: SQLiteLedgerStore,
    pub categories: SQLiteCategoryStore,
}

impl AppState {
    /// Create a new [AppState] with a SQLite database connection.
    ///
    /// This function will initialize the database by adding the tables for the
    /// domain models and seeding the category catalogue.
    ///
    /// # Errors
    /// Returns an error if the database cannot be initialized.
    pub fn new(
        db_connection: Connection,
        cookie_secret: &str,
        engine_config: EngineConfig,
        observer: Arc<dyn EngineObserver>,
    ) -> Result<Self, Error> {
        initialize(&db_connection)?;

        let connection = Arc::new(Mutex::new(db_connection));
        let ledger = SQLiteLedgerStore::new(connection.clone());
        let budget_store = SQLiteBudgetStore::new(connection.clone());
        let categories = SQLiteCategoryStore::new(connection);

        Ok(Self {
            cookie_key: create_cookie_key(cookie_secret),
            engine: FinanceEngine::new(
                ledger.clone(),
                budget_store.clone(),
                engine_config,
                observer,
            ),
            budgets: BudgetService::new(budget_store, categories.clone()),
            transactions: TransactionService::new(ledger.clone()),
            ledger,
            categories,
        })
    }
}

// this impl tells `PrivateCookieJar` how to access the key from our state
impl FromRef<AppState> for Key {
    fn from_ref(state: &AppState) -> Self {
        state.cookie_key.clone()
    }
}

/// Create a signing key for cookies from a `secret`s string.
pub fn create_cookie_key(secret: &str) -> Key {
    let hash = Sha512::digest(secret);

    Key::from(&hash)
}
