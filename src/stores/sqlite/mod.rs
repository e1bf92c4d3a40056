//! SQLite implementations of the store traits sharing one connection.

mod budget;
mod category;
mod transaction;

pub use budget::SQLiteBudgetStore;
pub use category::SQLiteCategoryStore;
pub use transaction::SQLiteLedgerStore;
