//! Contains traits and implementations for objects that store the domain models.
//!
//! Every store method takes `&self`: implementations share their underlying
//! connection and do their own locking.

pub mod sqlite;

use time::OffsetDateTime;

use crate::{
    Error,
    auth::UserID,
    budget::{Budget, NewBudget},
    category::Category,
    database_id::{BudgetId, CategoryId, TransactionId},
    transaction::{Transaction, TransactionBuilder, TransactionQuery},
};

/// Handles the creation and retrieval of transactions.
pub trait LedgerStore {
    /// Validate `builder` and insert it as a new transaction with a fresh ID.
    fn create(&self, builder: TransactionBuilder) -> Result<Transaction, Error>;

    /// Retrieve the transaction with `id`, or [Error::NotFound].
    fn get(&self, id: TransactionId) -> Result<Transaction, Error>;

    /// Replace the transaction with `id` with the contents of `builder`.
    ///
    /// Returns [Error::NotFound] if there is no transaction with `id`.
    fn update(&self, id: TransactionId, builder: TransactionBuilder) -> Result<Transaction, Error>;

    /// Delete the transaction with `id`.
    ///
    /// Returns [Error::NotFound] if there is no transaction with `id`.
    fn delete(&self, id: TransactionId) -> Result<(), Error>;

    /// Retrieve transactions from the store in the way defined by `query`.
    fn query(&self, query: &TransactionQuery) -> Result<Vec<Transaction>, Error>;
}

/// Handles the creation and retrieval of budgets.
pub trait BudgetStore {
    /// Insert a new budget with no items, created and updated at `now`.
    fn create(&self, new_budget: NewBudget, now: OffsetDateTime) -> Result<Budget, Error>;

    /// Retrieve the budget with `id`, or [Error::NotFound].
    fn get(&self, id: BudgetId) -> Result<Budget, Error>;

    /// Retrieve the budgets of `user_id`, most recently updated first.
    fn get_by_user(&self, user_id: UserID) -> Result<Vec<Budget>, Error>;

    /// Overwrite the stored budget that has the same ID as `budget`.
    ///
    /// Returns [Error::NotFound] if there is no such budget.
    fn update(&self, budget: &Budget) -> Result<(), Error>;

    /// Delete the budget with `id`.
    ///
    /// Returns [Error::NotFound] if there is no budget with `id`.
    fn delete(&self, id: BudgetId) -> Result<(), Error>;
}

/// Read access to the category catalogue.
pub trait CategoryStore {
    /// Retrieve the category with `id`, or [Error::NotFound].
    fn get(&self, id: CategoryId) -> Result<Category, Error>;

    /// Retrieve every category in ID order.
    fn get_all(&self) -> Result<Vec<Category>, Error>;
}
