//! The financial aggregation and projection engine.
//!
//! [FinanceEngine] turns the transactions in a [LedgerStore] into totals,
//! budget performance figures and forward looking balance projections. It owns
//! no persistent state and re-reads its stores on every call.

mod aggregation;
mod projection;
mod summary;

use std::sync::Arc;

use rust_decimal::Decimal;

pub use aggregation::{BudgetItemComparison, CategoryTotal, MonthlyTotals};
pub use projection::{ProjectionConfig, RecurrencePolicy, UpcomingRecurring};
pub use summary::Summary;

use crate::{
    Error,
    auth::UserID,
    observer::{EngineEvent, EngineObserver},
    stores::{BudgetStore, LedgerStore},
    transaction::{Transaction, TransactionQuery},
};

/// Tunable behaviour of the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EngineConfig {
    pub projection: ProjectionConfig,
}

/// Computes aggregates and projections over a ledger and a set of budgets.
#[derive(Clone)]
pub struct FinanceEngine<L, B> {
    ledger: L,
    budgets: B,
    config: EngineConfig,
    observer: Arc<dyn EngineObserver>,
}

impl<L, B> FinanceEngine<L, B>
where
    L: LedgerStore,
    B: BudgetStore,
{
    /// Create an engine reading from `ledger` and `budgets` that reports to `observer`.
    pub fn new(
        ledger: L,
        budgets: B,
        config: EngineConfig,
        observer: Arc<dyn EngineObserver>,
    ) -> Self {
        Self {
            ledger,
            budgets,
            config,
            observer,
        }
    }

    /// The configuration the engine was created with.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    fn fetch(
        &self,
        operation: &'static str,
        query: &TransactionQuery,
    ) -> Result<Vec<Transaction>, Error> {
        self.ledger
            .query(query)
            .inspect_err(|error| self.observer.on_failure(operation, error))
    }

    fn sum_matching(
        &self,
        operation: &'static str,
        user_id: Option<UserID>,
        query: &TransactionQuery,
    ) -> Result<Decimal, Error> {
        let transactions = self.fetch(operation, query)?;
        let total = self.checked(operation, sum_amounts(&transactions))?;
        self.report(operation, user_id, transactions.len(), total);

        Ok(total)
    }

    /// Pass `result` through, reporting an error to the observer.
    fn checked<T>(&self, operation: &'static str, result: Result<T, Error>) -> Result<T, Error> {
        result.inspect_err(|error| self.observer.on_failure(operation, error))
    }

    fn report(
        &self,
        operation: &'static str,
        user_id: Option<UserID>,
        matched: usize,
        total: Decimal,
    ) {
        self.observer.on_aggregate(&EngineEvent {
            operation,
            user_id,
            matched,
            total,
        });
    }
}

/// The error for money arithmetic whose result does not fit in a [Decimal].
fn overflow() -> Error {
    Error::Validation("The amounts are too large to calculate with".to_owned())
}

/// The exact sum of `amounts`. Zero for an empty iterator.
///
/// # Errors
/// Returns an [Error::Validation] if the sum overflows.
fn checked_sum(amounts: impl IntoIterator<Item = Decimal>) -> Result<Decimal, Error> {
    amounts.into_iter().try_fold(Decimal::ZERO, |total, amount| {
        total.checked_add(amount).ok_or_else(overflow)
    })
}

/// `minuend - subtrahend`, or an [Error::Validation] on overflow.
fn checked_sub(minuend: Decimal, subtrahend: Decimal) -> Result<Decimal, Error> {
    minuend.checked_sub(subtrahend).ok_or_else(overflow)
}

/// The exact sum of the amounts of `transactions`. Zero for an empty slice.
fn sum_amounts(transactions: &[Transaction]) -> Result<Decimal, Error> {
    checked_sum(transactions.iter().map(|transaction| transaction.amount))
}
