//! Combines the aggregates and the projection into one dashboard summary.

use rust_decimal::Decimal;
use serde::Serialize;

use crate::{
    Error,
    auth::UserID,
    engine::{FinanceEngine, checked_sub},
    stores::{BudgetStore, LedgerStore},
    transaction::TransactionKind,
};

/// The headline figures for one user.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    pub income: Decimal,
    pub expenses: Decimal,
    pub net: Decimal,
    /// The net balance projected over the configured horizon.
    pub projected_spending: Decimal,
}

impl<L, B> FinanceEngine<L, B>
where
    L: LedgerStore,
    B: BudgetStore,
{
    /// Build the [Summary] for `identity`.
    ///
    /// # Errors
    /// Returns [Error::Unauthorized] if there is no identity, otherwise any store error.
    pub fn summary(&self, identity: Option<UserID>) -> Result<Summary, Error> {
        let user_id = identity
            .ok_or(Error::Unauthorized)
            .inspect_err(|error| self.observer.on_failure("summary", error))?;

        let income = self.total_by_type_for_user(user_id, TransactionKind::Income)?;
        let expenses = self.total_by_type_for_user(user_id, TransactionKind::Expense)?;
        let net = self.checked("summary", checked_sub(income, expenses))?;
        let projected_spending =
            self.project_balance(user_id, net, self.config.projection.horizon_months)?;

        Ok(Summary {
            income,
            expenses,
            net,
            projected_spending,
        })
    }
}
