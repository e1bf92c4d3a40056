//! In-memory store doubles for exercising the engine without a database.

use std::sync::{Arc, Mutex};

use time::OffsetDateTime;

use crate::{
    Error,
    auth::UserID,
    budget::{Budget, NewBudget},
    database_id::{BudgetId, TransactionId},
    stores::{BudgetStore, LedgerStore},
    transaction::{SortOrder, Transaction, TransactionBuilder, TransactionQuery},
};

#[derive(Debug, Clone, Default)]
pub(crate) struct FakeLedger {
    transactions: Arc<Mutex<Vec<Transaction>>>,
}

impl FakeLedger {
    pub(crate) fn with(builders: Vec<TransactionBuilder>) -> Self {
        let ledger = Self::default();

        for builder in builders {
            ledger.create(builder).unwrap();
        }

        ledger
    }
}

impl LedgerStore for FakeLedger {
    fn create(&self, builder: TransactionBuilder) -> Result<Transaction, Error> {
        let mut transactions = self.transactions.lock().unwrap();
        let id = transactions.len() as TransactionId + 1;
        let transaction = builder.finalise(id)?;
        transactions.push(transaction.clone());

        Ok(transaction)
    }

    fn get(&self, id: TransactionId) -> Result<Transaction, Error> {
        self.transactions
            .lock()
            .unwrap()
            .iter()
            .find(|transaction| transaction.id == id)
            .cloned()
            .ok_or(Error::NotFound)
    }

    fn update(&self, id: TransactionId, builder: TransactionBuilder) -> Result<Transaction, Error> {
        let mut transactions = self.transactions.lock().unwrap();
        let slot = transactions
            .iter_mut()
            .find(|transaction| transaction.id == id)
            .ok_or(Error::NotFound)?;
        *slot = builder.finalise(id)?;

        Ok(slot.clone())
    }

    fn delete(&self, id: TransactionId) -> Result<(), Error> {
        let mut transactions = self.transactions.lock().unwrap();
        let before = transactions.len();
        transactions.retain(|transaction| transaction.id != id);

        if transactions.len() == before {
            return Err(Error::NotFound);
        }

        Ok(())
    }

    fn query(&self, query: &TransactionQuery) -> Result<Vec<Transaction>, Error> {
        let mut matching: Vec<Transaction> = self
            .transactions
            .lock()
            .unwrap()
            .iter()
            .filter(|transaction| query.matches(transaction))
            .cloned()
            .collect();

        match query.sort_created {
            Some(SortOrder::Ascending) => matching.sort_by_key(|transaction| transaction.created),
            Some(SortOrder::Descending) => {
                matching.sort_by_key(|transaction| std::cmp::Reverse(transaction.created))
            }
            None => {}
        }

        Ok(matching)
    }
}

/// A ledger whose every operation fails as if the database were down.
#[derive(Debug, Clone, Default)]
pub(crate) struct FailingLedger;

impl FailingLedger {
    fn error() -> Error {
        Error::StoreUnavailable("database is locked".to_owned())
    }
}

impl LedgerStore for FailingLedger {
    fn create(&self, _builder: TransactionBuilder) -> Result<Transaction, Error> {
        Err(Self::error())
    }

    fn get(&self, _id: TransactionId) -> Result<Transaction, Error> {
        Err(Self::error())
    }

    fn update(
        &self,
        _id: TransactionId,
        _builder: TransactionBuilder,
    ) -> Result<Transaction, Error> {
        Err(Self::error())
    }

    fn delete(&self, _id: TransactionId) -> Result<(), Error> {
        Err(Self::error())
    }

    fn query(&self, _query: &TransactionQuery) -> Result<Vec<Transaction>, Error> {
        Err(Self::error())
    }
}

#[derive(Debug, Clone, Default)]
pub(crate) struct FakeBudgetStore {
    budgets: Arc<Mutex<Vec<Budget>>>,
}

impl BudgetStore for FakeBudgetStore {
    fn create(&self, new_budget: NewBudget, now: OffsetDateTime) -> Result<Budget, Error> {
        let mut budgets = self.budgets.lock().unwrap();
        let budget = Budget {
            id: budgets.len() as BudgetId + 1,
            user_id: new_budget.user_id,
            name: new_budget.name,
            description: new_budget.description,
            items: vec![],
            created_at: now,
            updated_at: now,
        };
        budgets.push(budget.clone());

        Ok(budget)
    }

    fn get(&self, id: BudgetId) -> Result<Budget, Error> {
        self.budgets
            .lock()
            .unwrap()
            .iter()
            .find(|budget| budget.id == id)
            .cloned()
            .ok_or(Error::NotFound)
    }

    fn get_by_user(&self, user_id: UserID) -> Result<Vec<Budget>, Error> {
        let mut budgets: Vec<Budget> = self
            .budgets
            .lock()
            .unwrap()
            .iter()
            .filter(|budget| budget.user_id == user_id)
            .cloned()
            .collect();
        budgets.sort_by_key(|budget| std::cmp::Reverse(budget.updated_at));

        Ok(budgets)
    }

    fn update(&self, budget: &Budget) -> Result<(), Error> {
        let mut budgets = self.budgets.lock().unwrap();
        let slot = budgets
            .iter_mut()
            .find(|stored| stored.id == budget.id)
            .ok_or(Error::NotFound)?;
        *slot = budget.clone();

        Ok(())
    }

    fn delete(&self, id: BudgetId) -> Result<(), Error> {
        let mut budgets = self.budgets.lock().unwrap();
        let before = budgets.len();
        budgets.retain(|budget| budget.id != id);

        if budgets.len() == before {
            return Err(Error::NotFound);
        }

        Ok(())
    }
}
