//! Transaction bookkeeping on top of a [LedgerStore].

use crate::{
    Error,
    database_id::TransactionId,
    stores::LedgerStore,
    transaction::{Transaction, TransactionBuilder, TransactionQuery},
};

/// Records, edits and looks up transactions.
#[derive(Debug, Clone)]
pub struct TransactionService<L> {
    ledger: L,
}

impl<L> TransactionService<L>
where
    L: LedgerStore,
{
    pub fn new(ledger: L) -> Self {
        Self { ledger }
    }

    /// Validate `builder` and record it as a new transaction.
    ///
    /// # Errors
    /// Returns an [Error::Validation] if the amount is not positive or the category is blank.
    pub fn create_transaction(&self, builder: TransactionBuilder) -> Result<Transaction, Error> {
        let transaction = self.ledger.create(builder)?;
        tracing::info!(
            "Created transaction {} for user {}",
            transaction.id,
            transaction.user_id
        );

        Ok(transaction)
    }

    pub fn get_transaction(&self, id: TransactionId) -> Result<Transaction, Error> {
        self.ledger.get(id)
    }

    /// Replace every field of the transaction `id` with the contents of `builder`.
    ///
    /// # Errors
    /// Returns [Error::NotFound] if the transaction does not exist or an
    /// [Error::Validation] if `builder` is invalid.
    pub fn update_transaction(
        &self,
        id: TransactionId,
        builder: TransactionBuilder,
    ) -> Result<Transaction, Error> {
        self.ledger.update(id, builder)
    }

    pub fn delete_transaction(&self, id: TransactionId) -> Result<(), Error> {
        self.ledger.delete(id)?;
        tracing::info!("Deleted transaction {id}");

        Ok(())
    }

    pub fn query_transactions(&self, query: &TransactionQuery) -> Result<Vec<Transaction>, Error> {
        self.ledger.query(query)
    }
}
