//! Defines the core data models for transactions.

use std::{fmt::Display, str::FromStr};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::{Error, auth::UserID, database_id::TransactionId};

// ============================================================================
// MODELS
// ============================================================================

/// Whether money was earned or spent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TransactionKind {
    /// Money earned.
    Income,
    /// Money spent.
    Expense,
}

impl TransactionKind {
    /// The canonical upper case name, as stored and sent over the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionKind::Income => "INCOME",
            TransactionKind::Expense => "EXPENSE",
        }
    }
}

impl Display for TransactionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransactionKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "INCOME" => Ok(TransactionKind::Income),
            "EXPENSE" => Ok(TransactionKind::Expense),
            _ => Err(Error::Validation(
                "Type must be either 'INCOME' or 'EXPENSE'".to_owned(),
            )),
        }
    }
}

/// An expense or income, i.e. an event where money was either spent or earned.
///
/// To create a new `Transaction`, use [Transaction::build].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    /// The ID of the transaction.
    pub id: TransactionId,
    /// The user that owns the transaction.
    pub user_id: UserID,
    /// Who the money went to or came from.
    pub target: String,
    /// A text description of what the transaction was for.
    pub description: String,
    /// The amount of money spent or earned. Always positive, the direction is given by `kind`.
    pub amount: Decimal,
    /// Whether this was income or an expense.
    #[serde(rename = "type")]
    pub kind: TransactionKind,
    /// The category label, by convention the name of a category in the catalogue.
    pub category: String,
    /// When the transaction was recorded.
    #[serde(with = "time::serde::rfc3339")]
    pub created: OffsetDateTime,
    /// Whether the transaction repeats.
    pub recurring: bool,
    /// The number of days between repeats. Only meaningful when `recurring` is set.
    pub recurring_rate: Option<u32>,
}

impl Transaction {
    /// Create a new transaction.
    ///
    /// Shortcut for [TransactionBuilder] for discoverability.
    pub fn build(
        user_id: UserID,
        amount: Decimal,
        kind: TransactionKind,
        category: &str,
    ) -> TransactionBuilder {
        TransactionBuilder {
            user_id,
            target: String::new(),
            description: String::new(),
            amount,
            kind,
            category: category.to_owned(),
            created: OffsetDateTime::now_utc(),
            recurring: false,
            recurring_rate: None,
        }
    }
}

/// A builder for creating [Transaction] instances.
///
/// The creation timestamp defaults to the time the builder was made.
/// Call [TransactionBuilder::finalise] (or hand the builder to a
/// [LedgerStore](crate::stores::LedgerStore)) to validate it.
/// Optional fields such as the target, description and recurrence are set
/// by chaining the builder methods after [Transaction::build].
#[derive(Debug, PartialEq, Clone)]
pub struct TransactionBuilder {
    pub user_id: UserID,
    pub target: String,
    pub description: String,
    /// Must be strictly positive.
    pub amount: Decimal,
    pub kind: TransactionKind,
    /// Must not be blank.
    pub category: String,
    pub created: OffsetDateTime,
    pub recurring: bool,
    pub recurring_rate: Option<u32>,
}

impl TransactionBuilder {
    /// Set who the money went to or came from.
    pub fn target(mut self, target: &str) -> Self {
        self.target = target.to_owned();
        self
    }

    /// Set the description.
    pub fn description(mut self, description: &str) -> Self {
        self.description = description.to_owned();
        self
    }

    /// Set the creation timestamp.
    pub fn created(mut self, created: OffsetDateTime) -> Self {
        self.created = created;
        self
    }

    /// Mark the transaction as recurring every `rate` days.
    ///
    /// A `None` rate marks the transaction as recurring with no known interval.
    pub fn recurring(mut self, rate: Option<u32>) -> Self {
        self.recurring = true;
        self.recurring_rate = rate;
        self
    }

    /// Check the builder satisfies the transaction invariants.
    ///
    /// # Errors
    /// Returns an [Error::Validation] if the amount is not positive or the category is blank.
    pub fn validate(&self) -> Result<(), Error> {
        if self.amount <= Decimal::ZERO {
            return Err(Error::Validation(
                "Amount must be greater than zero".to_owned(),
            ));
        }

        if self.category.trim().is_empty() {
            return Err(Error::Validation("Category is required".to_owned()));
        }

        Ok(())
    }

    /// Validate the builder and create a [Transaction] with the ID `id`.
    ///
    /// # Errors
    /// Returns an [Error::Validation] if the builder is invalid, see [TransactionBuilder::validate].
    pub fn finalise(self, id: TransactionId) -> Result<Transaction, Error> {
        self.validate()?;

        Ok(Transaction {
            id,
            user_id: self.user_id,
            target: self.target,
            description: self.description,
            amount: self.amount,
            kind: self.kind,
            category: self.category,
            created: self.created,
            recurring: self.recurring,
            recurring_rate: if self.recurring {
                self.recurring_rate
            } else {
                None
            },
        })
    }
}
