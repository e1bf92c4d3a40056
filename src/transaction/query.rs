//! The filter object used to retrieve transactions from a [LedgerStore](crate::stores::LedgerStore).

use std::ops::Range;

use rust_decimal::Decimal;
use time::OffsetDateTime;

use crate::{
    auth::UserID,
    transaction::{Transaction, TransactionKind},
};

/// The order to sort transactions in a query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    /// Sort in order of increasing value.
    Ascending,
    /// Sort in order of decreasing value.
    Descending,
}

/// Defines which transactions should be fetched from [LedgerStore::query](crate::stores::LedgerStore::query).
///
/// Every field is an optional filter and the filters are combined with AND.
/// The default query matches every transaction.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransactionQuery {
    /// Only include transactions owned by this user.
    pub user_id: Option<UserID>,
    /// Only include transactions of this kind.
    pub kind: Option<TransactionKind>,
    /// Only include transactions with exactly this category label.
    pub category: Option<String>,
    /// Only include transactions created within this half-open range.
    pub created_range: Option<Range<OffsetDateTime>>,
    /// Only include transactions with an amount strictly greater than this.
    pub amount_above: Option<Decimal>,
    /// Only include transactions whose recurrence flag equals this.
    pub recurring: Option<bool>,
    /// Orders transactions by creation time. None returns transactions in the
    /// order they are stored.
    pub sort_created: Option<SortOrder>,
}

impl TransactionQuery {
    /// All transactions of `kind`, for every user.
    pub fn of_kind(kind: TransactionKind) -> Self {
        Self {
            kind: Some(kind),
            ..Default::default()
        }
    }

    /// All transactions owned by `user_id`.
    pub fn for_user(user_id: UserID) -> Self {
        Self {
            user_id: Some(user_id),
            ..Default::default()
        }
    }

    /// All transactions of `kind` owned by `user_id`.
    pub fn for_user_and_kind(user_id: UserID, kind: TransactionKind) -> Self {
        Self {
            user_id: Some(user_id),
            kind: Some(kind),
            ..Default::default()
        }
    }

    /// All transactions owned by `user_id` in `category`, created in `[start, end)`.
    pub fn for_user_and_category_created_between(
        user_id: UserID,
        category: &str,
        start: OffsetDateTime,
        end: OffsetDateTime,
    ) -> Self {
        Self {
            user_id: Some(user_id),
            category: Some(category.to_owned()),
            created_range: Some(start..end),
            ..Default::default()
        }
    }

    /// All transactions owned by `user_id` with the recurrence flag set to `recurring`.
    pub fn for_user_and_recurring(user_id: UserID, recurring: bool) -> Self {
        Self {
            user_id: Some(user_id),
            recurring: Some(recurring),
            ..Default::default()
        }
    }

    /// Restrict the query to transactions of `kind`.
    pub fn with_kind(mut self, kind: TransactionKind) -> Self {
        self.kind = Some(kind);
        self
    }

    /// Restrict the query to transactions created in `[start, end)`.
    pub fn created_between(mut self, start: OffsetDateTime, end: OffsetDateTime) -> Self {
        self.created_range = Some(start..end);
        self
    }

    /// Sort the results by creation time.
    pub fn sorted(mut self, order: SortOrder) -> Self {
        self.sort_created = Some(order);
        self
    }

    /// Whether `transaction` satisfies every filter of this query.
    ///
    /// Sorting is not a filter and is ignored here.
    pub fn matches(&self, transaction: &Transaction) -> bool {
        self.user_id.is_none_or(|user_id| transaction.user_id == user_id)
            && self.kind.is_none_or(|kind| transaction.kind == kind)
            && self
                .category
                .as_deref()
                .is_none_or(|category| transaction.category == category)
            && self
                .created_range
                .as_ref()
                .is_none_or(|range| range.contains(&transaction.created))
            && self
                .amount_above
                .is_none_or(|threshold| transaction.amount > threshold)
            && self
                .recurring
                .is_none_or(|recurring| transaction.recurring == recurring)
    }
}
