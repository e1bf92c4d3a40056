//! Linear balance projection from recurring transactions.

use rust_decimal::Decimal;
use serde::Serialize;
use time::{Duration, OffsetDateTime};

use crate::{
    Error,
    auth::UserID,
    engine::{FinanceEngine, checked_sub, checked_sum, overflow},
    stores::{BudgetStore, LedgerStore},
    transaction::{Transaction, TransactionKind, TransactionQuery},
};

const DEFAULT_HORIZON_MONTHS: u32 = 3;

/// How a recurring transaction contributes to one projection period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RecurrencePolicy {
    /// Every recurring transaction counts once per period, whatever its interval.
    #[default]
    FlatPerPeriod,
    /// Every recurring transaction counts `period_days / recurring_rate` times per period.
    ///
    /// Transactions without a positive interval count once per period.
    IntervalScaled { period_days: u32 },
}

impl RecurrencePolicy {
    /// The amount `transaction` contributes to a single period.
    ///
    /// # Errors
    /// Returns an [Error::Validation] if the scaled amount overflows.
    pub fn per_period_amount(&self, transaction: &Transaction) -> Result<Decimal, Error> {
        match self {
            RecurrencePolicy::FlatPerPeriod => Ok(transaction.amount),
            RecurrencePolicy::IntervalScaled { period_days } => match transaction.recurring_rate {
                Some(rate) if rate > 0 => transaction
                    .amount
                    .checked_mul(Decimal::from(*period_days))
                    .and_then(|scaled| scaled.checked_div(Decimal::from(rate)))
                    .ok_or_else(overflow),
                _ => Ok(transaction.amount),
            },
        }
    }
}

/// Settings for [FinanceEngine::project_balance] and the summary projection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProjectionConfig {
    /// How many periods ahead the summary projects.
    pub horizon_months: u32,
    pub policy: RecurrencePolicy,
}

impl Default for ProjectionConfig {
    fn default() -> Self {
        Self {
            horizon_months: DEFAULT_HORIZON_MONTHS,
            policy: RecurrencePolicy::default(),
        }
    }
}

/// A recurring expense and when it is next due.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpcomingRecurring {
    pub transaction: Transaction,
    #[serde(with = "time::serde::rfc3339")]
    pub next_occurrence: OffsetDateTime,
}

impl<L, B> FinanceEngine<L, B>
where
    L: LedgerStore,
    B: BudgetStore,
{
    /// Estimate the balance of `user_id` after `months_ahead` periods, starting from `current_net`.
    ///
    /// Every recurring transaction of the user, income or expense, is treated
    /// as an outgoing amount repeated each period according to the configured
    /// [RecurrencePolicy]. With `months_ahead` of zero the result is `current_net`.
    ///
    /// # Errors
    /// Returns an [Error::Validation] if the projection does not fit in a [Decimal].
    pub fn project_balance(
        &self,
        user_id: UserID,
        current_net: Decimal,
        months_ahead: u32,
    ) -> Result<Decimal, Error> {
        const OPERATION: &str = "project_balance";

        let recurring = self.fetch(
            OPERATION,
            &TransactionQuery::for_user_and_recurring(user_id, true),
        )?;

        let policy = self.config.projection.policy;
        let projected = recurring
            .iter()
            .try_fold(Decimal::ZERO, |total, transaction| {
                checked_sum([total, policy.per_period_amount(transaction)?])
            })
            .and_then(|per_period| {
                per_period
                    .checked_mul(Decimal::from(months_ahead))
                    .ok_or_else(overflow)
            })
            .and_then(|outgoing| checked_sub(current_net, outgoing));
        let projected = self.checked(OPERATION, projected)?;

        self.report(OPERATION, Some(user_id), recurring.len(), projected);

        Ok(projected)
    }

    /// The recurring expenses of `user_id` next due within `horizon_days` of `now`, soonest first.
    ///
    /// The next occurrence is the first `created + k * recurring_rate` days that
    /// is not before `now`. Expenses without a positive interval are skipped.
    ///
    /// # Errors
    /// Returns an [Error::Validation] if `now + horizon_days` is not a representable date.
    pub fn upcoming_recurring(
        &self,
        user_id: UserID,
        now: OffsetDateTime,
        horizon_days: u32,
    ) -> Result<Vec<UpcomingRecurring>, Error> {
        const OPERATION: &str = "upcoming_recurring";

        let recurring = self.fetch(
            OPERATION,
            &TransactionQuery::for_user_and_recurring(user_id, true)
                .with_kind(TransactionKind::Expense),
        )?;
        let horizon_end = self.checked(
            OPERATION,
            now.checked_add(Duration::days(i64::from(horizon_days)))
                .ok_or_else(|| {
                    Error::Validation("The horizon is too far in the future".to_owned())
                }),
        )?;

        let mut upcoming: Vec<UpcomingRecurring> = recurring
            .into_iter()
            .filter_map(|transaction| {
                let next_occurrence = next_occurrence(&transaction, now)?;

                (next_occurrence <= horizon_end).then_some(UpcomingRecurring {
                    transaction,
                    next_occurrence,
                })
            })
            .collect();
        upcoming.sort_by(|a, b| {
            a.next_occurrence
                .cmp(&b.next_occurrence)
                .then(a.transaction.id.cmp(&b.transaction.id))
        });

        let total = self.checked(
            OPERATION,
            checked_sum(upcoming.iter().map(|upcoming| upcoming.transaction.amount)),
        )?;
        self.report(OPERATION, Some(user_id), upcoming.len(), total);

        Ok(upcoming)
    }
}

/// The first repeat of `transaction` at or after `now`, or `None` if it has no
/// positive interval or the date would overflow.
fn next_occurrence(transaction: &Transaction, now: OffsetDateTime) -> Option<OffsetDateTime> {
    let rate = transaction.recurring_rate.filter(|rate| *rate > 0)?;

    if transaction.created >= now {
        return Some(transaction.created);
    }

    let interval = Duration::days(i64::from(rate));
    let elapsed = (now - transaction.created).whole_nanoseconds();
    let interval_nanos = interval.whole_nanoseconds();
    let periods = (elapsed + interval_nanos - 1) / interval_nanos;
    let offset = i64::try_from(periods * interval_nanos).ok()?;

    transaction
        .created
        .checked_add(Duration::nanoseconds(offset))
}
