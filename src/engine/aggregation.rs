//! Totals, budget performance, category breakdowns and monthly trends.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::Serialize;
use time::OffsetDateTime;

use crate::{
    Error,
    auth::UserID,
    budget::Budget,
    category::Category,
    database_id::BudgetId,
    engine::{FinanceEngine, checked_sub, checked_sum, sum_amounts},
    stores::{BudgetStore, LedgerStore},
    transaction::{TransactionKind, TransactionQuery},
};

/// How much was spent against one budget allowance.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BudgetItemComparison {
    pub category: Category,
    pub allowance: Decimal,
    pub spent: Decimal,
    /// `allowance - spent`, negative when overspent.
    pub remaining: Decimal,
}

/// The expenses recorded against one category label.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryTotal {
    pub category: String,
    pub total: Decimal,
}

/// Income and expense totals for one calendar month.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyTotals {
    /// The month formatted as "YYYY-MM".
    pub month: String,
    pub income: Decimal,
    pub expenses: Decimal,
}

impl<L, B> FinanceEngine<L, B>
where
    L: LedgerStore,
    B: BudgetStore,
{
    /// The sum of every transaction of `kind`, across all users.
    pub fn total_by_type(&self, kind: TransactionKind) -> Result<Decimal, Error> {
        self.sum_matching("total_by_type", None, &TransactionQuery::of_kind(kind))
    }

    /// The sum of the transactions of `kind` owned by `user_id`.
    pub fn total_by_type_for_user(
        &self,
        user_id: UserID,
        kind: TransactionKind,
    ) -> Result<Decimal, Error> {
        self.sum_matching(
            "total_by_type_for_user",
            Some(user_id),
            &TransactionQuery::for_user_and_kind(user_id, kind),
        )
    }

    /// The expenses of `user_id` created in `[start, end)`.
    pub fn total_for_period(
        &self,
        user_id: UserID,
        start: OffsetDateTime,
        end: OffsetDateTime,
    ) -> Result<Decimal, Error> {
        self.sum_matching(
            "total_for_period",
            Some(user_id),
            &TransactionQuery::for_user_and_kind(user_id, TransactionKind::Expense)
                .created_between(start, end),
        )
    }

    /// The transactions of any kind that `user_id` recorded in `category` during `[start, end)`.
    pub fn total_by_category_for_period(
        &self,
        user_id: UserID,
        category: &str,
        start: OffsetDateTime,
        end: OffsetDateTime,
    ) -> Result<Decimal, Error> {
        self.sum_matching(
            "total_by_category_for_period",
            Some(user_id),
            &TransactionQuery::for_user_and_category_created_between(user_id, category, start, end),
        )
    }

    /// The total spent by the budget's owner in the budget's categories during `[start, end)`.
    ///
    /// Only expenses count. Each item is summed separately, so a category that
    /// appears in two items is counted twice.
    ///
    /// # Errors
    /// Returns [Error::NotFound] if there is no budget with `budget_id`.
    pub fn budget_performance(
        &self,
        budget_id: BudgetId,
        start: OffsetDateTime,
        end: OffsetDateTime,
    ) -> Result<Decimal, Error> {
        const OPERATION: &str = "budget_performance";

        let budget = self.get_budget(OPERATION, budget_id)?;
        let mut total = Decimal::ZERO;
        let mut matched = 0;

        for item in &budget.items {
            let transactions = self.fetch(
                OPERATION,
                &expenses_in_category(&budget, &item.category.name, start, end),
            )?;
            matched += transactions.len();
            total = self.checked(
                OPERATION,
                sum_amounts(&transactions).and_then(|spent| checked_sum([total, spent])),
            )?;
        }

        self.report(OPERATION, Some(budget.user_id), matched, total);

        Ok(total)
    }

    /// Spending against each allowance of the budget during `[start, end)`, in item order.
    ///
    /// # Errors
    /// Returns [Error::NotFound] if there is no budget with `budget_id`.
    pub fn budget_comparison(
        &self,
        budget_id: BudgetId,
        start: OffsetDateTime,
        end: OffsetDateTime,
    ) -> Result<Vec<BudgetItemComparison>, Error> {
        const OPERATION: &str = "budget_comparison";

        let budget = self.get_budget(OPERATION, budget_id)?;
        let mut comparisons = Vec::with_capacity(budget.items.len());
        let mut matched = 0;

        for item in &budget.items {
            let transactions = self.fetch(
                OPERATION,
                &expenses_in_category(&budget, &item.category.name, start, end),
            )?;
            matched += transactions.len();
            let spent = self.checked(OPERATION, sum_amounts(&transactions))?;
            let remaining = self.checked(OPERATION, checked_sub(item.amount, spent))?;

            comparisons.push(BudgetItemComparison {
                category: item.category.clone(),
                allowance: item.amount,
                spent,
                remaining,
            });
        }

        let total = self.checked(
            OPERATION,
            checked_sum(comparisons.iter().map(|comparison| comparison.spent)),
        )?;
        self.report(OPERATION, Some(budget.user_id), matched, total);

        Ok(comparisons)
    }

    /// Income minus expenses for `user_id` over all time.
    pub fn net_amount(&self, user_id: UserID) -> Result<Decimal, Error> {
        let income = self.total_by_type_for_user(user_id, TransactionKind::Income)?;
        let expenses = self.total_by_type_for_user(user_id, TransactionKind::Expense)?;

        self.checked("net_amount", checked_sub(income, expenses))
    }

    /// The sum of all income across all users.
    pub fn total_income(&self) -> Result<Decimal, Error> {
        self.total_by_type(TransactionKind::Income)
    }

    /// The sum of all expenses across all users.
    pub fn total_expenses(&self) -> Result<Decimal, Error> {
        self.total_by_type(TransactionKind::Expense)
    }

    /// Income minus expenses across all users.
    pub fn global_net_amount(&self) -> Result<Decimal, Error> {
        let income = self.total_income()?;
        let expenses = self.total_expenses()?;

        self.checked("global_net_amount", checked_sub(income, expenses))
    }

    /// The expenses of `user_id` during `[start, end)` grouped by category label,
    /// largest total first and ties broken by label.
    pub fn category_breakdown(
        &self,
        user_id: UserID,
        start: OffsetDateTime,
        end: OffsetDateTime,
    ) -> Result<Vec<CategoryTotal>, Error> {
        const OPERATION: &str = "category_breakdown";

        let transactions = self.fetch(
            OPERATION,
            &TransactionQuery::for_user_and_kind(user_id, TransactionKind::Expense)
                .created_between(start, end),
        )?;

        let mut totals: BTreeMap<&str, Decimal> = BTreeMap::new();
        for transaction in &transactions {
            let total = totals.entry(transaction.category.as_str()).or_default();
            *total = self.checked(OPERATION, checked_sum([*total, transaction.amount]))?;
        }

        let mut breakdown: Vec<CategoryTotal> = totals
            .into_iter()
            .map(|(category, total)| CategoryTotal {
                category: category.to_owned(),
                total,
            })
            .collect();
        // The map is already ordered by label, and the sort is stable.
        breakdown.sort_by(|a, b| b.total.cmp(&a.total));

        let total = self.checked(
            OPERATION,
            checked_sum(breakdown.iter().map(|category| category.total)),
        )?;
        self.report(OPERATION, Some(user_id), transactions.len(), total);

        Ok(breakdown)
    }

    /// Income and expense totals of `user_id` per calendar month, oldest first.
    ///
    /// Months without transactions are omitted.
    pub fn monthly_trend(&self, user_id: UserID) -> Result<Vec<MonthlyTotals>, Error> {
        const OPERATION: &str = "monthly_trend";

        let transactions = self.fetch(OPERATION, &TransactionQuery::for_user(user_id))?;

        let mut months: BTreeMap<(i32, u8), (Decimal, Decimal)> = BTreeMap::new();
        for transaction in &transactions {
            let key = (transaction.created.year(), u8::from(transaction.created.month()));
            let (income, expenses) = months.entry(key).or_default();

            let total = match transaction.kind {
                TransactionKind::Income => income,
                TransactionKind::Expense => expenses,
            };
            *total = self.checked(OPERATION, checked_sum([*total, transaction.amount]))?;
        }

        let trend: Vec<MonthlyTotals> = months
            .into_iter()
            .map(|((year, month), (income, expenses))| MonthlyTotals {
                month: format!("{year:04}-{month:02}"),
                income,
                expenses,
            })
            .collect();

        let net = self.checked(
            OPERATION,
            checked_sum(trend.iter().map(|totals| totals.income)).and_then(|income| {
                checked_sub(income, checked_sum(trend.iter().map(|totals| totals.expenses))?)
            }),
        )?;
        self.report(OPERATION, Some(user_id), transactions.len(), net);

        Ok(trend)
    }

    fn get_budget(&self, operation: &'static str, budget_id: BudgetId) -> Result<Budget, Error> {
        self.budgets
            .get(budget_id)
            .inspect_err(|error| self.observer.on_failure(operation, error))
    }
}

fn expenses_in_category(
    budget: &Budget,
    category: &str,
    start: OffsetDateTime,
    end: OffsetDateTime,
) -> TransactionQuery {
    TransactionQuery::for_user_and_category_created_between(budget.user_id, category, start, end)
        .with_kind(TransactionKind::Expense)
}
