//! Defines the budget model and its embedded spending allowances.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use time::{Duration, OffsetDateTime};

use crate::{
    Error,
    auth::UserID,
    category::Category,
    database_id::{BudgetId, CategoryId},
};

// ============================================================================
// MODELS
// ============================================================================

/// A spending allowance for one category within a [Budget].
///
/// This is a limit, not a transaction, and it has no identity of its own.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BudgetItem {
    /// A snapshot of the category the allowance applies to.
    pub category: Category,
    /// The amount that may be spent per `frequency_days`.
    pub amount: Decimal,
    /// How many days the allowance covers.
    #[serde(rename = "frequency")]
    pub frequency_days: u32,
}

impl BudgetItem {
    /// Create a budget item.
    ///
    /// # Errors
    /// Returns an [Error::Validation] if `amount` is not positive or `frequency_days` is zero.
    pub fn new(category: Category, amount: Decimal, frequency_days: u32) -> Result<Self, Error> {
        let item = Self {
            category,
            amount,
            frequency_days,
        };
        item.validate()?;

        Ok(item)
    }

    pub(crate) fn validate(&self) -> Result<(), Error> {
        if self.amount <= Decimal::ZERO {
            return Err(Error::Validation(
                "Amount must be greater than zero".to_owned(),
            ));
        }

        if self.frequency_days == 0 {
            return Err(Error::Validation(
                "Frequency must be at least one day".to_owned(),
            ));
        }

        Ok(())
    }
}

/// A named spending plan for a user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Budget {
    /// The ID of the budget.
    pub id: BudgetId,
    /// The user that owns the budget.
    pub user_id: UserID,
    pub name: String,
    pub description: String,
    /// The allowances in the order they were added.
    pub items: Vec<BudgetItem>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl Budget {
    /// Append `item` and advance the update timestamp.
    pub fn add_item(&mut self, item: BudgetItem, now: OffsetDateTime) {
        self.items.push(item);
        self.touch(now);
    }

    /// Remove every item for the category `category_id` and advance the update timestamp.
    ///
    /// The timestamp advances even if no item matched.
    pub fn remove_items_for_category(&mut self, category_id: CategoryId, now: OffsetDateTime) {
        self.items.retain(|item| item.category.id != category_id);
        self.touch(now);
    }

    /// Replace the name, description and items with those of `update`.
    ///
    /// # Errors
    /// Returns an [Error::Validation] if `update` is invalid. The budget is unchanged on error.
    pub fn replace(&mut self, update: BudgetUpdate, now: OffsetDateTime) -> Result<(), Error> {
        validate_name(&update.name)?;
        for item in &update.items {
            item.validate()?;
        }

        self.name = update.name;
        self.description = update.description;
        self.items = update.items;
        self.touch(now);

        Ok(())
    }

    /// Set `updated_at` to `now`, or just after the previous update if the clock has not moved
    /// forward, so that the update timestamp always strictly increases.
    fn touch(&mut self, now: OffsetDateTime) {
        self.updated_at = if now > self.updated_at {
            now
        } else {
            self.updated_at + Duration::nanoseconds(1)
        };
    }
}

/// The data needed to create a [Budget]. New budgets have no items.
#[derive(Debug, Clone, PartialEq)]
pub struct NewBudget {
    pub user_id: UserID,
    pub name: String,
    pub description: String,
}

impl NewBudget {
    /// Check the user and name are present.
    ///
    /// # Errors
    /// Returns an [Error::Validation] if the name is blank.
    pub fn validate(&self) -> Result<(), Error> {
        validate_name(&self.name)
    }
}

/// A whole replacement for the mutable parts of a [Budget].
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct BudgetUpdate {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub items: Vec<BudgetItem>,
}

fn validate_name(name: &str) -> Result<(), Error> {
    if name.trim().is_empty() {
        return Err(Error::Validation("Budget name is required".to_owned()));
    }

    Ok(())
}
