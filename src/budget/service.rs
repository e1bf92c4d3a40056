//! Budget lifecycle: create, replace, delete and edit allowances.

use rust_decimal::Decimal;
use time::OffsetDateTime;

use crate::{
    Error,
    auth::UserID,
    budget::{Budget, BudgetItem, BudgetUpdate, NewBudget},
    database_id::{BudgetId, CategoryId},
    stores::{BudgetStore, CategoryStore},
};

/// Manages budgets on top of a [BudgetStore], resolving allowance categories
/// from a [CategoryStore].
#[derive(Debug, Clone)]
pub struct BudgetService<B, C> {
    budgets: B,
    categories: C,
}

impl<B, C> BudgetService<B, C>
where
    B: BudgetStore,
    C: CategoryStore,
{
    pub fn new(budgets: B, categories: C) -> Self {
        Self {
            budgets,
            categories,
        }
    }

    /// Validate `new_budget` and store it with no items.
    ///
    /// # Errors
    /// Returns an [Error::Validation] if the name is blank.
    pub fn create_budget(&self, new_budget: NewBudget) -> Result<Budget, Error> {
        new_budget.validate()?;

        let budget = self.budgets.create(new_budget, OffsetDateTime::now_utc())?;
        tracing::info!("Created budget {} for user {}", budget.id, budget.user_id);

        Ok(budget)
    }

    pub fn get_budget(&self, budget_id: BudgetId) -> Result<Budget, Error> {
        self.budgets.get(budget_id)
    }

    /// The budgets of `user_id`, most recently updated first.
    pub fn get_budgets_by_user(&self, user_id: UserID) -> Result<Vec<Budget>, Error> {
        self.budgets.get_by_user(user_id)
    }

    /// Replace the name, description and items of the budget `budget_id`.
    ///
    /// # Errors
    /// Returns [Error::NotFound] if the budget does not exist or an
    /// [Error::Validation] if `update` is invalid.
    pub fn update_budget(&self, budget_id: BudgetId, update: BudgetUpdate) -> Result<Budget, Error> {
        let mut budget = self.budgets.get(budget_id)?;
        budget.replace(update, OffsetDateTime::now_utc())?;
        self.budgets.update(&budget)?;

        Ok(budget)
    }

    /// # Errors
    /// Returns [Error::NotFound] if the budget does not exist.
    pub fn delete_budget(&self, budget_id: BudgetId) -> Result<(), Error> {
        self.budgets.delete(budget_id)?;
        tracing::info!("Deleted budget {budget_id}");

        Ok(())
    }

    /// Append an allowance of `amount` every `frequency_days` for the category
    /// `category_id` to the budget `budget_id`.
    ///
    /// # Errors
    /// Returns [Error::NotFound] if the budget or the category does not exist,
    /// or an [Error::Validation] if the amount or frequency is invalid.
    pub fn add_budget_item(
        &self,
        budget_id: BudgetId,
        category_id: CategoryId,
        amount: Decimal,
        frequency_days: u32,
    ) -> Result<Budget, Error> {
        let mut budget = self.budgets.get(budget_id)?;
        let category = self.categories.get(category_id)?;
        let item = BudgetItem::new(category, amount, frequency_days)?;

        budget.add_item(item, OffsetDateTime::now_utc());
        self.budgets.update(&budget)?;

        Ok(budget)
    }

    /// Remove every allowance for the category `category_id` from the budget `budget_id`.
    ///
    /// # Errors
    /// Returns [Error::NotFound] if the budget does not exist.
    pub fn remove_budget_item(
        &self,
        budget_id: BudgetId,
        category_id: CategoryId,
    ) -> Result<Budget, Error> {
        let mut budget = self.budgets.get(budget_id)?;

        budget.remove_items_for_category(category_id, OffsetDateTime::now_utc());
        self.budgets.update(&budget)?;

        Ok(budget)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use rusqlite::Connection;
    use rust_decimal_macros::dec;

    use crate::{
        Error,
        auth::UserID,
        budget::{BudgetUpdate, NewBudget},
        db::initialize,
        stores::sqlite::{SQLiteBudgetStore, SQLiteCategoryStore},
    };

    use super::BudgetService;

    fn get_service() -> BudgetService<SQLiteBudgetStore, SQLiteCategoryStore> {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).unwrap();
        let connection = Arc::new(Mutex::new(connection));

        BudgetService::new(
            SQLiteBudgetStore::new(connection.clone()),
            SQLiteCategoryStore::new(connection),
        )
    }

    fn new_budget(name: &str) -> NewBudget {
        NewBudget {
            user_id: UserID::new(1),
            name: name.to_owned(),
            description: String::new(),
        }
    }

    #[test]
    fn create_budget_starts_empty() {
        let service = get_service();

        let budget = service.create_budget(new_budget("Monthly")).unwrap();

        assert!(budget.items.is_empty());
        assert_eq!(service.get_budget(budget.id), Ok(budget));
    }

    #[test]
    fn create_budget_rejects_blank_name() {
        let service = get_service();

        assert_eq!(
            service.create_budget(new_budget("")),
            Err(Error::Validation("Budget name is required".to_owned()))
        );
    }

    #[test]
    fn add_and_remove_item() {
        let service = get_service();
        let budget = service.create_budget(new_budget("Monthly")).unwrap();

        let with_item = service.add_budget_item(budget.id, 1, dec!(300), 30).unwrap();
        let without_item = service.remove_budget_item(budget.id, 1).unwrap();

        assert_eq!(with_item.items.len(), 1);
        assert_eq!(with_item.items[0].category.name, "Food & Dining");
        assert_eq!(with_item.items[0].amount, dec!(300));
        assert_eq!(without_item.items, budget.items);
        assert!(with_item.updated_at > budget.updated_at);
        assert!(without_item.updated_at > with_item.updated_at);
        assert_eq!(service.get_budget(budget.id), Ok(without_item));
    }

    #[test]
    fn remove_unmatched_item_still_touches_budget() {
        let service = get_service();
        let budget = service.create_budget(new_budget("Monthly")).unwrap();
        let with_item = service.add_budget_item(budget.id, 1, dec!(300), 30).unwrap();

        let got = service.remove_budget_item(budget.id, 2).unwrap();

        assert_eq!(got.items, with_item.items);
        assert!(got.updated_at > with_item.updated_at);
    }

    #[test]
    fn add_item_to_missing_budget_or_category() {
        let service = get_service();
        let budget = service.create_budget(new_budget("Monthly")).unwrap();

        assert_eq!(
            service.add_budget_item(budget.id + 1, 1, dec!(1), 1),
            Err(Error::NotFound)
        );
        assert_eq!(
            service.add_budget_item(budget.id, 999, dec!(1), 1),
            Err(Error::NotFound)
        );
    }

    #[test]
    fn add_item_with_invalid_amount() {
        let service = get_service();
        let budget = service.create_budget(new_budget("Monthly")).unwrap();

        assert!(matches!(
            service.add_budget_item(budget.id, 1, dec!(-1), 30),
            Err(Error::Validation(_))
        ));
        assert_eq!(service.get_budget(budget.id).unwrap().items, vec![]);
    }

    #[test]
    fn update_replaces_budget() {
        let service = get_service();
        let budget = service.create_budget(new_budget("Monthly")).unwrap();

        let updated = service
            .update_budget(
                budget.id,
                BudgetUpdate {
                    name: "Weekly".to_owned(),
                    description: "groceries".to_owned(),
                    items: vec![],
                },
            )
            .unwrap();

        assert_eq!(updated.name, "Weekly");
        assert_eq!(updated.description, "groceries");
        assert_eq!(updated.user_id, budget.user_id);
        assert_eq!(service.get_budget(budget.id), Ok(updated));
    }

    #[test]
    fn update_missing_budget_is_not_found() {
        let service = get_service();

        let got = service.update_budget(
            3,
            BudgetUpdate {
                name: "Weekly".to_owned(),
                description: String::new(),
                items: vec![],
            },
        );

        assert_eq!(got, Err(Error::NotFound));
    }

    #[test]
    fn delete_budget() {
        let service = get_service();
        let budget = service.create_budget(new_budget("Monthly")).unwrap();

        service.delete_budget(budget.id).unwrap();

        assert_eq!(service.get_budget(budget.id), Err(Error::NotFound));
        assert_eq!(service.delete_budget(budget.id), Err(Error::NotFound));
    }

    #[test]
    fn budgets_by_user_most_recent_first() {
        let service = get_service();
        let first = service.create_budget(new_budget("First")).unwrap();
        let second = service.create_budget(new_budget("Second")).unwrap();
        service.add_budget_item(first.id, 2, dec!(50), 7).unwrap();

        let got: Vec<String> = service
            .get_budgets_by_user(UserID::new(1))
            .unwrap()
            .into_iter()
            .map(|budget| budget.name)
            .collect();

        assert_eq!(got, vec!["First".to_owned(), second.name]);
    }
}
