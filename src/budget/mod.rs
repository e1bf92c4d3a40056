//! Budgets: named spending plans made of per-category allowances.

mod core;
mod endpoints;
mod service;

pub use core::{Budget, BudgetItem, BudgetUpdate, NewBudget};
pub use endpoints::{
    add_budget_item_endpoint, create_budget_endpoint, delete_budget_endpoint,
    get_budget_comparison_endpoint, get_budget_endpoint, get_budget_performance_endpoint,
    get_budgets_endpoint, remove_budget_item_endpoint, update_budget_endpoint,
};
pub use service::BudgetService;
