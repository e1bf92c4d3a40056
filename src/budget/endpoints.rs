//! JSON endpoints for managing the caller's budgets.

use axum::{
    Json,
    extract::{
        FromRef, Path, Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
    http::{StatusCode, header::LOCATION},
    response::IntoResponse,
};
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::{
    AppState, Error,
    analytics::DateRange,
    app_state::{SQLiteBudgetService, SQLiteFinanceEngine},
    auth::{Identity, UserID},
    budget::{Budget, BudgetUpdate, NewBudget},
    database_id::{BudgetId, CategoryId},
    endpoints::{self, format_endpoint},
    engine::BudgetItemComparison,
    rejection::{parse_json, parse_query},
};

/// The state needed by the budget endpoints.
#[derive(Clone)]
pub struct BudgetState {
    pub budgets: SQLiteBudgetService,
    pub engine: SQLiteFinanceEngine,
}

impl FromRef<AppState> for BudgetState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            budgets: state.budgets.clone(),
            engine: state.engine.clone(),
        }
    }
}

/// The body for creating a budget.
#[derive(Debug, Deserialize)]
pub struct BudgetForm {
    pub name: String,
    #[serde(default)]
    pub description: String,
}

/// The body for adding an allowance to a budget.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetItemForm {
    pub category_id: CategoryId,
    pub amount: Decimal,
    /// The number of days the allowance covers.
    pub frequency: u32,
}

/// Get the budget `budget_id` if it belongs to `user_id`.
///
/// Budgets owned by other users are reported as missing so that callers
/// cannot probe for IDs.
fn get_owned_budget(
    budgets: &SQLiteBudgetService,
    budget_id: BudgetId,
    user_id: UserID,
) -> Result<Budget, Error> {
    let budget = budgets.get_budget(budget_id)?;

    if budget.user_id != user_id {
        tracing::warn!(
            "User {user_id} tried to access budget {budget_id} owned by {}",
            budget.user_id
        );
        return Err(Error::NotFound);
    }

    Ok(budget)
}

pub async fn get_budgets_endpoint(
    State(state): State<BudgetState>,
    identity: Identity,
) -> Result<Json<Vec<Budget>>, Error> {
    let user_id = identity.require()?;

    state.budgets.get_budgets_by_user(user_id).map(Json)
}

/// Create an empty budget for the caller.
///
/// Responds with 201 and the new budget's URL in the `Location` header.
pub async fn create_budget_endpoint(
    State(state): State<BudgetState>,
    identity: Identity,
    form: Result<Json<BudgetForm>, JsonRejection>,
) -> Result<impl IntoResponse, Error> {
    let user_id = identity.require()?;
    let form = parse_json(form)?;

    let budget = state.budgets.create_budget(NewBudget {
        user_id,
        name: form.name,
        description: form.description,
    })?;
    let location = format_endpoint(endpoints::BUDGET, &[budget.id]);

    Ok((StatusCode::CREATED, [(LOCATION, location)], Json(budget)))
}

pub async fn get_budget_endpoint(
    State(state): State<BudgetState>,
    identity: Identity,
    Path(budget_id): Path<BudgetId>,
) -> Result<Json<Budget>, Error> {
    let user_id = identity.require()?;

    get_owned_budget(&state.budgets, budget_id, user_id).map(Json)
}

/// Replace the name, description and items of one of the caller's budgets.
pub async fn update_budget_endpoint(
    State(state): State<BudgetState>,
    identity: Identity,
    Path(budget_id): Path<BudgetId>,
    update: Result<Json<BudgetUpdate>, JsonRejection>,
) -> Result<Json<Budget>, Error> {
    let user_id = identity.require()?;
    let update = parse_json(update)?;
    get_owned_budget(&state.budgets, budget_id, user_id)?;

    state.budgets.update_budget(budget_id, update).map(Json)
}

pub async fn delete_budget_endpoint(
    State(state): State<BudgetState>,
    identity: Identity,
    Path(budget_id): Path<BudgetId>,
) -> Result<StatusCode, Error> {
    let user_id = identity.require()?;
    get_owned_budget(&state.budgets, budget_id, user_id)?;

    state.budgets.delete_budget(budget_id)?;

    Ok(StatusCode::NO_CONTENT)
}

/// The total spent in the budget's categories during the requested window.
pub async fn get_budget_performance_endpoint(
    State(state): State<BudgetState>,
    identity: Identity,
    Path(budget_id): Path<BudgetId>,
    range: Result<Query<DateRange>, QueryRejection>,
) -> Result<Json<Decimal>, Error> {
    let user_id = identity.require()?;
    let range = parse_query(range)?;
    get_owned_budget(&state.budgets, budget_id, user_id)?;

    state
        .engine
        .budget_performance(budget_id, range.start, range.end)
        .map(Json)
}

pub async fn get_budget_comparison_endpoint(
    State(state): State<BudgetState>,
    identity: Identity,
    Path(budget_id): Path<BudgetId>,
    range: Result<Query<DateRange>, QueryRejection>,
) -> Result<Json<Vec<BudgetItemComparison>>, Error> {
    let user_id = identity.require()?;
    let range = parse_query(range)?;
    get_owned_budget(&state.budgets, budget_id, user_id)?;

    state
        .engine
        .budget_comparison(budget_id, range.start, range.end)
        .map(Json)
}

pub async fn add_budget_item_endpoint(
    State(state): State<BudgetState>,
    identity: Identity,
    Path(budget_id): Path<BudgetId>,
    form: Result<Json<BudgetItemForm>, JsonRejection>,
) -> Result<Json<Budget>, Error> {
    let user_id = identity.require()?;
    let form = parse_json(form)?;
    get_owned_budget(&state.budgets, budget_id, user_id)?;

    state
        .budgets
        .add_budget_item(budget_id, form.category_id, form.amount, form.frequency)
        .map(Json)
}

/// Remove every allowance for the category in the path.
pub async fn remove_budget_item_endpoint(
    State(state): State<BudgetState>,
    identity: Identity,
    Path((budget_id, category_id)): Path<(BudgetId, CategoryId)>,
) -> Result<Json<Budget>, Error> {
    let user_id = identity.require()?;
    get_owned_budget(&state.budgets, budget_id, user_id)?;

    state
        .budgets
        .remove_budget_item(budget_id, category_id)
        .map(Json)
}
