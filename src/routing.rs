//! Application router configuration.

use axum::{
    Router,
    routing::{delete, get, post},
};

use crate::{
    AppState, Error,
    analytics::{
        get_category_breakdown, get_category_total, get_monthly_trend, get_net_amount,
        get_projection, get_spending_for_period, get_summary, get_total_by_kind,
        get_upcoming_recurring,
    },
    budget::{
        add_budget_item_endpoint, create_budget_endpoint, delete_budget_endpoint,
        get_budget_comparison_endpoint, get_budget_endpoint, get_budget_performance_endpoint,
        get_budgets_endpoint, remove_budget_item_endpoint, update_budget_endpoint,
    },
    category::{get_categories, get_category},
    endpoints,
    transaction::{
        create_transaction_endpoint, delete_transaction_endpoint, export_transactions_endpoint,
        get_transaction_endpoint, get_transactions_endpoint, update_transaction_endpoint,
    },
};

/// Return a router with all the app's routes.
///
/// Every user scoped route resolves the caller from the auth cookie and
/// responds with 401 when there is none.
pub fn build_router(state: AppState) -> Router {
    let analytics_routes = Router::new()
        .route(endpoints::SUMMARY, get(get_summary))
        .route(endpoints::NET, get(get_net_amount))
        .route(endpoints::TOTALS, get(get_total_by_kind))
        .route(endpoints::SPENDING, get(get_spending_for_period))
        .route(endpoints::CATEGORY_TOTAL, get(get_category_total))
        .route(endpoints::BREAKDOWN, get(get_category_breakdown))
        .route(endpoints::TREND, get(get_monthly_trend))
        .route(endpoints::PROJECTION, get(get_projection))
        .route(endpoints::UPCOMING_RECURRING, get(get_upcoming_recurring));

    let budget_routes = Router::new()
        .route(
            endpoints::BUDGETS,
            get(get_budgets_endpoint).post(create_budget_endpoint),
        )
        .route(
            endpoints::BUDGET,
            get(get_budget_endpoint)
                .put(update_budget_endpoint)
                .delete(delete_budget_endpoint),
        )
        .route(
            endpoints::BUDGET_PERFORMANCE,
            get(get_budget_performance_endpoint),
        )
        .route(
            endpoints::BUDGET_COMPARISON,
            get(get_budget_comparison_endpoint),
        )
        .route(endpoints::BUDGET_ITEMS, post(add_budget_item_endpoint))
        .route(endpoints::BUDGET_ITEM, delete(remove_budget_item_endpoint));

    let transaction_routes = Router::new()
        .route(
            endpoints::TRANSACTIONS,
            get(get_transactions_endpoint).post(create_transaction_endpoint),
        )
        .route(
            endpoints::TRANSACTIONS_EXPORT,
            get(export_transactions_endpoint),
        )
        .route(
            endpoints::TRANSACTION,
            get(get_transaction_endpoint)
                .put(update_transaction_endpoint)
                .delete(delete_transaction_endpoint),
        );

    let category_routes = Router::new()
        .route(endpoints::CATEGORIES, get(get_categories))
        .route(endpoints::CATEGORY, get(get_category));

    analytics_routes
        .merge(budget_routes)
        .merge(transaction_routes)
        .merge(category_routes)
        .fallback(get_404_not_found)
        .with_state(state)
}

async fn get_404_not_found() -> Error {
    Error::NotFound
}
