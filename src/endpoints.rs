//! The API endpoint URIs.
//!
//! For endpoints that take parameters, e.g. '/api/budgets/{budget_id}', use [format_endpoint].

/// The headline income, expenses, net and projection for the caller.
pub const SUMMARY: &str = "/api/analytics/summary";
/// The caller's all time income minus expenses.
pub const NET: &str = "/api/analytics/net";
/// The caller's total for one transaction type.
pub const TOTALS: &str = "/api/analytics/totals/{kind}";
/// The caller's expenses within a date range.
pub const SPENDING: &str = "/api/analytics/spending";
/// The caller's total for one category within a date range.
pub const CATEGORY_TOTAL: &str = "/api/analytics/categories/{category}";
/// The caller's expenses per category within a date range.
pub const BREAKDOWN: &str = "/api/analytics/breakdown";
/// The caller's income and expenses per month.
pub const TREND: &str = "/api/analytics/trend";
/// The caller's projected balance.
pub const PROJECTION: &str = "/api/analytics/projection";
/// The caller's recurring expenses that are due soon.
pub const UPCOMING_RECURRING: &str = "/api/analytics/recurring";

pub const BUDGETS: &str = "/api/budgets";
pub const BUDGET: &str = "/api/budgets/{budget_id}";
pub const BUDGET_PERFORMANCE: &str = "/api/budgets/{budget_id}/performance";
pub const BUDGET_COMPARISON: &str = "/api/budgets/{budget_id}/comparison";
pub const BUDGET_ITEMS: &str = "/api/budgets/{budget_id}/items";
pub const BUDGET_ITEM: &str = "/api/budgets/{budget_id}/items/{category_id}";

pub const TRANSACTIONS: &str = "/api/transactions";
pub const TRANSACTION: &str = "/api/transactions/{transaction_id}";
/// The caller's transactions as a CSV download.
pub const TRANSACTIONS_EXPORT: &str = "/api/transactions/export";

pub const CATEGORIES: &str = "/api/categories";
pub const CATEGORY: &str = "/api/categories/{category_id}";

/// Replace the parameters in `endpoint_path` with `ids`, in order.
///
/// Parameters without a matching ID are left as is, so formatting
/// [BUDGET_ITEM] with `[1, 2]` gives "/api/budgets/1/items/2".
pub fn format_endpoint(endpoint_path: &str, ids: &[i64]) -> String {
    let mut formatted = String::with_capacity(endpoint_path.len());
    let mut rest = endpoint_path;

    for id in ids {
        let Some(param_start) = rest.find('{') else {
            break;
        };
        let Some(param_length) = rest[param_start..].find('}') else {
            break;
        };

        formatted.push_str(&rest[..param_start]);
        formatted.push_str(&id.to_string());
        rest = &rest[param_start + param_length + 1..];
    }

    formatted.push_str(rest);
    formatted
}
