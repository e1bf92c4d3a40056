//! JSON endpoints exposing the finance engine to the authenticated caller.

use axum::{
    Json,
    extract::{FromRef, Path, Query, State, rejection::QueryRejection},
};
use rust_decimal::Decimal;
use serde::Deserialize;
use time::OffsetDateTime;

use crate::{
    AppState, Error,
    app_state::SQLiteFinanceEngine,
    auth::Identity,
    engine::{CategoryTotal, MonthlyTotals, Summary, UpcomingRecurring},
    rejection::parse_query,
    transaction::TransactionKind,
};

/// How many days ahead to look for recurring expenses when the request does not say.
const DEFAULT_UPCOMING_DAYS: u32 = 30;

/// The state needed by the analytics endpoints.
#[derive(Clone)]
pub struct AnalyticsState {
    pub engine: SQLiteFinanceEngine,
}

impl FromRef<AppState> for AnalyticsState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            engine: state.engine.clone(),
        }
    }
}

/// A half-open `[start, end)` window given as RFC 3339 query parameters.
#[derive(Debug, Deserialize)]
pub struct DateRange {
    #[serde(with = "time::serde::rfc3339")]
    pub start: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub end: OffsetDateTime,
}

pub async fn get_summary(
    State(state): State<AnalyticsState>,
    identity: Identity,
) -> Result<Json<Summary>, Error> {
    state.engine.summary(identity.0).map(Json)
}

pub async fn get_net_amount(
    State(state): State<AnalyticsState>,
    identity: Identity,
) -> Result<Json<Decimal>, Error> {
    let user_id = identity.require()?;

    state.engine.net_amount(user_id).map(Json)
}

/// The caller's total for the transaction type in the path.
///
/// Unknown types match no transactions and total zero.
pub async fn get_total_by_kind(
    State(state): State<AnalyticsState>,
    identity: Identity,
    Path(kind): Path<String>,
) -> Result<Json<Decimal>, Error> {
    let user_id = identity.require()?;

    match kind.parse::<TransactionKind>() {
        Ok(kind) => state.engine.total_by_type_for_user(user_id, kind).map(Json),
        Err(_) => {
            tracing::debug!("Unknown transaction type {kind:?}, totalling to zero");
            Ok(Json(Decimal::ZERO))
        }
    }
}

pub async fn get_spending_for_period(
    State(state): State<AnalyticsState>,
    identity: Identity,
    range: Result<Query<DateRange>, QueryRejection>,
) -> Result<Json<Decimal>, Error> {
    let user_id = identity.require()?;
    let range = parse_query(range)?;

    state
        .engine
        .total_for_period(user_id, range.start, range.end)
        .map(Json)
}

pub async fn get_category_total(
    State(state): State<AnalyticsState>,
    identity: Identity,
    Path(category): Path<String>,
    range: Result<Query<DateRange>, QueryRejection>,
) -> Result<Json<Decimal>, Error> {
    let user_id = identity.require()?;
    let range = parse_query(range)?;

    state
        .engine
        .total_by_category_for_period(user_id, &category, range.start, range.end)
        .map(Json)
}

pub async fn get_category_breakdown(
    State(state): State<AnalyticsState>,
    identity: Identity,
    range: Result<Query<DateRange>, QueryRejection>,
) -> Result<Json<Vec<CategoryTotal>>, Error> {
    let user_id = identity.require()?;
    let range = parse_query(range)?;

    state
        .engine
        .category_breakdown(user_id, range.start, range.end)
        .map(Json)
}

pub async fn get_monthly_trend(
    State(state): State<AnalyticsState>,
    identity: Identity,
) -> Result<Json<Vec<MonthlyTotals>>, Error> {
    let user_id = identity.require()?;

    state.engine.monthly_trend(user_id).map(Json)
}

#[derive(Debug, Deserialize)]
pub struct ProjectionParams {
    pub months: Option<u32>,
}

/// The caller's net amount projected `months` ahead, defaulting to the configured horizon.
pub async fn get_projection(
    State(state): State<AnalyticsState>,
    identity: Identity,
    params: Result<Query<ProjectionParams>, QueryRejection>,
) -> Result<Json<Decimal>, Error> {
    let user_id = identity.require()?;
    let months = parse_query(params)?
        .months
        .unwrap_or(state.engine.config().projection.horizon_months);

    let net = state.engine.net_amount(user_id)?;

    state.engine.project_balance(user_id, net, months).map(Json)
}

#[derive(Debug, Deserialize)]
pub struct UpcomingParams {
    pub days: Option<u32>,
}

pub async fn get_upcoming_recurring(
    State(state): State<AnalyticsState>,
    identity: Identity,
    params: Result<Query<UpcomingParams>, QueryRejection>,
) -> Result<Json<Vec<UpcomingRecurring>>, Error> {
    let user_id = identity.require()?;
    let days = parse_query(params)?.days.unwrap_or(DEFAULT_UPCOMING_DAYS);

    state
        .engine
        .upcoming_recurring(user_id, OffsetDateTime::now_utc(), days)
        .map(Json)
}
