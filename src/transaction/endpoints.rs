//! JSON endpoints for recording and listing the caller's transactions.

use axum::{
    Json,
    extract::{
        FromRef, Path, Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
    http::{
        StatusCode,
        header::{CONTENT_DISPOSITION, CONTENT_TYPE, LOCATION},
    },
    response::IntoResponse,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use time::OffsetDateTime;

use crate::{
    AppState, Error,
    app_state::SQLiteTransactionService,
    auth::{Identity, UserID},
    database_id::TransactionId,
    endpoints::{self, format_endpoint},
    rejection::{parse_json, parse_query},
    transaction::{
        SortOrder, Transaction, TransactionBuilder, TransactionKind, TransactionQuery,
        export_transactions_csv,
    },
};

/// The state needed by the transaction endpoints.
#[derive(Clone)]
pub struct TransactionState {
    pub transactions: SQLiteTransactionService,
}

impl FromRef<AppState> for TransactionState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            transactions: state.transactions.clone(),
        }
    }
}

/// The body for creating or replacing a transaction.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionForm {
    pub amount: Decimal,
    /// Either "INCOME" or "EXPENSE".
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub target: String,
    #[serde(default)]
    pub description: String,
    /// Defaults to the time the request is handled.
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub created: Option<OffsetDateTime>,
    #[serde(default)]
    pub recurring: bool,
    pub recurring_rate: Option<u32>,
}

impl TransactionForm {
    fn into_builder(self, user_id: UserID) -> Result<TransactionBuilder, Error> {
        let kind: TransactionKind = self.kind.parse()?;
        let mut builder = Transaction::build(user_id, self.amount, kind, &self.category)
            .target(&self.target)
            .description(&self.description);

        if let Some(created) = self.created {
            builder = builder.created(created);
        }

        if self.recurring {
            builder = builder.recurring(self.recurring_rate);
        }

        Ok(builder)
    }
}

/// Optional filters for listing and exporting transactions.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionFilters {
    /// Either "INCOME" or "EXPENSE". Any other type matches nothing.
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub category: Option<String>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub start: Option<OffsetDateTime>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub end: Option<OffsetDateTime>,
    pub amount_above: Option<Decimal>,
    pub recurring: Option<bool>,
}

impl TransactionFilters {
    /// The caller's transactions matching the filters, newest first.
    ///
    /// Returns `None` if the filters cannot match any transaction.
    ///
    /// # Errors
    /// Returns an [Error::Validation] if only one end of the date window is given.
    fn into_query(self, user_id: UserID) -> Result<Option<TransactionQuery>, Error> {
        let created_range = match (self.start, self.end) {
            (Some(start), Some(end)) => Some(start..end),
            (None, None) => None,
            _ => {
                return Err(Error::Validation(
                    "Both start and end are required to filter by date".to_owned(),
                ));
            }
        };

        let kind = match self.kind.map(|kind| kind.parse::<TransactionKind>()) {
            Some(Ok(kind)) => Some(kind),
            Some(Err(_)) => return Ok(None),
            None => None,
        };

        Ok(Some(TransactionQuery {
            user_id: Some(user_id),
            kind,
            category: self.category,
            created_range,
            amount_above: self.amount_above,
            recurring: self.recurring,
            sort_created: Some(SortOrder::Descending),
        }))
    }
}

fn find_transactions(
    transactions: &SQLiteTransactionService,
    filters: TransactionFilters,
    user_id: UserID,
) -> Result<Vec<Transaction>, Error> {
    match filters.into_query(user_id)? {
        Some(query) => transactions.query_transactions(&query),
        None => Ok(Vec::new()),
    }
}

/// Get the transaction `transaction_id` if it belongs to `user_id`.
fn get_owned_transaction(
    transactions: &SQLiteTransactionService,
    transaction_id: TransactionId,
    user_id: UserID,
) -> Result<Transaction, Error> {
    let transaction = transactions.get_transaction(transaction_id)?;

    if transaction.user_id != user_id {
        tracing::warn!(
            "User {user_id} tried to access transaction {transaction_id} owned by {}",
            transaction.user_id
        );
        return Err(Error::NotFound);
    }

    Ok(transaction)
}

pub async fn get_transactions_endpoint(
    State(state): State<TransactionState>,
    identity: Identity,
    filters: Result<Query<TransactionFilters>, QueryRejection>,
) -> Result<Json<Vec<Transaction>>, Error> {
    let user_id = identity.require()?;
    let filters = parse_query(filters)?;

    find_transactions(&state.transactions, filters, user_id).map(Json)
}

/// Record a transaction for the caller.
///
/// Responds with 201 and the new transaction's URL in the `Location` header.
pub async fn create_transaction_endpoint(
    State(state): State<TransactionState>,
    identity: Identity,
    form: Result<Json<TransactionForm>, JsonRejection>,
) -> Result<impl IntoResponse, Error> {
    let user_id = identity.require()?;
    let builder = parse_json(form)?.into_builder(user_id)?;

    let transaction = state.transactions.create_transaction(builder)?;
    let location = format_endpoint(endpoints::TRANSACTION, &[transaction.id]);

    Ok((StatusCode::CREATED, [(LOCATION, location)], Json(transaction)))
}

pub async fn get_transaction_endpoint(
    State(state): State<TransactionState>,
    identity: Identity,
    Path(transaction_id): Path<TransactionId>,
) -> Result<Json<Transaction>, Error> {
    let user_id = identity.require()?;

    get_owned_transaction(&state.transactions, transaction_id, user_id).map(Json)
}

pub async fn update_transaction_endpoint(
    State(state): State<TransactionState>,
    identity: Identity,
    Path(transaction_id): Path<TransactionId>,
    form: Result<Json<TransactionForm>, JsonRejection>,
) -> Result<Json<Transaction>, Error> {
    let user_id = identity.require()?;
    let builder = parse_json(form)?.into_builder(user_id)?;
    get_owned_transaction(&state.transactions, transaction_id, user_id)?;

    state
        .transactions
        .update_transaction(transaction_id, builder)
        .map(Json)
}

pub async fn delete_transaction_endpoint(
    State(state): State<TransactionState>,
    identity: Identity,
    Path(transaction_id): Path<TransactionId>,
) -> Result<StatusCode, Error> {
    let user_id = identity.require()?;
    get_owned_transaction(&state.transactions, transaction_id, user_id)?;

    state.transactions.delete_transaction(transaction_id)?;

    Ok(StatusCode::NO_CONTENT)
}

/// Download the caller's transactions as a CSV file.
///
/// Accepts the same filters as the transaction list.
pub async fn export_transactions_endpoint(
    State(state): State<TransactionState>,
    identity: Identity,
    filters: Result<Query<TransactionFilters>, QueryRejection>,
) -> Result<impl IntoResponse, Error> {
    let user_id = identity.require()?;
    let filters = parse_query(filters)?;

    let transactions = find_transactions(&state.transactions, filters, user_id)?;
    let csv = export_transactions_csv(&transactions)?;

    Ok((
        [
            (CONTENT_TYPE, "text/csv; charset=utf-8"),
            (
                CONTENT_DISPOSITION,
                "attachment; filename=\"transactions.csv\"",
            ),
        ],
        csv,
    ))
}
