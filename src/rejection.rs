//! Turns axum's extractor rejections into the app's [Error] type so that
//! malformed requests get the same JSON error body as everything else.

use axum::{
    Json,
    extract::{
        Query,
        rejection::{JsonRejection, QueryRejection},
    },
};

use crate::Error;

/// Unwrap query parameters, turning a malformed query into a validation error.
pub(crate) fn parse_query<T>(query: Result<Query<T>, QueryRejection>) -> Result<T, Error> {
    query
        .map(|Query(params)| params)
        .map_err(|rejection| Error::Validation(rejection.body_text()))
}

/// Unwrap a JSON body, turning a malformed body into a validation error.
pub(crate) fn parse_json<T>(body: Result<Json<T>, JsonRejection>) -> Result<T, Error> {
    body.map(|Json(body)| body)
        .map_err(|rejection| Error::Validation(rejection.body_text()))
}
