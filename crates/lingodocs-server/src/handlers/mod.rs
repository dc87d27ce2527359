pub mod dashboard;
pub mod documents;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use lingodocs_shared::api::Envelope;
use serde::Serialize;

/// Wrap `data` in the standard success envelope.
pub(crate) fn reply<T: Serialize>(status: StatusCode, message: &str, data: T) -> Response {
    let body = Envelope::ok(status.as_u16(), message, data);
    (status, Json(body)).into_response()
}

/// Success envelope with no `data` payload.
pub(crate) fn reply_empty(status: StatusCode, message: &str) -> Response {
    let body = Envelope::<serde_json::Value>::ok_empty(status.as_u16(), message);
    (status, Json(body)).into_response()
}
