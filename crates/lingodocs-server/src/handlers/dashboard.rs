use axum::{http::StatusCode, response::Response};
use lingodocs_shared::api::DashboardMetrics;

use super::reply;

/// GET /dashboard
///
/// Headline numbers are not wired to any store yet; the endpoint serves
/// fixed values under the standard envelope.
pub async fn metrics() -> Response {
    let data = DashboardMetrics {
        users: 4200,
        current_users: 100,
        active_users: 685,
    };

    reply(StatusCode::OK, "Details get successfully", data)
}
