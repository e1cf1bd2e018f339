use axum::{
    extract::State,
    http::{HeaderMap, StatusCode, header},
    response::IntoResponse,
};

use super::text;
use crate::state::SharedState;

/// `GET /health`
///
/// 200 with the peer count when the node is connected, 500 when it is
/// isolated but expects peers, 502 when it cannot be queried.
pub async fn health(State(state): State<SharedState>, headers: HeaderMap) -> impl IntoResponse {
    let origin = headers
        .get(header::ORIGIN)
        .and_then(|value| value.to_str().ok());

    let report = state.exporter.health(origin).await;
    let status =
        StatusCode::from_u16(report.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    text(status, report.body())
}
