use axum::{extract::State, http::StatusCode, response::IntoResponse};

use super::text;
use crate::state::SharedState;

/// `GET /metrics`
///
/// Always 200; failed scrape groups only drop their own lines.
pub async fn metrics(State(state): State<SharedState>) -> impl IntoResponse {
    text(StatusCode::OK, state.exporter.scrape().await)
}

/// `GET /babeauthorship`
///
/// Unlike `/metrics` there is no partial output: any failure is a 500.
pub async fn babe_authorship(State(state): State<SharedState>) -> impl IntoResponse {
    match state.exporter.babe_authorship().await {
        Ok(body) => text(StatusCode::OK, body),
        Err(e) => {
            tracing::error!(error = %e, "babe authorship scrape failed");
            text(StatusCode::INTERNAL_SERVER_ERROR, format!("{e}\n"))
        }
    }
}
