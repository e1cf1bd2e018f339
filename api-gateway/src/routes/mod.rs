//! HTTP routes.

pub mod health;
pub mod metrics;

use axum::{
    Router,
    extract::Request,
    http::{StatusCode, header},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::get,
};

use crate::state::SharedState;

/// Body served for any path without a handler.
const INDEX_TEXT: &str = "substrate/polkadot node monitoring\n";

/// Builds the exporter router.
pub fn router(state: SharedState) -> Router {
    Router::new()
        .route("/metrics", get(metrics::metrics))
        .route("/babeauthorship", get(metrics::babe_authorship))
        .route("/health", get(health::health))
        .fallback(index)
        .layer(middleware::from_fn(access_log))
        .with_state(state)
}

/// Plain-text response with an explicit status.
pub(crate) fn text(status: StatusCode, body: String) -> Response {
    (status, [(header::CONTENT_TYPE, "text/plain")], body).into_response()
}

async fn index() -> Response {
    text(StatusCode::OK, INDEX_TEXT.to_string())
}

/// One log line per request, with the caller's `Origin` when present.
async fn access_log(req: Request, next: Next) -> Response {
    let method = req.method().clone();
    let path = req.uri().path().to_string();
    let origin = req
        .headers()
        .get(header::ORIGIN)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string);

    let response = next.run(req).await;
    tracing::info!(
        %method,
        path = %path,
        status = response.status().as_u16(),
        origin = origin.as_deref(),
        "request handled"
    );
    response
}
