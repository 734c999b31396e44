//! Thin HTTP layer over the search engine.
//!
//! Endpoints:
//! - `GET /search?query=...&n=...&sim_threshold=...&use_rationale=...`
//!   returning a JSON array of result rows, or `{"error": ...}` when the
//!   query concept is unknown
//! - `GET /similar?query=...&top_k=...` returning a JSON array of the
//!   stored concepts nearest to the query concept
//! - `GET /heartbeat` returning `OK`

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use serde::Deserialize;
use serde_json::json;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use conceptvec_rationale::SharedRationaleBackend;
use conceptvec_search::{DEFAULT_SIMILAR, SearchError, SearchOptions, most_similar, search};
use conceptvec_store::ConceptStore;

use crate::config::SearchConfig;

/// Shared state for request handlers.
pub struct AppState {
    pub store: Arc<ConceptStore>,
    pub rationale: Option<SharedRationaleBackend>,
    pub defaults: SearchConfig,
    pub rationale_timeout: Duration,
}

/// Query parameters of `GET /search`.
#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub query: String,
    pub n: Option<usize>,
    pub sim_threshold: Option<f32>,
    #[serde(default)]
    pub use_rationale: bool,
}

/// Query parameters of `GET /similar`.
#[derive(Debug, Deserialize)]
pub struct SimilarParams {
    pub query: String,
    pub top_k: Option<usize>,
}

/// Build the application router.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/search", get(search_handler))
        .route("/similar", get(similar_handler))
        .route("/heartbeat", get(heartbeat_handler))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Serve the router on the given address until the process exits.
pub async fn serve(addr: SocketAddr, state: Arc<AppState>) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "Listening");
    axum::serve(listener, router(state)).await?;
    Ok(())
}

async fn heartbeat_handler() -> &'static str {
    "OK"
}

async fn search_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SearchParams>,
) -> Response {
    let mut opts = SearchOptions::default()
        .with_samples(params.n.unwrap_or(state.defaults.n))
        .with_threshold(params.sim_threshold.unwrap_or(state.defaults.sim_threshold));
    opts.rationale_timeout = state.rationale_timeout;

    if params.use_rationale {
        match &state.rationale {
            Some(backend) => opts = opts.with_rationale(backend.clone()),
            None => {
                tracing::warn!("Rationale requested but no backend configured");
            }
        }
    }

    match search(&state.store, &params.query, &opts).await {
        Ok(table) => (StatusCode::OK, axum::Json(table)).into_response(),
        Err(e) => error_response(e),
    }
}

async fn similar_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SimilarParams>,
) -> Response {
    let top_k = params.top_k.unwrap_or(DEFAULT_SIMILAR);
    match most_similar(&state.store, &params.query, top_k) {
        Ok(neighbors) => (StatusCode::OK, axum::Json(neighbors)).into_response(),
        Err(e) => error_response(e),
    }
}

/// Map a search error to a structured JSON payload, never a crash.
fn error_response(e: SearchError) -> Response {
    let status = match &e {
        SearchError::QueryNotFound(_) => StatusCode::NOT_FOUND,
        SearchError::StoreTooSmall { .. } => StatusCode::BAD_REQUEST,
    };
    (status, axum::Json(json!({ "error": e.to_string() }))).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_params_defaults() {
        let params: SearchParams =
            serde_json::from_str(r#"{"query": "Gene_1"}"#).unwrap();
        assert_eq!(params.query, "Gene_1");
        assert!(params.n.is_none());
        assert!(params.sim_threshold.is_none());
        assert!(!params.use_rationale);
    }

    #[test]
    fn test_similar_params_defaults() {
        let params: SimilarParams =
            serde_json::from_str(r#"{"query": "Gene_1"}"#).unwrap();
        assert_eq!(params.query, "Gene_1");
        assert!(params.top_k.is_none());

        let params: SimilarParams =
            serde_json::from_str(r#"{"query": "Gene_1", "top_k": 3}"#).unwrap();
        assert_eq!(params.top_k, Some(3));
    }

    #[test]
    fn test_search_params_full() {
        let params: SearchParams = serde_json::from_str(
            r#"{"query": "Gene_1", "n": 50, "sim_threshold": 0.5, "use_rationale": true}"#,
        )
        .unwrap();
        assert_eq!(params.n, Some(50));
        assert_eq!(params.sim_threshold, Some(0.5));
        assert!(params.use_rationale);
    }
}
