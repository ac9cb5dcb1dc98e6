// Read-only HTTP routes over the stats collector

mod http;

use axum::{Router, http::Method, middleware, routing::get};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

use crate::collector::StatsSource;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) source: Arc<dyn StatsSource>,
}

pub fn app(source: Arc<dyn StatsSource>) -> Router {
    let state = AppState { source };
    Router::new()
        .route("/", get(http::root_handler)) // GET /
        .route("/stats", get(http::stats_handler)) // GET /stats
        .route("/version", get(http::version_handler)) // GET /version
        .layer(middleware::from_fn(http::read_only))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods([Method::GET]),
        )
        .with_state(state)
}
