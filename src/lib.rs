pub mod api;
pub mod config;
pub mod error;
pub mod upstream;

use axum::{extract::DefaultBodyLimit, Router};
use tower_http::cors::{Any, CorsLayer};

pub use api::{AppState, GatewaySettings};
pub use config::Config;

/// The full HTTP application: routes, body limit and an open CORS policy.
pub fn app(state: AppState) -> Router {
    let body_limit = state.settings.body_limit_bytes;

    Router::new()
        .merge(api::router())
        .layer(DefaultBodyLimit::max(body_limit))
        // Browser clients call from any origin
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_headers(Any)
                .allow_methods(Any),
        )
        .with_state(state)
}
