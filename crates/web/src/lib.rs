//! HTTP surface for the brokerage site.
//!
//! Every provider is built once at startup and shared read-only through
//! [`AppState`]. A provider left unconfigured makes the endpoints that need
//! it answer with a configuration error instead of silently doing nothing.

pub mod config;
pub mod directory;
pub mod error;
pub mod routes;
pub mod state;

pub use config::{Brokerage, Config, ConfigError};
pub use error::ApiError;
pub use state::AppState;

use axum::Router;
use tower_http::trace::TraceLayer;

/// Build the application with request tracing.
pub fn app(state: AppState) -> Router {
    routes::router()
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
