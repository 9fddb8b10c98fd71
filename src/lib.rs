pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod rate_limit;
pub mod routes;
pub mod services;
pub mod state;
pub mod store;
pub mod validation;

use std::sync::Arc;
use std::time::Instant;

use axum::Router;
use axum::http::{HeaderName, HeaderValue, Method, header};
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;

use crate::auth::Credentials;
use crate::config::Config;
use crate::rate_limit::RequestRateLimiter;
use crate::state::{AppState, SharedState};
use crate::store::Store;

pub fn build_state(store: Arc<dyn Store>, config: Config) -> Result<SharedState, String> {
    let credentials = Credentials::from_config(&config)?;
    let limiter = RequestRateLimiter::new(config.rate_limit);

    Ok(Arc::new(AppState {
        store,
        credentials,
        config,
        limiter,
        started_at: Instant::now(),
    }))
}

pub fn build_app(store: Arc<dyn Store>, config: Config) -> Result<Router, String> {
    let state = build_state(store, config)?;
    router(state)
}

pub fn router(state: SharedState) -> Result<Router, String> {
    let cors = cors_layer(&state.config.cors_origin)?;
    let max_body_size = state.config.max_body_size;

    let app = Router::new()
        .merge(routes::api_routes())
        .route("/health", axum::routing::get(routes::system::health))
        .fallback(routes::system::not_found)
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::rate_limit::limit_requests,
        ))
        .layer(RequestBodyLimitLayer::new(max_body_size))
        .layer(cors)
        .layer(SetResponseHeaderLayer::overriding(
            HeaderName::from_static("x-content-type-options"),
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            HeaderName::from_static("x-frame-options"),
            HeaderValue::from_static("DENY"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            HeaderName::from_static("referrer-policy"),
            HeaderValue::from_static("strict-origin-when-cross-origin"),
        ))
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    Ok(app)
}

fn cors_layer(origin: &str) -> Result<CorsLayer, String> {
    let allow_origin = if origin == "*" {
        AllowOrigin::any()
    } else {
        let value = HeaderValue::from_str(origin)
            .map_err(|e| format!("Invalid CORS origin {origin:?}: {e}"))?;
        AllowOrigin::exact(value)
    };

    Ok(CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]))
}
