use std::net::SocketAddr;

use axum::extract::{ConnectInfo, Request, State};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

use crate::error::AppError;
use crate::state::SharedState;

/// Rejects clients that exceed the configured request budget. Requests
/// without a peer address (in-process callers) pass through.
pub async fn limit_requests(State(state): State<SharedState>, req: Request, next: Next) -> Response {
    let peer = req
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip());

    if let Some(ip) = peer {
        if let Err(retry_after) = state.limiter.check(ip) {
            tracing::warn!(%ip, retry_after, "rate limit exceeded");
            return AppError::RateLimited { retry_after }.into_response();
        }
    }

    next.run(req).await
}
