use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use serde::Deserialize;

use crate::auth::{AuthUser, TokenPayload};
use crate::error::AppError;
use crate::models::CreatedUser;
use crate::services::auth::{self as accounts, LoginOutcome, Registration};
use crate::state::SharedState;
use crate::validation;

#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

pub async fn register(
    State(state): State<SharedState>,
    payload: Result<Json<Registration>, JsonRejection>,
) -> Result<(StatusCode, Json<CreatedUser>), AppError> {
    let Json(req) = payload?;
    validation::registration(&req)?;

    let created = accounts::register(
        state.store.as_ref(),
        &state.credentials,
        state.config.default_role,
        req,
    )
    .await?;

    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn login(
    State(state): State<SharedState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<LoginOutcome>, AppError> {
    let Json(req) = payload?;
    validation::login(&req.email, &req.password)?;

    let outcome =
        accounts::login(state.store.as_ref(), &state.credentials, &req.email, &req.password)
            .await?;

    Ok(Json(outcome))
}

/// Echoes the verified token payload.
pub async fn me(auth: AuthUser) -> Json<TokenPayload> {
    Json(auth.payload())
}
