use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;

use crate::auth::gate::AdminOnly;
use crate::auth::{AuthUser, Authorized};
use crate::error::AppError;
use crate::models::Company;
use crate::services::company::{self, CompanyPatch, actor_company_id};
use crate::state::SharedState;
use crate::validation;

pub async fn me(
    auth: AuthUser,
    State(state): State<SharedState>,
) -> Result<Json<Company>, AppError> {
    let company = company::get_company_for_user(state.store.as_ref(), auth.user_id).await?;
    Ok(Json(company))
}

/// Updates the caller's own company.
pub async fn update(
    auth: Authorized<AdminOnly>,
    State(state): State<SharedState>,
    payload: Result<Json<CompanyPatch>, JsonRejection>,
) -> Result<Json<Company>, AppError> {
    let Json(patch) = payload?;
    validation::company_patch(&patch)?;

    let store = state.store.as_ref();
    let company_id = actor_company_id(store, auth.user.user_id).await?;
    let company = company::update_company(store, company_id, patch).await?;
    Ok(Json(company))
}
