use axum::Json;
use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use uuid::Uuid;

use crate::auth::Authorized;
use crate::auth::gate::{AdminOnly, AdminOrSupervisor};
use crate::error::AppError;
use crate::models::{CreatedUser, UserView};
use crate::services::company::actor_company_id;
use crate::services::users::{self, NewUserRequest, UserPatch};
use crate::state::SharedState;
use crate::validation;

pub async fn list(
    auth: Authorized<AdminOrSupervisor>,
    State(state): State<SharedState>,
) -> Result<Json<Vec<UserView>>, AppError> {
    let store = state.store.as_ref();
    let company_id = actor_company_id(store, auth.user.user_id).await?;
    let users = users::list_users_by_company(store, company_id).await?;
    Ok(Json(users))
}

pub async fn get(
    auth: Authorized<AdminOrSupervisor>,
    State(state): State<SharedState>,
    id: Result<Path<Uuid>, PathRejection>,
) -> Result<Json<UserView>, AppError> {
    let Path(id) = id?;
    let store = state.store.as_ref();
    let company_id = actor_company_id(store, auth.user.user_id).await?;
    let user = users::get_user_by_id(store, company_id, id).await?;
    Ok(Json(user))
}

pub async fn create(
    auth: Authorized<AdminOnly>,
    State(state): State<SharedState>,
    payload: Result<Json<NewUserRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<CreatedUser>), AppError> {
    let Json(req) = payload?;
    validation::new_user(&req)?;

    let created = users::create_user(
        state.store.as_ref(),
        &state.credentials,
        req,
        auth.user.user_id,
    )
    .await?;

    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn update(
    auth: Authorized<AdminOrSupervisor>,
    State(state): State<SharedState>,
    id: Result<Path<Uuid>, PathRejection>,
    payload: Result<Json<UserPatch>, JsonRejection>,
) -> Result<Json<UserView>, AppError> {
    let Path(id) = id?;
    let Json(patch) = payload?;
    validation::user_patch(&patch)?;

    let store = state.store.as_ref();
    let company_id = actor_company_id(store, auth.user.user_id).await?;
    let user = users::update_user(store, &state.credentials, company_id, id, patch).await?;
    Ok(Json(user))
}

pub async fn delete(
    auth: Authorized<AdminOnly>,
    State(state): State<SharedState>,
    id: Result<Path<Uuid>, PathRejection>,
) -> Result<StatusCode, AppError> {
    let Path(id) = id?;
    users::delete_user(state.store.as_ref(), id, auth.user.user_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
