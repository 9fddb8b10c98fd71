use serde::Deserialize;
use uuid::Uuid;

use super::{ServiceError, ServiceResult};
use crate::auth::Credentials;
use crate::models::{CreatedUser, NewUser, Role, User, UserChanges, UserView};
use crate::store::Store;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewUserRequest {
    pub email: String,
    pub full_name: String,
    pub password: String,
    pub role_id: i32,
    /// Accepted for client compatibility; the acting admin's company is
    /// always used instead.
    #[serde(default)]
    pub company_id: Option<Uuid>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct UserPatch {
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub role_id: Option<i32>,
    pub active: Option<bool>,
}

impl UserPatch {
    pub fn is_empty(&self) -> bool {
        self.full_name.is_none()
            && self.email.is_none()
            && self.password.is_none()
            && self.role_id.is_none()
            && self.active.is_none()
    }
}

/// Provisions a user inside the acting admin's company.
pub async fn create_user(
    store: &dyn Store,
    credentials: &Credentials,
    input: NewUserRequest,
    acting_admin_id: Uuid,
) -> ServiceResult<CreatedUser> {
    if store.find_user_by_email(&input.email).await?.is_some() {
        return Err(ServiceError::EmailAlreadyExists);
    }

    let admin = store
        .find_user_by_id(acting_admin_id)
        .await?
        .filter(|admin| admin.active)
        .ok_or(ServiceError::AdminUserNotFound)?;

    let role = Role::from_id(input.role_id).ok_or(ServiceError::RoleNotFound)?;

    if let Some(requested) = input.company_id {
        if requested != admin.company_id {
            tracing::warn!(
                admin_id = %admin.id,
                %requested,
                "ignoring foreign companyId on user creation"
            );
        }
    }

    let password_hash = credentials
        .passwords
        .hash(&input.password)
        .await
        .map_err(ServiceError::Internal)?;

    let user = store
        .create_user(NewUser {
            email: input.email,
            full_name: input.full_name,
            password_hash,
            company_id: admin.company_id,
            role_id: role.id(),
        })
        .await?;

    tracing::info!(user_id = %user.id, company_id = %user.company_id, role = %role, "user created");

    Ok(CreatedUser::from(user))
}

pub async fn list_users_by_company(
    store: &dyn Store,
    company_id: Uuid,
) -> ServiceResult<Vec<UserView>> {
    let users = store.list_active_users(company_id).await?;
    Ok(users.into_iter().map(UserView::from).collect())
}

/// Active or inactive users of `company_id`. Users of other companies are
/// reported as not found.
pub async fn get_user_by_id(
    store: &dyn Store,
    company_id: Uuid,
    id: Uuid,
) -> ServiceResult<UserView> {
    let user = find_in_company(store, company_id, id).await?;
    Ok(UserView::from(user))
}

/// Applies the fields present in `patch`; omitted fields are untouched.
pub async fn update_user(
    store: &dyn Store,
    credentials: &Credentials,
    company_id: Uuid,
    id: Uuid,
    patch: UserPatch,
) -> ServiceResult<UserView> {
    find_in_company(store, company_id, id).await?;

    if let Some(role_id) = patch.role_id {
        Role::from_id(role_id).ok_or(ServiceError::RoleNotFound)?;
    }

    let password_hash = match patch.password {
        Some(password) => Some(
            credentials
                .passwords
                .hash(&password)
                .await
                .map_err(ServiceError::Internal)?,
        ),
        None => None,
    };

    let updated = store
        .update_user(
            id,
            UserChanges {
                email: patch.email,
                full_name: patch.full_name,
                password_hash,
                role_id: patch.role_id,
                active: patch.active,
            },
        )
        .await?
        .ok_or(ServiceError::UserNotFound)?;

    tracing::info!(user_id = %updated.id, "user updated");

    Ok(UserView::from(updated))
}

/// Soft-deletes a user of the acting admin's company. Deleting an already
/// inactive user reports `USER_NOT_FOUND`.
pub async fn delete_user(
    store: &dyn Store,
    target_id: Uuid,
    acting_admin_id: Uuid,
) -> ServiceResult<()> {
    let admin = store
        .find_user_by_id(acting_admin_id)
        .await?
        .filter(|admin| admin.active)
        .ok_or(ServiceError::Forbidden)?;

    let target = store
        .find_user_by_id(target_id)
        .await?
        .filter(|target| target.active)
        .ok_or(ServiceError::UserNotFound)?;

    if target.company_id != admin.company_id {
        tracing::warn!(
            admin_id = %admin.id,
            target_id = %target.id,
            "cross-tenant delete rejected"
        );
        return Err(ServiceError::Forbidden);
    }

    store.deactivate_user(target.id).await?;

    tracing::info!(user_id = %target.id, admin_id = %admin.id, "user deactivated");

    Ok(())
}

async fn find_in_company(store: &dyn Store, company_id: Uuid, id: Uuid) -> ServiceResult<User> {
    store
        .find_user_by_id(id)
        .await?
        .filter(|user| user.company_id == company_id)
        .ok_or(ServiceError::UserNotFound)
}
