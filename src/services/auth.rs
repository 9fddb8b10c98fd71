use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{ServiceError, ServiceResult};
use crate::auth::{Credentials, TokenPayload};
use crate::models::{CreatedUser, NewCompany, NewUser, Role};
use crate::store::Store;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterUser {
    pub full_name: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterCompany {
    pub name: String,
    pub tax_id: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Registration {
    pub user: RegisterUser,
    pub company: RegisterCompany,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginUser {
    pub id: Uuid,
    pub email: String,
    pub full_name: String,
    pub role: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct LoginOutcome {
    pub token: String,
    pub user: LoginUser,
}

/// Creates a company and its bootstrap administrator.
pub async fn register(
    store: &dyn Store,
    credentials: &Credentials,
    default_role: Role,
    input: Registration,
) -> ServiceResult<CreatedUser> {
    let Registration { user, company } = input;

    if store.find_user_by_email(&user.email).await?.is_some() {
        return Err(ServiceError::EmailAlreadyExists);
    }
    if store.find_company_by_tax_id(&company.tax_id).await?.is_some() {
        return Err(ServiceError::CompanyAlreadyExists);
    }

    let password_hash = credentials
        .passwords
        .hash(&user.password)
        .await
        .map_err(ServiceError::Internal)?;

    // The unique constraints decide races lost after the checks above.
    let (company, admin) = store
        .create_company_with_admin(
            NewCompany {
                name: company.name,
                tax_id: company.tax_id,
            },
            NewUser {
                email: user.email,
                full_name: user.full_name,
                password_hash,
                company_id: Uuid::nil(),
                role_id: default_role.id(),
            },
        )
        .await?;

    tracing::info!(company_id = %company.id, user_id = %admin.id, "company registered");

    Ok(CreatedUser::from(admin))
}

/// Checks credentials and issues an access token. Unknown email, inactive
/// account and wrong password all fail with the same error.
pub async fn login(
    store: &dyn Store,
    credentials: &Credentials,
    email: &str,
    password: &str,
) -> ServiceResult<LoginOutcome> {
    let user = match store.find_user_by_email(email).await? {
        Some(user) if user.active => user,
        _ => {
            // Same hashing cost as a wrong password.
            credentials
                .passwords
                .verify_decoy(password)
                .await
                .map_err(ServiceError::Internal)?;
            tracing::warn!("login rejected: unknown or inactive account");
            return Err(ServiceError::InvalidCredentials);
        }
    };

    let valid = credentials
        .passwords
        .verify(password, &user.password_hash)
        .await
        .map_err(ServiceError::Internal)?;
    if !valid {
        tracing::warn!(user_id = %user.id, "login rejected: wrong password");
        return Err(ServiceError::InvalidCredentials);
    }

    let role = Role::from_id(user.role_id).ok_or_else(|| {
        ServiceError::Internal(format!("user {} has unknown role {}", user.id, user.role_id))
    })?;

    let token = credentials
        .tokens
        .issue(&TokenPayload {
            user_id: user.id,
            email: user.email.clone(),
            role_id: user.role_id,
        })
        .map_err(|e| ServiceError::Internal(e.to_string()))?;

    Ok(LoginOutcome {
        token,
        user: LoginUser {
            id: user.id,
            email: user.email,
            full_name: user.full_name,
            role: role.name().to_string(),
        },
    })
}
