use std::marker::PhantomData;

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use uuid::Uuid;

use crate::auth::gate::{self, GateError, RoleSet};
use crate::auth::jwt::TokenPayload;
use crate::error::AppError;
use crate::state::SharedState;

/// Authenticated caller. Extraction verifies the bearer token and stores
/// the decoded payload in the request extensions.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: Uuid,
    pub email: String,
    pub role_id: i32,
}

impl AuthUser {
    pub fn payload(&self) -> TokenPayload {
        TokenPayload {
            user_id: self.user_id,
            email: self.email.clone(),
            role_id: self.role_id,
        }
    }
}

impl From<TokenPayload> for AuthUser {
    fn from(payload: TokenPayload) -> Self {
        Self {
            user_id: payload.user_id,
            email: payload.email,
            role_id: payload.role_id,
        }
    }
}

impl FromRequestParts<SharedState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &SharedState,
    ) -> Result<Self, Self::Rejection> {
        if let Some(payload) = parts.extensions.get::<TokenPayload>() {
            return Ok(AuthUser::from(payload.clone()));
        }

        let header = match parts.headers.get(AUTHORIZATION) {
            Some(value) => Some(value.to_str().map_err(|_| GateError::Unauthenticated)?),
            None => None,
        };

        let payload = gate::authenticate(header, &state.credentials.tokens)?;
        parts.extensions.insert(payload.clone());

        Ok(AuthUser::from(payload))
    }
}

/// Authenticated caller whose role is in `R::ALLOWED`. Rejects before the
/// handler body runs.
#[derive(Debug, Clone)]
pub struct Authorized<R> {
    pub user: AuthUser,
    _roles: PhantomData<fn() -> R>,
}

impl<R: RoleSet> FromRequestParts<SharedState> for Authorized<R> {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &SharedState,
    ) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        gate::authorize(parts.extensions.get::<TokenPayload>(), R::ALLOWED)?;

        Ok(Authorized {
            user,
            _roles: PhantomData,
        })
    }
}
