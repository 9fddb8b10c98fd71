//! Request authorization decisions, independent of the HTTP framework.
//!
//! Two checks run in order: [`authenticate`] turns an `Authorization`
//! header into a verified [`TokenPayload`], and [`authorize`] tests the
//! payload's role against a route's allow-list. Routes may require the
//! first without the second.

use thiserror::Error;

use super::jwt::{TokenError, TokenKeys, TokenPayload};
use crate::models::Role;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum GateError {
    #[error("authentication required")]
    Unauthenticated,

    #[error("invalid token")]
    InvalidToken,

    #[error("token expired")]
    TokenExpired,

    #[error("insufficient role")]
    Forbidden,
}

/// Fixed allow-list of roles for a route.
pub trait RoleSet: Send + Sync + 'static {
    const ALLOWED: &'static [Role];
}

pub struct AdminOnly;

impl RoleSet for AdminOnly {
    const ALLOWED: &'static [Role] = &[Role::Admin];
}

pub struct AdminOrSupervisor;

impl RoleSet for AdminOrSupervisor {
    const ALLOWED: &'static [Role] = &[Role::Admin, Role::Supervisor];
}

/// Extracts the token from a `Bearer <token>` header value. The prefix is
/// checked before any signature work happens.
pub fn bearer_token(header: Option<&str>) -> Result<&str, GateError> {
    header
        .and_then(|value| value.strip_prefix("Bearer "))
        .ok_or(GateError::Unauthenticated)
}

pub fn authenticate(header: Option<&str>, keys: &TokenKeys) -> Result<TokenPayload, GateError> {
    let token = bearer_token(header)?;
    keys.verify(token)
        .map(|claims| claims.payload())
        .map_err(|e| match e {
            TokenError::Expired => GateError::TokenExpired,
            TokenError::Invalid | TokenError::Signing(_) => GateError::InvalidToken,
        })
}

pub fn authorize(identity: Option<&TokenPayload>, allowed: &[Role]) -> Result<(), GateError> {
    let identity = identity.ok_or(GateError::Unauthenticated)?;
    if allowed.iter().any(|role| role.id() == identity.role_id) {
        Ok(())
    } else {
        Err(GateError::Forbidden)
    }
}
