//! Account and company lifecycle operations.
//!
//! Every operation takes the store and credential primitives as arguments
//! and reports failures as a [`ServiceError`]. Mapping to HTTP happens in
//! [`crate::error`].

pub mod auth;
pub mod company;
pub mod users;

use thiserror::Error;

use crate::store::{StoreError, UniqueField};

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("Email already exists")]
    EmailAlreadyExists,

    #[error("Company already exists")]
    CompanyAlreadyExists,

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Acting administrator not found")]
    AdminUserNotFound,

    #[error("Role not found")]
    RoleNotFound,

    #[error("User not found")]
    UserNotFound,

    #[error("Company not found")]
    CompanyNotFound,

    #[error("You do not have permission to perform this action")]
    Forbidden,

    #[error("internal error: {0}")]
    Internal(String),
}

impl ServiceError {
    pub fn code(&self) -> &'static str {
        match self {
            ServiceError::EmailAlreadyExists => "EMAIL_ALREADY_EXISTS",
            ServiceError::CompanyAlreadyExists => "COMPANY_ALREADY_EXISTS",
            ServiceError::InvalidCredentials => "INVALID_CREDENTIALS",
            ServiceError::AdminUserNotFound => "ADMIN_USER_NOT_FOUND",
            ServiceError::RoleNotFound => "ROLE_NOT_FOUND",
            ServiceError::UserNotFound => "USER_NOT_FOUND",
            ServiceError::CompanyNotFound => "COMPANY_NOT_FOUND",
            ServiceError::Forbidden => "FORBIDDEN",
            ServiceError::Internal(_) => "INTERNAL",
        }
    }
}

impl From<StoreError> for ServiceError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Conflict(UniqueField::Email) => ServiceError::EmailAlreadyExists,
            StoreError::Conflict(UniqueField::TaxId) => ServiceError::CompanyAlreadyExists,
            StoreError::Backend(msg) => ServiceError::Internal(msg),
        }
    }
}

pub type ServiceResult<T> = Result<T, ServiceError>;
