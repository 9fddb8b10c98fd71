//! Persistence interface consumed by the domain operations.
//!
//! Uniqueness of `users.email` and `companies.tax_id` is enforced by the
//! backend at write time; a violated constraint surfaces as
//! [`StoreError::Conflict`] so callers can translate it even when their own
//! pre-check lost a race.

pub mod memory;

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::models::{Company, CompanyChanges, NewCompany, NewUser, User, UserChanges};

pub use memory::MemoryStore;

/// Globally unique columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UniqueField {
    Email,
    TaxId,
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("unique constraint violated on {0:?}")]
    Conflict(UniqueField),

    #[error("store backend error: {0}")]
    Backend(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

#[async_trait]
pub trait Store: Send + Sync {
    async fn find_user_by_id(&self, id: Uuid) -> StoreResult<Option<User>>;

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>>;

    async fn find_company_by_id(&self, id: Uuid) -> StoreResult<Option<Company>>;

    async fn find_company_by_tax_id(&self, tax_id: &str) -> StoreResult<Option<Company>>;

    /// Creates a company and its first user atomically. Either both rows
    /// exist afterwards or neither does. `admin.company_id` is ignored and
    /// replaced with the new company's id.
    async fn create_company_with_admin(
        &self,
        company: NewCompany,
        admin: NewUser,
    ) -> StoreResult<(Company, User)>;

    async fn create_user(&self, user: NewUser) -> StoreResult<User>;

    /// Active users of one company, newest first.
    async fn list_active_users(&self, company_id: Uuid) -> StoreResult<Vec<User>>;

    /// Returns `None` when no row has this id.
    async fn update_user(&self, id: Uuid, changes: UserChanges) -> StoreResult<Option<User>>;

    async fn update_company(
        &self,
        id: Uuid,
        changes: CompanyChanges,
    ) -> StoreResult<Option<Company>>;

    /// Soft delete: flips `active` to false. The row is kept.
    async fn deactivate_user(&self, id: Uuid) -> StoreResult<()>;
}
