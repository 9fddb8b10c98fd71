//! In-memory store for development and testing.
//!
//! All writes happen under one lock, so the uniqueness checks and the
//! inserts they guard are a single critical section.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{Store, StoreError, StoreResult, UniqueField};
use crate::models::{Company, CompanyChanges, NewCompany, NewUser, User, UserChanges};

#[derive(Default)]
struct Tables {
    users: HashMap<Uuid, User>,
    companies: HashMap<Uuid, Company>,
}

impl Tables {
    fn email_taken(&self, email: &str, except: Option<Uuid>) -> bool {
        self.users
            .values()
            .any(|u| u.email == email && Some(u.id) != except)
    }

    fn tax_id_taken(&self, tax_id: &str, except: Option<Uuid>) -> bool {
        self.companies
            .values()
            .any(|c| c.tax_id == tax_id && Some(c.id) != except)
    }

    fn insert_user(&mut self, new: NewUser) -> StoreResult<User> {
        if self.email_taken(&new.email, None) {
            return Err(StoreError::Conflict(UniqueField::Email));
        }
        if !self.companies.contains_key(&new.company_id) {
            return Err(StoreError::Backend(format!(
                "company {} does not exist",
                new.company_id
            )));
        }

        let user = User {
            id: Uuid::now_v7(),
            email: new.email,
            full_name: new.full_name,
            password_hash: new.password_hash,
            company_id: new.company_id,
            role_id: new.role_id,
            active: true,
            created_at: Utc::now(),
        };
        self.users.insert(user.id, user.clone());
        Ok(user)
    }
}

#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn find_user_by_id(&self, id: Uuid) -> StoreResult<Option<User>> {
        Ok(self.tables.read().await.users.get(&id).cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let tables = self.tables.read().await;
        Ok(tables.users.values().find(|u| u.email == email).cloned())
    }

    async fn find_company_by_id(&self, id: Uuid) -> StoreResult<Option<Company>> {
        Ok(self.tables.read().await.companies.get(&id).cloned())
    }

    async fn find_company_by_tax_id(&self, tax_id: &str) -> StoreResult<Option<Company>> {
        let tables = self.tables.read().await;
        Ok(tables
            .companies
            .values()
            .find(|c| c.tax_id == tax_id)
            .cloned())
    }

    async fn create_company_with_admin(
        &self,
        company: NewCompany,
        admin: NewUser,
    ) -> StoreResult<(Company, User)> {
        let mut tables = self.tables.write().await;

        // Check both constraints before touching either table.
        if tables.tax_id_taken(&company.tax_id, None) {
            return Err(StoreError::Conflict(UniqueField::TaxId));
        }
        if tables.email_taken(&admin.email, None) {
            return Err(StoreError::Conflict(UniqueField::Email));
        }

        let company = Company {
            id: Uuid::now_v7(),
            name: company.name,
            tax_id: company.tax_id,
            created_at: Utc::now(),
        };
        tables.companies.insert(company.id, company.clone());

        let user = tables.insert_user(NewUser {
            company_id: company.id,
            ..admin
        });
        match user {
            Ok(user) => Ok((company, user)),
            Err(e) => {
                tables.companies.remove(&company.id);
                Err(e)
            }
        }
    }

    async fn create_user(&self, user: NewUser) -> StoreResult<User> {
        self.tables.write().await.insert_user(user)
    }

    async fn list_active_users(&self, company_id: Uuid) -> StoreResult<Vec<User>> {
        let tables = self.tables.read().await;
        let mut users: Vec<User> = tables
            .users
            .values()
            .filter(|u| u.company_id == company_id && u.active)
            .cloned()
            .collect();
        users.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(users)
    }

    async fn update_user(&self, id: Uuid, changes: UserChanges) -> StoreResult<Option<User>> {
        let mut tables = self.tables.write().await;

        if let Some(email) = &changes.email {
            if tables.email_taken(email, Some(id)) {
                return Err(StoreError::Conflict(UniqueField::Email));
            }
        }

        let Some(user) = tables.users.get_mut(&id) else {
            return Ok(None);
        };
        if let Some(email) = changes.email {
            user.email = email;
        }
        if let Some(full_name) = changes.full_name {
            user.full_name = full_name;
        }
        if let Some(password_hash) = changes.password_hash {
            user.password_hash = password_hash;
        }
        if let Some(role_id) = changes.role_id {
            user.role_id = role_id;
        }
        if let Some(active) = changes.active {
            user.active = active;
        }
        Ok(Some(user.clone()))
    }

    async fn update_company(
        &self,
        id: Uuid,
        changes: CompanyChanges,
    ) -> StoreResult<Option<Company>> {
        let mut tables = self.tables.write().await;

        if let Some(tax_id) = &changes.tax_id {
            if tables.tax_id_taken(tax_id, Some(id)) {
                return Err(StoreError::Conflict(UniqueField::TaxId));
            }
        }

        let Some(company) = tables.companies.get_mut(&id) else {
            return Ok(None);
        };
        if let Some(name) = changes.name {
            company.name = name;
        }
        if let Some(tax_id) = changes.tax_id {
            company.tax_id = tax_id;
        }
        Ok(Some(company.clone()))
    }

    async fn deactivate_user(&self, id: Uuid) -> StoreResult<()> {
        if let Some(user) = self.tables.write().await.users.get_mut(&id) {
            user.active = false;
        }
        Ok(())
    }
}
