//! Postgres-backed [`Store`].

pub mod companies;
pub mod users;

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::{Company, CompanyChanges, NewCompany, NewUser, User, UserChanges};
use crate::store::{Store, StoreError, StoreResult, UniqueField};

const USERS_EMAIL_KEY: &str = "users_email_key";
const COMPANIES_TAX_ID_KEY: &str = "companies_tax_id_key";

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(ref db_err) = err {
            if db_err.is_unique_violation() {
                match db_err.constraint() {
                    Some(USERS_EMAIL_KEY) => return StoreError::Conflict(UniqueField::Email),
                    Some(COMPANIES_TAX_ID_KEY) => {
                        return StoreError::Conflict(UniqueField::TaxId);
                    }
                    _ => {}
                }
            }
        }
        StoreError::Backend(err.to_string())
    }
}

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl Store for PgStore {
    async fn find_user_by_id(&self, id: Uuid) -> StoreResult<Option<User>> {
        Ok(users::find_by_id(&self.pool, id).await?)
    }

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        Ok(users::find_by_email(&self.pool, email).await?)
    }

    async fn find_company_by_id(&self, id: Uuid) -> StoreResult<Option<Company>> {
        Ok(companies::find_by_id(&self.pool, id).await?)
    }

    async fn find_company_by_tax_id(&self, tax_id: &str) -> StoreResult<Option<Company>> {
        Ok(companies::find_by_tax_id(&self.pool, tax_id).await?)
    }

    async fn create_company_with_admin(
        &self,
        company: NewCompany,
        admin: NewUser,
    ) -> StoreResult<(Company, User)> {
        // Dropping the transaction without commit rolls back the company row.
        let mut tx = self.pool.begin().await?;

        let company = companies::create(&mut *tx, &company).await?;
        let admin = users::create(
            &mut *tx,
            &NewUser {
                company_id: company.id,
                ..admin
            },
        )
        .await?;

        tx.commit().await?;
        Ok((company, admin))
    }

    async fn create_user(&self, user: NewUser) -> StoreResult<User> {
        Ok(users::create(&self.pool, &user).await?)
    }

    async fn list_active_users(&self, company_id: Uuid) -> StoreResult<Vec<User>> {
        Ok(users::list_active_by_company(&self.pool, company_id).await?)
    }

    async fn update_user(&self, id: Uuid, changes: UserChanges) -> StoreResult<Option<User>> {
        Ok(users::update(&self.pool, id, &changes).await?)
    }

    async fn update_company(
        &self,
        id: Uuid,
        changes: CompanyChanges,
    ) -> StoreResult<Option<Company>> {
        Ok(companies::update(&self.pool, id, &changes).await?)
    }

    async fn deactivate_user(&self, id: Uuid) -> StoreResult<()> {
        Ok(users::deactivate(&self.pool, id).await?)
    }
}
