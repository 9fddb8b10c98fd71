use sqlx::PgPool;
use uuid::Uuid;

use crate::models::{Company, CompanyChanges, NewCompany};

pub async fn create<'e, E: sqlx::PgExecutor<'e>>(
    executor: E,
    company: &NewCompany,
) -> Result<Company, sqlx::Error> {
    sqlx::query_as::<_, Company>(
        "INSERT INTO companies (name, tax_id) VALUES ($1, $2) RETURNING *",
    )
    .bind(&company.name)
    .bind(&company.tax_id)
    .fetch_one(executor)
    .await
}

pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Company>, sqlx::Error> {
    sqlx::query_as::<_, Company>("SELECT * FROM companies WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn find_by_tax_id(pool: &PgPool, tax_id: &str) -> Result<Option<Company>, sqlx::Error> {
    sqlx::query_as::<_, Company>("SELECT * FROM companies WHERE tax_id = $1")
        .bind(tax_id)
        .fetch_optional(pool)
        .await
}

pub async fn update(
    pool: &PgPool,
    id: Uuid,
    changes: &CompanyChanges,
) -> Result<Option<Company>, sqlx::Error> {
    sqlx::query_as::<_, Company>(
        "UPDATE companies SET
             name = COALESCE($2, name),
             tax_id = COALESCE($3, tax_id)
         WHERE id = $1 RETURNING *",
    )
    .bind(id)
    .bind(changes.name.as_deref())
    .bind(changes.tax_id.as_deref())
    .fetch_optional(pool)
    .await
}
