use sqlx::PgPool;
use uuid::Uuid;

use crate::models::{NewUser, User, UserChanges};

pub async fn create<'e, E: sqlx::PgExecutor<'e>>(
    executor: E,
    user: &NewUser,
) -> Result<User, sqlx::Error> {
    sqlx::query_as::<_, User>(
        "INSERT INTO users (email, full_name, password_hash, company_id, role_id)
         VALUES ($1, $2, $3, $4, $5) RETURNING *",
    )
    .bind(&user.email)
    .bind(&user.full_name)
    .bind(&user.password_hash)
    .bind(user.company_id)
    .bind(user.role_id)
    .fetch_one(executor)
    .await
}

pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = $1")
        .bind(email)
        .fetch_optional(pool)
        .await
}

pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn list_active_by_company(
    pool: &PgPool,
    company_id: Uuid,
) -> Result<Vec<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(
        "SELECT * FROM users WHERE company_id = $1 AND active = TRUE
         ORDER BY created_at DESC, id DESC",
    )
    .bind(company_id)
    .fetch_all(pool)
    .await
}

pub async fn update(
    pool: &PgPool,
    id: Uuid,
    changes: &UserChanges,
) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(
        "UPDATE users SET
             email = COALESCE($2, email),
             full_name = COALESCE($3, full_name),
             password_hash = COALESCE($4, password_hash),
             role_id = COALESCE($5, role_id),
             active = COALESCE($6, active)
         WHERE id = $1 RETURNING *",
    )
    .bind(id)
    .bind(changes.email.as_deref())
    .bind(changes.full_name.as_deref())
    .bind(changes.password_hash.as_deref())
    .bind(changes.role_id)
    .bind(changes.active)
    .fetch_optional(pool)
    .await
}

pub async fn deactivate(pool: &PgPool, id: Uuid) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE users SET active = FALSE WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(())
}
