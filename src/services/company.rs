use serde::Deserialize;
use uuid::Uuid;

use super::{ServiceError, ServiceResult};
use crate::models::{Company, CompanyChanges};
use crate::store::Store;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CompanyPatch {
    pub name: Option<String>,
    pub tax_id: Option<String>,
}

impl CompanyPatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.tax_id.is_none()
    }
}

/// Resolves the tenant of an authenticated caller. Tokens carry no
/// company id, so the store is the source of truth.
pub async fn actor_company_id(store: &dyn Store, actor_id: Uuid) -> ServiceResult<Uuid> {
    store
        .find_user_by_id(actor_id)
        .await?
        .filter(|actor| actor.active)
        .map(|actor| actor.company_id)
        .ok_or(ServiceError::Forbidden)
}

/// Company of an active caller. Deactivated callers are `FORBIDDEN`.
pub async fn get_company_for_user(store: &dyn Store, user_id: Uuid) -> ServiceResult<Company> {
    let company_id = actor_company_id(store, user_id).await?;

    store
        .find_company_by_id(company_id)
        .await?
        .ok_or(ServiceError::CompanyNotFound)
}

/// Applies the present fields of `patch`. Callers reject empty patches.
pub async fn update_company(
    store: &dyn Store,
    id: Uuid,
    patch: CompanyPatch,
) -> ServiceResult<Company> {
    if store.find_company_by_id(id).await?.is_none() {
        return Err(ServiceError::CompanyNotFound);
    }

    let company = store
        .update_company(
            id,
            CompanyChanges {
                name: patch.name,
                tax_id: patch.tax_id,
            },
        )
        .await?
        .ok_or(ServiceError::CompanyNotFound)?;

    tracing::info!(company_id = %company.id, "company updated");

    Ok(company)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Role;
    use crate::services::auth::{self, RegisterCompany, RegisterUser, Registration};
    use crate::services::test_support::credentials;
    use crate::services::users;
    use crate::store::MemoryStore;

    async fn register(store: &MemoryStore, email: &str, tax_id: &str) -> (Uuid, Uuid) {
        let created = auth::register(
            store,
            &credentials(),
            Role::Admin,
            Registration {
                user: RegisterUser {
                    full_name: "Ana Gómez".to_string(),
                    email: email.to_string(),
                    password: "123456".to_string(),
                },
                company: RegisterCompany {
                    name: "TextilSync SAS".to_string(),
                    tax_id: tax_id.to_string(),
                },
            },
        )
        .await
        .unwrap();
        (created.id, created.company_id)
    }

    #[tokio::test]
    async fn company_of_user_is_returned() {
        let store = MemoryStore::new();
        let (user_id, company_id) = register(&store, "ana@x.com", "900123456").await;

        let company = get_company_for_user(&store, user_id).await.unwrap();

        assert_eq!(company.id, company_id);
        assert_eq!(company.name, "TextilSync SAS");
        assert_eq!(company.tax_id, "900123456");
    }

    #[tokio::test]
    async fn unknown_user_is_forbidden_from_company() {
        let store = MemoryStore::new();
        let err = get_company_for_user(&store, Uuid::now_v7()).await.unwrap_err();
        assert_eq!(err.code(), "FORBIDDEN");
    }

    #[tokio::test]
    async fn update_changes_only_present_fields() {
        let store = MemoryStore::new();
        let (_, company_id) = register(&store, "ana@x.com", "900123456").await;

        let company = update_company(
            &store,
            company_id,
            CompanyPatch {
                name: Some("TextilSync Global".to_string()),
                tax_id: None,
            },
        )
        .await
        .unwrap();

        assert_eq!(company.name, "TextilSync Global");
        assert_eq!(company.tax_id, "900123456");
    }

    #[tokio::test]
    async fn update_unknown_company_fails() {
        let store = MemoryStore::new();
        let err = update_company(
            &store,
            Uuid::now_v7(),
            CompanyPatch {
                name: Some("Nope".to_string()),
                tax_id: None,
            },
        )
        .await
        .unwrap_err();
        assert_eq!(err.code(), "COMPANY_NOT_FOUND");
    }

    #[tokio::test]
    async fn update_to_taken_tax_id_conflicts() {
        let store = MemoryStore::new();
        let (_, first) = register(&store, "ana@x.com", "111").await;
        register(&store, "bob@x.com", "222").await;

        let err = update_company(
            &store,
            first,
            CompanyPatch {
                name: None,
                tax_id: Some("222".to_string()),
            },
        )
        .await
        .unwrap_err();
        assert_eq!(err.code(), "COMPANY_ALREADY_EXISTS");
    }

    #[tokio::test]
    async fn deactivated_actor_has_no_tenant() {
        let store = MemoryStore::new();
        let (admin_id, company_id) = register(&store, "ana@x.com", "111").await;
        let op = users::create_user(
            &store,
            &credentials(),
            users::NewUserRequest {
                email: "op@x.com".to_string(),
                full_name: "Operator".to_string(),
                password: "123456".to_string(),
                role_id: Role::Operator.id(),
                company_id: None,
            },
            admin_id,
        )
        .await
        .unwrap();

        assert_eq!(actor_company_id(&store, op.id).await.unwrap(), company_id);
        assert_eq!(get_company_for_user(&store, op.id).await.unwrap().id, company_id);

        users::delete_user(&store, op.id, admin_id).await.unwrap();
        let err = actor_company_id(&store, op.id).await.unwrap_err();
        assert_eq!(err.code(), "FORBIDDEN");
        let err = get_company_for_user(&store, op.id).await.unwrap_err();
        assert_eq!(err.code(), "FORBIDDEN");
    }
}
