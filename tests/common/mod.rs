#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde_json::{Value, json};
use uuid::Uuid;

use tenantdesk::auth::{TokenKeys, TokenPayload};
use tenantdesk::config::Config;
use tenantdesk::models::{Company, CompanyChanges, NewCompany, NewUser, User, UserChanges};
use tenantdesk::store::{MemoryStore, Store, StoreResult};

pub const JWT_SECRET: &str = "integration-test-secret";

/// In-memory store that counts every call made through it.
#[derive(Default)]
pub struct CountingStore {
    inner: MemoryStore,
    calls: AtomicUsize,
}

impl CountingStore {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn hit(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl Store for CountingStore {
    async fn find_user_by_id(&self, id: Uuid) -> StoreResult<Option<User>> {
        self.hit();
        self.inner.find_user_by_id(id).await
    }

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        self.hit();
        self.inner.find_user_by_email(email).await
    }

    async fn find_company_by_id(&self, id: Uuid) -> StoreResult<Option<Company>> {
        self.hit();
        self.inner.find_company_by_id(id).await
    }

    async fn find_company_by_tax_id(&self, tax_id: &str) -> StoreResult<Option<Company>> {
        self.hit();
        self.inner.find_company_by_tax_id(tax_id).await
    }

    async fn create_company_with_admin(
        &self,
        company: NewCompany,
        admin: NewUser,
    ) -> StoreResult<(Company, User)> {
        self.hit();
        self.inner.create_company_with_admin(company, admin).await
    }

    async fn create_user(&self, user: NewUser) -> StoreResult<User> {
        self.hit();
        self.inner.create_user(user).await
    }

    async fn list_active_users(&self, company_id: Uuid) -> StoreResult<Vec<User>> {
        self.hit();
        self.inner.list_active_users(company_id).await
    }

    async fn update_user(&self, id: Uuid, changes: UserChanges) -> StoreResult<Option<User>> {
        self.hit();
        self.inner.update_user(id, changes).await
    }

    async fn update_company(
        &self,
        id: Uuid,
        changes: CompanyChanges,
    ) -> StoreResult<Option<Company>> {
        self.hit();
        self.inner.update_company(id, changes).await
    }

    async fn deactivate_user(&self, id: Uuid) -> StoreResult<()> {
        self.hit();
        self.inner.deactivate_user(id).await
    }
}

/// A running test server backed by an in-memory store.
pub struct TestApp {
    pub addr: SocketAddr,
    pub client: Client,
    pub store: Arc<CountingStore>,
}

/// A registered company and a logged-in user of it.
pub struct Tenant {
    pub company_id: String,
    pub user_id: String,
    pub token: String,
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    /// Sign a token with the server's secret and an arbitrary lifetime.
    pub fn forge_token(&self, payload: &TokenPayload, ttl: chrono::Duration) -> String {
        TokenKeys::new(JWT_SECRET, ttl).issue(payload).unwrap()
    }

    pub async fn register(
        &self,
        full_name: &str,
        email: &str,
        company: &str,
        tax_id: &str,
    ) -> (Value, StatusCode) {
        let body = json!({
            "user": { "fullName": full_name, "email": email, "password": "123456" },
            "company": { "name": company, "taxId": tax_id },
        });
        self.post("/api/v1/auth/register", &body).await
    }

    pub async fn login(&self, email: &str, password: &str) -> (Value, StatusCode) {
        self.post(
            "/api/v1/auth/login",
            &json!({ "email": email, "password": password }),
        )
        .await
    }

    /// Register a company with an admin, log the admin in.
    pub async fn tenant(&self, email: &str, tax_id: &str) -> Tenant {
        let (body, status) = self.register("Admin User", email, "ACME", tax_id).await;
        assert_eq!(status, StatusCode::CREATED, "register failed: {body}");
        let company_id = body["companyId"].as_str().unwrap().to_string();

        let token = self.token_for(email, "123456").await;
        Tenant {
            company_id,
            user_id: body["id"].as_str().unwrap().to_string(),
            token,
        }
    }

    /// Create a user through the admin API and log it in.
    pub async fn member(&self, admin_token: &str, email: &str, role_id: i32) -> Tenant {
        let (body, status) = self
            .post_auth(
                "/api/v1/users",
                admin_token,
                &json!({
                    "email": email,
                    "fullName": "Team Member",
                    "password": "123456",
                    "roleId": role_id,
                }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "create user failed: {body}");

        let token = self.token_for(email, "123456").await;
        Tenant {
            company_id: body["companyId"].as_str().unwrap().to_string(),
            user_id: body["id"].as_str().unwrap().to_string(),
            token,
        }
    }

    pub async fn token_for(&self, email: &str, password: &str) -> String {
        let (body, status) = self.login(email, password).await;
        assert_eq!(status, StatusCode::OK, "login failed: {body}");
        body["token"].as_str().unwrap().to_string()
    }

    pub async fn get(&self, path: &str) -> (Value, StatusCode) {
        let resp = self
            .client
            .get(self.url(path))
            .send()
            .await
            .expect("get request failed");
        read(resp).await
    }

    pub async fn post(&self, path: &str, body: &Value) -> (Value, StatusCode) {
        let resp = self
            .client
            .post(self.url(path))
            .json(body)
            .send()
            .await
            .expect("post request failed");
        read(resp).await
    }

    /// Make an authenticated GET request.
    pub async fn get_auth(&self, path: &str, token: &str) -> (Value, StatusCode) {
        let resp = self
            .client
            .get(self.url(path))
            .bearer_auth(token)
            .send()
            .await
            .expect("get request failed");
        read(resp).await
    }

    /// Make an authenticated POST request with JSON body.
    pub async fn post_auth(&self, path: &str, token: &str, body: &Value) -> (Value, StatusCode) {
        let resp = self
            .client
            .post(self.url(path))
            .bearer_auth(token)
            .json(body)
            .send()
            .await
            .expect("post request failed");
        read(resp).await
    }

    /// Make an authenticated PUT request with JSON body.
    pub async fn put_auth(&self, path: &str, token: &str, body: &Value) -> (Value, StatusCode) {
        let resp = self
            .client
            .put(self.url(path))
            .bearer_auth(token)
            .json(body)
            .send()
            .await
            .expect("put request failed");
        read(resp).await
    }

    /// Make an authenticated PATCH request with JSON body.
    pub async fn patch_auth(&self, path: &str, token: &str, body: &Value) -> (Value, StatusCode) {
        let resp = self
            .client
            .patch(self.url(path))
            .bearer_auth(token)
            .json(body)
            .send()
            .await
            .expect("patch request failed");
        read(resp).await
    }

    /// Make an authenticated DELETE request.
    pub async fn delete_auth(&self, path: &str, token: &str) -> (Value, StatusCode) {
        let resp = self
            .client
            .delete(self.url(path))
            .bearer_auth(token)
            .send()
            .await
            .expect("delete request failed");
        read(resp).await
    }
}

async fn read(resp: reqwest::Response) -> (Value, StatusCode) {
    let status = resp.status();
    let body: Value = resp.json().await.unwrap_or(json!(null));
    (body, status)
}

pub fn test_config(rate_limit: u32) -> Config {
    let rate_limit = rate_limit.to_string();
    let vars = [
        ("DATABASE_URL", "postgres://unused/tenantdesk"),
        ("JWT_SECRET", JWT_SECRET),
        ("JWT_EXPIRES", "1h"),
        ("TENANTDESK_HOST", "127.0.0.1"),
        ("TENANTDESK_LOG_LEVEL", "warn"),
        ("TENANTDESK_RATE_LIMIT", rate_limit.as_str()),
        ("TENANTDESK_HASH_MEMORY_KIB", "1024"),
        ("TENANTDESK_HASH_ITERATIONS", "1"),
    ];
    Config::from_lookup(|key| {
        vars.iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v.to_string())
    })
    .expect("test config must be valid")
}

/// Spawn a test app with rate limiting disabled.
pub async fn spawn_app() -> TestApp {
    spawn_app_with(test_config(0)).await
}

pub async fn spawn_app_with(config: Config) -> TestApp {
    let store = Arc::new(CountingStore::default());
    let app = tenantdesk::build_app(store.clone(), config).expect("Failed to build app");

    // Bind to random port
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind to random port");
    let addr = listener.local_addr().unwrap();

    // Spawn server in background
    tokio::spawn(async move {
        axum::serve(
            listener,
            app.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .await
        .expect("Server failed");
    });

    let client = Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .unwrap();

    TestApp {
        addr,
        client,
        store,
    }
}
