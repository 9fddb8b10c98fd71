use argon2::{
    Algorithm, Argon2, Params, PasswordHasher as _, PasswordVerifier, Version,
    password_hash::{PasswordHash, SaltString, rand_core::OsRng},
};

/// Argon2id work factor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HashCost {
    pub memory_kib: u32,
    pub iterations: u32,
}

impl Default for HashCost {
    fn default() -> Self {
        Self {
            memory_kib: 19 * 1024,
            iterations: 2,
        }
    }
}

/// Salted one-way password hashing. Work runs on the blocking pool.
#[derive(Clone)]
pub struct PasswordHasher {
    params: Params,
    /// Hash of a throwaway secret with the same params, checked when there
    /// is no stored hash so every login attempt costs one verification.
    decoy_hash: String,
}

impl PasswordHasher {
    pub fn new(cost: HashCost) -> Result<Self, String> {
        let params = Params::new(cost.memory_kib, cost.iterations, 1, None)
            .map_err(|e| format!("Invalid password hash params: {e}"))?;
        let decoy_hash = hash_with(params.clone(), "tenantdesk-decoy-secret")?;
        Ok(Self { params, decoy_hash })
    }

    pub async fn hash(&self, password: &str) -> Result<String, String> {
        let params = self.params.clone();
        let password = password.to_owned();
        tokio::task::spawn_blocking(move || hash_with(params, &password))
            .await
            .map_err(|e| format!("Hashing task failed: {e}"))?
    }

    /// `Ok(false)` on mismatch; `Err` only when the stored hash is unreadable.
    pub async fn verify(&self, password: &str, hash: &str) -> Result<bool, String> {
        let password = password.to_owned();
        let hash = hash.to_owned();
        tokio::task::spawn_blocking(move || verify(&password, &hash))
            .await
            .map_err(|e| format!("Verification task failed: {e}"))?
    }

    /// Spends one verification on the decoy hash. Always `false`.
    pub async fn verify_decoy(&self, password: &str) -> Result<bool, String> {
        self.verify(password, &self.decoy_hash).await?;
        Ok(false)
    }
}

fn hash_with(params: Params, password: &str) -> Result<String, String> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|e| format!("Hashing failed: {e}"))
}

fn verify(password: &str, hash: &str) -> Result<bool, String> {
    let parsed = PasswordHash::new(hash).map_err(|e| format!("Invalid hash: {e}"))?;
    match Argon2::default().verify_password(password.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(format!("Verification failed: {e}")),
    }
}
