pub mod extractor;
pub mod gate;
pub mod jwt;
pub mod password;

use crate::config::Config;

pub use extractor::{AuthUser, Authorized};
pub use jwt::{TokenKeys, TokenPayload};
pub use password::{HashCost, PasswordHasher};

/// Hashing and token primitives handed to the domain operations.
pub struct Credentials {
    pub tokens: TokenKeys,
    pub passwords: PasswordHasher,
}

impl Credentials {
    pub fn from_config(config: &Config) -> Result<Self, String> {
        if config.jwt_secret.is_empty() {
            return Err("JWT secret must not be empty".to_string());
        }
        Ok(Self {
            tokens: TokenKeys::new(&config.jwt_secret, config.jwt_ttl),
            passwords: PasswordHasher::new(config.hash_cost)?,
        })
    }
}
