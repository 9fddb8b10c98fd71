use std::net::IpAddr;

use chrono::Duration;

use crate::auth::HashCost;
use crate::models::Role;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub jwt_ttl: Duration,
    pub default_role: Role,
    pub host: IpAddr,
    pub port: u16,
    pub log_level: String,
    pub rate_limit: RateLimitConfig,
    pub cors_origin: String,
    pub max_body_size: usize,
    pub hash_cost: HashCost,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitConfig {
    /// Requests allowed per window and client IP. Zero disables limiting.
    pub max_requests: u32,
    pub window_secs: u64,
}

impl Config {
    pub fn from_env() -> Result<Self, String> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, String>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env_required = |key: &str| {
            lookup(key)
                .filter(|v| !v.is_empty())
                .ok_or_else(|| format!("Missing required environment variable: {key}"))
        };
        let env_or = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let database_url = env_required("DATABASE_URL")?;
        let jwt_secret = env_required("JWT_SECRET")?;
        let jwt_ttl = parse_ttl(&env_required("JWT_EXPIRES")?)
            .map_err(|e| format!("Invalid JWT_EXPIRES: {e}"))?;

        let default_role_id: i32 = env_or("DEFAULT_ROLE_ID", "1")
            .parse()
            .map_err(|e| format!("Invalid DEFAULT_ROLE_ID: {e}"))?;
        let default_role = Role::from_id(default_role_id)
            .ok_or_else(|| format!("DEFAULT_ROLE_ID {default_role_id} is not a known role"))?;

        let host: IpAddr = env_or("TENANTDESK_HOST", "0.0.0.0")
            .parse()
            .map_err(|e| format!("Invalid TENANTDESK_HOST: {e}"))?;

        let port: u16 = env_or("TENANTDESK_PORT", "3000")
            .parse()
            .map_err(|e| format!("Invalid TENANTDESK_PORT: {e}"))?;

        let log_level = env_or("TENANTDESK_LOG_LEVEL", "info");

        let max_requests: u32 = env_or("TENANTDESK_RATE_LIMIT", "20")
            .parse()
            .map_err(|e| format!("Invalid TENANTDESK_RATE_LIMIT: {e}"))?;
        let window_secs: u64 = env_or("TENANTDESK_RATE_LIMIT_WINDOW_SECS", "30")
            .parse()
            .map_err(|e| format!("Invalid TENANTDESK_RATE_LIMIT_WINDOW_SECS: {e}"))?;

        let cors_origin = env_or("TENANTDESK_CORS_ORIGIN", "*");

        let max_body_size: usize = env_or("TENANTDESK_MAX_BODY_SIZE", "1048576")
            .parse()
            .map_err(|e| format!("Invalid TENANTDESK_MAX_BODY_SIZE: {e}"))?;

        let defaults = HashCost::default();
        let hash_cost = HashCost {
            memory_kib: env_or("TENANTDESK_HASH_MEMORY_KIB", &defaults.memory_kib.to_string())
                .parse()
                .map_err(|e| format!("Invalid TENANTDESK_HASH_MEMORY_KIB: {e}"))?,
            iterations: env_or("TENANTDESK_HASH_ITERATIONS", &defaults.iterations.to_string())
                .parse()
                .map_err(|e| format!("Invalid TENANTDESK_HASH_ITERATIONS: {e}"))?,
        };

        Ok(Config {
            database_url,
            jwt_secret,
            jwt_ttl,
            default_role,
            host,
            port,
            log_level,
            rate_limit: RateLimitConfig {
                max_requests,
                window_secs,
            },
            cors_origin,
            max_body_size,
            hash_cost,
        })
    }
}

/// Parses a token lifetime such as `3600`, `90s`, `15m`, `1h` or `7d`.
pub fn parse_ttl(raw: &str) -> Result<Duration, String> {
    let raw = raw.trim();
    let (digits, unit) = match raw.find(|c: char| !c.is_ascii_digit()) {
        Some(idx) => raw.split_at(idx),
        None => (raw, "s"),
    };

    let amount: i64 = digits
        .parse()
        .map_err(|_| format!("'{raw}' is not a duration"))?;
    if amount == 0 {
        return Err("duration must be positive".to_string());
    }

    let ttl = match unit {
        "s" => Duration::try_seconds(amount),
        "m" => Duration::try_minutes(amount),
        "h" => Duration::try_hours(amount),
        "d" => Duration::try_days(amount),
        other => return Err(format!("unknown unit '{other}'")),
    };
    ttl.ok_or_else(|| format!("'{raw}' is out of range"))
}
