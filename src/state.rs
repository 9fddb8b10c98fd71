use std::sync::Arc;
use std::time::Instant;

use crate::auth::Credentials;
use crate::config::Config;
use crate::rate_limit::RequestRateLimiter;
use crate::store::Store;

pub type SharedState = Arc<AppState>;

pub struct AppState {
    pub store: Arc<dyn Store>,
    pub credentials: Credentials,
    pub config: Config,
    pub limiter: RequestRateLimiter,
    pub started_at: Instant,
}
