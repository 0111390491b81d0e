use std::sync::Arc;

use sqlx::PgPool;

use crate::config::Config;
use crate::email::OtpMailer;
use crate::providers::ProviderRegistry;
use crate::rate_limit::LoginRateLimiter;
use crate::storage::MediaStore;

pub type SharedState = Arc<AppState>;

pub struct AppState {
    pub pool: PgPool,
    pub config: Config,
    pub providers: ProviderRegistry,
    pub storage: Option<MediaStore>,
    pub mailer: Option<Arc<OtpMailer>>,
    pub login_limiter: LoginRateLimiter,
}
