use std::sync::Arc;

use roster_core::ports::{Mailer, SheetFetcher};
use roster_core::repositories::{DeveloperRepository, TenantRepository, WorkspaceRepository};
use roster_core::services::{AuthOptions, AuthService, RequestService, RosterService, TenantLocks, TenantService};
use roster_security::JwtService;
use roster_shared::config::AppConfig;

use crate::metrics::ApiMetrics;
use crate::rate_limit::LoginLimiter;

/// Storage and outbound adapters the services are built on.
pub struct Backends {
    pub tenants: Arc<dyn TenantRepository>,
    pub developers: Arc<dyn DeveloperRepository>,
    pub workspace: Arc<dyn WorkspaceRepository>,
    pub fetcher: Arc<dyn SheetFetcher>,
    pub mailer: Arc<dyn Mailer>,
}

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub tenants: Arc<TenantService>,
    pub auth: Arc<AuthService>,
    pub roster: Arc<RosterService>,
    pub requests: Arc<RequestService>,
    pub login_limiter: Arc<LoginLimiter>,
    pub metrics: Arc<ApiMetrics>,
}

impl AppState {
    pub fn new(config: AppConfig, backends: Backends) -> Result<Self, prometheus::Error> {
        let locks = Arc::new(TenantLocks::new());
        let jwt = Arc::new(JwtService::new(&config.session.secret, config.session.ttl_seconds));

        let tenants = TenantService::new(backends.tenants, backends.workspace.clone(), locks.clone());
        let auth = AuthService::new(
            backends.developers,
            backends.workspace.clone(),
            backends.mailer,
            jwt,
            locks.clone(),
            AuthOptions {
                default_employee_password: config.session.default_employee_password,
                reset_link_base: config.mail.reset_link_base.clone(),
            },
        );
        let roster = RosterService::new(backends.workspace.clone(), locks.clone(), backends.fetcher);
        let requests = RequestService::new(backends.workspace, locks);

        Ok(Self {
            login_limiter: Arc::new(LoginLimiter::new(config.security.login_attempts_per_minute)),
            metrics: Arc::new(ApiMetrics::new()?),
            config: Arc::new(config),
            tenants: Arc::new(tenants),
            auth: Arc::new(auth),
            roster: Arc::new(roster),
            requests: Arc::new(requests),
        })
    }

    pub fn secure_cookies(&self) -> bool {
        self.config.session.secure_cookies
    }
}
