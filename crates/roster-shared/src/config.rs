//! Configuration management

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::PathBuf;

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub app: AppSettings,
    pub storage: StorageSettings,
    pub session: SessionSettings,
    pub security: SecuritySettings,
    pub mail: MailSettings,
    pub logging: LoggingSettings,
    #[serde(default)]
    pub bootstrap: Option<BootstrapDeveloper>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppSettings {
    pub env: String,
    pub host: String,
    pub port: u16,
    pub name: String,
    /// Apex domain tenants hang off as subdomains, e.g. `roster.example`.
    pub base_domain: String,
    pub request_timeout_seconds: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StorageSettings {
    pub data_dir: PathBuf,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SessionSettings {
    pub secret: String,
    pub ttl_seconds: i64,
    pub secure_cookies: bool,
    pub default_employee_password: bool,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SecuritySettings {
    pub login_attempts_per_minute: u32,
    pub allowed_origins: Vec<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct MailSettings {
    pub enabled: bool,
    pub smtp_host: String,
    pub smtp_port: u16,
    pub smtp_username: String,
    pub smtp_password: String,
    pub from_address: String,
    /// Public origin password links are built on.
    pub reset_link_base: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingSettings {
    pub json: bool,
    pub directory: Option<PathBuf>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct BootstrapDeveloper {
    pub username: String,
    pub password: String,
    pub full_name: String,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        let env = std::env::var("APP_ENV").unwrap_or_else(|_| "development".into());
        let config = Config::builder()
            .set_default("app.env", "development")?
            .set_default("app.host", "127.0.0.1")?
            .set_default("app.port", 8080)?
            .set_default("app.name", "roster-server")?
            .set_default("app.base_domain", "localhost")?
            .set_default("app.request_timeout_seconds", 30)?
            .set_default("storage.data_dir", "data")?
            .set_default("session.secret", "dev_secret")?
            .set_default("session.ttl_seconds", crate::constants::DEFAULT_SESSION_TTL_SECONDS)?
            .set_default("session.secure_cookies", false)?
            .set_default("session.default_employee_password", true)?
            .set_default("security.login_attempts_per_minute", 10)?
            .set_default("security.allowed_origins", Vec::<String>::new())?
            .set_default("mail.enabled", false)?
            .set_default("mail.smtp_host", "localhost")?
            .set_default("mail.smtp_port", 587)?
            .set_default("mail.smtp_username", "")?
            .set_default("mail.smtp_password", "")?
            .set_default("mail.from_address", "roster@localhost")?
            .set_default("mail.reset_link_base", "http://localhost:8080")?
            .set_default("logging.json", true)?
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", env)).required(false))
            .add_source(Environment::with_prefix("APP").separator("__").try_parsing(true))
            .build()?;
        config.try_deserialize()
    }

    pub fn is_production(&self) -> bool {
        self.app.env == "production"
    }
}
