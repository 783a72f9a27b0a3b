use serde::Deserialize;

use crate::domain::DomainError;
use crate::infrastructure::auth::TokenConfig;
use crate::infrastructure::observability::MetricsConfig;
use crate::infrastructure::storage::StorageConfig;

/// Application configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub jwt: JwtSettings,
    #[serde(default)]
    pub auth: AuthSettings,
    #[serde(default)]
    pub metrics: MetricsConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Allow any origin, header and method
    #[serde(default = "default_true")]
    pub cors_allow_any_origin: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default)]
    pub format: LogFormat,
}

#[derive(Debug, Clone, Copy, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// `jwt` section
///
/// Key, issuer and audience have no defaults; start-up fails without them.
#[derive(Clone, Deserialize)]
pub struct JwtSettings {
    #[serde(default)]
    pub key: String,
    #[serde(default)]
    pub issuer: String,
    #[serde(default)]
    pub audience: String,
    #[serde(
        default = "default_expiry_in_minutes",
        alias = "ExpiryInMinutes",
        alias = "expiryinminutes"
    )]
    pub expiry_in_minutes: u64,
    #[serde(default)]
    pub leeway_seconds: u64,
}

impl std::fmt::Debug for JwtSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtSettings")
            .field("key", &"[hidden]")
            .field("issuer", &self.issuer)
            .field("audience", &self.audience)
            .field("expiry_in_minutes", &self.expiry_in_minutes)
            .field("leeway_seconds", &self.leeway_seconds)
            .finish()
    }
}

impl JwtSettings {
    /// Resolve and validate the token configuration
    pub fn token_config(&self) -> Result<TokenConfig, DomainError> {
        let config = TokenConfig::new(
            self.key.clone(),
            self.issuer.clone(),
            self.audience.clone(),
            self.expiry_in_minutes,
        )
        .with_leeway_seconds(self.leeway_seconds);

        config.validate()?;
        Ok(config)
    }
}

/// Password hashing scheme for new registrations
#[derive(Debug, Clone, Copy, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PasswordHashing {
    #[default]
    Argon2,
    /// Unsalted SHA-256, matching rows written by the legacy service
    Sha256,
}

/// `auth` section
#[derive(Debug, Clone, Deserialize)]
pub struct AuthSettings {
    #[serde(default)]
    pub password_hashing: PasswordHashing,
    /// Let the Argon2 hasher also verify legacy SHA-256 digests
    #[serde(default)]
    pub accept_legacy_hashes: bool,
    /// Role stamped on newly registered users
    #[serde(default = "default_role")]
    pub default_role: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_allow_any_origin: true,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
        }
    }
}

impl Default for JwtSettings {
    fn default() -> Self {
        Self {
            key: String::new(),
            issuer: String::new(),
            audience: String::new(),
            expiry_in_minutes: default_expiry_in_minutes(),
            leeway_seconds: 0,
        }
    }
}

impl Default for AuthSettings {
    fn default() -> Self {
        Self {
            password_hashing: PasswordHashing::default(),
            accept_legacy_hashes: false,
            default_role: default_role(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_true() -> bool {
    true
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_expiry_in_minutes() -> u64 {
    60
}

fn default_role() -> String {
    "user".to_string()
}

impl AppConfig {
    /// Load `config/default`, then `config/local`, then `APP__SECTION__KEY` variables
    pub fn load() -> Result<Self, config::ConfigError> {
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(
                config::Environment::with_prefix("APP")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}
