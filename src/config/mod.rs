//! Application configuration

mod app_config;

pub use app_config::{
    AppConfig, AuthSettings, JwtSettings, LogFormat, LoggingConfig, PasswordHashing, ServerConfig,
};
