use chrono::Duration;
use config::ConfigError;
use serde::Deserialize;
use std::env;
use std::path::Path;

use crate::error::AppError;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub logging: LoggingConfig,
    pub sms: SmsConfig,
    pub otp: OtpConfig,
    pub uploads: UploadConfig,
    pub admin: AdminConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite://snacks.db".to_string(),
            max_connections: 5,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

/// TextBee gateway settings. An empty `api_key` or `device_id` disables delivery.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SmsConfig {
    pub base_url: String,
    pub api_key: String,
    pub device_id: String,
    pub country_code: String,
    pub sender_name: String,
    pub timeout_secs: u64,
}

impl Default for SmsConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.textbee.dev".to_string(),
            api_key: String::new(),
            device_id: String::new(),
            country_code: "+91".to_string(),
            sender_name: "Divyam Snacks".to_string(),
            timeout_secs: 10,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OtpConfig {
    /// 0 disables the age check.
    pub ttl_secs: u64,
}

impl Default for OtpConfig {
    fn default() -> Self {
        Self { ttl_secs: 300 }
    }
}

impl OtpConfig {
    /// `None` when expiry is disabled.
    pub fn ttl(&self) -> Result<Option<Duration>, AppError> {
        if self.ttl_secs == 0 {
            return Ok(None);
        }

        i64::try_from(self.ttl_secs)
            .ok()
            .and_then(Duration::try_seconds)
            .map(Some)
            .ok_or_else(|| {
                AppError::Config(ConfigError::Message(format!(
                    "otp.ttl_secs out of range: {}",
                    self.ttl_secs
                )))
            })
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UploadConfig {
    pub dir: String,
    pub url_prefix: String,
    pub max_files: usize,
    pub max_body_bytes: usize,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            dir: "uploads".to_string(),
            url_prefix: "/uploads".to_string(),
            max_files: 5,
            max_body_bytes: 25 * 1024 * 1024,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AdminConfig {
    pub require_auth: bool,
    pub username: String,
    pub password: String,
    pub jwt_secret: String,
    pub token_expiry_hours: u64,
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            require_auth: false,
            username: "admin".to_string(),
            password: "admin123".to_string(),
            jwt_secret: "change-me".to_string(),
            token_expiry_hours: 12,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self, AppError> {
        let config_path = env::var("CONFIG_PATH").unwrap_or_else(|_| "config".to_string());

        let builder = config::Config::builder()
            .add_source(
                config::File::from(Path::new(&config_path).join("default")).required(false),
            )
            .add_source(
                config::Environment::with_prefix("APP")
                    .separator("__")
                    .try_parsing(true),
            )
            // 兼容旧部署的环境变量
            .set_override_option("server.port", env::var("PORT").ok())?
            .set_override_option("database.url", env::var("DATABASE_URL").ok())?
            .set_override_option("sms.api_key", env::var("TEXTBEE_API_KEY").ok())?
            .set_override_option("sms.device_id", env::var("TEXTBEE_DEVICE_ID").ok())?;

        let config = builder.build()?;
        let config: Config = config.try_deserialize()?;
        config.otp.ttl()?;

        Ok(config)
    }
}
