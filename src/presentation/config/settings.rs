use config::{Config, ConfigError, File};
use serde::Deserialize;

use crate::application::services::AuthMode;

use super::Environment;

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    #[serde(skip)]
    pub environment: Environment,
    pub server: ServerSettings,
    pub database: DatabaseSettings,
    pub storage: StorageSettings,
    pub vision: VisionSettings,
    pub auth: AuthSettings,
    pub retention: RetentionSettings,
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseSettings {
    /// Without a URL the service keeps its records in memory.
    pub url: Option<String>,
    pub max_connections: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageSettings {
    pub provider: StorageProviderSetting,
    pub local_path: String,
    pub bucket: Option<String>,
    pub region: Option<String>,
    pub endpoint: Option<String>,
    pub folder_prefix: String,
    pub max_upload_size_bytes: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageProviderSetting {
    Local,
    S3,
}

#[derive(Debug, Clone, Deserialize)]
pub struct VisionSettings {
    /// One of `openai`, `abacus`, `lmstudio`, `azure`.
    pub provider: String,
    pub base_url: Option<String>,
    pub azure_endpoint: Option<String>,
    pub api_version: Option<String>,
    pub api_key: String,
    pub model: String,
    pub max_tokens: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuthSettings {
    pub mode: AuthMode,
    pub app_password: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RetentionSettings {
    pub max_age_hours: u32,
    pub sweep_interval_secs: u64,
}

impl RetentionSettings {
    pub fn max_age(&self) -> chrono::Duration {
        chrono::Duration::hours(i64::from(self.max_age_hours))
    }

    pub fn sweep_interval(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.sweep_interval_secs.max(1))
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    pub json: bool,
}

impl Settings {
    /// Layers defaults, `appsettings.{environment}` and `APP_*` variables
    /// (`__` separates nested keys, e.g. `APP_DATABASE__URL`).
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = std::env::var("APP_ENVIRONMENT")
            .map(Environment::try_from)
            .unwrap_or(Ok(Environment::Local))
            .map_err(ConfigError::Message)?;

        let configuration = Config::builder()
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 3000)?
            .set_default("database.max_connections", 5)?
            .set_default("storage.provider", "local")?
            .set_default("storage.local_path", "./data/uploads")?
            .set_default("storage.folder_prefix", "")?
            .set_default("storage.max_upload_size_bytes", 104_857_600)?
            .set_default("vision.provider", "openai")?
            .set_default("vision.api_key", "")?
            .set_default("vision.model", "gpt-4o")?
            .set_default("vision.max_tokens", 2000)?
            .set_default("auth.mode", "users")?
            .set_default("retention.max_age_hours", 48)?
            .set_default("retention.sweep_interval_secs", 3600)?
            .set_default("logging.json", environment == Environment::Prod)?
            .add_source(
                File::with_name(&format!("appsettings.{}", environment.as_str().to_lowercase()))
                    .required(false),
            )
            .add_source(
                config::Environment::with_prefix("APP")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()?;

        let mut settings: Settings = configuration.try_deserialize()?;
        settings.environment = environment;
        Ok(settings)
    }
}
