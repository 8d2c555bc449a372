mod environment;
mod settings;

pub use environment::Environment;
pub use settings::{
    AuthSettings, DatabaseSettings, LoggingSettings, RetentionSettings, ServerSettings, Settings,
    StorageProviderSetting, StorageSettings, VisionSettings,
};
