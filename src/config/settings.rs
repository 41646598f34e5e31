use std::path::Path;

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};

use crate::{buffer::BufferConfig, error::SettingsError, logging::LoggingConfig};

/// Префикс переменных окружения: `TAGPACK__BUFFER__MAX_SIZE` и т.п.
pub const ENV_PREFIX: &str = "TAGPACK";
/// Имя необязательного файла конфигурации в текущем каталоге.
pub const DEFAULT_CONFIG_FILE: &str = "tagpack";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub buffer: BufferConfig,
    pub logging: LoggingConfig,
}

impl Settings {
    /// Загружает настройки: значения по умолчанию, `tagpack.toml` (если
    /// есть), переменные окружения.
    pub fn load() -> Result<Self, SettingsError> {
        Self::build(File::with_name(DEFAULT_CONFIG_FILE).required(false))
    }

    /// То же, что [`load`](Self::load), но файл задан явно и обязателен.
    pub fn load_from(path: &Path) -> Result<Self, SettingsError> {
        Self::build(File::from(path).required(true))
    }

    fn build<S>(file: S) -> Result<Self, SettingsError>
    where
        S: config::Source + Send + Sync + 'static,
    {
        let cfg = Config::builder()
            .add_source(file)
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let settings: Settings = cfg.try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), SettingsError> {
        self.buffer
            .validate()
            .map_err(|e| SettingsError::Invalid(e.to_string()))?;
        self.logging.validate().map_err(SettingsError::Invalid)?;
        Ok(())
    }
}
