use serde::{Deserialize, Serialize};

/// Формат вывода событий.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Многострочный, для разработки
    Pretty,
    /// Одна строка на событие
    #[default]
    Compact,
    /// JSON на строку, для сбора логов
    Json,
}

impl std::str::FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pretty" => Ok(Self::Pretty),
            "compact" => Ok(Self::Compact),
            "json" => Ok(Self::Json),
            other => Err(format!("unknown log format '{other}'")),
        }
    }
}

const LEVELS: [&str; 6] = ["trace", "debug", "info", "warn", "error", "off"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Уровень по умолчанию; `RUST_LOG` имеет приоритет.
    pub level: String,
    pub format: LogFormat,
    pub with_ansi: bool,
    pub with_target: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::default(),
            with_ansi: true,
            with_target: false,
        }
    }
}

impl LoggingConfig {
    pub fn validate(&self) -> Result<(), String> {
        let level = self.level.to_ascii_lowercase();
        if !LEVELS.contains(&level.as_str()) {
            return Err(format!(
                "Invalid log level '{}', expected one of {}",
                self.level,
                LEVELS.join(", ")
            ));
        }
        Ok(())
    }

    /// Директива для `EnvFilter`: уровень для крейта и для зависимостей.
    pub fn build_filter_directive(&self) -> String {
        let level = self.level.to_ascii_lowercase();
        format!("{level},tagpack={level}")
    }
}
