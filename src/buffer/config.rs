use serde::{Deserialize, Serialize};
use tagpack_error::{GenericError, StatusCode};

/// Начальная ёмкость по умолчанию.
pub const DEFAULT_INITIAL_SIZE: usize = 1024;
/// Максимальный размер по умолчанию (1 МиБ).
pub const DEFAULT_MAX_SIZE: usize = 1024 * 1024;

/// Что делать со значением хоста, у которого нет представления в формате.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FallbackPolicy {
    /// Записать текстовое представление строкой (с предупреждением в лог).
    #[default]
    Stringify,
    /// Вернуть `BufferError::UnsupportedValue`.
    Reject,
}

/// Параметры одного экземпляра буфера.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BufferConfig {
    pub initial_size: usize,
    pub max_size: usize,
    pub fallback: FallbackPolicy,
}

impl Default for BufferConfig {
    fn default() -> Self {
        Self {
            initial_size: DEFAULT_INITIAL_SIZE,
            max_size: DEFAULT_MAX_SIZE,
            fallback: FallbackPolicy::default(),
        }
    }
}

impl BufferConfig {
    pub fn new(
        initial_size: usize,
        max_size: usize,
    ) -> Self {
        Self {
            initial_size,
            max_size,
            ..Default::default()
        }
    }

    pub fn with_fallback(
        mut self,
        fallback: FallbackPolicy,
    ) -> Self {
        self.fallback = fallback;
        self
    }

    /// Проверяет согласованность лимитов.
    ///
    /// Максимум хранится в конверте как `u32`, поэтому больше не бывает.
    pub fn validate(&self) -> Result<(), GenericError> {
        if self.max_size == 0 {
            return Err(GenericError::new(
                StatusCode::InvalidConfig,
                "buffer.max_size must be greater than zero",
            ));
        }
        if self.max_size > u32::MAX as usize {
            return Err(GenericError::new(
                StatusCode::InvalidConfig,
                format!("buffer.max_size {} exceeds {}", self.max_size, u32::MAX),
            ));
        }
        if self.initial_size > self.max_size {
            return Err(GenericError::new(
                StatusCode::InvalidConfig,
                format!(
                    "buffer.initial_size {} exceeds buffer.max_size {}",
                    self.initial_size, self.max_size
                ),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Тест проверяет, что конфигурация по умолчанию валидна.
    #[test]
    fn test_default_is_valid() {
        let config = BufferConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.fallback, FallbackPolicy::Stringify);
    }

    /// Тест проверяет отказ для несогласованных лимитов.
    #[test]
    fn test_validate_rejects_bad_limits() {
        assert!(BufferConfig::new(10, 0).validate().is_err());
        assert!(BufferConfig::new(100, 10).validate().is_err());
        assert!(BufferConfig::new(0, u32::MAX as usize + 1).validate().is_err());
        assert!(BufferConfig::new(0, 1).validate().is_ok());
    }

    /// Тест проверяет разбор политики из строки в нижнем регистре.
    #[test]
    fn test_fallback_deserialize() {
        let policy: FallbackPolicy = serde_json::from_str("\"reject\"").unwrap();
        assert_eq!(policy, FallbackPolicy::Reject);
    }
}
