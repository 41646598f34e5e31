//! Ошибки крейта.
//!
//! Ошибки формата и буфера живут в `tagpack-error`; здесь они
//! переэкспортируются вместе с ошибками загрузки настроек.

use std::any::Any;

pub use tagpack_error::{
    BufferError, ErrorExt, GenericError, ResultExt, StackError, StatusCode, TagpackResult,
};
use thiserror::Error;

/// Результат операций буфера.
pub type BufferResult<T> = Result<T, BufferError>;

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

impl ErrorExt for SettingsError {
    fn status_code(&self) -> StatusCode {
        StatusCode::InvalidConfig
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn client_message(&self) -> String {
        self.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Тест проверяет код статуса и перенос в StackError.
    #[test]
    fn test_settings_error_into_stack() {
        let err = SettingsError::Invalid("max_size is zero".into());
        assert_eq!(err.status_code(), StatusCode::InvalidConfig);
        let stack: StackError = err.into();
        assert_eq!(stack.status_code(), StatusCode::InvalidConfig);
        assert!(stack.to_string().contains("max_size is zero"));
    }
}
