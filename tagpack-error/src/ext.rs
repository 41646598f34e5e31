use std::{any::Any, error::Error};

use crate::StatusCode;

/// Общий интерфейс ошибок tagpack.
///
/// Трейт object-safe: [`crate::StackError`] хранит ошибку как
/// `Arc<dyn ErrorExt>` и достаёт конкретный тип через [`ErrorExt::as_any`].
pub trait ErrorExt: Error + Send + Sync + 'static {
    fn status_code(&self) -> StatusCode {
        StatusCode::Internal
    }

    fn as_any(&self) -> &dyn Any;

    /// Короткое сообщение для пользователя. Внутренние ошибки не раскрываются.
    fn client_message(&self) -> String {
        match self.status_code() {
            StatusCode::Unknown | StatusCode::Internal => "Internal error".to_string(),
            _ => self.to_string(),
        }
    }

    /// Пары ключ/значение для структурных логов.
    fn labels(&self) -> Vec<(&'static str, String)> {
        vec![
            ("kind", short_type_name::<Self>().to_string()),
            ("code", self.status_code().code().to_string()),
        ]
    }
}

/// Имя типа без пути модуля.
pub fn short_type_name<T: ?Sized>() -> &'static str {
    let full = std::any::type_name::<T>();
    full.rsplit("::").next().unwrap_or(full)
}

#[cfg(test)]
mod tests {
    use std::{any::Any, fmt};

    use super::*;

    #[derive(Debug)]
    struct Opaque;

    impl fmt::Display for Opaque {
        fn fmt(
            &self,
            f: &mut fmt::Formatter<'_>,
        ) -> fmt::Result {
            f.write_str("secret detail")
        }
    }

    impl Error for Opaque {}

    impl ErrorExt for Opaque {
        fn as_any(&self) -> &dyn Any {
            self
        }
    }

    #[derive(Debug)]
    struct Truncated;

    impl fmt::Display for Truncated {
        fn fmt(
            &self,
            f: &mut fmt::Formatter<'_>,
        ) -> fmt::Result {
            f.write_str("stream ended early")
        }
    }

    impl Error for Truncated {}

    impl ErrorExt for Truncated {
        fn status_code(&self) -> StatusCode {
            StatusCode::UnexpectedEof
        }

        fn as_any(&self) -> &dyn Any {
            self
        }
    }

    /// Тест проверяет, что ошибка без кода считается внутренней и скрывает
    /// детали от пользователя.
    #[test]
    fn test_default_is_internal() {
        assert_eq!(Opaque.status_code(), StatusCode::Internal);
        assert_eq!(Opaque.client_message(), "Internal error");
    }

    /// Тест проверяет, что для остальных кодов пользователь видит Display.
    #[test]
    fn test_client_message_uses_display() {
        assert_eq!(Truncated.client_message(), "stream ended early");
    }

    /// Тест проверяет метки для логов.
    #[test]
    fn test_labels() {
        let labels = Truncated.labels();
        assert_eq!(labels[0], ("kind", "Truncated".to_string()));
        assert_eq!(labels[1], ("code", "6001".to_string()));
    }

    #[test]
    fn test_short_type_name() {
        assert_eq!(short_type_name::<Truncated>(), "Truncated");
        assert_eq!(short_type_name::<u8>(), "u8");
    }
}
