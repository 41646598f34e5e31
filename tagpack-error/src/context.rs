use crate::StackError;

/// Добавление контекста к `Result` с любой ошибкой, которая переводится в
/// [`StackError`].
pub trait ResultExt<T> {
    fn context(
        self,
        message: impl Into<String>,
    ) -> Result<T, StackError>;

    /// Как [`ResultExt::context`], но сообщение строится только при ошибке.
    fn with_context<M, F>(
        self,
        f: F,
    ) -> Result<T, StackError>
    where
        M: Into<String>,
        F: FnOnce() -> M;
}

impl<T, E> ResultExt<T> for Result<T, E>
where
    E: Into<StackError>,
{
    #[track_caller]
    fn context(
        self,
        message: impl Into<String>,
    ) -> Result<T, StackError> {
        match self {
            Ok(v) => Ok(v),
            Err(e) => Err(e.into().context(message)),
        }
    }

    #[track_caller]
    fn with_context<M, F>(
        self,
        f: F,
    ) -> Result<T, StackError>
    where
        M: Into<String>,
        F: FnOnce() -> M,
    {
        match self {
            Ok(v) => Ok(v),
            Err(e) => Err(e.into().context(f())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{BufferError, StatusCode};

    /// Тест проверяет, что контекст добавляется только к ошибке.
    #[test]
    fn test_context_on_err() {
        let res: Result<(), BufferError> = Err(BufferError::Destroyed);
        let err = res.context("flushing").unwrap_err();
        assert_eq!(err.status_code(), StatusCode::Destroyed);
        assert_eq!(err.frames()[0].message, "flushing");
        assert!(err.frames()[0].location.file().ends_with("context.rs"));

        let ok: Result<u8, BufferError> = Ok(3);
        assert_eq!(ok.context("unused").unwrap(), 3);
    }

    /// Тест проверяет, что ленивый контекст не вычисляется для `Ok`.
    #[test]
    fn test_with_context_is_lazy() {
        let ok: Result<u8, BufferError> = Ok(1);
        let res = ok.with_context(|| -> String { panic!("must not be called") });
        assert_eq!(res.unwrap(), 1);

        let res: Result<(), BufferError> = Err(BufferError::malformed("x"));
        let err = res.with_context(|| format!("envelope #{}", 2)).unwrap_err();
        assert_eq!(err.to_string(), "envelope #2: Malformed envelope: x");
    }
}
