use std::{fmt, panic::Location, sync::Arc};

use crate::{ErrorExt, StatusCode};

/// Ошибка с цепочкой контекстов.
///
/// Корневая ошибка хранится один раз, а каждый вызов
/// [`StackError::context`] добавляет кадр с местом вызова.
#[derive(Clone)]
pub struct StackError {
    root: Arc<dyn ErrorExt>,
    frames: Vec<Frame>,
}

/// Кадр контекста: сообщение и место, где он был добавлен.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub message: String,
    pub location: &'static Location<'static>,
}

impl StackError {
    pub fn new<E: ErrorExt>(err: E) -> Self {
        Self {
            root: Arc::new(err),
            frames: Vec::new(),
        }
    }

    #[track_caller]
    pub fn context(
        mut self,
        message: impl Into<String>,
    ) -> Self {
        self.frames.push(Frame {
            message: message.into(),
            location: Location::caller(),
        });
        self
    }

    pub fn status_code(&self) -> StatusCode {
        self.root.status_code()
    }

    pub fn client_message(&self) -> String {
        self.root.client_message()
    }

    pub fn root(&self) -> &dyn ErrorExt {
        self.root.as_ref()
    }

    /// Кадры в порядке добавления (от ближнего к корню к внешнему).
    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    pub fn downcast_ref<T: ErrorExt>(&self) -> Option<&T> {
        self.root.as_any().downcast_ref::<T>()
    }

    /// Многострочный отчёт: внешний контекст первым, корень последним,
    /// каждый кадр с местом вызова.
    pub fn report(&self) -> String {
        let mut out = String::new();
        for frame in self.frames.iter().rev() {
            out.push_str(&format!(
                "{} (at {}:{})\n",
                frame.message,
                frame.location.file(),
                frame.location.line()
            ));
        }
        out.push_str(&format!("caused by [{}]: {}", self.status_code(), self.root));
        out
    }
}

impl fmt::Debug for StackError {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.debug_struct("StackError")
            .field("status_code", &self.status_code())
            .field("root", &self.root.to_string())
            .field("frames", &self.frames)
            .finish()
    }
}

impl fmt::Display for StackError {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        for frame in self.frames.iter().rev() {
            write!(f, "{}: ", frame.message)?;
        }
        write!(f, "{}", self.root)
    }
}

impl std::error::Error for StackError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(self.root.as_ref())
    }
}

impl<E: ErrorExt> From<E> for StackError {
    fn from(e: E) -> Self {
        StackError::new(e)
    }
}
