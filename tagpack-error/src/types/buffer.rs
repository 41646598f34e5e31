use std::any::Any;

use thiserror::Error;

use crate::{ErrorExt, StatusCode};

/// Ошибки тегированного буфера и текстового транспорта.
///
/// Все ошибки восстановимы вызывающей стороной: операции записи оставляют
/// буфер в последнем корректном состоянии.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BufferError {
    /// Запись вышла бы за настроенный максимум буфера
    #[error("Capacity exceeded: {requested} more bytes at cursor {cursor} (max {max_size})")]
    CapacityExceeded {
        requested: usize,
        cursor: usize,
        max_size: usize,
    },

    /// Не удалось выделить память под новое хранилище
    #[error("Failed to allocate {requested} bytes for the byte store")]
    AllocationFailed { requested: usize },

    /// Текстовый конверт не прошёл проверку
    #[error("Malformed envelope: {reason}")]
    MalformedEnvelope { reason: String },

    /// Неизвестный тег типа в потоке
    #[error("Unknown type tag 0x{tag:02X} at offset {offset}")]
    UnknownTag { tag: u8, offset: usize },

    /// Поток закончился посреди значения
    #[error("Unexpected end of stream at offset {offset}: need {needed} bytes, {available} available")]
    UnexpectedEof {
        offset: usize,
        needed: usize,
        available: usize,
    },

    /// Строка в потоке не является корректным UTF-8
    #[error("Invalid UTF-8 string at offset {offset}")]
    InvalidUtf8 { offset: usize },

    /// Значение не помещается в поле длины формата
    #[error("{what} size {size} exceeds format limit {limit}")]
    ValueTooLarge {
        what: &'static str,
        size: usize,
        limit: usize,
    },

    /// Значение не имеет представления в формате
    #[error("Value of type {type_name} has no wire representation")]
    UnsupportedValue { type_name: String },

    /// Буфер уничтожен, операции недоступны
    #[error("Buffer has been destroyed")]
    Destroyed,
}

impl BufferError {
    /// Удобный конструктор для ошибок конверта.
    pub fn malformed(reason: impl Into<String>) -> Self {
        Self::MalformedEnvelope {
            reason: reason.into(),
        }
    }

    /// Смещение в потоке, на котором произошла ошибка декодирования.
    pub fn offset(&self) -> Option<usize> {
        match self {
            Self::UnknownTag { offset, .. }
            | Self::UnexpectedEof { offset, .. }
            | Self::InvalidUtf8 { offset } => Some(*offset),
            _ => None,
        }
    }

    /// Ошибка потока (после неё чтение обрывается, а не падает).
    pub fn is_stream_error(&self) -> bool {
        matches!(
            self,
            Self::UnknownTag { .. } | Self::UnexpectedEof { .. } | Self::InvalidUtf8 { .. }
        )
    }
}

impl ErrorExt for BufferError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::CapacityExceeded { .. } => StatusCode::CapacityExceeded,
            Self::AllocationFailed { .. } => StatusCode::AllocationFailed,
            Self::MalformedEnvelope { .. } => StatusCode::MalformedEnvelope,
            Self::UnknownTag { .. } => StatusCode::UnknownTag,
            Self::UnexpectedEof { .. } => StatusCode::UnexpectedEof,
            Self::InvalidUtf8 { .. } => StatusCode::InvalidUtf8,
            Self::ValueTooLarge { .. } => StatusCode::ValueTooLarge,
            Self::UnsupportedValue { .. } => StatusCode::TypeError,
            Self::Destroyed => StatusCode::Destroyed,
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn client_message(&self) -> String {
        match self {
            Self::CapacityExceeded { .. } => "Buffer is full".to_string(),
            Self::AllocationFailed { .. } => "Out of memory".to_string(),
            Self::MalformedEnvelope { .. } => "Invalid text payload".to_string(),
            Self::UnknownTag { .. } | Self::UnexpectedEof { .. } | Self::InvalidUtf8 { .. } => {
                "Corrupted buffer contents".to_string()
            }
            Self::ValueTooLarge { what, .. } => format!("{what} is too large"),
            Self::UnsupportedValue { type_name } => format!("Cannot store {type_name}"),
            Self::Destroyed => "Buffer has been destroyed".to_string(),
        }
    }

    fn labels(&self) -> Vec<(&'static str, String)> {
        let mut labels = vec![
            ("kind", "BufferError".to_string()),
            ("code", self.status_code().code().to_string()),
        ];
        if let Some(offset) = self.offset() {
            labels.push(("offset", offset.to_string()));
        }
        match self {
            Self::UnknownTag { tag, .. } => labels.push(("tag", format!("0x{tag:02X}"))),
            Self::ValueTooLarge { what, .. } => labels.push(("limit", what.to_string())),
            _ => {}
        }
        labels
    }
}

// Конверсия в std::io::Error для кода, работающего через io::Result
impl From<BufferError> for std::io::Error {
    fn from(e: BufferError) -> Self {
        let kind = match &e {
            BufferError::UnexpectedEof { .. } => std::io::ErrorKind::UnexpectedEof,
            BufferError::MalformedEnvelope { .. }
            | BufferError::UnknownTag { .. }
            | BufferError::InvalidUtf8 { .. } => std::io::ErrorKind::InvalidData,
            BufferError::CapacityExceeded { .. } | BufferError::ValueTooLarge { .. } => {
                std::io::ErrorKind::InvalidInput
            }
            BufferError::AllocationFailed { .. } => std::io::ErrorKind::OutOfMemory,
            BufferError::UnsupportedValue { .. } => std::io::ErrorKind::Unsupported,
            BufferError::Destroyed => std::io::ErrorKind::Other,
        };

        std::io::Error::new(kind, e.to_string())
    }
}
