use std::fmt;

use num_enum::TryFromPrimitive;

/// Коды статуса ошибок tagpack.
///
/// Старшая цифра задаёт группу (см. [`StatusGroup`]):
/// 0 успех, 1 общие, 2 данные, 5 буфер, 6 поток, 8 формат.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, TryFromPrimitive)]
#[repr(u32)]
#[non_exhaustive]
pub enum StatusCode {
    Success = 0,

    Unknown = 1000,
    Unsupported = 1001,
    Internal = 1002,
    InvalidArgs = 1003,
    InvalidConfig = 1004,

    InvalidValue = 2000,
    TypeError = 2001,
    ValueTooLarge = 2002,

    CapacityExceeded = 5000,
    AllocationFailed = 5001,
    Destroyed = 5002,

    Io = 6000,
    UnexpectedEof = 6001,

    MalformedEnvelope = 8000,
    UnknownTag = 8001,
    UnsupportedVersion = 8002,
    InvalidUtf8 = 8003,
    EncodingError = 8004,
    DecodingError = 8005,
}

/// Группа, к которой относится код статуса.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatusGroup {
    Success,
    General,
    Data,
    Buffer,
    Stream,
    Format,
}

impl StatusCode {
    /// Числовое значение кода.
    pub const fn code(self) -> u32 {
        self as u32
    }

    /// Код по числу, `None` для неизвестных значений.
    pub fn from_u32(v: u32) -> Option<Self> {
        Self::try_from(v).ok()
    }

    pub fn group(self) -> StatusGroup {
        match self.code() / 1000 {
            0 => StatusGroup::Success,
            2 => StatusGroup::Data,
            5 => StatusGroup::Buffer,
            6 => StatusGroup::Stream,
            8 => StatusGroup::Format,
            _ => StatusGroup::General,
        }
    }

    /// Ошибка во входных данных вызывающей стороны, а не в самом буфере.
    pub fn is_caller_fault(self) -> bool {
        matches!(self.group(), StatusGroup::Data)
            || matches!(self, Self::InvalidArgs | Self::InvalidConfig)
    }

    /// Повреждённый или чужой поток байт.
    pub fn is_format_error(self) -> bool {
        matches!(self.group(), StatusGroup::Format | StatusGroup::Stream)
    }

    /// Код процесса для CLI: группа кода статуса, 1 для общих ошибок.
    pub fn exit_code(self) -> u8 {
        match self.group() {
            StatusGroup::Success => 0,
            StatusGroup::General => 1,
            StatusGroup::Data => 2,
            StatusGroup::Buffer => 3,
            StatusGroup::Stream | StatusGroup::Format => 4,
        }
    }
}

impl From<StatusCode> for u32 {
    fn from(c: StatusCode) -> Self {
        c.code()
    }
}

impl fmt::Display for StatusCode {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        write!(f, "E{:04} {:?}", self.code(), self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Тест проверяет преобразование кода в число и обратно.
    #[test]
    fn test_code_from_u32() {
        assert_eq!(StatusCode::CapacityExceeded.code(), 5000);
        assert_eq!(StatusCode::from_u32(8001), Some(StatusCode::UnknownTag));
        assert_eq!(StatusCode::from_u32(4242), None);
        assert_eq!(u32::from(StatusCode::Success), 0);
    }

    /// Тест проверяет разбиение кодов по группам.
    #[test]
    fn test_groups() {
        assert_eq!(StatusCode::Success.group(), StatusGroup::Success);
        assert_eq!(StatusCode::InvalidConfig.group(), StatusGroup::General);
        assert_eq!(StatusCode::ValueTooLarge.group(), StatusGroup::Data);
        assert_eq!(StatusCode::Destroyed.group(), StatusGroup::Buffer);
        assert_eq!(StatusCode::UnexpectedEof.group(), StatusGroup::Stream);
        assert_eq!(StatusCode::UnknownTag.group(), StatusGroup::Format);
    }

    /// Тест проверяет предикаты и коды выхода.
    #[test]
    fn test_predicates_and_exit_codes() {
        assert!(StatusCode::UnexpectedEof.is_format_error());
        assert!(!StatusCode::CapacityExceeded.is_format_error());
        assert!(StatusCode::ValueTooLarge.is_caller_fault());
        assert!(StatusCode::InvalidConfig.is_caller_fault());
        assert!(!StatusCode::AllocationFailed.is_caller_fault());

        assert_eq!(StatusCode::Internal.exit_code(), 1);
        assert_eq!(StatusCode::MalformedEnvelope.exit_code(), 4);
    }

    #[test]
    fn test_display() {
        assert_eq!(StatusCode::UnknownTag.to_string(), "E8001 UnknownTag");
        assert_eq!(StatusCode::Success.to_string(), "E0000 Success");
    }
}
