//! Определение тегов бинарного формата.
//!
//! Каждое закодированное значение начинается с однобайтового тега, который
//! полностью определяет размер и раскладку следующей за ним нагрузки.
//! Набор тегов закрыт: 28 вариантов, значения 0..=27.

use num_enum::{IntoPrimitive, TryFromPrimitive};

/// Тег типа закодированного значения.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, IntoPrimitive, TryFromPrimitive)]
#[repr(u8)]
pub enum TypeTag {
    /// Отсутствие значения, также терминатор таблицы
    Nil = 0,
    Bool = 1,
    Int8 = 2,
    Int16 = 3,
    Int32 = 4,
    UInt8 = 5,
    UInt16 = 6,
    UInt32 = 7,
    /// Узкий float: 1/5/10 бит
    Float16 = 8,
    /// Узкий float: 1/6/17 бит
    Float24 = 9,
    Float32 = 10,
    Float64 = 11,
    /// Строка короче 256 байт, длина в 1 байт
    String = 12,
    /// Строка до 65535 байт, длина в 2 байта
    StringLong = 13,
    Vector2 = 14,
    /// Ссылка на объект хоста, хранится вне потока
    Instance = 15,
    Vector3 = 16,
    Color3 = 17,
    UDim = 18,
    UDim2 = 19,
    CFrame = 20,
    Rect = 21,
    NumberRange = 22,
    NumberSequence = 23,
    ColorSequence = 24,
    BrickColor = 25,
    /// Вложенная таблица, завершается тегом `Nil`
    Table = 26,
    /// Пара ключ-значение
    KeyValuePair = 27,
}

impl TypeTag {
    /// Разбирает байт тега; `None` для значений вне набора.
    pub fn from_byte(byte: u8) -> Option<Self> {
        Self::try_from(byte).ok()
    }

    /// Байтовое значение тега.
    pub const fn as_byte(self) -> u8 {
        self as u8
    }

    /// Размер нагрузки для тегов фиксированной длины (без байта тега).
    ///
    /// Возвращает `None` для строк, последовательностей ключевых точек,
    /// таблиц и пар: их размер зависит от содержимого.
    pub const fn fixed_payload_len(self) -> Option<usize> {
        match self {
            Self::Nil | Self::Instance => Some(0),
            Self::Bool | Self::Int8 | Self::UInt8 => Some(1),
            Self::Int16 | Self::UInt16 | Self::Float16 | Self::BrickColor => Some(2),
            Self::Float24 | Self::Color3 => Some(3),
            Self::Int32 | Self::UInt32 | Self::Float32 | Self::UDim => Some(4),
            Self::Float64 | Self::Vector2 | Self::NumberRange | Self::UDim2 => Some(8),
            Self::Vector3 => Some(12),
            Self::Rect => Some(16),
            Self::CFrame => Some(18),
            Self::String
            | Self::StringLong
            | Self::NumberSequence
            | Self::ColorSequence
            | Self::Table
            | Self::KeyValuePair => None,
        }
    }

    /// Все теги в порядке возрастания значения.
    pub const ALL: [TypeTag; 28] = [
        Self::Nil,
        Self::Bool,
        Self::Int8,
        Self::Int16,
        Self::Int32,
        Self::UInt8,
        Self::UInt16,
        Self::UInt32,
        Self::Float16,
        Self::Float24,
        Self::Float32,
        Self::Float64,
        Self::String,
        Self::StringLong,
        Self::Vector2,
        Self::Instance,
        Self::Vector3,
        Self::Color3,
        Self::UDim,
        Self::UDim2,
        Self::CFrame,
        Self::Rect,
        Self::NumberRange,
        Self::NumberSequence,
        Self::ColorSequence,
        Self::BrickColor,
        Self::Table,
        Self::KeyValuePair,
    ];
}
