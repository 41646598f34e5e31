//! Выбор минимального представления для числа.
//!
//! Порядок проверок совпадает с границами кодирования: сначала целые
//! значения по знаку и диапазону, затем дробные по модулю. Целое, не
//! влезающее в 32 бита, уходит в `F64`, а не оборачивается.

use super::TypeTag;

/// Наибольший модуль, который ещё кодируется во float16 без насыщения.
pub const F16_LIMIT: f64 = 65520.0;
/// Наибольший модуль, который ещё кодируется во float24 без насыщения.
pub const F24_LIMIT: f64 = 4294959104.0;
/// Наибольший конечный float32.
pub const F32_LIMIT: f64 = f32::MAX as f64;

/// Вид хранения числа.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumberKind {
    U8,
    U16,
    U32,
    I8,
    I16,
    I32,
    F16,
    F24,
    F32,
    F64,
}

impl NumberKind {
    /// Тег, под которым число этого вида пишется в поток.
    pub const fn tag(self) -> TypeTag {
        match self {
            Self::U8 => TypeTag::UInt8,
            Self::U16 => TypeTag::UInt16,
            Self::U32 => TypeTag::UInt32,
            Self::I8 => TypeTag::Int8,
            Self::I16 => TypeTag::Int16,
            Self::I32 => TypeTag::Int32,
            Self::F16 => TypeTag::Float16,
            Self::F24 => TypeTag::Float24,
            Self::F32 => TypeTag::Float32,
            Self::F64 => TypeTag::Float64,
        }
    }

    /// Размер нагрузки в байтах.
    pub const fn payload_len(self) -> usize {
        match self {
            Self::U8 | Self::I8 => 1,
            Self::U16 | Self::I16 | Self::F16 => 2,
            Self::F24 => 3,
            Self::U32 | Self::I32 | Self::F32 => 4,
            Self::F64 => 8,
        }
    }
}

/// Возвращает минимальный вид хранения для `value`.
pub fn classify(value: f64) -> NumberKind {
    if value.fract() == 0.0 {
        if value >= 0.0 {
            if value <= u8::MAX as f64 {
                NumberKind::U8
            } else if value <= u16::MAX as f64 {
                NumberKind::U16
            } else if value <= u32::MAX as f64 {
                NumberKind::U32
            } else {
                NumberKind::F64
            }
        } else if value >= i8::MIN as f64 {
            NumberKind::I8
        } else if value >= i16::MIN as f64 {
            NumberKind::I16
        } else if value >= i32::MIN as f64 {
            NumberKind::I32
        } else {
            NumberKind::F64
        }
    } else {
        // NaN и бесконечности сюда тоже попадают: fract() для них NaN
        let magnitude = value.abs();
        if magnitude <= F16_LIMIT {
            NumberKind::F16
        } else if magnitude <= F24_LIMIT {
            NumberKind::F24
        } else if magnitude <= F32_LIMIT {
            NumberKind::F32
        } else {
            NumberKind::F64
        }
    }
}
