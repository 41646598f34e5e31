//! Кодек бинарного формата.
//!
//! ## Модули
//!
//! - [`tags`] — теги типов и размеры нагрузок
//! - [`classify`] — выбор минимальной ширины для чисел
//! - [`narrow_float`] — 16- и 24-битные float
//! - [`primitives`] — little-endian запись и чтение скаляров
//! - [`composite`] — раскладка составных значений
//!
//! Каждое значение в потоке — тег и нагрузка, полностью определяемая тегом.
//! Функции этого модуля пишут во временный `Vec<u8>` и ничего не знают о
//! лимитах буфера: проверку ёмкости делает [`crate::buffer::ByteStore`].

pub mod classify;
pub mod composite;
pub mod narrow_float;
pub mod primitives;
pub mod tags;

pub use classify::{classify, NumberKind};
pub use composite::WireCodec;
pub use narrow_float::{decode_f16, decode_f24, encode_f16, encode_f24, NarrowFormat};
pub use primitives::{Decoder, Encoder, MAX_STRING_LEN, SHORT_STRING_LIMIT};
pub use tags::TypeTag;
use tagpack_error::BufferError;

/// Пишет число тегом минимальной ширины и его нагрузкой.
pub fn put_number(
    enc: &mut Encoder<'_>,
    value: f64,
) -> NumberKind {
    let kind = classify(value);
    enc.put_u8(kind.tag().as_byte());
    match kind {
        NumberKind::U8 => enc.put_u8(value as u8),
        NumberKind::U16 => enc.put_u16(value as u16),
        NumberKind::U32 => enc.put_u32(value as u32),
        NumberKind::I8 => enc.put_i8(value as i8),
        NumberKind::I16 => enc.put_i16(value as i16),
        NumberKind::I32 => enc.put_i32(value as i32),
        NumberKind::F16 => enc.put_f16(value),
        NumberKind::F24 => enc.put_f24(value),
        NumberKind::F32 => enc.put_f32(value as f32),
        NumberKind::F64 => enc.put_f64(value),
    }
    kind
}

/// Пишет строку с тегом `String` или `StringLong` по её длине.
///
/// Строка длиннее [`MAX_STRING_LEN`] байт отклоняется до записи.
pub fn put_string(
    enc: &mut Encoder<'_>,
    s: &str,
) -> Result<(), BufferError> {
    let len = s.len();
    if len > MAX_STRING_LEN {
        return Err(BufferError::ValueTooLarge {
            what: "string",
            size: len,
            limit: MAX_STRING_LEN,
        });
    }
    if len < SHORT_STRING_LIMIT {
        enc.put_u8(TypeTag::String.as_byte());
        enc.put_u8(len as u8);
    } else {
        enc.put_u8(TypeTag::StringLong.as_byte());
        enc.put_u16(len as u16);
    }
    enc.put_bytes(s.as_bytes());
    Ok(())
}

/// Пишет составное значение с его тегом.
pub fn put_composite<T: WireCodec>(
    enc: &mut Encoder<'_>,
    value: &T,
) -> Result<(), BufferError> {
    value.validate()?;
    enc.put_u8(T::TAG.as_byte());
    value.encode(enc);
    Ok(())
}

/// Читает нагрузку числового тега. `None`, если тег не числовой.
pub fn get_number(
    dec: &mut Decoder<'_>,
    tag: TypeTag,
) -> Option<Result<f64, BufferError>> {
    let value = match tag {
        TypeTag::Int8 => dec.get_i8().map(f64::from),
        TypeTag::Int16 => dec.get_i16().map(f64::from),
        TypeTag::Int32 => dec.get_i32().map(f64::from),
        TypeTag::UInt8 => dec.get_u8().map(f64::from),
        TypeTag::UInt16 => dec.get_u16().map(f64::from),
        TypeTag::UInt32 => dec.get_u32().map(f64::from),
        TypeTag::Float16 => dec.get_f16(),
        TypeTag::Float24 => dec.get_f24(),
        TypeTag::Float32 => dec.get_f32().map(f64::from),
        TypeTag::Float64 => dec.get_f64(),
        _ => return None,
    };
    Some(value)
}

/// Читает нагрузку строкового тега (длина и байты).
pub fn get_string(
    dec: &mut Decoder<'_>,
    tag: TypeTag,
) -> Result<String, BufferError> {
    let len = match tag {
        TypeTag::StringLong => dec.get_u16()? as usize,
        _ => dec.get_u8()? as usize,
    };
    dec.get_string(len)
}
