//! Раскладка составных значений в последовательности скаляров.
//!
//! | Тип            | Поля                                                     |
//! |----------------|----------------------------------------------------------|
//! | Vector2        | x f32, y f32                                             |
//! | Vector3        | x f32, y f32, z f32                                      |
//! | CFrame         | rx, ry, rz u16 (радианы × 10430.219195527361), x, y, z f32 |
//! | Color3         | r, g, b u8 (× 255)                                       |
//! | UDim           | scale i16 (× 1000), offset i16                           |
//! | UDim2          | x.scale, x.offset, y.scale, y.offset (i16)               |
//! | Rect           | min.x, min.y, max.x, max.y f32                           |
//! | NumberRange    | min f32, max f32                                         |
//! | NumberSequence | count u8, затем time, value, envelope u8 (× 255)         |
//! | ColorSequence  | count u8, затем time, r, g, b u8 (× 255)                 |
//! | BrickColor     | index u16                                                |
//!
//! Константы масштаба менять нельзя: от них зависит совместимость формата.

use tagpack_error::BufferError;

use super::{
    primitives::{Decoder, Encoder},
    TypeTag,
};
use crate::value::{
    BrickColor, CFrame, Color3, ColorKeypoint, ColorSequence, NumberKeypoint, NumberRange,
    NumberSequence, Rect, UDim, UDim2, Vector2, Vector3,
};

/// Коды углов на радиан: 65536 / 2π.
pub const ANGLE_SCALE: f64 = 10430.219195527361;
/// Множитель для байтовой квантизации компонент в [0, 1].
pub const UNIT_SCALE: f32 = 255.0;
/// Множитель масштаба UDim.
pub const UDIM_SCALE: f32 = 1000.0;
/// Наибольшее число ключевых точек (счётчик в 1 байт).
pub const MAX_KEYPOINTS: usize = u8::MAX as usize;

/// Кодек составного значения с фиксированным тегом.
pub trait WireCodec: Sized {
    const TAG: TypeTag;

    /// Размер нагрузки без байта тега.
    fn payload_len(&self) -> usize;

    /// Проверка представимости; вызывается до записи первого байта.
    fn validate(&self) -> Result<(), BufferError> {
        Ok(())
    }

    fn encode(
        &self,
        enc: &mut Encoder<'_>,
    );

    fn decode(dec: &mut Decoder<'_>) -> Result<Self, BufferError>;
}

/// Квантизация компоненты из [0, 1] в байт.
pub fn quantize_unit(v: f32) -> u8 {
    (v.clamp(0.0, 1.0) * UNIT_SCALE).round() as u8
}

pub fn dequantize_unit(b: u8) -> f32 {
    b as f32 / UNIT_SCALE
}

/// Угол в радианах в 16-битный код (по модулю 2π).
pub fn encode_angle(radians: f32) -> u16 {
    ((radians as f64 * ANGLE_SCALE).round() as i64).rem_euclid(1 << 16) as u16
}

/// 16-битный код в радианы из диапазона [-π, π).
pub fn decode_angle(code: u16) -> f32 {
    (code as i16 as f64 / ANGLE_SCALE) as f32
}

fn encode_udim_scale(scale: f32) -> i16 {
    (scale * UDIM_SCALE).round() as i16
}

fn encode_udim_offset(offset: i32) -> i16 {
    offset.clamp(i16::MIN as i32, i16::MAX as i32) as i16
}

fn put_udim(
    enc: &mut Encoder<'_>,
    udim: &UDim,
) {
    enc.put_i16(encode_udim_scale(udim.scale));
    enc.put_i16(encode_udim_offset(udim.offset));
}

fn get_udim(dec: &mut Decoder<'_>) -> Result<UDim, BufferError> {
    let scale = dec.get_i16()? as f32 / UDIM_SCALE;
    let offset = dec.get_i16()? as i32;
    Ok(UDim { scale, offset })
}

fn put_color_bytes(
    enc: &mut Encoder<'_>,
    color: &Color3,
) {
    enc.put_u8(quantize_unit(color.r));
    enc.put_u8(quantize_unit(color.g));
    enc.put_u8(quantize_unit(color.b));
}

fn get_color_bytes(dec: &mut Decoder<'_>) -> Result<Color3, BufferError> {
    Ok(Color3 {
        r: dequantize_unit(dec.get_u8()?),
        g: dequantize_unit(dec.get_u8()?),
        b: dequantize_unit(dec.get_u8()?),
    })
}

fn check_keypoints(
    what: &'static str,
    count: usize,
) -> Result<(), BufferError> {
    if count > MAX_KEYPOINTS {
        return Err(BufferError::ValueTooLarge {
            what,
            size: count,
            limit: MAX_KEYPOINTS,
        });
    }
    Ok(())
}

impl WireCodec for Vector2 {
    const TAG: TypeTag = TypeTag::Vector2;

    fn payload_len(&self) -> usize {
        8
    }

    fn encode(
        &self,
        enc: &mut Encoder<'_>,
    ) {
        enc.put_f32(self.x);
        enc.put_f32(self.y);
    }

    fn decode(dec: &mut Decoder<'_>) -> Result<Self, BufferError> {
        Ok(Self {
            x: dec.get_f32()?,
            y: dec.get_f32()?,
        })
    }
}

impl WireCodec for Vector3 {
    const TAG: TypeTag = TypeTag::Vector3;

    fn payload_len(&self) -> usize {
        12
    }

    fn encode(
        &self,
        enc: &mut Encoder<'_>,
    ) {
        enc.put_f32(self.x);
        enc.put_f32(self.y);
        enc.put_f32(self.z);
    }

    fn decode(dec: &mut Decoder<'_>) -> Result<Self, BufferError> {
        Ok(Self {
            x: dec.get_f32()?,
            y: dec.get_f32()?,
            z: dec.get_f32()?,
        })
    }
}

impl WireCodec for CFrame {
    const TAG: TypeTag = TypeTag::CFrame;

    fn payload_len(&self) -> usize {
        18
    }

    fn encode(
        &self,
        enc: &mut Encoder<'_>,
    ) {
        enc.put_u16(encode_angle(self.rotation.x));
        enc.put_u16(encode_angle(self.rotation.y));
        enc.put_u16(encode_angle(self.rotation.z));
        self.position.encode(enc);
    }

    fn decode(dec: &mut Decoder<'_>) -> Result<Self, BufferError> {
        let rotation = Vector3 {
            x: decode_angle(dec.get_u16()?),
            y: decode_angle(dec.get_u16()?),
            z: decode_angle(dec.get_u16()?),
        };
        let position = Vector3::decode(dec)?;
        Ok(Self { position, rotation })
    }
}

impl WireCodec for Color3 {
    const TAG: TypeTag = TypeTag::Color3;

    fn payload_len(&self) -> usize {
        3
    }

    fn encode(
        &self,
        enc: &mut Encoder<'_>,
    ) {
        put_color_bytes(enc, self);
    }

    fn decode(dec: &mut Decoder<'_>) -> Result<Self, BufferError> {
        get_color_bytes(dec)
    }
}

impl WireCodec for UDim {
    const TAG: TypeTag = TypeTag::UDim;

    fn payload_len(&self) -> usize {
        4
    }

    fn encode(
        &self,
        enc: &mut Encoder<'_>,
    ) {
        put_udim(enc, self);
    }

    fn decode(dec: &mut Decoder<'_>) -> Result<Self, BufferError> {
        get_udim(dec)
    }
}

impl WireCodec for UDim2 {
    const TAG: TypeTag = TypeTag::UDim2;

    fn payload_len(&self) -> usize {
        8
    }

    fn encode(
        &self,
        enc: &mut Encoder<'_>,
    ) {
        put_udim(enc, &self.x);
        put_udim(enc, &self.y);
    }

    fn decode(dec: &mut Decoder<'_>) -> Result<Self, BufferError> {
        Ok(Self {
            x: get_udim(dec)?,
            y: get_udim(dec)?,
        })
    }
}

impl WireCodec for Rect {
    const TAG: TypeTag = TypeTag::Rect;

    fn payload_len(&self) -> usize {
        16
    }

    fn encode(
        &self,
        enc: &mut Encoder<'_>,
    ) {
        self.min.encode(enc);
        self.max.encode(enc);
    }

    fn decode(dec: &mut Decoder<'_>) -> Result<Self, BufferError> {
        Ok(Self {
            min: Vector2::decode(dec)?,
            max: Vector2::decode(dec)?,
        })
    }
}

impl WireCodec for NumberRange {
    const TAG: TypeTag = TypeTag::NumberRange;

    fn payload_len(&self) -> usize {
        8
    }

    fn encode(
        &self,
        enc: &mut Encoder<'_>,
    ) {
        enc.put_f32(self.min);
        enc.put_f32(self.max);
    }

    fn decode(dec: &mut Decoder<'_>) -> Result<Self, BufferError> {
        Ok(Self {
            min: dec.get_f32()?,
            max: dec.get_f32()?,
        })
    }
}

impl WireCodec for NumberSequence {
    const TAG: TypeTag = TypeTag::NumberSequence;

    fn payload_len(&self) -> usize {
        1 + self.keypoints.len() * 3
    }

    fn validate(&self) -> Result<(), BufferError> {
        check_keypoints("NumberSequence", self.keypoints.len())
    }

    fn encode(
        &self,
        enc: &mut Encoder<'_>,
    ) {
        enc.put_u8(self.keypoints.len() as u8);
        for kp in &self.keypoints {
            enc.put_u8(quantize_unit(kp.time));
            enc.put_u8(quantize_unit(kp.value));
            enc.put_u8(quantize_unit(kp.envelope));
        }
    }

    fn decode(dec: &mut Decoder<'_>) -> Result<Self, BufferError> {
        let count = dec.get_u8()? as usize;
        let mut keypoints = Vec::with_capacity(count);
        for _ in 0..count {
            keypoints.push(NumberKeypoint {
                time: dequantize_unit(dec.get_u8()?),
                value: dequantize_unit(dec.get_u8()?),
                envelope: dequantize_unit(dec.get_u8()?),
            });
        }
        Ok(Self { keypoints })
    }
}

impl WireCodec for ColorSequence {
    const TAG: TypeTag = TypeTag::ColorSequence;

    fn payload_len(&self) -> usize {
        1 + self.keypoints.len() * 4
    }

    fn validate(&self) -> Result<(), BufferError> {
        check_keypoints("ColorSequence", self.keypoints.len())
    }

    fn encode(
        &self,
        enc: &mut Encoder<'_>,
    ) {
        enc.put_u8(self.keypoints.len() as u8);
        for kp in &self.keypoints {
            enc.put_u8(quantize_unit(kp.time));
            put_color_bytes(enc, &kp.color);
        }
    }

    fn decode(dec: &mut Decoder<'_>) -> Result<Self, BufferError> {
        let count = dec.get_u8()? as usize;
        let mut keypoints = Vec::with_capacity(count);
        for _ in 0..count {
            let time = dequantize_unit(dec.get_u8()?);
            let color = get_color_bytes(dec)?;
            keypoints.push(ColorKeypoint { time, color });
        }
        Ok(Self { keypoints })
    }
}

impl WireCodec for BrickColor {
    const TAG: TypeTag = TypeTag::BrickColor;

    fn payload_len(&self) -> usize {
        2
    }

    fn encode(
        &self,
        enc: &mut Encoder<'_>,
    ) {
        enc.put_u16(self.0);
    }

    fn decode(dec: &mut Decoder<'_>) -> Result<Self, BufferError> {
        Ok(Self(dec.get_u16()?))
    }
}
