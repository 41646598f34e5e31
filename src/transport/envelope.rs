//! Двоичный конверт текстового транспорта.
//!
//! ```text
//! version u8 | payload_len u32 | payload_len u32 | payload | max_size u32
//! ```
//!
//! Длина нагрузки записана дважды; при разборе копии обязаны совпадать.

use byteorder::{ByteOrder, LittleEndian};
use tagpack_error::BufferError;

/// Поддерживаемые версии конверта.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvelopeVersion {
    V1 = 1,
}

impl TryFrom<u8> for EnvelopeVersion {
    type Error = BufferError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(EnvelopeVersion::V1),
            other => Err(BufferError::malformed(format!(
                "unsupported envelope version {other}"
            ))),
        }
    }
}

/// Текущая версия конверта.
pub const ENVELOPE_VERSION: u8 = EnvelopeVersion::V1 as u8;
/// Версия и две копии длины.
pub const HEADER_LEN: usize = 1 + 4 + 4;
/// Максимальный размер буфера после нагрузки.
pub const TRAILER_LEN: usize = 4;

/// Разобранный конверт, нагрузка заимствуется из входа.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Envelope<'a> {
    pub version: EnvelopeVersion,
    pub payload: &'a [u8],
    pub max_size: u32,
}

/// Собирает конверт вокруг нагрузки.
pub fn encode_envelope(
    payload: &[u8],
    max_size: usize,
) -> Result<Vec<u8>, BufferError> {
    let payload_len = u32::try_from(payload.len()).map_err(|_| BufferError::ValueTooLarge {
        what: "payload",
        size: payload.len(),
        limit: u32::MAX as usize,
    })?;
    let max_size = u32::try_from(max_size).map_err(|_| BufferError::ValueTooLarge {
        what: "max_size",
        size: max_size,
        limit: u32::MAX as usize,
    })?;

    let mut out = vec![0u8; HEADER_LEN + payload.len() + TRAILER_LEN];
    out[0] = ENVELOPE_VERSION;
    LittleEndian::write_u32(&mut out[1..5], payload_len);
    LittleEndian::write_u32(&mut out[5..9], payload_len);
    out[HEADER_LEN..HEADER_LEN + payload.len()].copy_from_slice(payload);
    LittleEndian::write_u32(&mut out[HEADER_LEN + payload.len()..], max_size);
    Ok(out)
}

/// Разбирает и проверяет конверт.
pub fn parse_envelope(bytes: &[u8]) -> Result<Envelope<'_>, BufferError> {
    if bytes.len() < HEADER_LEN + TRAILER_LEN {
        return Err(BufferError::malformed(format!(
            "envelope too short: {} bytes, need at least {}",
            bytes.len(),
            HEADER_LEN + TRAILER_LEN
        )));
    }
    let version = EnvelopeVersion::try_from(bytes[0])?;
    let len = LittleEndian::read_u32(&bytes[1..5]);
    let len_copy = LittleEndian::read_u32(&bytes[5..9]);
    if len != len_copy {
        return Err(BufferError::malformed(format!(
            "payload length mismatch: {len} != {len_copy}"
        )));
    }

    let len = len as usize;
    let expected = HEADER_LEN + len + TRAILER_LEN;
    if bytes.len() < expected {
        return Err(BufferError::malformed(format!(
            "payload truncated: {} bytes, need {expected}",
            bytes.len()
        )));
    }
    if bytes.len() > expected {
        return Err(BufferError::malformed(format!(
            "{} trailing bytes after envelope",
            bytes.len() - expected
        )));
    }

    let payload = &bytes[HEADER_LEN..HEADER_LEN + len];
    let max_size = LittleEndian::read_u32(&bytes[HEADER_LEN + len..]);
    if max_size == 0 {
        return Err(BufferError::malformed("max size is zero"));
    }
    if len > max_size as usize {
        return Err(BufferError::malformed(format!(
            "payload of {len} bytes exceeds max size {max_size}"
        )));
    }

    Ok(Envelope {
        version,
        payload,
        max_size,
    })
}
