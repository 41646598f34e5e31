//! Текстовое представление буфера: конверт в base64.

use base64::{
    alphabet,
    engine::{
        general_purpose::{self, GeneralPurpose, STANDARD},
        DecodePaddingMode,
    },
    Engine,
};
use tagpack_error::BufferError;
use tracing::debug;

use super::envelope::{encode_envelope, parse_envelope};
use crate::buffer::{BufferConfig, TaggedBuffer};

/// Декодер, принимающий ввод как с `=`, так и без него.
const LENIENT: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    general_purpose::PAD.with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Проверяет алфавит: `A–Z a–z 0–9 + /` и не больше двух `=` в конце.
fn validate_alphabet(text: &str) -> Result<(), BufferError> {
    let body = text.trim_end_matches('=');
    let padding = text.len() - body.len();
    if padding > 2 {
        return Err(BufferError::malformed(format!(
            "too much padding: {padding} '=' characters"
        )));
    }
    if let Some((pos, ch)) = body
        .char_indices()
        .find(|(_, c)| !(c.is_ascii_alphanumeric() || *c == '+' || *c == '/'))
    {
        return Err(BufferError::malformed(format!(
            "invalid character {ch:?} at position {pos}"
        )));
    }
    Ok(())
}

/// Снимает base64 с текста конверта.
///
/// Пробелы по краям отбрасываются, `=` в конце необязательны.
pub fn decode_base64(text: &str) -> Result<Vec<u8>, BufferError> {
    let text = text.trim_matches(|c: char| c.is_ascii_whitespace());
    if text.is_empty() {
        return Err(BufferError::malformed("empty input"));
    }
    validate_alphabet(text)?;
    LENIENT
        .decode(text)
        .map_err(|e| BufferError::malformed(format!("invalid base64: {e}")))
}

/// Сериализует буфер в текст.
pub fn to_text(buffer: &TaggedBuffer) -> Result<String, BufferError> {
    if buffer.is_destroyed() {
        return Err(BufferError::Destroyed);
    }
    let envelope = encode_envelope(buffer.as_bytes(), buffer.max_size())?;
    let text = STANDARD.encode(&envelope);
    debug!(payload = buffer.len(), text = text.len(), "Buffer encoded to text");
    Ok(text)
}

/// Восстанавливает буфер из текста.
///
/// Максимальный размер берётся из конверта; из `config` используются
/// остальные параметры. Побочная таблица ссылок в текст не попадает,
/// поэтому ссылки восстановленного буфера читаются как `Nil`.
pub fn from_text(
    text: &str,
    config: &BufferConfig,
) -> Result<TaggedBuffer, BufferError> {
    let bytes = decode_base64(text)?;
    let envelope = parse_envelope(&bytes)?;

    let max_size = envelope.max_size as usize;
    let config = BufferConfig {
        initial_size: config.initial_size.min(max_size),
        max_size,
        ..config.clone()
    };
    debug!(
        payload = envelope.payload.len(),
        max_size = config.max_size,
        "Buffer decoded from text"
    );
    TaggedBuffer::from_payload(envelope.payload, config)
}

impl TaggedBuffer {
    /// См. [`to_text`].
    pub fn to_text(&self) -> Result<String, BufferError> {
        to_text(self)
    }

    /// См. [`from_text`].
    pub fn from_text(
        text: &str,
        config: &BufferConfig,
    ) -> Result<Self, BufferError> {
        from_text(text, config)
    }
}
