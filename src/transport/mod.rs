//! Текстовый транспорт: двоичный конверт с версией и его base64-форма.

pub mod envelope;
pub mod text;

pub use envelope::{
    encode_envelope, parse_envelope, Envelope, EnvelopeVersion, ENVELOPE_VERSION, HEADER_LEN,
    TRAILER_LEN,
};
pub use text::{decode_base64, from_text, to_text};
