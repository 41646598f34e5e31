#![no_main]

use base64::{engine::general_purpose::STANDARD, Engine};
use libfuzzer_sys::fuzz_target;
use tagpack::{buffer::scan, transport::encode_envelope, BufferConfig, TaggedBuffer};

// Произвольный поток в корректном конверте: чтение и дамп не паникуют,
// нестрогое и строгое чтение согласованы.
fuzz_target!(|payload: Vec<u8>| {
    let Ok(envelope) = encode_envelope(&payload, payload.len().max(1)) else {
        return;
    };
    let text = STANDARD.encode(envelope);
    let mut buf = TaggedBuffer::from_text(&text, &BufferConfig::default())
        .expect("valid envelope must decode");

    let outcome = buf.read_outcome().expect("buffer is alive");
    match buf.read_strict() {
        Ok(table) => {
            assert!(outcome.error.is_none());
            assert_eq!(table, outcome.table);
        }
        Err(err) => assert_eq!(Some(err), outcome.error),
    }
    let _ = scan(&payload);
});
