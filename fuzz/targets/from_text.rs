#![no_main]

use libfuzzer_sys::fuzz_target;
use tagpack::{BufferConfig, TaggedBuffer};

// Разбор произвольного текста не должен паниковать; успешно разобранный
// буфер обязан сериализоваться обратно в тот же конверт.
fuzz_target!(|text: &str| {
    let Ok(mut buf) = TaggedBuffer::from_text(text, &BufferConfig::default()) else {
        return;
    };
    let _ = buf.read();
    let again = buf.to_text().expect("restored buffer must encode");
    let back = TaggedBuffer::from_text(&again, &BufferConfig::default())
        .expect("own output must decode");
    assert_eq!(back.as_bytes(), buf.as_bytes());
});
