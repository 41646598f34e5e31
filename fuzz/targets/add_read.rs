#![no_main]

use libfuzzer_sys::fuzz_target;
use tagpack::{TaggedBuffer, Value};

// Запись произвольных значений не паникует, а записанный поток читается
// строго без ошибок.
fuzz_target!(|values: Vec<Value>| {
    let mut buf = TaggedBuffer::create(16, 1 << 16, None).expect("valid limits");
    for value in &values {
        let mark = buf.mark().expect("buffer is alive");
        if buf.add(value).is_err() {
            buf.rewind(mark).expect("buffer is alive");
        }
    }
    buf.read_strict().expect("written stream must be readable");
});
