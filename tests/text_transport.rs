//! Интеграционные тесты текстового транспорта.

use base64::{engine::general_purpose::STANDARD, Engine};
use tagpack::{
    from_text, to_text,
    transport::{encode_envelope, ENVELOPE_VERSION, HEADER_LEN, TRAILER_LEN},
    BufferConfig, BufferError, CFrame, NumberRange, Table, TaggedBuffer, Value, Vector3,
};

fn config() -> BufferConfig {
    BufferConfig::default()
}

fn assert_malformed(text: &str) {
    match from_text(text, &config()) {
        Err(BufferError::MalformedEnvelope { .. }) => {}
        other => panic!("expected MalformedEnvelope for {text:?}, got {other:?}"),
    }
}

/// Тест проверяет круговой проход пустого буфера.
#[test]
fn test_empty_buffer() {
    let buf = TaggedBuffer::create(8, 100, None).unwrap();
    let text = to_text(&buf).unwrap();
    let raw = STANDARD.decode(&text).unwrap();
    assert_eq!(raw.len(), HEADER_LEN + TRAILER_LEN);
    assert_eq!(raw[0], ENVELOPE_VERSION);

    let back = from_text(&text, &config()).unwrap();
    assert!(back.is_empty());
    assert_eq!(back.max_size(), 100);
}

/// Тест проверяет одно значение.
#[test]
fn test_single_value() {
    let mut buf = TaggedBuffer::create(8, 100, None).unwrap();
    buf.add(&Value::from(NumberRange::new(1.0, 2.5))).unwrap();
    let mut back = from_text(&buf.to_text().unwrap(), &config()).unwrap();
    assert_eq!(back.len(), buf.len());
    assert_eq!(
        back.read_strict().unwrap().get(&Value::from(1)),
        Some(&Value::NumberRange(NumberRange::new(1.0, 2.5)))
    );
}

/// Тест проверяет буфер с несколькими записями и вложенностью.
#[test]
fn test_multi_entry() {
    let mut buf = TaggedBuffer::create(8, 4096, None).unwrap();
    let mut inner = Table::new();
    inner.push("x");
    inner.push(2);
    buf.add_pair(&Value::from("list"), &Value::Table(inner))
        .unwrap();
    buf.add_pair(
        &Value::from("cf"),
        &Value::from(CFrame {
            position: Vector3::new(1.0, 2.0, 3.0),
            rotation: Vector3::default(),
        }),
    )
    .unwrap();
    buf.add(&Value::from(true)).unwrap();

    let mut back = from_text(&buf.to_text().unwrap(), &config()).unwrap();
    assert_eq!(back.as_bytes(), buf.as_bytes());
    assert_eq!(back.read_strict().unwrap(), buf.read_strict().unwrap());
}

/// Тест проверяет, что восстановленный буфер можно дописывать.
#[test]
fn test_restored_buffer_is_writable() {
    let mut buf = TaggedBuffer::create(8, 32, None).unwrap();
    buf.add(&Value::from(1)).unwrap();
    let mut back = from_text(&buf.to_text().unwrap(), &config()).unwrap();
    back.add(&Value::from(2)).unwrap();
    assert_eq!(back.as_bytes(), &[5, 1, 5, 2]);
    assert!(back.add(&Value::from("a".repeat(40))).is_err());
}

/// Тест проверяет отказ для пустого и не-base64 ввода.
#[test]
fn test_rejects_bad_text() {
    assert_malformed("");
    assert_malformed("\n");
    assert_malformed("not base64!");
    assert_malformed("AAAA-AAA");
    assert_malformed("AA==A");
    assert_malformed("A");
}

/// Тест проверяет отказ для неверной версии и повреждённого заголовка.
#[test]
fn test_rejects_bad_envelope() {
    let mut wrong_version = encode_envelope(&[5, 1], 64).unwrap();
    wrong_version[0] = 0;
    assert_malformed(&STANDARD.encode(&wrong_version));

    let mut mismatch = encode_envelope(&[5, 1], 64).unwrap();
    mismatch[1] = 1;
    assert_malformed(&STANDARD.encode(&mismatch));

    let too_big = encode_envelope(&[0; 65], 64).unwrap();
    assert_malformed(&STANDARD.encode(&too_big));

    let mut trailing = encode_envelope(&[5, 1], 64).unwrap();
    trailing.extend_from_slice(&[0, 0]);
    assert_malformed(&STANDARD.encode(&trailing));
}
