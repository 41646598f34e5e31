//! Property-based tests для буфера и текстового транспорта
//!
//! Генерируют тысячи значений и проверяют круговой проход через поток
//! тегов и через текст, а также устойчивость разбора к мусору.

use base64::{engine::general_purpose::STANDARD, Engine};
use proptest::prelude::*;
use tagpack::{
    buffer::ByteStore,
    codec::{classify, NumberKind},
    transport::encode_envelope,
    BufferConfig, TaggedBuffer, TypeTag, Value,
};

use generators::*;

const PROPTEST_CASES: u32 = 500;
const PROPTEST_MAX_SHRINK_ITERS: u32 = 10000;

fn round_trip(value: &Value) -> Value {
    let mut buf = TaggedBuffer::create(64, 1 << 24, None).unwrap();
    buf.add(value).unwrap();
    let table = buf.read_strict().unwrap();
    table.get(&Value::from(1)).cloned().unwrap_or_default()
}

fn round_trip_number(n: f64) -> (TypeTag, f64) {
    let mut buf = TaggedBuffer::create(16, 64, None).unwrap();
    buf.add(&Value::Number(n)).unwrap();
    let tag = TypeTag::from_byte(buf.as_bytes()[0]).unwrap();
    let back = buf.read_strict().unwrap();
    (tag, back.get(&Value::from(1)).and_then(Value::as_number).unwrap())
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: PROPTEST_CASES,
        max_shrink_iters: PROPTEST_MAX_SHRINK_ITERS,
        .. ProptestConfig::default()
    })]

    /// Целые числа восстанавливаются точно.
    #[test]
    fn prop_integers_exact(n in integer_strategy()) {
        let (_, back) = round_trip_number(n);
        prop_assert_eq!(back, n);
    }

    /// Целые в 32-битных диапазонах получают минимальный целый тег.
    #[test]
    fn prop_integer_tag_is_minimal(n in (i32::MIN as i64..=u32::MAX as i64)) {
        let kind = classify(n as f64);
        let expected = if n >= 0 {
            if n <= u8::MAX as i64 { NumberKind::U8 }
            else if n <= u16::MAX as i64 { NumberKind::U16 }
            else { NumberKind::U32 }
        } else if n >= i8::MIN as i64 { NumberKind::I8 }
        else if n >= i16::MIN as i64 { NumberKind::I16 }
        else { NumberKind::I32 };
        prop_assert_eq!(kind, expected);
    }

    /// Дробные в диапазоне float16 теряют не больше 2^-10 относительно.
    #[test]
    fn prop_f16_precision(v in f16_fraction_strategy()) {
        let (tag, back) = round_trip_number(v);
        prop_assert_eq!(tag, TypeTag::Float16);
        prop_assert!(((back - v) / v).abs() <= 2f64.powi(-10), "{} -> {}", v, back);
    }

    /// Дробные в диапазоне float24 теряют не больше 2^-17 относительно.
    #[test]
    fn prop_f24_precision(v in f24_fraction_strategy()) {
        let (tag, back) = round_trip_number(v);
        prop_assert_eq!(tag, TypeTag::Float24);
        prop_assert!(((back - v) / v).abs() <= 2f64.powi(-17), "{} -> {}", v, back);
    }

    /// Любое значение (включая вложенные таблицы) проходит поток без потерь.
    #[test]
    fn prop_value_round_trip(value in value_strategy()) {
        prop_assert_eq!(round_trip(&value), value);
    }

    /// Пары ключ-значение читаются по своим ключам.
    #[test]
    fn prop_pairs_round_trip(
        entries in prop::collection::vec((key_strategy(), leaf_value_strategy()), 0..20)
    ) {
        let mut buf = TaggedBuffer::create(64, 1 << 24, None).unwrap();
        let mut expected = tagpack::Table::new();
        for (key, value) in &entries {
            buf.add_pair(key, value).unwrap();
            expected.insert(key.clone(), value.clone());
        }
        prop_assert_eq!(buf.read_strict().unwrap(), expected);
    }

    /// Текстовый транспорт восстанавливает байты, длину и максимум.
    #[test]
    fn prop_text_round_trip(
        values in prop::collection::vec(value_strategy(), 0..8),
        max_size in (1usize << 20)..(1usize << 22),
    ) {
        let mut buf = TaggedBuffer::create(64, max_size, None).unwrap();
        for value in &values {
            buf.add(value).unwrap();
        }
        let text = buf.to_text().unwrap();
        let back = TaggedBuffer::from_text(&text, &BufferConfig::default()).unwrap();
        prop_assert_eq!(back.as_bytes(), buf.as_bytes());
        prop_assert_eq!(back.max_size(), max_size);
    }

    /// Рост хранилища не меняет уже записанные байты.
    #[test]
    fn prop_growth_preserves_bytes(
        chunks in prop::collection::vec(prop::collection::vec(any::<u8>(), 0..300), 0..40)
    ) {
        let mut store = ByteStore::new(1, 1 << 20).unwrap();
        let mut expected = Vec::new();
        for chunk in &chunks {
            store.append(chunk).unwrap();
            expected.extend_from_slice(chunk);
            prop_assert!(store.cursor() <= store.capacity());
        }
        prop_assert_eq!(store.as_bytes(), expected.as_slice());
    }

    /// Произвольный текст не вызывает паники.
    #[test]
    fn prop_from_text_never_panics(text in ".{0,200}") {
        let _ = TaggedBuffer::from_text(&text, &BufferConfig::default());
    }

    /// Произвольный поток внутри корректного конверта читается без паники,
    /// а нестрогое чтение всегда возвращает таблицу.
    #[test]
    fn prop_read_garbage_never_panics(payload in prop::collection::vec(any::<u8>(), 0..512)) {
        let envelope = encode_envelope(&payload, 1024).unwrap();
        let text = STANDARD.encode(envelope);
        let mut buf = TaggedBuffer::from_text(&text, &BufferConfig::default()).unwrap();
        prop_assert!(buf.read().is_ok());
        let _ = buf.read_strict();
    }
}
