use std::fmt;

use bytes::Bytes;
use tagpack_error::{BufferError, ResultExt, TagpackResult};
use tracing::{debug, warn};

use super::{
    config::{BufferConfig, FallbackPolicy},
    reader::{self, ReadOutcome, MAX_NESTING_DEPTH},
    refs::RefTable,
    sink::FlushSink,
    store::{ByteStore, StoreMark},
};
use crate::{
    codec::{self, Encoder, TypeTag},
    value::{ExternalRef, Table, Value},
};

/// После `flush` хранилище крупнее этого и крупнее 4 × max_size
/// пересоздаётся размером max_size.
const SHRINK_THRESHOLD: usize = 1024 * 1024;

/// Снимок буфера для отката незавершённой записи.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BufferMark {
    store: StoreMark,
    refs: usize,
}

/// Буфер тегированных значений.
///
/// Один владелец, без внутренних блокировок. После [`TaggedBuffer::destroy`]
/// любая операция возвращает [`BufferError::Destroyed`].
pub struct TaggedBuffer {
    store: ByteStore,
    refs: RefTable,
    sink: Option<Box<dyn FlushSink>>,
    config: BufferConfig,
    scratch: Vec<u8>,
    destroyed: bool,
}

impl fmt::Debug for TaggedBuffer {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.debug_struct("TaggedBuffer")
            .field("len", &self.store.cursor())
            .field("capacity", &self.store.capacity())
            .field("max_size", &self.store.max_size())
            .field("refs", &self.refs.len())
            .field("has_sink", &self.sink.is_some())
            .field("destroyed", &self.destroyed)
            .finish()
    }
}

impl TaggedBuffer {
    /// Создаёт пустой буфер. Начальная ёмкость не превышает максимума.
    pub fn create(
        initial_size: usize,
        max_size: usize,
        sink: Option<Box<dyn FlushSink>>,
    ) -> Result<Self, BufferError> {
        let config = BufferConfig::new(initial_size.min(max_size), max_size);
        let mut buffer = Self::build(config)?;
        buffer.sink = sink;
        Ok(buffer)
    }

    /// Создаёт буфер по проверенной конфигурации.
    pub fn with_config(config: BufferConfig) -> TagpackResult<Self> {
        config
            .validate()
            .context("Invalid buffer configuration")?;
        Self::build(config).context("Failed to allocate buffer")
    }

    fn build(config: BufferConfig) -> Result<Self, BufferError> {
        let store = ByteStore::new(config.initial_size, config.max_size)?;
        debug!(
            initial_size = config.initial_size,
            max_size = config.max_size,
            "Tagged buffer created"
        );
        Ok(Self {
            store,
            refs: RefTable::new(),
            sink: None,
            config,
            scratch: Vec::new(),
            destroyed: false,
        })
    }

    /// Восстанавливает буфер из нагрузки конверта.
    pub(crate) fn from_payload(
        payload: &[u8],
        config: BufferConfig,
    ) -> Result<Self, BufferError> {
        let store = ByteStore::from_payload(payload, config.max_size)?;
        Ok(Self {
            store,
            refs: RefTable::new(),
            sink: None,
            config,
            scratch: Vec::new(),
            destroyed: false,
        })
    }

    /// Устанавливает получателя для `flush`.
    pub fn set_sink(
        &mut self,
        sink: Box<dyn FlushSink>,
    ) -> Result<(), BufferError> {
        self.ensure_alive()?;
        self.sink = Some(sink);
        Ok(())
    }

    fn ensure_alive(&self) -> Result<(), BufferError> {
        if self.destroyed {
            return Err(BufferError::Destroyed);
        }
        Ok(())
    }

    /// Дописывает значение в поток.
    ///
    /// Ошибка посреди таблицы оставляет уже записанные записи на месте;
    /// для атомарной записи используйте [`mark`](Self::mark) и
    /// [`rewind`](Self::rewind).
    pub fn add(
        &mut self,
        value: &Value,
    ) -> Result<(), BufferError> {
        self.ensure_alive()?;
        self.write_value(value, 0)
    }

    /// Дописывает пару ключ-значение.
    pub fn add_pair(
        &mut self,
        key: &Value,
        value: &Value,
    ) -> Result<(), BufferError> {
        self.ensure_alive()?;
        self.write_tag(TypeTag::KeyValuePair)?;
        self.write_value(key, 0)?;
        self.write_value(value, 0)
    }

    fn write_tag(
        &mut self,
        tag: TypeTag,
    ) -> Result<(), BufferError> {
        self.store.append(&[tag.as_byte()])
    }

    fn write_value(
        &mut self,
        value: &Value,
        depth: usize,
    ) -> Result<(), BufferError> {
        match value {
            Value::Table(table) => self.write_table(table, depth),
            Value::Ref(r) => self.write_ref(*r),
            scalar => {
                self.scratch.clear();
                encode_scalar(
                    &mut Encoder::new(&mut self.scratch),
                    scalar,
                    self.config.fallback,
                )?;
                self.store.append(&self.scratch)
            }
        }
    }

    /// Таблицы глубже [`MAX_NESTING_DEPTH`] не пишутся: читатель их
    /// не примет.
    fn write_table(
        &mut self,
        table: &Table,
        depth: usize,
    ) -> Result<(), BufferError> {
        if depth >= MAX_NESTING_DEPTH {
            return Err(BufferError::ValueTooLarge {
                what: "table nesting",
                size: depth + 1,
                limit: MAX_NESTING_DEPTH,
            });
        }
        self.write_tag(TypeTag::Table)?;
        for (key, value) in table.iter() {
            self.write_tag(TypeTag::KeyValuePair)?;
            self.write_value(key, depth + 1)?;
            self.write_value(value, depth + 1)?;
        }
        self.write_tag(TypeTag::Nil)
    }

    fn write_ref(
        &mut self,
        r: ExternalRef,
    ) -> Result<(), BufferError> {
        self.write_tag(TypeTag::Instance)?;
        self.refs.push(r);
        Ok(())
    }

    /// Передаёт накопленные байты получателю и очищает буфер.
    ///
    /// Возвращает число переданных байтов. Без получателя байты
    /// отбрасываются.
    pub fn flush(&mut self) -> Result<usize, BufferError> {
        self.ensure_alive()?;
        let bytes = Bytes::copy_from_slice(self.store.as_bytes());
        let flushed = bytes.len();
        match self.sink.as_mut() {
            Some(sink) => sink.consume(bytes),
            None => debug!(bytes = flushed, "Flush without sink, bytes dropped"),
        }
        self.reset()?;
        debug!(bytes = flushed, "Tagged buffer flushed");
        Ok(flushed)
    }

    fn reset(&mut self) -> Result<(), BufferError> {
        self.store.reset();
        self.refs.clear();
        let capacity = self.store.capacity();
        let max_size = self.store.max_size();
        if capacity > SHRINK_THRESHOLD && capacity > max_size.saturating_mul(4) {
            debug!(capacity, max_size, "Reallocating oversized byte store");
            self.store.reallocate(max_size)?;
        }
        Ok(())
    }

    /// Сбрасывает курсор и ссылки без передачи данных.
    pub fn clear(&mut self) -> Result<(), BufferError> {
        self.ensure_alive()?;
        self.store.reset();
        self.refs.clear();
        Ok(())
    }

    /// Освобождает память. Повторный вызов возвращает `Destroyed`.
    pub fn destroy(&mut self) -> Result<(), BufferError> {
        self.ensure_alive()?;
        self.store.release();
        self.refs.clear();
        self.sink = None;
        self.scratch = Vec::new();
        self.destroyed = true;
        debug!("Tagged buffer destroyed");
        Ok(())
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    /// Читает поток в таблицу.
    ///
    /// Повреждённый поток не считается ошибкой: возвращается всё, что
    /// удалось прочитать до места повреждения, а причина пишется в лог.
    pub fn read(&mut self) -> Result<Table, BufferError> {
        let outcome = self.read_outcome()?;
        if let Some(err) = &outcome.error {
            warn!(error = %err, entries = outcome.table.len(), "Buffer read stopped early");
        }
        Ok(outcome.table)
    }

    /// Как [`read`](Self::read), но повреждённый поток возвращает ошибку.
    pub fn read_strict(&mut self) -> Result<Table, BufferError> {
        self.read_outcome()?.into_result()
    }

    /// Полный результат чтения вместе с причиной остановки.
    pub fn read_outcome(&mut self) -> Result<ReadOutcome, BufferError> {
        self.ensure_alive()?;
        self.refs.rewind_reads();
        Ok(reader::decode_stream(self.store.as_bytes(), &mut self.refs))
    }

    pub fn mark(&self) -> Result<BufferMark, BufferError> {
        self.ensure_alive()?;
        Ok(BufferMark {
            store: self.store.mark(),
            refs: self.refs.len(),
        })
    }

    /// Откатывает всё, что записано после снимка.
    pub fn rewind(
        &mut self,
        mark: BufferMark,
    ) -> Result<(), BufferError> {
        self.ensure_alive()?;
        self.store.rewind(mark.store);
        self.refs.truncate(mark.refs);
        Ok(())
    }

    /// Длина записанного потока в байтах.
    pub fn len(&self) -> usize {
        self.store.cursor()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.store.capacity()
    }

    pub fn max_size(&self) -> usize {
        self.store.max_size()
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.store.as_bytes()
    }

    pub fn refs(&self) -> &[ExternalRef] {
        self.refs.as_slice()
    }

    pub fn config(&self) -> &BufferConfig {
        &self.config
    }
}

/// Кодирует значение без вложенной структуры: всё, кроме таблиц и ссылок.
pub fn encode_scalar(
    enc: &mut Encoder<'_>,
    value: &Value,
    fallback: FallbackPolicy,
) -> Result<(), BufferError> {
    match value {
        Value::Nil => enc.put_u8(TypeTag::Nil.as_byte()),
        Value::Bool(b) => {
            enc.put_u8(TypeTag::Bool.as_byte());
            enc.put_u8(*b as u8);
        }
        Value::Number(n) => {
            codec::put_number(enc, *n);
        }
        Value::Str(s) => codec::put_string(enc, s)?,
        Value::Vector2(v) => codec::put_composite(enc, v)?,
        Value::Vector3(v) => codec::put_composite(enc, v)?,
        Value::CFrame(v) => codec::put_composite(enc, v)?,
        Value::Color3(v) => codec::put_composite(enc, v)?,
        Value::UDim(v) => codec::put_composite(enc, v)?,
        Value::UDim2(v) => codec::put_composite(enc, v)?,
        Value::Rect(v) => codec::put_composite(enc, v)?,
        Value::NumberRange(v) => codec::put_composite(enc, v)?,
        Value::NumberSequence(v) => codec::put_composite(enc, v)?,
        Value::ColorSequence(v) => codec::put_composite(enc, v)?,
        Value::BrickColor(v) => codec::put_composite(enc, v)?,
        Value::Opaque(text) => match fallback {
            FallbackPolicy::Stringify => {
                warn!(text = %text, "Value has no wire type, storing its text form");
                codec::put_string(enc, text)?;
            }
            FallbackPolicy::Reject => {
                return Err(BufferError::UnsupportedValue {
                    type_name: value.type_name().to_string(),
                })
            }
        },
        Value::Table(_) | Value::Ref(_) => {
            return Err(BufferError::UnsupportedValue {
                type_name: value.type_name().to_string(),
            })
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{buffer::sink::CollectSink, value::Vector3};

    fn buffer(max_size: usize) -> TaggedBuffer {
        TaggedBuffer::create(16, max_size, None).unwrap()
    }

    /// Тест проверяет раскладку таблицы: тег, пары, терминатор.
    #[test]
    fn test_table_layout() {
        let mut buf = buffer(1024);
        let mut table = Table::new();
        table.insert("a", 1);
        table.insert("b", "x");
        buf.add(&Value::Table(table.clone())).unwrap();

        assert_eq!(
            buf.as_bytes(),
            &[26, 27, 12, 1, b'a', 5, 1, 27, 12, 1, b'b', 12, 1, b'x', 0]
        );
        let back = buf.read_strict().unwrap();
        assert_eq!(back.get(&Value::from(1)), Some(&Value::Table(table)));
    }

    /// Тест проверяет запись пары и её чтение по ключу.
    #[test]
    fn test_add_pair() {
        let mut buf = buffer(1024);
        buf.add_pair(&Value::from("pos"), &Value::from(Vector3::new(1.0, 2.0, 3.0)))
            .unwrap();
        let table = buf.read().unwrap();
        assert_eq!(
            table.get_str("pos"),
            Some(&Value::Vector3(Vector3::new(1.0, 2.0, 3.0)))
        );
    }

    /// Тест проверяет, что отказ по ёмкости не меняет курсор.
    #[test]
    fn test_capacity_rejection() {
        let mut buf = buffer(4);
        buf.add(&Value::from(1)).unwrap();
        let err = buf.add(&Value::from("hello")).unwrap_err();
        assert!(matches!(err, BufferError::CapacityExceeded { .. }));
        assert_eq!(buf.len(), 2);
    }

    /// Тест проверяет атомарную запись через снимок.
    #[test]
    fn test_mark_rewind_composite() {
        let mut buf = buffer(8);
        let mut table = Table::new();
        table.insert("key", "value");
        let mark = buf.mark().unwrap();
        assert!(buf.add(&Value::Table(table)).is_err());
        assert!(!buf.is_empty());
        buf.rewind(mark).unwrap();
        assert!(buf.is_empty());
    }

    /// Тест проверяет ссылки: запись в побочную таблицу и повторное чтение.
    #[test]
    fn test_refs_are_side_table() {
        let mut buf = buffer(64);
        buf.add(&Value::Ref(ExternalRef(5))).unwrap();
        assert_eq!(buf.as_bytes(), &[15]);
        assert_eq!(buf.refs(), &[ExternalRef(5)]);
        for _ in 0..2 {
            let table = buf.read().unwrap();
            assert_eq!(table.get(&Value::from(1)), Some(&Value::Ref(ExternalRef(5))));
        }
    }

    /// Тест проверяет обе политики для значений без представления.
    #[test]
    fn test_fallback_policies() {
        let mut buf = buffer(64);
        buf.add(&Value::Opaque("function: 0x1".into())).unwrap();
        assert_eq!(buf.as_bytes()[0], TypeTag::String.as_byte());

        let config = BufferConfig::new(16, 64).with_fallback(FallbackPolicy::Reject);
        let mut strict = TaggedBuffer::with_config(config).unwrap();
        let err = strict.add(&Value::Opaque("thread".into())).unwrap_err();
        assert_eq!(
            err,
            BufferError::UnsupportedValue {
                type_name: "userdata".into()
            }
        );
        assert!(strict.is_empty());
    }

    /// Тест проверяет передачу байтов получателю и очистку после flush.
    #[test]
    fn test_flush_to_sink() {
        let sink = CollectSink::new();
        let mut buf = TaggedBuffer::create(16, 64, Some(Box::new(sink.clone()))).unwrap();
        buf.add(&Value::from(200)).unwrap();
        buf.add(&Value::Ref(ExternalRef(1))).unwrap();

        assert_eq!(buf.flush().unwrap(), 3);
        assert!(buf.is_empty());
        assert!(buf.refs().is_empty());
        assert_eq!(sink.chunks(), vec![Bytes::from_static(&[5, 200, 15])]);

        assert_eq!(buf.flush().unwrap(), 0);
        assert_eq!(sink.total_len(), 3);
    }

    /// Тест проверяет получателя-замыкание.
    #[test]
    fn test_flush_to_closure() {
        let (tx, rx) = std::sync::mpsc::channel();
        let mut buf = TaggedBuffer::create(
            16,
            64,
            Some(Box::new(move |bytes: Bytes| {
                tx.send(bytes.len()).unwrap();
            })),
        )
        .unwrap();
        buf.add(&Value::Bool(true)).unwrap();
        buf.flush().unwrap();
        assert_eq!(rx.recv().unwrap(), 2);
    }

    /// Тест проверяет, что после destroy все операции отказывают.
    #[test]
    fn test_destroyed_buffer() {
        let mut buf = buffer(64);
        buf.add(&Value::from(1)).unwrap();
        buf.destroy().unwrap();

        assert!(buf.is_destroyed());
        assert_eq!(buf.capacity(), 0);
        assert_eq!(buf.add(&Value::Nil), Err(BufferError::Destroyed));
        assert_eq!(buf.read(), Err(BufferError::Destroyed));
        assert_eq!(buf.flush(), Err(BufferError::Destroyed));
        assert_eq!(buf.clear(), Err(BufferError::Destroyed));
        assert_eq!(buf.destroy(), Err(BufferError::Destroyed));
    }

    /// Тест проверяет, что слишком глубокая таблица не пишется.
    #[test]
    fn test_nesting_limit_on_write() {
        let mut value = Value::Table(Table::new());
        for _ in 0..MAX_NESTING_DEPTH {
            let mut outer = Table::new();
            outer.push(value);
            value = Value::Table(outer);
        }
        let mut buf = buffer(1 << 16);
        assert!(matches!(
            buf.add(&value),
            Err(BufferError::ValueTooLarge { what: "table nesting", .. })
        ));
    }

    /// Тест проверяет отказ конфигурации с нарушенными лимитами.
    #[test]
    fn test_with_config_validates() {
        let err = TaggedBuffer::with_config(BufferConfig::new(100, 10)).unwrap_err();
        assert_eq!(err.status_code(), tagpack_error::StatusCode::InvalidConfig);
        assert_eq!(err.frames()[0].message, "Invalid buffer configuration");
    }

    /// Тест проверяет пересоздание раздутого хранилища после flush.
    #[test]
    fn test_flush_shrinks_oversized_store() {
        let mut buf = buffer(1024);
        buf.store.reallocate(2 * SHRINK_THRESHOLD).unwrap();
        buf.add(&Value::from(1)).unwrap();
        assert_eq!(buf.capacity(), 2 * SHRINK_THRESHOLD);

        assert_eq!(buf.flush().unwrap(), 2);
        assert!(buf.is_empty());
        assert_eq!(buf.capacity(), buf.max_size());
        buf.add(&Value::from(2)).unwrap();
        assert_eq!(buf.as_bytes(), &[5, 2]);
    }

    /// Тест проверяет, что хранилище не больше 4 × max_size сохраняет ёмкость.
    #[test]
    fn test_flush_keeps_store_within_ratio() {
        let mut buf = buffer(SHRINK_THRESHOLD);
        buf.store.reallocate(2 * SHRINK_THRESHOLD).unwrap();
        buf.add(&Value::from(1)).unwrap();
        buf.flush().unwrap();
        assert_eq!(buf.capacity(), 2 * SHRINK_THRESHOLD);

        let mut small = buffer(64);
        small.store.reallocate(1024).unwrap();
        small.flush().unwrap();
        assert_eq!(small.capacity(), 1024);
    }
}
