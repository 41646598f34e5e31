//! Обход потока тегов и восстановление таблицы.
//!
//! Верхний уровень потока — последовательность записей до конца данных:
//! пара `KeyValuePair` кладётся в результат по своему ключу, голое значение
//! занимает следующую позицию 1, 2, 3…, а голый `Nil` лишь сдвигает позицию.
//! Вложенная таблица устроена так же, но завершается тегом `Nil`.

use tagpack_error::BufferError;

use super::refs::RefTable;
use crate::{
    codec::{self, Decoder, TypeTag, WireCodec},
    value::{
        BrickColor, CFrame, Color3, ColorSequence, NumberRange, NumberSequence, Rect, Table, UDim,
        UDim2, Value, Vector2, Vector3,
    },
};

/// Наибольшая глубина вложенности таблиц при чтении.
pub const MAX_NESTING_DEPTH: usize = 128;

/// Результат чтения: всё, что удалось восстановить, и ошибка, на которой
/// чтение остановилось.
#[derive(Debug, Clone, PartialEq)]
pub struct ReadOutcome {
    pub table: Table,
    pub error: Option<BufferError>,
}

impl ReadOutcome {
    pub fn into_result(self) -> Result<Table, BufferError> {
        match self.error {
            Some(err) => Err(err),
            None => Ok(self.table),
        }
    }
}

/// Декодирует весь поток. Ссылки берутся из `refs` по порядку.
pub fn decode_stream(
    bytes: &[u8],
    refs: &mut RefTable,
) -> ReadOutcome {
    let mut dec = Decoder::new(bytes);
    let mut table = Table::new();
    let error = read_entries(&mut dec, refs, &mut table, 0, false).err();
    ReadOutcome { table, error }
}

/// Декодирует одно значение с его тегом.
pub fn decode_value(
    dec: &mut Decoder<'_>,
    refs: &mut RefTable,
) -> Result<Value, BufferError> {
    decode_value_at(dec, refs, 0)
}

fn read_tag(dec: &mut Decoder<'_>) -> Result<TypeTag, BufferError> {
    let offset = dec.position();
    let byte = dec.get_u8()?;
    TypeTag::from_byte(byte).ok_or(BufferError::UnknownTag { tag: byte, offset })
}

fn read_entries(
    dec: &mut Decoder<'_>,
    refs: &mut RefTable,
    table: &mut Table,
    depth: usize,
    terminated: bool,
) -> Result<(), BufferError> {
    let mut position = 1usize;
    loop {
        if !terminated && dec.is_at_end() {
            return Ok(());
        }
        match read_tag(dec)? {
            TypeTag::Nil if terminated => return Ok(()),
            TypeTag::Nil => position += 1,
            TypeTag::KeyValuePair => {
                let key = decode_value_at(dec, refs, depth)?;
                let value = decode_value_at(dec, refs, depth)?;
                table.insert(key, value);
            }
            tag => {
                let value = decode_payload(dec, tag, refs, depth)?;
                table.insert(position, value);
                position += 1;
            }
        }
    }
}

fn decode_value_at(
    dec: &mut Decoder<'_>,
    refs: &mut RefTable,
    depth: usize,
) -> Result<Value, BufferError> {
    let offset = dec.position();
    match read_tag(dec)? {
        // Пара допустима только как запись таблицы.
        TypeTag::KeyValuePair => Err(BufferError::UnknownTag {
            tag: TypeTag::KeyValuePair.as_byte(),
            offset,
        }),
        tag => decode_payload(dec, tag, refs, depth),
    }
}

fn composite<T: WireCodec>(
    dec: &mut Decoder<'_>,
    wrap: fn(T) -> Value,
) -> Result<Value, BufferError> {
    T::decode(dec).map(wrap)
}

fn decode_payload(
    dec: &mut Decoder<'_>,
    tag: TypeTag,
    refs: &mut RefTable,
    depth: usize,
) -> Result<Value, BufferError> {
    if let Some(number) = codec::get_number(dec, tag) {
        return number.map(Value::Number);
    }
    match tag {
        TypeTag::Nil => Ok(Value::Nil),
        TypeTag::Bool => Ok(Value::Bool(dec.get_u8()? != 0)),
        TypeTag::String | TypeTag::StringLong => codec::get_string(dec, tag).map(Value::Str),
        TypeTag::Instance => Ok(refs.next_ref().map_or(Value::Nil, Value::Ref)),
        TypeTag::Vector2 => composite::<Vector2>(dec, Value::Vector2),
        TypeTag::Vector3 => composite::<Vector3>(dec, Value::Vector3),
        TypeTag::CFrame => composite::<CFrame>(dec, Value::CFrame),
        TypeTag::Color3 => composite::<Color3>(dec, Value::Color3),
        TypeTag::UDim => composite::<UDim>(dec, Value::UDim),
        TypeTag::UDim2 => composite::<UDim2>(dec, Value::UDim2),
        TypeTag::Rect => composite::<Rect>(dec, Value::Rect),
        TypeTag::NumberRange => composite::<NumberRange>(dec, Value::NumberRange),
        TypeTag::NumberSequence => composite::<NumberSequence>(dec, Value::NumberSequence),
        TypeTag::ColorSequence => composite::<ColorSequence>(dec, Value::ColorSequence),
        TypeTag::BrickColor => composite::<BrickColor>(dec, Value::BrickColor),
        TypeTag::Table => {
            if depth >= MAX_NESTING_DEPTH {
                return Err(BufferError::ValueTooLarge {
                    what: "table nesting",
                    size: depth + 1,
                    limit: MAX_NESTING_DEPTH,
                });
            }
            let mut table = Table::new();
            read_entries(dec, refs, &mut table, depth + 1, true)?;
            Ok(Value::Table(table))
        }
        // Числа разобраны выше, пара обрабатывается вызывающим.
        _ => Err(BufferError::UnknownTag {
            tag: tag.as_byte(),
            offset: dec.position().saturating_sub(1),
        }),
    }
}

/// Запись в постраничном дампе потока.
#[derive(Debug, Clone, PartialEq)]
pub struct TagRecord {
    pub offset: usize,
    pub tag: TypeTag,
    pub depth: usize,
    /// Значение для скалярных тегов; `None` для таблиц, пар и терминаторов.
    pub value: Option<Value>,
}

/// Плоский дамп всех тегов потока в порядке следования.
///
/// Дамп останавливается на первой ошибке; уже собранные записи
/// возвращаются вместе с ней.
pub fn scan(bytes: &[u8]) -> (Vec<TagRecord>, Option<BufferError>) {
    let mut dec = Decoder::new(bytes);
    let mut refs = RefTable::new();
    let mut records = Vec::new();
    while !dec.is_at_end() {
        if let Err(err) = scan_value(&mut dec, &mut refs, 0, 0, &mut records) {
            return (records, Some(err));
        }
    }
    (records, None)
}

/// `nesting` считает только уровни таблиц и ограничен так же, как при
/// чтении; `indent` задаёт отступ записи в дампе.
fn scan_value(
    dec: &mut Decoder<'_>,
    refs: &mut RefTable,
    nesting: usize,
    indent: usize,
    records: &mut Vec<TagRecord>,
) -> Result<(), BufferError> {
    let offset = dec.position();
    let tag = read_tag(dec)?;
    let record = |value| TagRecord {
        offset,
        tag,
        depth: indent,
        value,
    };
    match tag {
        TypeTag::KeyValuePair => {
            records.push(record(None));
            scan_value(dec, refs, nesting, indent + 1, records)?;
            scan_value(dec, refs, nesting, indent + 1, records)
        }
        TypeTag::Table => {
            if nesting >= MAX_NESTING_DEPTH {
                return Err(BufferError::ValueTooLarge {
                    what: "table nesting",
                    size: nesting + 1,
                    limit: MAX_NESTING_DEPTH,
                });
            }
            records.push(record(None));
            loop {
                if dec.peek_u8()? == TypeTag::Nil.as_byte() {
                    records.push(TagRecord {
                        offset: dec.position(),
                        tag: TypeTag::Nil,
                        depth: indent + 1,
                        value: None,
                    });
                    dec.get_u8()?;
                    return Ok(());
                }
                scan_value(dec, refs, nesting + 1, indent + 1, records)?;
            }
        }
        tag => {
            let value = decode_payload(dec, tag, refs, nesting)?;
            records.push(record(Some(value)));
            Ok(())
        }
    }
}
