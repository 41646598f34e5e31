//! Мост между [`Value`] и JSON для CLI и отладочного вывода.
//!
//! Таблица-последовательность становится массивом, остальные таблицы —
//! объектами. Составные значения помечаются полем `"$type"`.

use serde::de::Error as _;
use serde_json::{json, Map, Number, Value as Json};

use super::{
    BrickColor, CFrame, Color3, ColorSequence, ExternalRef, NumberRange, NumberSequence, Rect,
    Table, UDim, UDim2, Value, Vector2, Vector3,
};

const TYPE_FIELD: &str = "$type";

/// Наибольшее целое, которое f64 представляет без потерь.
const MAX_SAFE_INTEGER: f64 = 9007199254740992.0;

fn number_to_json(n: f64) -> Json {
    if n.is_nan() {
        return Json::String("NaN".into());
    }
    if n.is_infinite() {
        return Json::String(if n > 0.0 { "inf" } else { "-inf" }.into());
    }
    if n.fract() == 0.0 && n.abs() < MAX_SAFE_INTEGER {
        return Json::Number(Number::from(n as i64));
    }
    Number::from_f64(n).map_or(Json::Null, Json::Number)
}

fn tagged<T: serde::Serialize>(
    type_name: &str,
    value: &T,
) -> Json {
    let mut object = match serde_json::to_value(value) {
        Ok(Json::Object(map)) => map,
        Ok(other) => {
            let mut map = Map::new();
            map.insert("value".into(), other);
            map
        }
        Err(_) => Map::new(),
    };
    object.insert(TYPE_FIELD.into(), Json::String(type_name.into()));
    Json::Object(object)
}

fn key_to_string(key: &Value) -> String {
    match key {
        Value::Str(s) => s.clone(),
        Value::Number(n) => match number_to_json(*n) {
            Json::String(s) => s,
            other => other.to_string(),
        },
        Value::Bool(b) => b.to_string(),
        other => format!("<{}>", other.type_name()),
    }
}

/// Преобразует значение в JSON.
pub fn to_json(value: &Value) -> Json {
    match value {
        Value::Nil => Json::Null,
        Value::Bool(b) => Json::Bool(*b),
        Value::Number(n) => number_to_json(*n),
        Value::Str(s) | Value::Opaque(s) => Json::String(s.clone()),
        Value::Vector2(v) => tagged("Vector2", v),
        Value::Vector3(v) => tagged("Vector3", v),
        Value::CFrame(v) => tagged("CFrame", v),
        Value::Color3(v) => tagged("Color3", v),
        Value::UDim(v) => tagged("UDim", v),
        Value::UDim2(v) => tagged("UDim2", v),
        Value::Rect(v) => tagged("Rect", v),
        Value::NumberRange(v) => tagged("NumberRange", v),
        Value::NumberSequence(v) => tagged("NumberSequence", v),
        Value::ColorSequence(v) => tagged("ColorSequence", v),
        Value::BrickColor(BrickColor(index)) => json!({ TYPE_FIELD: "BrickColor", "index": index }),
        Value::Ref(ExternalRef(id)) => json!({ TYPE_FIELD: "Instance", "ref": id }),
        Value::Table(t) => table_to_json(t),
    }
}

/// Преобразует таблицу в JSON-массив или объект.
pub fn table_to_json(table: &Table) -> Json {
    if !table.is_empty() && table.is_sequence() {
        let items = (1..=table.len())
            .filter_map(|i| table.get_index(i))
            .map(to_json)
            .collect();
        return Json::Array(items);
    }

    let object = table
        .iter()
        .map(|(k, v)| (key_to_string(k), to_json(v)))
        .collect();
    Json::Object(object)
}

fn typed_from_json(
    type_name: &str,
    json: &Json,
) -> Result<Value, serde_json::Error> {
    let value = match type_name {
        "Vector2" => Value::Vector2(serde_json::from_value::<Vector2>(json.clone())?),
        "Vector3" => Value::Vector3(serde_json::from_value::<Vector3>(json.clone())?),
        "CFrame" => Value::CFrame(serde_json::from_value::<CFrame>(json.clone())?),
        "Color3" => Value::Color3(serde_json::from_value::<Color3>(json.clone())?),
        "UDim" => Value::UDim(serde_json::from_value::<UDim>(json.clone())?),
        "UDim2" => Value::UDim2(serde_json::from_value::<UDim2>(json.clone())?),
        "Rect" => Value::Rect(serde_json::from_value::<Rect>(json.clone())?),
        "NumberRange" => Value::NumberRange(serde_json::from_value::<NumberRange>(json.clone())?),
        "NumberSequence" => {
            Value::NumberSequence(serde_json::from_value::<NumberSequence>(json.clone())?)
        }
        "ColorSequence" => {
            Value::ColorSequence(serde_json::from_value::<ColorSequence>(json.clone())?)
        }
        "BrickColor" => {
            let index = json
                .get("index")
                .and_then(Json::as_u64)
                .and_then(|i| u16::try_from(i).ok())
                .ok_or_else(|| serde_json::Error::custom("BrickColor.index must be u16"))?;
            Value::BrickColor(BrickColor(index))
        }
        "Instance" => {
            let id = json
                .get("ref")
                .and_then(Json::as_u64)
                .ok_or_else(|| serde_json::Error::custom("Instance.ref must be u64"))?;
            Value::Ref(ExternalRef(id))
        }
        other => {
            return Err(serde_json::Error::custom(format!(
                "unknown {TYPE_FIELD} '{other}'"
            )))
        }
    };
    Ok(value)
}

/// Преобразует JSON в значение.
///
/// Массивы становятся таблицами с позициями `1..=n` (позиции `null`
/// пропускаются), объекты с полем `"$type"` — составными значениями.
pub fn from_json(json: &Json) -> Result<Value, serde_json::Error> {
    let value = match json {
        Json::Null => Value::Nil,
        Json::Bool(b) => Value::Bool(*b),
        Json::Number(n) => Value::Number(n.as_f64().unwrap_or(f64::NAN)),
        Json::String(s) => Value::Str(s.clone()),
        Json::Array(items) => {
            let mut table = Table::with_capacity(items.len());
            for (i, item) in items.iter().enumerate() {
                table.insert(Value::Number((i + 1) as f64), from_json(item)?);
            }
            Value::Table(table)
        }
        Json::Object(map) => {
            if let Some(Json::String(type_name)) = map.get(TYPE_FIELD) {
                return typed_from_json(type_name, json);
            }
            let mut table = Table::with_capacity(map.len());
            for (k, v) in map {
                table.insert(Value::Str(k.clone()), from_json(v)?);
            }
            Value::Table(table)
        }
    };
    Ok(value)
}
