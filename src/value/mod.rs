//! Модель значений хоста.
//!
//! [`Value`] — закрытое перечисление всех форм, которые умеет хранить буфер.
//! Числа хоста всегда `f64`; ширина хранения выбирается при записи.

pub mod geometry;
pub mod json;
pub mod table;

pub use geometry::*;
pub use table::Table;

/// Непрозрачная ссылка на объект хоста.
///
/// Никогда не сериализуется по значению: буфер хранит её в побочной таблице,
/// а в потоке остаётся только тег.
#[cfg_attr(feature = "fuzz", derive(arbitrary::Arbitrary))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ExternalRef(pub u64);

#[cfg_attr(feature = "fuzz", derive(arbitrary::Arbitrary))]
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    #[default]
    Nil,
    Bool(bool),
    Number(f64),
    Str(String),
    Vector2(Vector2),
    Vector3(Vector3),
    CFrame(CFrame),
    Color3(Color3),
    UDim(UDim),
    UDim2(UDim2),
    Rect(Rect),
    NumberRange(NumberRange),
    NumberSequence(NumberSequence),
    ColorSequence(ColorSequence),
    BrickColor(BrickColor),
    Ref(ExternalRef),
    Table(Table),
    /// Значение хоста без представления в формате (функция, поток и т.п.),
    /// переданное своим текстовым видом.
    Opaque(String),
}

impl Value {
    pub fn is_nil(&self) -> bool {
        matches!(self, Value::Nil)
    }

    /// Имя типа в терминах хоста.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Nil => "nil",
            Value::Bool(_) => "boolean",
            Value::Number(_) => "number",
            Value::Str(_) => "string",
            Value::Vector2(_) => "Vector2",
            Value::Vector3(_) => "Vector3",
            Value::CFrame(_) => "CFrame",
            Value::Color3(_) => "Color3",
            Value::UDim(_) => "UDim",
            Value::UDim2(_) => "UDim2",
            Value::Rect(_) => "Rect",
            Value::NumberRange(_) => "NumberRange",
            Value::NumberSequence(_) => "NumberSequence",
            Value::ColorSequence(_) => "ColorSequence",
            Value::BrickColor(_) => "BrickColor",
            Value::Ref(_) => "Instance",
            Value::Table(_) => "table",
            Value::Opaque(_) => "userdata",
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_table(&self) -> Option<&Table> {
        match self {
            Value::Table(t) => Some(t),
            _ => None,
        }
    }
}

macro_rules! impl_from_number {
    ($($t:ty),*) => {
        $(
            impl From<$t> for Value {
                fn from(n: $t) -> Self {
                    Value::Number(n as f64)
                }
            }
        )*
    };
}

impl_from_number!(f64, f32, i8, i16, i32, i64, u8, u16, u32, u64, usize);

macro_rules! impl_from_variant {
    ($($t:ident),*) => {
        $(
            impl From<$t> for Value {
                fn from(v: $t) -> Self {
                    Value::$t(v)
                }
            }
        )*
    };
}

impl_from_variant!(
    Vector2,
    Vector3,
    CFrame,
    Color3,
    UDim,
    UDim2,
    Rect,
    NumberRange,
    NumberSequence,
    ColorSequence,
    BrickColor,
    Table
);

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

impl From<ExternalRef> for Value {
    fn from(r: ExternalRef) -> Self {
        Value::Ref(r)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Nil, Into::into)
    }
}
