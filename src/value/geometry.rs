//! Геометрические и составные значения хоста.
//!
//! Каждый тип раскладывается в фиксированную последовательность скаляров,
//! см. `codec::composite`.

use serde::{Deserialize, Serialize};

#[cfg_attr(feature = "fuzz", derive(arbitrary::Arbitrary))]
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vector2 {
    pub x: f32,
    pub y: f32,
}

#[cfg_attr(feature = "fuzz", derive(arbitrary::Arbitrary))]
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vector3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

/// Поворот (углы Эйлера XYZ в радианах) плюс перенос.
///
/// Углы хранятся 16-битными кодами, поэтому после чтения они приводятся к
/// диапазону [-π, π) с шагом 2π/65536.
#[cfg_attr(feature = "fuzz", derive(arbitrary::Arbitrary))]
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct CFrame {
    pub position: Vector3,
    pub rotation: Vector3,
}

/// Цвет RGB, компоненты в [0, 1].
#[cfg_attr(feature = "fuzz", derive(arbitrary::Arbitrary))]
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Color3 {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

/// Относительный масштаб плюс абсолютное смещение.
#[cfg_attr(feature = "fuzz", derive(arbitrary::Arbitrary))]
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct UDim {
    pub scale: f32,
    pub offset: i32,
}

#[cfg_attr(feature = "fuzz", derive(arbitrary::Arbitrary))]
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct UDim2 {
    pub x: UDim,
    pub y: UDim,
}

#[cfg_attr(feature = "fuzz", derive(arbitrary::Arbitrary))]
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub min: Vector2,
    pub max: Vector2,
}

#[cfg_attr(feature = "fuzz", derive(arbitrary::Arbitrary))]
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct NumberRange {
    pub min: f32,
    pub max: f32,
}

/// Ключевая точка числовой кривой; все поля в [0, 1].
#[cfg_attr(feature = "fuzz", derive(arbitrary::Arbitrary))]
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct NumberKeypoint {
    pub time: f32,
    pub value: f32,
    #[serde(default)]
    pub envelope: f32,
}

#[cfg_attr(feature = "fuzz", derive(arbitrary::Arbitrary))]
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct NumberSequence {
    pub keypoints: Vec<NumberKeypoint>,
}

#[cfg_attr(feature = "fuzz", derive(arbitrary::Arbitrary))]
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ColorKeypoint {
    pub time: f32,
    pub color: Color3,
}

#[cfg_attr(feature = "fuzz", derive(arbitrary::Arbitrary))]
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ColorSequence {
    pub keypoints: Vec<ColorKeypoint>,
}

/// Индекс цвета в палитре хоста.
#[cfg_attr(feature = "fuzz", derive(arbitrary::Arbitrary))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct BrickColor(pub u16);

impl Vector2 {
    pub const fn new(
        x: f32,
        y: f32,
    ) -> Self {
        Self { x, y }
    }
}

impl Vector3 {
    pub const fn new(
        x: f32,
        y: f32,
        z: f32,
    ) -> Self {
        Self { x, y, z }
    }
}

impl Color3 {
    pub const fn new(
        r: f32,
        g: f32,
        b: f32,
    ) -> Self {
        Self { r, g, b }
    }

    /// Цвет из байтовых компонент 0..=255.
    pub fn from_rgb(
        r: u8,
        g: u8,
        b: u8,
    ) -> Self {
        Self::new(r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0)
    }
}

impl UDim {
    pub const fn new(
        scale: f32,
        offset: i32,
    ) -> Self {
        Self { scale, offset }
    }
}

impl UDim2 {
    pub const fn new(
        x_scale: f32,
        x_offset: i32,
        y_scale: f32,
        y_offset: i32,
    ) -> Self {
        Self {
            x: UDim::new(x_scale, x_offset),
            y: UDim::new(y_scale, y_offset),
        }
    }
}

impl NumberRange {
    pub const fn new(
        min: f32,
        max: f32,
    ) -> Self {
        Self { min, max }
    }
}

impl NumberSequence {
    pub fn new(keypoints: Vec<NumberKeypoint>) -> Self {
        Self { keypoints }
    }
}

impl ColorSequence {
    pub fn new(keypoints: Vec<ColorKeypoint>) -> Self {
        Self { keypoints }
    }
}
