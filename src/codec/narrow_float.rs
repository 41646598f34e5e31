//! Узкие форматы с плавающей точкой: 16 и 24 бита.
//!
//! Раскладка повторяет IEEE754: знак, смещённая экспонента, мантисса.
//! Специальные случаи:
//! - ноль (любого знака) кодируется нулевым шаблоном;
//! - модуль не меньше предела формата насыщается до бесконечности со знаком
//!   (экспонента из всех единиц, мантисса 0);
//! - NaN кодируется экспонентой из всех единиц и мантиссой 1.
//!
//! Округление к ближайшему, половина от нуля. Перенос из мантиссы
//! переходит в экспоненту.

/// Параметры узкого формата.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NarrowFormat {
    pub exponent_bits: u32,
    pub mantissa_bits: u32,
    pub bias: i32,
}

/// 1 бит знака, 5 бит экспоненты (смещение 15), 10 бит мантиссы.
pub const FLOAT16: NarrowFormat = NarrowFormat {
    exponent_bits: 5,
    mantissa_bits: 10,
    bias: 15,
};

/// 1 бит знака, 6 бит экспоненты (смещение 31), 17 бит мантиссы.
pub const FLOAT24: NarrowFormat = NarrowFormat {
    exponent_bits: 6,
    mantissa_bits: 17,
    bias: 31,
};

/// Точная степень двойки для нормального диапазона f64.
fn pow2(exp: i32) -> f64 {
    debug_assert!((-1022..=1023).contains(&exp));
    f64::from_bits(((exp + 1023) as u64) << 52)
}

impl NarrowFormat {
    const fn max_exponent(&self) -> u32 {
        (1 << self.exponent_bits) - 1
    }

    const fn mantissa_mask(&self) -> u32 {
        (1 << self.mantissa_bits) - 1
    }

    const fn sign_bit(&self) -> u32 {
        1 << (self.exponent_bits + self.mantissa_bits)
    }

    const fn infinity_bits(&self) -> u32 {
        self.max_exponent() << self.mantissa_bits
    }

    /// Общая ширина формата в битах.
    pub const fn width(&self) -> u32 {
        1 + self.exponent_bits + self.mantissa_bits
    }

    /// Порог насыщения: половина ULP над наибольшим конечным значением.
    pub fn limit(&self) -> f64 {
        let max_unbiased = self.max_exponent() as i32 - 1 - self.bias;
        pow2(max_unbiased) * (2.0 - pow2(-(self.mantissa_bits as i32) - 1))
    }

    /// Кодирует `value` в битовый шаблон формата (младшие `width()` бит).
    pub fn encode(
        &self,
        value: f64,
    ) -> u32 {
        if value.is_nan() {
            return self.infinity_bits() | 1;
        }

        let magnitude = value.abs();
        if magnitude == 0.0 {
            return 0;
        }

        let sign = if value.is_sign_negative() {
            self.sign_bit()
        } else {
            0
        };

        if magnitude >= self.limit() {
            return sign | self.infinity_bits();
        }

        let mantissa_bits = self.mantissa_bits as i32;
        let raw_exponent = ((magnitude.to_bits() >> 52) & 0x7ff) as i32;
        // Субнормали f64 заведомо ниже любого узкого диапазона
        let exponent = if raw_exponent == 0 {
            i32::MIN
        } else {
            raw_exponent - 1023
        };

        let body = if exponent < 1 - self.bias {
            (magnitude * pow2(self.bias - 1 + mantissa_bits)).round() as u32
        } else {
            let fraction = magnitude / pow2(exponent) - 1.0;
            let mantissa = (fraction * pow2(mantissa_bits)).round() as u32;
            (((exponent + self.bias) as u32) << self.mantissa_bits) + mantissa
        };

        sign | body
    }

    /// Декодирует битовый шаблон формата обратно в `f64`.
    pub fn decode(
        &self,
        bits: u32,
    ) -> f64 {
        let negative = bits & self.sign_bit() != 0;
        let exponent = (bits >> self.mantissa_bits) & self.max_exponent();
        let mantissa = bits & self.mantissa_mask();
        let mantissa_bits = self.mantissa_bits as i32;

        let magnitude = if exponent == self.max_exponent() {
            if mantissa != 0 {
                return f64::NAN;
            }
            f64::INFINITY
        } else if exponent == 0 {
            mantissa as f64 * pow2(1 - self.bias - mantissa_bits)
        } else {
            (1.0 + mantissa as f64 / pow2(mantissa_bits)) * pow2(exponent as i32 - self.bias)
        };

        if negative {
            -magnitude
        } else {
            magnitude
        }
    }
}

/// Кодирует число во float16.
pub fn encode_f16(value: f64) -> u16 {
    FLOAT16.encode(value) as u16
}

/// Декодирует float16.
pub fn decode_f16(bits: u16) -> f64 {
    FLOAT16.decode(bits as u32)
}

/// Кодирует число во float24 (младшие 24 бита результата).
pub fn encode_f24(value: f64) -> u32 {
    FLOAT24.encode(value)
}

/// Декодирует float24 из младших 24 бит.
pub fn decode_f24(bits: u32) -> f64 {
    FLOAT24.decode(bits & 0x00FF_FFFF)
}
