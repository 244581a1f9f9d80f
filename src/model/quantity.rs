use std::fmt;
use std::str::FromStr;

use serde::Deserialize;
use thiserror::Error;

const NANOS_PER_UNIT: i128 = 1_000_000_000;
const NANOS_PER_MILLI: i128 = 1_000_000;
const BYTES_PER_MEBIBYTE: i128 = 1 << 20;

/// Longest fractional part accepted before the value is considered nonsense.
const MAX_FRACTION_DIGITS: u32 = 30;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QuantityError {
    #[error("empty quantity")]
    Empty,
    #[error("invalid number in quantity {0:?}")]
    InvalidNumber(String),
    #[error("unknown suffix {suffix:?} in quantity {input:?}")]
    UnknownSuffix { input: String, suffix: String },
    #[error("quantity {0:?} is out of range")]
    Overflow(String),
}

/// A Kubernetes resource quantity stored as a fixed-point count of
/// nano-units, so `100m` CPU and `128Mi` memory both compare exactly.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize)]
#[serde(try_from = "String")]
pub struct Quantity {
    nanos: i128,
}

impl Quantity {
    pub const ZERO: Quantity = Quantity { nanos: 0 };

    pub fn from_nanos(nanos: i128) -> Self {
        Self { nanos }
    }

    pub fn from_millis(millis: i64) -> Self {
        Self { nanos: millis as i128 * NANOS_PER_MILLI }
    }

    pub fn from_units(units: i64) -> Self {
        Self { nanos: units as i128 * NANOS_PER_UNIT }
    }

    pub fn from_mebibytes(mib: i64) -> Self {
        Self::from_units(mib).scaled(BYTES_PER_MEBIBYTE)
    }

    fn scaled(self, factor: i128) -> Self {
        Self { nanos: self.nanos.saturating_mul(factor) }
    }

    pub fn nanos(&self) -> i128 {
        self.nanos
    }

    /// Value in thousandths of a unit, rounded up.
    pub fn millis_ceil(&self) -> i128 {
        div_ceil(self.nanos, NANOS_PER_MILLI)
    }

    /// Value in mebibytes (2^20 units), rounded up.
    pub fn mebibytes_ceil(&self) -> i128 {
        div_ceil(self.nanos, NANOS_PER_UNIT * BYTES_PER_MEBIBYTE)
    }

    /// CPU rendering: whole cores as `"2"`, everything else as millicores.
    pub fn cpu_text(&self) -> String {
        let millis = self.millis_ceil();
        if millis % 1000 == 0 {
            format!("{}", millis / 1000)
        } else {
            format!("{}m", millis)
        }
    }

    /// Memory rendering in mebibytes.
    pub fn mem_text(&self) -> String {
        format!("{}Mi", self.mebibytes_ceil())
    }
}

fn div_ceil(value: i128, divisor: i128) -> i128 {
    let q = value / divisor;
    if value % divisor > 0 { q + 1 } else { q }
}

/// Nano-unit multiplier for every suffix in the quantity grammar.
fn suffix_scale(suffix: &str) -> Option<i128> {
    let scale = match suffix {
        "n" => 1,
        "u" => 1_000,
        "m" => NANOS_PER_MILLI,
        "" => NANOS_PER_UNIT,
        "k" => NANOS_PER_UNIT * 1_000,
        "M" => NANOS_PER_UNIT * 1_000_000,
        "G" => NANOS_PER_UNIT * 1_000_000_000,
        "T" => NANOS_PER_UNIT * 1_000_000_000_000,
        "P" => NANOS_PER_UNIT * 1_000_000_000_000_000,
        "E" => NANOS_PER_UNIT * 1_000_000_000_000_000_000,
        "Ki" => NANOS_PER_UNIT << 10,
        "Mi" => NANOS_PER_UNIT << 20,
        "Gi" => NANOS_PER_UNIT << 30,
        "Ti" => NANOS_PER_UNIT << 40,
        "Pi" => NANOS_PER_UNIT << 50,
        "Ei" => NANOS_PER_UNIT << 60,
        _ => return None,
    };
    Some(scale)
}

impl FromStr for Quantity {
    type Err = QuantityError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let s = input.trim();
        if s.is_empty() {
            return Err(QuantityError::Empty);
        }

        let (negative, unsigned) = match s.as_bytes()[0] {
            b'-' => (true, &s[1..]),
            b'+' => (false, &s[1..]),
            _ => (false, s),
        };

        let number_end = unsigned
            .find(|c: char| !(c.is_ascii_digit() || c == '.'))
            .unwrap_or(unsigned.len());
        let (number, suffix) = unsigned.split_at(number_end);

        let (whole, fraction) = number.split_once('.').unwrap_or((number, ""));
        if whole.is_empty() && fraction.is_empty() {
            return Err(QuantityError::InvalidNumber(input.to_string()));
        }
        let fraction_digits = fraction.len() as u32;
        if fraction_digits > MAX_FRACTION_DIGITS {
            return Err(QuantityError::InvalidNumber(input.to_string()));
        }

        let overflow = || QuantityError::Overflow(input.to_string());
        let digits = format!("{}{}", whole, fraction);
        let mantissa: i128 = digits
            .parse()
            .map_err(|_| QuantityError::InvalidNumber(input.to_string()))?;

        // A decimal exponent folds into the fraction divisor or the multiplier.
        let (scale, mut exponent) = match suffix_scale(suffix) {
            Some(scale) => (scale, 0i32),
            None => {
                let exp = suffix
                    .strip_prefix(['e', 'E'])
                    .and_then(|e| e.parse::<i32>().ok())
                    .ok_or_else(|| QuantityError::UnknownSuffix {
                        input: input.to_string(),
                        suffix: suffix.to_string(),
                    })?;
                (NANOS_PER_UNIT, exp)
            }
        };
        exponent -= fraction_digits as i32;

        let mut numerator = mantissa.checked_mul(scale).ok_or_else(overflow)?;
        let mut denominator: i128 = 1;
        if exponent >= 0 {
            let factor = 10i128.checked_pow(exponent as u32).ok_or_else(overflow)?;
            numerator = numerator.checked_mul(factor).ok_or_else(overflow)?;
        } else {
            denominator = 10i128.checked_pow(exponent.unsigned_abs()).ok_or_else(overflow)?;
        }

        let nanos = div_ceil(numerator, denominator);
        Ok(Quantity { nanos: if negative { -nanos } else { nanos } })
    }
}

impl TryFrom<String> for Quantity {
    type Error = QuantityError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let units = self.nanos / NANOS_PER_UNIT;
        let rest = (self.nanos % NANOS_PER_UNIT).abs();
        if rest == 0 {
            write!(f, "{}", units)
        } else if rest % NANOS_PER_MILLI == 0 {
            write!(f, "{}m", self.nanos / NANOS_PER_MILLI)
        } else {
            write!(f, "{}n", self.nanos)
        }
    }
}
