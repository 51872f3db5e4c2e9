use serde::{
    Deserialize,
    Serialize,
};
use std::{
    fmt,
    str::FromStr,
};

/// Fractional digits carried by every [`Amount`].
pub const DECIMALS: u32 = 8;
const UNIT: u64 = 10u64.pow(DECIMALS);

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum AmountError {
    #[error("amount is empty")]
    Empty,
    #[error("amount cannot be negative: {0}")]
    Negative(String),
    #[error("invalid amount: {0}")]
    Invalid(String),
    #[error("amount out of range: {0}")]
    Overflow(String),
}

/// Non-negative fixed-point decimal with [`DECIMALS`] fractional digits.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(try_from = "String", into = "String")]
pub struct Amount(u64);

impl Amount {
    pub const ZERO: Amount = Amount(0);

    pub const fn from_base_units(units: u64) -> Self {
        Self(units)
    }

    pub const fn base_units(self) -> u64 {
        self.0
    }

    pub const fn from_whole(whole: u64) -> Self {
        Self(whole.saturating_mul(UNIT))
    }

    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    pub fn checked_add(self, other: Amount) -> Option<Amount> {
        self.0.checked_add(other.0).map(Amount)
    }

    pub fn saturating_add(self, other: Amount) -> Amount {
        Amount(self.0.saturating_add(other.0))
    }

    /// Subtraction clamped at zero.
    pub fn saturating_sub(self, other: Amount) -> Amount {
        Amount(self.0.saturating_sub(other.0))
    }

    /// Renders with exactly `places` fractional digits, truncating the rest.
    pub fn fixed(self, places: u32) -> String {
        let whole = self.0 / UNIT;
        if places == 0 {
            return whole.to_string();
        }
        let places = places.min(DECIMALS);
        let fraction = format!("{:0width$}", self.0 % UNIT, width = DECIMALS as usize);
        format!("{whole}.{}", &fraction[..places as usize])
    }

    /// Renders without trailing zeros, `1.5` rather than `1.50000000`.
    pub fn compact(self) -> String {
        let whole = self.0 / UNIT;
        let fraction = self.0 % UNIT;
        if fraction == 0 {
            whole.to_string()
        } else {
            let digits = format!("{:0width$}", fraction, width = DECIMALS as usize);
            format!("{whole}.{}", digits.trim_end_matches('0'))
        }
    }

    /// Reads the longest numeric prefix the way form input is read, so
    /// `0.5abc` is `0.5` and `1.2.3` is `1.2`. An exponent counts only when
    /// digits follow it. Fails only when there is no numeric prefix.
    pub fn parse_prefix(raw: &str) -> Result<Self, AmountError> {
        let trimmed = raw.trim();
        let text = raw.trim_start();
        let text = text.strip_prefix('+').unwrap_or(text);
        if text.starts_with('-') {
            return Err(AmountError::Negative(trimmed.to_string()));
        }
        let bytes = text.as_bytes();
        let digits_from =
            |from: usize| from + bytes[from..].iter().take_while(|b| b.is_ascii_digit()).count();

        let whole_end = digits_from(0);
        let whole = &text[..whole_end];
        let (fraction, fraction_end) = match bytes.get(whole_end) {
            Some(b'.') => {
                let fraction_end = digits_from(whole_end + 1);
                (&text[whole_end + 1..fraction_end], fraction_end)
            }
            _ => ("", whole_end),
        };
        if whole.is_empty() && fraction.is_empty() {
            return Err(AmountError::Invalid(trimmed.to_string()));
        }

        let mut exponent: i64 = 0;
        if matches!(bytes.get(fraction_end), Some(b'e' | b'E')) {
            let sign_end = match bytes.get(fraction_end + 1) {
                Some(b'+' | b'-') => fraction_end + 2,
                _ => fraction_end + 1,
            };
            let exponent_end = digits_from(sign_end);
            if exponent_end > sign_end {
                exponent = text[fraction_end + 1..exponent_end]
                    .parse()
                    .map_err(|_| AmountError::Overflow(trimmed.to_string()))?;
            }
        }

        let digits = format!("{whole}{fraction}");
        if digits.bytes().all(|b| b == b'0') {
            return Ok(Amount::ZERO);
        }
        let point = whole.len() as i64 + exponent;
        if point < -(DECIMALS as i64) {
            return Ok(Amount::ZERO);
        }
        if point > digits.len() as i64 + 20 {
            return Err(AmountError::Overflow(trimmed.to_string()));
        }
        let decimal = if point <= 0 {
            format!("0.{}{digits}", "0".repeat(point.unsigned_abs() as usize))
        } else if point as usize >= digits.len() {
            format!("{digits}{}", "0".repeat(point as usize - digits.len()))
        } else {
            let (w, f) = digits.split_at(point as usize);
            format!("{w}.{f}")
        };
        decimal.parse()
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.fixed(DECIMALS))
    }
}

impl FromStr for Amount {
    type Err = AmountError;

    /// Accepts plain decimals such as `1`, `0.001` or `.5`. Digits beyond
    /// [`DECIMALS`] are truncated.
    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let text = raw.trim();
        if text.is_empty() {
            return Err(AmountError::Empty);
        }
        if text.starts_with('-') {
            return Err(AmountError::Negative(text.to_string()));
        }
        let (whole, fraction) = match text.split_once('.') {
            Some((w, f)) => (w, f),
            None => (text, ""),
        };
        if whole.is_empty() && fraction.is_empty() {
            return Err(AmountError::Invalid(text.to_string()));
        }
        if !whole.chars().all(|c| c.is_ascii_digit())
            || !fraction.chars().all(|c| c.is_ascii_digit())
        {
            return Err(AmountError::Invalid(text.to_string()));
        }
        let whole_units = if whole.is_empty() {
            0
        } else {
            whole
                .parse::<u64>()
                .map_err(|_| AmountError::Overflow(text.to_string()))?
        };
        let mut fraction_digits: String =
            fraction.chars().take(DECIMALS as usize).collect();
        while fraction_digits.len() < DECIMALS as usize {
            fraction_digits.push('0');
        }
        let fraction_units = fraction_digits
            .parse::<u64>()
            .map_err(|_| AmountError::Invalid(text.to_string()))?;
        whole_units
            .checked_mul(UNIT)
            .and_then(|units| units.checked_add(fraction_units))
            .map(Amount)
            .ok_or_else(|| AmountError::Overflow(text.to_string()))
    }
}

impl TryFrom<String> for Amount {
    type Error = AmountError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Amount> for String {
    fn from(value: Amount) -> Self {
        value.compact()
    }
}
