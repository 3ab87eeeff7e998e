use std::fmt;

use crate::foundation::error::{SequenceError, SequenceResult};

/// Rational number `num/den`, used for time bases.
///
/// A time base is the duration of one timestamp tick in seconds: `1/90000` means a pts of
/// `90000` is one second.
#[derive(Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct Rational {
    /// Numerator.
    pub num: i64,
    /// Denominator, positive after construction.
    pub den: i64,
}

impl Rational {
    /// Create a rational with its sign normalized onto the numerator.
    pub fn new(num: i64, den: i64) -> SequenceResult<Self> {
        if den == 0 {
            return Err(SequenceError::invalid("Rational den must be non-zero"));
        }
        if den > 0 {
            return Ok(Self { num, den });
        }
        match (num.checked_neg(), den.checked_neg()) {
            (Some(num), Some(den)) => Ok(Self { num, den }),
            _ => Err(SequenceError::invalid(format!(
                "Rational {num}/{den} cannot be sign-normalized"
            ))),
        }
    }

    /// Create a time base; both terms must be strictly positive.
    pub fn time_base(num: i64, den: i64) -> SequenceResult<Self> {
        let tb = Self::new(num, den)?;
        tb.validate_time_base()?;
        Ok(tb)
    }

    /// Check that `self` is usable as a time base.
    pub fn validate_time_base(self) -> SequenceResult<()> {
        if self.den <= 0 || self.num <= 0 {
            return Err(SequenceError::invalid(format!(
                "time base must be positive, got {self}"
            )));
        }
        Ok(())
    }

    /// Convert to f64.
    pub fn as_f64(self) -> f64 {
        self.num as f64 / self.den as f64
    }

    /// Reduce to lowest terms.
    pub fn reduce(self) -> Self {
        if self.num == 0 {
            return Self { num: 0, den: 1 };
        }
        let g = gcd(self.num.unsigned_abs(), self.den.unsigned_abs()) as i64;
        Self {
            num: self.num / g,
            den: self.den / g,
        }
    }

    /// Equality of value, ignoring representation (`1/2 == 2/4`).
    pub fn same_value(self, other: Self) -> bool {
        i128::from(self.num) * i128::from(other.den) == i128::from(other.num) * i128::from(self.den)
    }
}

impl fmt::Debug for Rational {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Rational({}/{})", self.num, self.den)
    }
}

impl fmt::Display for Rational {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.num, self.den)
    }
}

/// Re-express `value` ticks of `from` as ticks of `to`, rounding to nearest (half away from zero).
///
/// Computed in 128-bit; results outside `i64` saturate.
pub fn rescale(value: i64, from: Rational, to: Rational) -> i64 {
    if from == to {
        return value;
    }
    let den = i128::from(from.den) * i128::from(to.num);
    if den == 0 {
        return 0;
    }
    let Some(num) = (i128::from(value) * i128::from(from.num)).checked_mul(i128::from(to.den))
    else {
        let negative = (value < 0) ^ (from.num < 0) ^ (to.den < 0) ^ (den < 0);
        return if negative { i64::MIN } else { i64::MAX };
    };
    let (num, den) = if den < 0 { (-num, -den) } else { (num, den) };
    let half = den / 2;
    let q = if num >= 0 {
        num.saturating_add(half) / den
    } else {
        num.saturating_sub(half) / den
    };
    q.clamp(i128::from(i64::MIN), i128::from(i64::MAX)) as i64
}

fn gcd(mut a: u64, mut b: u64) -> u64 {
    while b != 0 {
        let t = b;
        b = a % b;
        a = t;
    }
    a
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/rational.rs"]
mod tests;
