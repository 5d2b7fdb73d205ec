//! Arbitrary-magnitude decimal numbers for currency, multipliers and costs.
//!
//! A [`BigNumber`] is a normalized `f64` mantissa (`1 <= |m| < 10`, or exactly
//! zero) paired with an `i64` power of ten, so the economy can grow far past
//! the ~10^308 ceiling of `f64` and the ~10^19 ceiling of `u64` without ever
//! saturating or wrapping. Precision is that of the mantissa (about 16
//! significant digits), which is all an idle economy needs.
//!
//! ```rust
//! use chipdeck_engine::number::BigNumber;
//!
//! let a = BigNumber::from(1_000_000_000_000u64);
//! let b = a * a * a; // 10^36, well past u64
//! assert_eq!(b.exponent(), 36);
//! assert!(b > a);
//! ```

use std::cmp::Ordering;
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Div, DivAssign, Mul, MulAssign, Neg, Sub, SubAssign};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::NumberParseError;

/// Magnitude gap beyond which the smaller addend no longer changes the sum.
const MAX_SIGNIFICANT_DIGITS: i64 = 17;

/// From this exponent up, every representable value is already an integer.
const INTEGRAL_EXPONENT: i64 = 16;

/// Bound on the decimal exponent. Results above it saturate at the bound;
/// results below its negation flush to zero. Persisted values outside it are
/// rejected.
pub const MAX_EXPONENT: i64 = i64::MAX / 4;

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(try_from = "BigNumberRepr", into = "BigNumberRepr")]
pub struct BigNumber {
    mantissa: f64,
    exponent: i64,
}

/// Canonical persisted form: sign, magnitude of the mantissa, power of ten.
#[derive(Serialize, Deserialize)]
struct BigNumberRepr {
    sign: i8,
    mantissa: f64,
    exponent: i64,
}

impl From<BigNumber> for BigNumberRepr {
    fn from(n: BigNumber) -> Self {
        Self {
            sign: n.signum(),
            mantissa: n.mantissa.abs(),
            exponent: n.exponent,
        }
    }
}

impl TryFrom<BigNumberRepr> for BigNumber {
    type Error = NumberParseError;

    fn try_from(repr: BigNumberRepr) -> Result<Self, Self::Error> {
        if !repr.mantissa.is_finite() || repr.mantissa < 0.0 {
            return Err(NumberParseError::NotFinite);
        }
        check_exponent(repr.exponent)?;
        match repr.sign {
            0 => Ok(BigNumber::ZERO),
            1 => Ok(BigNumber::normalized(repr.mantissa, repr.exponent)),
            -1 => Ok(BigNumber::normalized(-repr.mantissa, repr.exponent)),
            sign => Err(NumberParseError::InvalidSign { sign }),
        }
    }
}

fn check_exponent(exponent: i64) -> Result<(), NumberParseError> {
    if exponent.unsigned_abs() > MAX_EXPONENT.unsigned_abs() {
        return Err(NumberParseError::ExponentOutOfRange { exponent });
    }
    Ok(())
}

impl BigNumber {
    pub const ZERO: BigNumber = BigNumber {
        mantissa: 0.0,
        exponent: 0,
    };
    pub const ONE: BigNumber = BigNumber {
        mantissa: 1.0,
        exponent: 0,
    };

    /// Builds `mantissa * 10^exponent`, normalizing the mantissa.
    pub fn new(mantissa: f64, exponent: i64) -> Self {
        Self::normalized(mantissa, exponent)
    }

    fn normalized(mantissa: f64, exponent: i64) -> Self {
        if mantissa == 0.0 || !mantissa.is_finite() {
            return Self::ZERO;
        }
        if (1.0..10.0).contains(&mantissa.abs()) {
            return Self::bounded(mantissa, exponent);
        }
        let shift = mantissa.abs().log10().floor() as i32;
        let mut m = if shift >= 0 {
            mantissa / 10f64.powi(shift)
        } else {
            mantissa * 10f64.powi(-shift)
        };
        let mut e = exponent.saturating_add(i64::from(shift));
        // log10 can be off by one right at powers of ten
        if m.abs() >= 10.0 {
            m /= 10.0;
            e = e.saturating_add(1);
        } else if m.abs() < 1.0 {
            m *= 10.0;
            e = e.saturating_sub(1);
        }
        Self::bounded(m, e)
    }

    /// Applies the [`MAX_EXPONENT`] bound to an already normalized mantissa.
    fn bounded(mantissa: f64, exponent: i64) -> Self {
        if exponent > MAX_EXPONENT {
            Self {
                mantissa,
                exponent: MAX_EXPONENT,
            }
        } else if exponent < -MAX_EXPONENT {
            Self::ZERO
        } else {
            Self { mantissa, exponent }
        }
    }

    pub fn mantissa(&self) -> f64 {
        self.mantissa
    }

    pub fn exponent(&self) -> i64 {
        self.exponent
    }

    pub fn is_zero(&self) -> bool {
        self.mantissa == 0.0
    }

    pub fn signum(&self) -> i8 {
        if self.mantissa > 0.0 {
            1
        } else if self.mantissa < 0.0 {
            -1
        } else {
            0
        }
    }

    pub fn abs(self) -> Self {
        Self {
            mantissa: self.mantissa.abs(),
            exponent: self.exponent,
        }
    }

    /// Nearest `f64`; infinite once the magnitude passes `f64::MAX`.
    pub fn to_f64(&self) -> f64 {
        if self.is_zero() {
            return 0.0;
        }
        if self.exponent > 308 {
            return self.mantissa.signum() * f64::INFINITY;
        }
        if self.exponent < -323 {
            return 0.0;
        }
        if self.exponent < 0 {
            return self.mantissa / 10f64.powi(-self.exponent as i32);
        }
        self.mantissa * 10f64.powi(self.exponent as i32)
    }

    /// Base-10 logarithm of the magnitude (`-inf` for zero).
    pub fn log10(&self) -> f64 {
        if self.is_zero() {
            return f64::NEG_INFINITY;
        }
        self.mantissa.abs().log10() + self.exponent as f64
    }

    /// Three-way comparison, identical to [`Ord::cmp`].
    pub fn compare(&self, other: &Self) -> Ordering {
        self.cmp(other)
    }

    /// Integer power by repeated squaring; exact up to mantissa rounding.
    pub fn powi(self, mut power: u64) -> Self {
        let mut result = Self::ONE;
        let mut base = self;
        while power > 0 {
            if power & 1 == 1 {
                result = result * base;
            }
            power >>= 1;
            if power > 0 {
                base = base * base;
            }
        }
        result
    }

    /// Real power. Integral non-negative powers go through [`BigNumber::powi`];
    /// other powers are taken on the magnitude through logarithms.
    pub fn pow(self, power: f64) -> Self {
        if power == 0.0 {
            return Self::ONE;
        }
        if power.fract() == 0.0 && power > 0.0 && power < u64::MAX as f64 {
            return self.powi(power as u64);
        }
        if self.is_zero() {
            return Self::ZERO;
        }
        let log = power * self.log10();
        let exponent = log.floor();
        Self::normalized(10f64.powf(log - exponent), exponent as i64)
    }

    pub fn floor(self) -> Self {
        if self.exponent >= INTEGRAL_EXPONENT || self.is_zero() {
            return self;
        }
        if self.exponent < 0 {
            return if self.mantissa < 0.0 {
                -Self::ONE
            } else {
                Self::ZERO
            };
        }
        Self::from(self.to_f64().floor())
    }

    /// Rounds half away from zero.
    pub fn round(self) -> Self {
        if self.exponent >= INTEGRAL_EXPONENT || self.is_zero() {
            return self;
        }
        if self.exponent < -1 {
            return Self::ZERO;
        }
        Self::from(self.to_f64().round())
    }

    /// `None` when dividing by zero.
    pub fn checked_div(self, rhs: Self) -> Option<Self> {
        if rhs.is_zero() {
            return None;
        }
        if self.is_zero() {
            return Some(Self::ZERO);
        }
        Some(Self::normalized(
            self.mantissa / rhs.mantissa,
            self.exponent.saturating_sub(rhs.exponent),
        ))
    }

    /// True when the two values differ by at most `relative` of the larger
    /// magnitude.
    pub fn approx_eq(&self, other: &Self, relative: f64) -> bool {
        if self == other {
            return true;
        }
        let larger = std::cmp::max(self.abs(), other.abs());
        let diff = (*self - *other).abs();
        diff <= larger * Self::from(relative)
    }

    pub fn max(self, other: Self) -> Self {
        std::cmp::max(self, other)
    }

    pub fn min(self, other: Self) -> Self {
        std::cmp::min(self, other)
    }
}

impl Default for BigNumber {
    fn default() -> Self {
        Self::ZERO
    }
}

impl PartialEq for BigNumber {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

// Normalization never stores NaN, so the ordering is total.
impl Eq for BigNumber {}

impl PartialOrd for BigNumber {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for BigNumber {
    fn cmp(&self, other: &Self) -> Ordering {
        let (sa, sb) = (self.signum(), other.signum());
        if sa != sb {
            return sa.cmp(&sb);
        }
        if sa == 0 {
            return Ordering::Equal;
        }
        let magnitude = self.exponent.cmp(&other.exponent).then_with(|| {
            self.mantissa
                .abs()
                .total_cmp(&other.mantissa.abs())
        });
        if sa > 0 {
            magnitude
        } else {
            magnitude.reverse()
        }
    }
}

impl Add for BigNumber {
    type Output = BigNumber;

    fn add(self, rhs: Self) -> Self {
        if self.is_zero() {
            return rhs;
        }
        if rhs.is_zero() {
            return self;
        }
        let (big, small) = if self.exponent >= rhs.exponent {
            (self, rhs)
        } else {
            (rhs, self)
        };
        let gap = big.exponent - small.exponent;
        if gap > MAX_SIGNIFICANT_DIGITS {
            return big;
        }
        let mantissa = big.mantissa + small.mantissa / 10f64.powi(gap as i32);
        Self::normalized(mantissa, big.exponent)
    }
}

impl Neg for BigNumber {
    type Output = BigNumber;

    fn neg(self) -> Self {
        if self.is_zero() {
            return self;
        }
        Self {
            mantissa: -self.mantissa,
            exponent: self.exponent,
        }
    }
}

impl Sub for BigNumber {
    type Output = BigNumber;

    fn sub(self, rhs: Self) -> Self {
        self + (-rhs)
    }
}

impl Mul for BigNumber {
    type Output = BigNumber;

    fn mul(self, rhs: Self) -> Self {
        if self.is_zero() || rhs.is_zero() {
            return Self::ZERO;
        }
        Self::normalized(
            self.mantissa * rhs.mantissa,
            self.exponent.saturating_add(rhs.exponent),
        )
    }
}

impl Div for BigNumber {
    type Output = BigNumber;

    /// # Panics
    ///
    /// Panics when `rhs` is zero, like integer division.
    fn div(self, rhs: Self) -> Self {
        match self.checked_div(rhs) {
            Some(q) => q,
            None => panic!("attempt to divide a BigNumber by zero"),
        }
    }
}

impl AddAssign for BigNumber {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl SubAssign for BigNumber {
    fn sub_assign(&mut self, rhs: Self) {
        *self = *self - rhs;
    }
}

impl MulAssign for BigNumber {
    fn mul_assign(&mut self, rhs: Self) {
        *self = *self * rhs;
    }
}

impl DivAssign for BigNumber {
    fn div_assign(&mut self, rhs: Self) {
        *self = *self / rhs;
    }
}

impl Sum for BigNumber {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, |acc, n| acc + n)
    }
}

impl From<f64> for BigNumber {
    fn from(v: f64) -> Self {
        debug_assert!(v.is_finite(), "BigNumber from non-finite f64");
        Self::normalized(v, 0)
    }
}

impl From<u64> for BigNumber {
    fn from(v: u64) -> Self {
        if v <= 1 << f64::MANTISSA_DIGITS {
            return Self::normalized(v as f64, 0);
        }
        // u64 -> f64 loses digits past 2^53; split off the power of ten first
        let digits = v.ilog10();
        let scale = 10u64.pow(digits);
        let head = (v / scale) as f64;
        let tail = (v % scale) as f64 / scale as f64;
        Self::normalized(head + tail, digits as i64)
    }
}

impl From<u32> for BigNumber {
    fn from(v: u32) -> Self {
        Self::from(v as u64)
    }
}

impl From<usize> for BigNumber {
    fn from(v: usize) -> Self {
        Self::from(v as u64)
    }
}

impl From<i64> for BigNumber {
    fn from(v: i64) -> Self {
        let magnitude = Self::from(v.unsigned_abs());
        if v < 0 {
            -magnitude
        } else {
            magnitude
        }
    }
}

impl fmt::Display for BigNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_zero() {
            return write!(f, "0");
        }
        if (0..INTEGRAL_EXPONENT).contains(&self.exponent) {
            let v = self.to_f64();
            if (v - v.round()).abs() <= v.abs() * 1e-12 {
                return write!(f, "{:.0}", v.round());
            }
            return write!(f, "{}", v);
        }
        if (-6..0).contains(&self.exponent) {
            return write!(f, "{}", self.to_f64());
        }
        let m = format!("{:.12}", self.mantissa);
        let m = m.trim_end_matches('0').trim_end_matches('.');
        write!(f, "{}e{}", m, self.exponent)
    }
}

impl FromStr for BigNumber {
    type Err = NumberParseError;

    /// Accepts plain decimals (`"1500"`, `"0.25"`) and scientific notation
    /// with exponents beyond the `f64` range (`"1.5e400"`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let literal = s.trim();
        let invalid = || NumberParseError::InvalidLiteral {
            literal: literal.to_string(),
        };
        let (mantissa, exponent) = match literal.find(['e', 'E']) {
            Some(idx) => {
                let m: f64 = literal[..idx].parse().map_err(|_| invalid())?;
                let e: i64 = literal[idx + 1..].parse().map_err(|_| invalid())?;
                (m, e)
            }
            None => (literal.parse::<f64>().map_err(|_| invalid())?, 0),
        };
        if !mantissa.is_finite() {
            return Err(NumberParseError::NotFinite);
        }
        check_exponent(exponent)?;
        Ok(Self::normalized(mantissa, exponent))
    }
}
