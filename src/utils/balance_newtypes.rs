//! TAO and alpha amount handling with compile-time separation of assets.
//!
//! Chain amounts are integers in the smallest unit (1e9 per whole token).
//! TAO and subnet alpha share that scale but are different assets, so each
//! gets its own wrapper:
//! - [`Rao`] wraps `u128` TAO base units
//! - [`Alpha`] wraps `u128` alpha base units of some subnet
//! - [`Tao`] wraps an `f64` display value, used for operator input
//!
//! There is no `Add<Alpha> for Rao`; converting between the two needs a
//! price and goes through [`Alpha::value_in_tao`].
//!
//! Float values are for display and arithmetic only. Anything sent to the
//! chain is rescaled with [`tao_to_rao`] first.

use crate::core::constants::{RAOPERTAO, TAO_SYMBOL};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Sub};

/// TAO base units (1 TAO = 1e9 RAO).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Rao(pub u128);

impl Rao {
    pub const ZERO: Self = Self(0);

    /// Exactly one TAO.
    pub const PER_TAO: Self = Self(RAOPERTAO);

    pub const fn new(value: u128) -> Self {
        Self(value)
    }

    pub const fn as_u128(self) -> u128 {
        self.0
    }

    /// Display value in TAO.
    pub fn as_tao(self) -> f64 {
        rao_to_tao(self.0)
    }

    pub fn from_tao(tao: f64) -> Self {
        Self(tao_to_rao(tao))
    }

    pub fn saturating_add(self, other: Self) -> Self {
        Self(self.0.saturating_add(other.0))
    }

    pub fn saturating_sub(self, other: Self) -> Self {
        Self(self.0.saturating_sub(other.0))
    }

    pub fn is_zero(self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for Rao {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{:.9}", TAO_SYMBOL, self.as_tao())
    }
}

impl Add for Rao {
    type Output = Self;
    fn add(self, other: Self) -> Self {
        self.saturating_add(other)
    }
}

impl Sub for Rao {
    type Output = Self;
    fn sub(self, other: Self) -> Self {
        self.saturating_sub(other)
    }
}

impl AddAssign for Rao {
    fn add_assign(&mut self, other: Self) {
        *self = self.saturating_add(other);
    }
}

impl Sum for Rao {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, |acc, r| acc + r)
    }
}

impl From<u128> for Rao {
    fn from(value: u128) -> Self {
        Self(value)
    }
}

impl From<Rao> for u128 {
    fn from(rao: Rao) -> Self {
        rao.0
    }
}

/// Alpha base units of a subnet's staked asset.
///
/// Same 1e9 scale as [`Rao`], different asset. Remove-stake amounts are
/// expressed in this type.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Alpha(pub u128);

impl Alpha {
    pub const ZERO: Self = Self(0);

    pub const fn new(value: u128) -> Self {
        Self(value)
    }

    pub const fn as_u128(self) -> u128 {
        self.0
    }

    /// Display value in whole alpha tokens.
    pub fn as_alpha(self) -> f64 {
        rao_to_tao(self.0)
    }

    /// Build from a whole-token display amount, truncating.
    pub fn from_alpha(alpha: f64) -> Self {
        Self(tao_to_rao(alpha))
    }

    /// TAO display value of this stake at `price` TAO per alpha.
    ///
    /// The root subnet holds TAO directly, so its stake is valued 1:1 and the
    /// price is ignored. A non-positive price means "unknown" and values to 0.
    pub fn value_in_tao(self, netuid: u16, price: f64) -> f64 {
        if netuid == crate::core::constants::ROOT_NETUID {
            self.as_alpha()
        } else if price > 0.0 {
            self.as_alpha() * price
        } else {
            0.0
        }
    }

    pub fn is_zero(self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for Alpha {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{:.9}",
            crate::core::constants::ALPHA_SYMBOL,
            self.as_alpha()
        )
    }
}

impl Add for Alpha {
    type Output = Self;
    fn add(self, other: Self) -> Self {
        Self(self.0.saturating_add(other.0))
    }
}

impl From<u128> for Alpha {
    fn from(value: u128) -> Self {
        Self(value)
    }
}

/// TAO display amount, as typed by an operator.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Tao(pub f64);

impl Tao {
    pub const fn new(value: f64) -> Self {
        Self(value)
    }

    pub const fn as_f64(self) -> f64 {
        self.0
    }

    /// Rescale to base units, truncating toward zero.
    pub fn as_rao(self) -> Rao {
        Rao(tao_to_rao(self.0))
    }
}

impl fmt::Display for Tao {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{:.9}", TAO_SYMBOL, self.0)
    }
}

impl From<f64> for Tao {
    fn from(value: f64) -> Self {
        Self(value)
    }
}

impl From<Rao> for Tao {
    fn from(rao: Rao) -> Self {
        Self(rao.as_tao())
    }
}

/// Convert a display amount to base units, truncating toward zero.
///
/// Negative, NaN and infinite inputs give 0; values past `u128::MAX` saturate.
/// The whole part is scaled exactly. The fractional part snaps to the nearest
/// base unit when it is within half an ulp of the input, so
/// `tao_to_rao(rao_to_tao(r)) == r` for every `r < 2^52`.
pub fn tao_to_rao(tao: f64) -> u128 {
    if !tao.is_finite() || tao <= 0.0 {
        return 0;
    }
    let max_tao = u128::MAX as f64 / RAOPERTAO as f64;
    if tao >= max_tao {
        return u128::MAX;
    }
    let whole = tao.trunc();
    let fraction = (tao - whole) * RAOPERTAO as f64;
    let ulp = f64::from_bits(tao.to_bits() + 1) - tao;
    let tolerance = ulp * RAOPERTAO as f64 / 2.0 + FRACTION_SLACK_RAO;
    let nearest = fraction.round();
    let fraction_rao = if (fraction - nearest).abs() <= tolerance {
        nearest
    } else {
        fraction.trunc()
    };
    (whole as u128)
        .saturating_mul(RAOPERTAO)
        .saturating_add(fraction_rao as u128)
}

/// Rounding error of scaling a fraction below one by `RAOPERTAO`.
const FRACTION_SLACK_RAO: f64 = 1e-6;

/// Convert base units to a display amount.
///
/// Exact for values up to 2^53.
pub fn rao_to_tao(rao: u128) -> f64 {
    if rao == 0 {
        return 0.0;
    }
    rao as f64 / RAOPERTAO as f64
}

/// Fraction in `[0, 1]` from a u16-scaled chain field such as incentive.
pub fn u16_normalized_float(value: u128) -> f64 {
    (value as f64 / crate::core::constants::U16_FRACTION_DIVISOR).min(1.0)
}
