//! Coefficient rings.

use std::fmt;
use std::ops::{Add, Mul, Neg, Sub};

use num_rational::{Rational64, Ratio};

use crate::model::Sign;

/// A commutative ring with an exact zero test.
pub trait Ring:
    Clone
    + PartialEq
    + fmt::Debug
    + fmt::Display
    + Send
    + Sync
    + 'static
    + Add<Output = Self>
    + Sub<Output = Self>
    + Mul<Output = Self>
    + Neg<Output = Self>
{
    fn zero() -> Self;

    fn one() -> Self;

    fn is_zero(&self) -> bool {
        *self == Self::zero()
    }

    fn is_one(&self) -> bool {
        *self == Self::one()
    }

    /// `+1` or `−1`.
    fn from_sign(sign: Sign) -> Self {
        if sign.is_negative() { -Self::one() } else { Self::one() }
    }
}

macro_rules! impl_integer_ring {
    ($($t:ty),*) => {$(
        impl Ring for $t {
            fn zero() -> Self {
                0
            }

            fn one() -> Self {
                1
            }
        }
    )*};
}

impl_integer_ring!(i64, i128);

impl Ring for Rational64 {
    fn zero() -> Self {
        Ratio::from_integer(0)
    }

    fn one() -> Self {
        Ratio::from_integer(1)
    }
}
