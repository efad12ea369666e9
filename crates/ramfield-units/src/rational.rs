//! Exact rational exponents.

use std::fmt;
use std::ops::Neg;

/// A reduced fraction `num / den` with `den > 0`.
///
/// Used for dimension and symbol exponents so that half-integer powers
/// (Gaussian magnetic units) stay exact under repeated combination.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Rational {
    num: i32,
    den: i32,
}

fn gcd(mut a: i64, mut b: i64) -> i64 {
    a = a.abs();
    b = b.abs();
    while b != 0 {
        let t = a % b;
        a = b;
        b = t;
    }
    a
}

impl Rational {
    /// The exponent zero.
    pub const ZERO: Rational = Rational { num: 0, den: 1 };
    /// The exponent one.
    pub const ONE: Rational = Rational { num: 1, den: 1 };
    /// The exponent one half.
    pub const HALF: Rational = Rational { num: 1, den: 2 };

    /// Build a reduced fraction. Returns `None` when `den == 0`.
    pub fn new(num: i32, den: i32) -> Option<Self> {
        Self::reduce(i64::from(num), i64::from(den))
    }

    /// Reduce `num / den`, or `None` when `den == 0` or a reduced term
    /// does not fit in `i32`.
    fn reduce(num: i64, den: i64) -> Option<Self> {
        if den == 0 {
            return None;
        }
        let g = gcd(num, den).max(1);
        let sign = den.signum();
        Some(Self {
            num: i32::try_from(sign * num / g).ok()?,
            den: i32::try_from(sign * den / g).ok()?,
        })
    }

    /// An integer exponent.
    pub const fn integer(n: i32) -> Self {
        Self { num: n, den: 1 }
    }

    /// Numerator of the reduced fraction.
    pub const fn numer(&self) -> i32 {
        self.num
    }

    /// Denominator of the reduced fraction (always positive).
    pub const fn denom(&self) -> i32 {
        self.den
    }

    /// Whether this is exactly zero.
    pub const fn is_zero(&self) -> bool {
        self.num == 0
    }

    /// Whether the denominator is one.
    pub const fn is_integer(&self) -> bool {
        self.den == 1
    }

    /// Whether the value is strictly negative.
    pub const fn is_negative(&self) -> bool {
        self.num < 0
    }

    /// Absolute value.
    pub const fn abs(&self) -> Self {
        Self {
            num: self.num.saturating_abs(),
            den: self.den,
        }
    }

    /// `self + rhs`, or `None` if the result leaves the `i32` range.
    pub fn checked_add(self, rhs: Rational) -> Option<Rational> {
        let (a, b) = (i64::from(self.num), i64::from(self.den));
        let (c, d) = (i64::from(rhs.num), i64::from(rhs.den));
        Self::reduce(a * d + c * b, b * d)
    }

    /// `self - rhs`, or `None` if the result leaves the `i32` range.
    pub fn checked_sub(self, rhs: Rational) -> Option<Rational> {
        let (a, b) = (i64::from(self.num), i64::from(self.den));
        let (c, d) = (i64::from(rhs.num), i64::from(rhs.den));
        Self::reduce(a * d - c * b, b * d)
    }

    /// `self * rhs`, or `None` if the result leaves the `i32` range.
    pub fn checked_mul(self, rhs: Rational) -> Option<Rational> {
        Self::reduce(
            i64::from(self.num) * i64::from(rhs.num),
            i64::from(self.den) * i64::from(rhs.den),
        )
    }

    /// Floating-point value, used to raise scale factors.
    pub fn to_f64(&self) -> f64 {
        self.num as f64 / self.den as f64
    }
}

impl Default for Rational {
    fn default() -> Self {
        Self::ZERO
    }
}

impl From<i32> for Rational {
    fn from(n: i32) -> Self {
        Self::integer(n)
    }
}

impl Neg for Rational {
    type Output = Rational;

    fn neg(self) -> Rational {
        Rational {
            num: self.num.saturating_neg(),
            den: self.den,
        }
    }
}

impl fmt::Display for Rational {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.den == 1 {
            write!(f, "{}", self.num)
        } else {
            write!(f, "{}/{}", self.num, self.den)
        }
    }
}
