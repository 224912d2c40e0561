//! Scalar backend interface for model evaluation.
//!
//! Every magnification formula in this crate is written once, generically,
//! against the [`Real`] interface of elementary operations. Two backends
//! implement it:
//!
//! - `f64`: plain numeric evaluation, no derivative tracking
//! - [`Dual`]: forward-mode automatic differentiation (value + derivative)
//!
//! The backend is selected once per top-level call through monomorphization,
//! never per element. Mixing backends is impossible by construction: an `f64`
//! constant enters a dual computation only by being lifted with
//! [`Real::from_f64`], so any dual operand keeps the whole expression dual.

use std::cmp::Ordering;
use std::ops::{Add, Div, Mul, Neg, Sub};

/// Elementary scalar operations shared by all numeric backends.
pub trait Real:
    Copy
    + PartialEq
    + PartialOrd
    + Add<Output = Self>
    + Sub<Output = Self>
    + Mul<Output = Self>
    + Div<Output = Self>
    + Neg<Output = Self>
{
    /// Lift a plain constant into this backend.
    fn from_f64(v: f64) -> Self;

    /// The primal (non-derivative) value.
    fn value(self) -> f64;

    fn ln(self) -> Self;

    fn exp(self) -> Self;

    fn sqrt(self) -> Self;

    fn hypot(self, other: Self) -> Self;

    /// Apply a scalar `f64` function with known derivative `df` at the primal
    /// value.
    ///
    /// This is the promotion point for library functions that only exist on
    /// `f64` (e.g. a distribution CDF): the plain backend simply applies `f`,
    /// while the dual backend also propagates `df` through the chain rule.
    fn chain(self, f: impl Fn(f64) -> f64, df: impl Fn(f64) -> f64) -> Self;
}

impl Real for f64 {
    fn from_f64(v: f64) -> Self {
        v
    }

    fn value(self) -> f64 {
        self
    }

    fn ln(self) -> Self {
        f64::ln(self)
    }

    fn exp(self) -> Self {
        f64::exp(self)
    }

    fn sqrt(self) -> Self {
        f64::sqrt(self)
    }

    fn hypot(self, other: Self) -> Self {
        f64::hypot(self, other)
    }

    fn chain(self, f: impl Fn(f64) -> f64, _df: impl Fn(f64) -> f64) -> Self {
        f(self)
    }
}

/// A forward-mode dual number: primal value plus derivative part.
///
/// Seeding `eps = 1` on one input and `eps = 0` on the others yields the
/// derivative of any [`Real`]-generic expression with respect to that input.
#[derive(Debug, Clone, Copy, Default)]
pub struct Dual {
    pub val: f64,
    pub eps: f64,
}

impl Dual {
    pub fn new(val: f64, eps: f64) -> Self {
        Self { val, eps }
    }

    /// A dual seeded as the differentiation variable (`eps = 1`).
    pub fn variable(val: f64) -> Self {
        Self::new(val, 1.0)
    }

    /// A dual carrying no derivative (`eps = 0`).
    pub fn constant(val: f64) -> Self {
        Self::new(val, 0.0)
    }
}

// Comparisons act on the primal value only, so branch conditions agree with
// the plain backend.
impl PartialEq for Dual {
    fn eq(&self, other: &Self) -> bool {
        self.val == other.val
    }
}

impl PartialOrd for Dual {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        self.val.partial_cmp(&other.val)
    }
}

impl Add for Dual {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self::new(self.val + rhs.val, self.eps + rhs.eps)
    }
}

impl Sub for Dual {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Self::new(self.val - rhs.val, self.eps - rhs.eps)
    }
}

impl Mul for Dual {
    type Output = Self;
    fn mul(self, rhs: Self) -> Self {
        Self::new(self.val * rhs.val, self.val * rhs.eps + self.eps * rhs.val)
    }
}

impl Div for Dual {
    type Output = Self;
    fn div(self, rhs: Self) -> Self {
        Self::new(
            self.val / rhs.val,
            (self.eps * rhs.val - self.val * rhs.eps) / (rhs.val * rhs.val),
        )
    }
}

impl Neg for Dual {
    type Output = Self;
    fn neg(self) -> Self {
        Self::new(-self.val, -self.eps)
    }
}

impl Real for Dual {
    fn from_f64(v: f64) -> Self {
        Self::constant(v)
    }

    fn value(self) -> f64 {
        self.val
    }

    fn ln(self) -> Self {
        Self::new(self.val.ln(), self.eps / self.val)
    }

    fn exp(self) -> Self {
        let e = self.val.exp();
        Self::new(e, self.eps * e)
    }

    fn sqrt(self) -> Self {
        let s = self.val.sqrt();
        Self::new(s, self.eps / (2.0 * s))
    }

    fn hypot(self, other: Self) -> Self {
        let h = self.val.hypot(other.val);
        Self::new(h, (self.val * self.eps + other.val * other.eps) / h)
    }

    fn chain(self, f: impl Fn(f64) -> f64, df: impl Fn(f64) -> f64) -> Self {
        Self::new(f(self.val), self.eps * df(self.val))
    }
}
