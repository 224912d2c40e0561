//! Capability contracts for pluggable magnification models.
//!
//! Every model maps `(position or radius, total_area, fov, hemifields,
//! shape_params)` to a predicted magnification or cumulative area, where:
//!
//! - `total_area` scales the cumulative curve (1 yields a normalized CDF-like
//!   curve; the surface area in square mm yields areas in square mm)
//! - `fov` is the diameter of the field of view the area receives input from
//! - `hemifields` rescales between whole-field and partial-field areas
//!
//! Any valid model satisfies `radial_cumarea(0) == 0`, is non-decreasing in
//! `r`, and reaches `total_area` at `r = fov / 2`.
//!
//! Methods are generic over the numeric backend scalar `T`; the fitting
//! engine consumes models through `dyn CMagRadialModel<f64>`.

use std::f64::consts::PI;

use crate::domain::ParamTransform;
use crate::math::backend::Real;

/// Base capability: magnification at a 2D field position.
pub trait CMagModel<T: Real> {
    /// Number of shape parameters the model expects.
    fn arity(&self) -> usize;

    /// Areal magnification at field position `(x, y)`.
    fn areal_cmag(&self, x: T, y: T, total_area: T, fov: f64, hemifields: f64, params: &[T]) -> T;

    /// Linear magnification: the square root of the areal magnification.
    fn linear_cmag(&self, x: T, y: T, total_area: T, fov: f64, hemifields: f64, params: &[T]) -> T {
        self.areal_cmag(x, y, total_area, fov, hemifields, params).sqrt()
    }

    /// The model's declared parameter transform, if any.
    ///
    /// The fitting engine uses this pair when the caller supplies none;
    /// `None` means the identity transform.
    fn param_transform(&self) -> Option<ParamTransform> {
        None
    }
}

/// Radial capability: the model is a pure function of eccentricity
/// `r = hypot(x, y)`.
pub trait CMagRadialModel<T: Real>: CMagModel<T> {
    /// Cumulative surface area mapped within eccentricity `r`.
    fn radial_cumarea(&self, r: T, total_area: T, fov: f64, hemifields: f64, params: &[T]) -> T;

    /// Areal magnification at eccentricity `r`.
    fn radial_cmag(&self, r: T, total_area: T, fov: f64, hemifields: f64, params: &[T]) -> T;

    /// Surface-area density at eccentricity `r`, derived from the
    /// magnification: `hemifields * pi * r * radial_cmag(r)`.
    ///
    /// Models should only override this when the derived form is undefined
    /// somewhere the density itself has a closed value (see `BetaCmag`).
    fn radial_area(&self, r: T, total_area: T, fov: f64, hemifields: f64, params: &[T]) -> T {
        T::from_f64(hemifields * PI) * r * self.radial_cmag(r, total_area, fov, hemifields, params)
    }
}

/// The base areal capability expressed through a radial model: reduce the
/// position to its eccentricity with `hypot` and evaluate radially.
///
/// Concrete radial models delegate their `areal_cmag` here so the reduction
/// is defined exactly once.
pub fn areal_from_radial<T: Real, M: CMagRadialModel<T> + ?Sized>(
    model: &M,
    x: T,
    y: T,
    total_area: T,
    fov: f64,
    hemifields: f64,
    params: &[T],
) -> T {
    model.radial_cmag(x.hypot(y), total_area, fov, hemifields, params)
}
