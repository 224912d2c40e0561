//! The Horton & Hoyt (1991) law as a radial cumulative-area model.
//!
//! The underlying law is `m(r) = (a / (b + r))^2`, but this wrapper exposes a
//! different parameterization: the single shape parameter is `b`, and the
//! scale `a` is derived on every evaluation from the `total_area` /
//! `fov` normalization via the algebraic inversion in [`crate::math::hh91`].
//! The optimizer therefore never sees `a`; fitting the total area jointly is
//! what determines it.

use crate::domain::{Output, ParamTransform};
use crate::math::backend::Real;
use crate::math::hh91;
use crate::models::model::{areal_from_radial, CMagModel, CMagRadialModel};

/// Radial cumulative-area model backed by the Horton & Hoyt (1991) closed
/// forms. Shape parameters: `[b]` (degrees, positive).
///
/// # Panics
/// Evaluation panics if `params` has fewer than one element. The fitting
/// engine validates arity before optimizing.
#[derive(Debug, Clone, Copy, Default)]
pub struct Hh91;

impl Hh91 {
    fn derive_a<T: Real>(total_area: T, fov: f64, hemifields: f64, b: T) -> T {
        let max_ecc = T::from_f64(fov / 2.0);
        hh91::find_a(total_area, T::from_f64(0.0), Some(max_ecc), b, hemifields)
    }
}

impl<T: Real> CMagModel<T> for Hh91 {
    fn arity(&self) -> usize {
        1
    }

    fn areal_cmag(&self, x: T, y: T, total_area: T, fov: f64, hemifields: f64, params: &[T]) -> T {
        areal_from_radial(self, x, y, total_area, fov, hemifields, params)
    }

    fn param_transform(&self) -> Option<ParamTransform> {
        // b must stay positive or the magnification is undefined at r = 0.
        Some(ParamTransform::log_exp())
    }
}

impl<T: Real> CMagRadialModel<T> for Hh91 {
    fn radial_cumarea(&self, r: T, total_area: T, fov: f64, hemifields: f64, params: &[T]) -> T {
        let b = params[0];
        let a = Self::derive_a(total_area, fov, hemifields, b);
        hh91::integral(r, None, a, b, hemifields)
    }

    fn radial_cmag(&self, r: T, total_area: T, fov: f64, hemifields: f64, params: &[T]) -> T {
        let b = params[0];
        let a = Self::derive_a(total_area, fov, hemifields, b);
        hh91::magnification(r, a, b, Output::Areal)
    }
}
