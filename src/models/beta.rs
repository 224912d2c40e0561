//! Beta-distribution cumulative-area model.
//!
//! The cumulative cortical surface area out to eccentricity `r` is taken to be
//! `total_area * BetaCDF(r / max_ecc; alpha, beta)`, where `max_ecc = fov / 2`.
//! This gives a flexible two-parameter family whose cumulative curve is exact
//! by construction; the magnification follows by differentiation.

use std::f64::consts::PI;

use statrs::distribution::{Beta, Continuous, ContinuousCDF};
use statrs::function::beta::beta as beta_fn;

use crate::domain::ParamTransform;
use crate::math::backend::Real;
use crate::models::model::{areal_from_radial, CMagModel, CMagRadialModel};

/// Radial cumulative-area model built on the Beta distribution over the
/// normalized eccentricity `r / (fov / 2)`. Shape parameters:
/// `[alpha, beta]` (both positive).
///
/// # Panics
/// Evaluation panics if `params` has fewer than two elements. The fitting
/// engine validates arity before optimizing.
#[derive(Debug, Clone, Copy, Default)]
pub struct BetaCmag;

impl BetaCmag {
    /// The distribution shape parameters cross into statrs as plain floats;
    /// derivatives in alpha and beta are not propagated.
    fn shape_pair<T: Real>(params: &[T]) -> (f64, f64) {
        (params[0].value(), params[1].value())
    }

    /// d/dx of the Beta pdf, for lifting the f64-only density through the
    /// generic backend.
    fn pdf_slope(dist: &Beta, alpha: f64, beta: f64, x: f64) -> f64 {
        if x <= 0.0 || x >= 1.0 {
            return 0.0;
        }
        dist.pdf(x) * ((alpha - 1.0) / x - (beta - 1.0) / (1.0 - x))
    }
}

impl<T: Real> CMagModel<T> for BetaCmag {
    fn arity(&self) -> usize {
        2
    }

    fn areal_cmag(&self, x: T, y: T, total_area: T, fov: f64, hemifields: f64, params: &[T]) -> T {
        areal_from_radial(self, x, y, total_area, fov, hemifields, params)
    }

    fn param_transform(&self) -> Option<ParamTransform> {
        Some(ParamTransform::log_exp())
    }
}

impl<T: Real> CMagRadialModel<T> for BetaCmag {
    fn radial_cumarea(&self, r: T, total_area: T, fov: f64, hemifields: f64, params: &[T]) -> T {
        let _ = hemifields;
        let (alpha, beta) = Self::shape_pair(params);
        let max_ecc = fov / 2.0;
        let x = r / T::from_f64(max_ecc);
        let cdf = match Beta::new(alpha, beta) {
            Ok(dist) => {
                let slope = move |v: f64| {
                    if (0.0..=1.0).contains(&v) {
                        dist.pdf(v)
                    } else {
                        0.0
                    }
                };
                x.chain(move |v| dist.cdf(v), slope)
            }
            Err(_) => T::from_f64(f64::NAN),
        };
        total_area * cdf
    }

    fn radial_cmag(&self, r: T, total_area: T, fov: f64, hemifields: f64, params: &[T]) -> T {
        let (alpha, beta) = Self::shape_pair(params);
        let max_ecc = fov / 2.0;
        let norm = total_area / T::from_f64(hemifields * PI * max_ecc);
        if r.value() == 0.0 {
            // Magnification at the fovea: the density diverges, vanishes, or
            // stays finite depending on alpha.
            let boundary = if alpha < 2.0 {
                f64::INFINITY
            } else if alpha > 2.0 {
                0.0
            } else {
                max_ecc.powf(1.0 - alpha) / beta_fn(alpha, beta)
            };
            return norm * T::from_f64(boundary);
        }
        let pdf = match Beta::new(alpha, beta) {
            Ok(dist) => {
                let f = move |v: f64| {
                    if (0.0..=1.0).contains(&v) {
                        dist.pdf(v)
                    } else {
                        0.0
                    }
                };
                let df = move |v: f64| Self::pdf_slope(&dist, alpha, beta, v);
                let x = r / T::from_f64(max_ecc);
                x.chain(f, df)
            }
            Err(_) => T::from_f64(f64::NAN),
        };
        norm * pdf / r
    }

    fn radial_area(&self, r: T, total_area: T, fov: f64, hemifields: f64, params: &[T]) -> T {
        // The derived form multiplies the density by r and divides it back
        // out, which is 0 * inf at the fovea. Use the density directly.
        let _ = hemifields;
        let (alpha, beta) = Self::shape_pair(params);
        let max_ecc = fov / 2.0;
        let x = r / T::from_f64(max_ecc);
        let pdf = match Beta::new(alpha, beta) {
            Ok(dist) => {
                let f = move |v: f64| {
                    if (0.0..=1.0).contains(&v) {
                        dist.pdf(v)
                    } else {
                        0.0
                    }
                };
                let df = move |v: f64| Self::pdf_slope(&dist, alpha, beta, v);
                x.chain(f, df)
            }
            Err(_) => T::from_f64(f64::NAN),
        };
        total_area / T::from_f64(max_ecc) * pdf
    }
}
