//! The Horton & Hoyt (1991) model of V1 cortical magnification.
//!
//! The model predicts an areal magnification of `m(r) = (a / (b + r))^2`
//! square mm of cortex per square degree of visual field at eccentricity `r`
//! degrees, with measured values `a = 17.3` mm and `b = 0.75` degrees.
//!
//! Alongside the magnification itself this module provides its closed-form
//! cumulative-area integral and the algebraic inversion of that integral for
//! the scale parameter `a`. All three are generic over the numeric backend,
//! so they evaluate plainly on `f64` and differentiably on `Dual`.
//!
//! Reference: Horton JC, Hoyt WF (1991) The representation of the visual
//! field in human striate cortex. Arch Ophthalmol. 109(6):816-24.

use std::f64::consts::PI;

use crate::domain::Output;
use crate::math::backend::Real;

/// The `a` parameter measured by Horton & Hoyt (1991), in mm.
pub const A_HH91: f64 = 17.3;

/// The `b` parameter measured by Horton & Hoyt (1991), in degrees.
pub const B_HH91: f64 = 0.75;

/// Cortical magnification at eccentricity `r`.
///
/// Returns `(a / (b + r))^2` for [`Output::Areal`] (square mm per square
/// degree) or `a / (b + r)` for [`Output::Linear`] (mm per degree).
pub fn magnification<T: Real>(r: T, a: T, b: T, output: Output) -> T {
    let lin = a / (b + r);
    match output {
        Output::Areal => lin * lin,
        Output::Linear => lin,
    }
}

/// Cortical surface area devoted to an eccentricity range, in square mm.
///
/// `integral(r, None, ..)` is the surface area of the central `r` degrees;
/// `integral(r0, Some(r1), ..)` is the surface area of the ring between `r0`
/// and `r1` degrees. Both are the closed form of
/// `hemifields * pi * integral of u * m(u) du` over the range:
///
/// ```text
/// h * pi * a^2 * (b/(b+r1) - b/(b+r0) + ln((b+r1)/(b+r0)))
/// ```
///
/// A lower bound of exactly 0 takes a simplified branch,
/// `h * pi * a^2 * (ln((b+r)/b) - r/(b+r))`, which sidesteps the removable
/// singularity of the general form.
pub fn integral<T: Real>(ecc: T, max_ecc: Option<T>, a: T, b: T, hemifields: f64) -> T {
    let (r0, r1) = match max_ecc {
        Some(m) => (ecc, m),
        None => (T::from_f64(0.0), ecc),
    };
    let scale = T::from_f64(hemifields * PI) * a * a;
    if r0.value() == 0.0 {
        let b_r1 = b + r1;
        scale * ((b_r1 / b).ln() - r1 / b_r1)
    } else {
        let b_r0 = b + r0;
        let b_r1 = b + r1;
        scale * (b / b_r1 - b / b_r0 + (b_r1 / b_r0).ln())
    }
}

/// Recover the scale parameter `a` from a surface area over an eccentricity
/// range.
///
/// This is the algebraic inversion of [`integral`] (not an iterative search):
///
/// ```text
/// a = sqrt(A / (h * pi * (b * (1/(b+r1) - 1/(b+r0)) + ln((b+r1)/(b+r0)))))
/// ```
///
/// The bounds follow the same convention as [`integral`]: with `max_ecc` of
/// `None`, `ecc` is the maximum eccentricity and 0 the minimum.
pub fn find_a<T: Real>(surf_area: T, ecc: T, max_ecc: Option<T>, b: T, hemifields: f64) -> T {
    let (r0, r1) = match max_ecc {
        Some(m) => (ecc, m),
        None => (T::from_f64(0.0), ecc),
    };
    let one = T::from_f64(1.0);
    let b_r0 = b + r0;
    let b_r1 = b + r1;
    let denom =
        T::from_f64(hemifields * PI) * (b * (one / b_r1 - one / b_r0) + (b_r1 / b_r0).ln());
    (surf_area / denom).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::backend::Dual;

    #[test]
    fn areal_is_square_of_linear() {
        for &r in &[0.0, 0.5, 3.0, 40.0] {
            let lin = magnification(r, A_HH91, B_HH91, Output::Linear);
            let areal = magnification(r, A_HH91, B_HH91, Output::Areal);
            assert!((areal - lin * lin).abs() < 1e-12);
        }
    }

    #[test]
    fn integral_is_monotone_in_upper_bound() {
        let mut prev = 0.0;
        for i in 1..=200 {
            let r = i as f64 * 0.5;
            let v = integral(r, None, A_HH91, B_HH91, 2.0);
            assert!(v >= prev, "integral decreased at r={r}: {v} < {prev}");
            prev = v;
        }
    }

    #[test]
    fn zero_based_integral_is_additive_over_rings() {
        // integral(0, r1) must equal integral(0, rm) + integral(rm, r1),
        // which exercises both algebraic branches against each other.
        let (rm, r1) = (3.0, 12.0);
        let whole = integral(r1, None, A_HH91, B_HH91, 2.0);
        let inner = integral(rm, None, A_HH91, B_HH91, 2.0);
        let ring = integral(rm, Some(r1), A_HH91, B_HH91, 2.0);
        assert!((whole - (inner + ring)).abs() < 1e-9 * whole);
    }

    #[test]
    fn find_a_inverts_integral() {
        for &(a0, b0, r) in &[(17.3, 0.75, 7.0), (5.0, 2.0, 50.0)] {
            let area = integral(r, None, a0, b0, 2.0);
            let a = find_a(area, r, None, b0, 2.0);
            assert!(
                (a - a0).abs() < 1e-9 * a0,
                "round trip failed for (a={a0}, b={b0}, r={r}): got {a}"
            );
        }
        // Two-bound form.
        let area = integral(2.0, Some(30.0), 11.0, 1.5, 1.0);
        let a = find_a(area, 2.0, Some(30.0), 1.5, 1.0);
        assert!((a - 11.0).abs() < 1e-9);
    }

    #[test]
    fn integral_derivative_in_b_matches_finite_differences() {
        let (r, a, b0, h) = (7.0, 17.3, 0.75, 2.0);
        let dual = integral(
            Dual::constant(r),
            None,
            Dual::constant(a),
            Dual::variable(b0),
            h,
        );
        let db = 1e-6;
        let fd = (integral(r, None, a, b0 + db, h) - integral(r, None, a, b0 - db, h)) / (2.0 * db);
        assert!((dual.val - integral(r, None, a, b0, h)).abs() < 1e-9);
        assert!(
            (dual.eps - fd).abs() < 1e-3 * fd.abs().max(1.0),
            "dual derivative {} vs finite difference {}",
            dual.eps,
            fd
        );
    }

    #[test]
    fn find_a_derivative_in_area_matches_finite_differences() {
        let (r, b, h) = (7.0, 0.75, 2.0);
        let area0 = 1500.0;
        let dual = find_a(
            Dual::variable(area0),
            Dual::constant(r),
            None,
            Dual::constant(b),
            h,
        );
        let da = 1e-3;
        let fd =
            (find_a(area0 + da, r, None, b, h) - find_a(area0 - da, r, None, b, h)) / (2.0 * da);
        assert!((dual.eps - fd).abs() < 1e-8);
    }
}
