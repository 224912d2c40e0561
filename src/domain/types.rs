//! Domain types used throughout the fitting pipeline.
//!
//! These types are kept lightweight and serializable so fit results can be
//! exported (JSON/CSV) and reloaded later for comparisons across subjects and
//! labels.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::CmagError;

/// Which form of the cortical magnification to return.
///
/// The areal magnification (square mm of cortex per square degree of visual
/// field) is the square of the linear magnification (mm per degree).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Output {
    Areal,
    Linear,
}

impl FromStr for Output {
    type Err = CmagError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "areal" => Ok(Self::Areal),
            "linear" => Ok(Self::Linear),
            other => Err(CmagError::invalid_argument(format!(
                "unrecognized output mode '{other}'; valid choices are 'areal' or 'linear'"
            ))),
        }
    }
}

/// Closure type for caller-supplied residual aggregation: `(observed,
/// predicted) -> scalar loss`.
pub type LossFn = dyn Fn(&[f64], &[f64]) -> f64 + Send + Sync;

/// Loss used by the fitting engine.
///
/// `Mse` becomes a weighted mean (normalized by the weight sum) when weights
/// are supplied to the fit; `Rss` and `Custom` ignore weights.
#[derive(Clone, Default)]
pub enum Loss {
    /// Mean of squared residuals (weighted mean when weights are given).
    #[default]
    Mse,
    /// Raw sum of squared residuals.
    Rss,
    /// Caller-supplied residual aggregation.
    Custom(Arc<LossFn>),
}

impl fmt::Debug for Loss {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Mse => f.write_str("Mse"),
            Self::Rss => f.write_str("Rss"),
            Self::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

impl FromStr for Loss {
    type Err = CmagError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "mse" => Ok(Self::Mse),
            "rss" => Ok(Self::Rss),
            other => Err(CmagError::invalid_argument(format!(
                "unrecognized loss '{other}'; valid names are 'mse' or 'rss'"
            ))),
        }
    }
}

/// Closure type mapping a parameter vector between natural and search space.
pub type VecMap = dyn Fn(&[f64]) -> Vec<f64> + Send + Sync;

/// A forward/inverse pair mapping natural-domain parameters to and from an
/// unconstrained search domain.
///
/// The forward map is applied to the initial parameters before they enter the
/// minimizer; the inverse map recovers natural-space parameters inside the
/// objective and in the final result. The minimizer itself only ever sees
/// transformed coordinates. The typical use is [`ParamTransform::log_exp`],
/// which keeps positive-only shape parameters valid during an unconstrained
/// search.
#[derive(Clone)]
pub struct ParamTransform {
    forward: Arc<VecMap>,
    inverse: Arc<VecMap>,
}

impl ParamTransform {
    pub fn new(
        forward: impl Fn(&[f64]) -> Vec<f64> + Send + Sync + 'static,
        inverse: impl Fn(&[f64]) -> Vec<f64> + Send + Sync + 'static,
    ) -> Self {
        Self {
            forward: Arc::new(forward),
            inverse: Arc::new(inverse),
        }
    }

    /// The identity transform: search directly in natural space.
    pub fn identity() -> Self {
        Self::new(|p| p.to_vec(), |p| p.to_vec())
    }

    /// Elementwise log/exp transform for positive-only parameters.
    pub fn log_exp() -> Self {
        Self::new(
            |p| p.iter().map(|v| v.ln()).collect(),
            |p| p.iter().map(|v| v.exp()).collect(),
        )
    }

    pub fn apply_forward(&self, params: &[f64]) -> Vec<f64> {
        (self.forward)(params)
    }

    pub fn apply_inverse(&self, params: &[f64]) -> Vec<f64> {
        (self.inverse)(params)
    }
}

impl fmt::Debug for ParamTransform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ParamTransform { .. }")
    }
}

/// Result of one cumulative-area fit.
///
/// Created once at the end of a `fit_cumarea` call and never mutated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CumAreaFit {
    /// Final parameter vector, in natural (untransformed) units.
    pub params: Vec<f64>,
    /// Fitted total surface area, present when joint total-area fitting was
    /// requested.
    pub total_area: Option<f64>,
    /// Achieved loss value at the final parameters.
    pub loss: f64,
    /// Whether the minimizer reported convergence. Non-convergence is a
    /// diagnostic, not an error; the caller decides how to treat it.
    pub converged: bool,
    /// Number of minimizer iterations performed.
    pub iterations: u64,
    /// Human-readable termination status from the minimizer.
    pub termination: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn output_parses_recognized_modes_only() {
        assert_eq!("areal".parse::<Output>().unwrap(), Output::Areal);
        assert_eq!("linear".parse::<Output>().unwrap(), Output::Linear);
        assert!(matches!(
            "quadratic".parse::<Output>(),
            Err(CmagError::InvalidArgument(_))
        ));
    }

    #[test]
    fn loss_parses_recognized_names_only() {
        assert!(matches!("mse".parse::<Loss>().unwrap(), Loss::Mse));
        assert!(matches!("rss".parse::<Loss>().unwrap(), Loss::Rss));
        assert!(matches!(
            "mae".parse::<Loss>(),
            Err(CmagError::InvalidArgument(_))
        ));
    }

    #[test]
    fn log_exp_transform_round_trips() {
        let tx = ParamTransform::log_exp();
        let p = [0.75, 2.0, 17.3];
        let back = tx.apply_inverse(&tx.apply_forward(&p));
        for (x, y) in p.iter().zip(back.iter()) {
            assert!((x - y).abs() < 1e-12);
        }
    }
}
