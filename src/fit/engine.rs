//! The cumulative-area fitting engine.
//!
//! Given per-vertex surface areas and eccentricities, the engine sorts the
//! samples by eccentricity, accumulates the areas into an empirical
//! cumulative-area curve, and fits a model's predicted curve to it with a
//! derivative-free Nelder-Mead search. The total surface area may be held
//! fixed or fitted jointly as an extra coordinate (carried as its square
//! root so the optimizer cannot make it negative).

use std::sync::Arc;

use argmin::core::{
    CostFunction, Error as ArgminError, Executor, State, TerminationReason, TerminationStatus,
};
use argmin::solver::neldermead::NelderMead;

use crate::config::FieldConfig;
use crate::domain::{CumAreaFit, Loss, ParamTransform};
use crate::error::CmagError;
use crate::models::CMagRadialModel;

/// Functional form whose cumulative-area curve is fitted.
pub enum FormFn<'a> {
    /// A radial model; predictions come from its `radial_cumarea`.
    Model(&'a dyn CMagRadialModel<f64>),
    /// An arbitrary curve: `(params, eccentricities) -> cumulative areas`.
    /// The parameter vector excludes the total area, which cannot be fitted
    /// jointly for a bare function.
    Func(&'a (dyn Fn(&[f64], &[f64]) -> Vec<f64> + Sync)),
}

/// Nelder-Mead stopping criteria.
#[derive(Debug, Clone, Copy)]
pub struct OptimizerOptions {
    pub max_iters: u64,
    /// Standard-deviation tolerance across the simplex costs.
    pub sd_tolerance: f64,
}

impl Default for OptimizerOptions {
    fn default() -> Self {
        OptimizerOptions {
            max_iters: 500,
            sd_tolerance: 1e-12,
        }
    }
}

/// Options for a single cumulative-area fit.
///
/// `fov` and `hemifields` default to the values in the [`FieldConfig`]
/// passed to [`fit_cumarea`] when left as `None`.
#[derive(Debug, Clone)]
pub struct FitOptions {
    /// Total surface area of the region, or the initial guess for it when
    /// `fit_total_area` is set.
    pub total_area: f64,
    pub fov: Option<f64>,
    pub hemifields: Option<f64>,
    /// Fit the total area jointly with the shape parameters.
    pub fit_total_area: bool,
    pub loss: Loss,
    /// Per-sample weights, in the caller's (unsorted) sample order.
    pub weights: Option<Vec<f64>>,
    /// Overrides the model's own parameter transform when set.
    pub param_transform: Option<ParamTransform>,
    pub optimizer: OptimizerOptions,
}

impl Default for FitOptions {
    fn default() -> Self {
        FitOptions {
            total_area: 1.0,
            fov: None,
            hemifields: None,
            fit_total_area: true,
            loss: Loss::default(),
            weights: None,
            param_transform: None,
            optimizer: OptimizerOptions::default(),
        }
    }
}

// Simplex seeding offsets, matching the common reflective-simplex choice.
const NONZERO_DELTA: f64 = 0.05;
const ZERO_DELTA: f64 = 0.00025;

enum ResolvedLoss {
    Mse,
    WeightedMse { weights: Vec<f64>, wsum: f64 },
    Rss,
    Custom(Arc<crate::domain::LossFn>),
}

impl ResolvedLoss {
    // A custom loss receives the curves as (observed, predicted).
    fn eval(&self, pred: &[f64], obs: &[f64]) -> f64 {
        match self {
            ResolvedLoss::Mse => {
                let n = obs.len() as f64;
                pred.iter()
                    .zip(obs)
                    .map(|(p, o)| (p - o) * (p - o))
                    .sum::<f64>()
                    / n
            }
            ResolvedLoss::WeightedMse { weights, wsum } => {
                pred.iter()
                    .zip(obs)
                    .zip(weights)
                    .map(|((p, o), w)| w * (p - o) * (p - o))
                    .sum::<f64>()
                    / wsum
            }
            ResolvedLoss::Rss => pred
                .iter()
                .zip(obs)
                .map(|(p, o)| (p - o) * (p - o))
                .sum::<f64>(),
            ResolvedLoss::Custom(f) => f(obs, pred),
        }
    }
}

struct CumAreaObjective<'a> {
    cum_area: Vec<f64>,
    eccen: Vec<f64>,
    form: &'a FormFn<'a>,
    transform: &'a ParamTransform,
    loss: ResolvedLoss,
    fit_total_area: bool,
    total_area: f64,
    fov: f64,
    hemifields: f64,
}

impl CumAreaObjective<'_> {
    fn predictions(&self, shape: &[f64], total_area: f64) -> Vec<f64> {
        match self.form {
            FormFn::Model(model) => self
                .eccen
                .iter()
                .map(|&r| model.radial_cumarea(r, total_area, self.fov, self.hemifields, shape))
                .collect(),
            FormFn::Func(f) => f(shape, &self.eccen),
        }
    }
}

impl CostFunction for CumAreaObjective<'_> {
    type Param = Vec<f64>;
    type Output = f64;

    fn cost(&self, p: &Self::Param) -> Result<Self::Output, ArgminError> {
        let (shape_tx, total_area) = if self.fit_total_area {
            // The trailing coordinate carries sqrt(total_area).
            let (c, shape) = p.split_last().unwrap_or((&0.0, &[]));
            (shape, c * c)
        } else {
            (p.as_slice(), self.total_area)
        };
        let shape = self.transform.apply_inverse(shape_tx);
        let pred = self.predictions(&shape, total_area);
        let cost = self.loss.eval(&pred, &self.cum_area);
        if cost.is_finite() {
            Ok(cost)
        } else {
            Ok(f64::MAX)
        }
    }
}

/// Returns the index permutation that stably sorts `eccen` ascending.
fn sort_index(eccen: &[f64]) -> Vec<usize> {
    let mut idx: Vec<usize> = (0..eccen.len()).collect();
    idx.sort_by(|&i, &j| {
        eccen[i]
            .partial_cmp(&eccen[j])
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    idx
}

fn initial_simplex(x0: &[f64]) -> Vec<Vec<f64>> {
    let mut simplex = Vec::with_capacity(x0.len() + 1);
    simplex.push(x0.to_vec());
    for i in 0..x0.len() {
        let mut v = x0.to_vec();
        if v[i] != 0.0 {
            v[i] *= 1.0 + NONZERO_DELTA;
        } else {
            v[i] = ZERO_DELTA;
        }
        simplex.push(v);
    }
    simplex
}

/// Fits a model's cumulative-area curve to per-vertex measurements.
///
/// `surface_areas` and `eccen` are parallel per-vertex columns in any order;
/// the engine sorts by eccentricity internally and permutes any weights the
/// same way, so the result does not depend on sample order. `params0` is the
/// initial guess for the shape parameters, in natural (untransformed) units.
pub fn fit_cumarea(
    surface_areas: &[f64],
    eccen: &[f64],
    form: FormFn<'_>,
    params0: &[f64],
    opts: &FitOptions,
    cfg: &FieldConfig,
) -> Result<CumAreaFit, CmagError> {
    if surface_areas.len() != eccen.len() {
        return Err(CmagError::invalid_argument(
            "surface_areas and eccen must have the same length",
        ));
    }
    if surface_areas.is_empty() {
        return Err(CmagError::invalid_argument("no samples to fit"));
    }
    if params0.is_empty() {
        return Err(CmagError::invalid_argument(
            "initial parameter vector is empty",
        ));
    }
    if let FormFn::Model(model) = &form {
        if params0.len() != model.arity() {
            return Err(CmagError::invalid_argument(format!(
                "model takes {} parameters but params0 has {}",
                model.arity(),
                params0.len()
            )));
        }
    }
    if matches!(form, FormFn::Func(_)) && opts.fit_total_area {
        return Err(CmagError::invalid_config(
            "fit_total_area requires a model form, not a bare function",
        ));
    }
    if let Some(w) = &opts.weights {
        if w.len() != eccen.len() {
            return Err(CmagError::invalid_argument(
                "weights must match the number of samples",
            ));
        }
        if w.iter().any(|&x| !x.is_finite() || x < 0.0) {
            return Err(CmagError::invalid_argument(
                "weights must be finite and non-negative",
            ));
        }
    }
    let fov = opts.fov.unwrap_or(cfg.fov);
    let hemifields = opts.hemifields.unwrap_or(cfg.hemifields);
    if !fov.is_finite() || fov <= 0.0 {
        return Err(CmagError::invalid_config("fov must be finite and positive"));
    }
    if !opts.total_area.is_finite() || opts.total_area <= 0.0 {
        return Err(CmagError::invalid_config(
            "total_area must be finite and positive",
        ));
    }

    // Empirical cumulative-area curve, with weights carried along the sort.
    let idx = sort_index(eccen);
    let eccen_sorted: Vec<f64> = idx.iter().map(|&i| eccen[i]).collect();
    let mut cum_area = Vec::with_capacity(idx.len());
    let mut acc = 0.0;
    for &i in &idx {
        acc += surface_areas[i];
        cum_area.push(acc);
    }
    let loss = match (&opts.loss, &opts.weights) {
        (Loss::Mse, Some(w)) => {
            let weights: Vec<f64> = idx.iter().map(|&i| w[i]).collect();
            let wsum: f64 = weights.iter().sum();
            if wsum <= 0.0 {
                return Err(CmagError::invalid_argument("weights sum to zero"));
            }
            ResolvedLoss::WeightedMse { weights, wsum }
        }
        (Loss::Mse, None) => ResolvedLoss::Mse,
        (Loss::Rss, _) => ResolvedLoss::Rss,
        (Loss::Custom(f), _) => ResolvedLoss::Custom(f.clone()),
    };

    let transform = opts
        .param_transform
        .clone()
        .or_else(|| match &form {
            FormFn::Model(model) => model.param_transform(),
            FormFn::Func(_) => None,
        })
        .unwrap_or_else(ParamTransform::identity);

    let mut x0 = transform.apply_forward(params0);
    if opts.fit_total_area {
        x0.push(opts.total_area.sqrt());
    }

    let objective = CumAreaObjective {
        cum_area,
        eccen: eccen_sorted,
        form: &form,
        transform: &transform,
        loss,
        fit_total_area: opts.fit_total_area,
        total_area: opts.total_area,
        fov,
        hemifields,
    };

    let solver = NelderMead::new(initial_simplex(&x0))
        .with_sd_tolerance(opts.optimizer.sd_tolerance)
        .map_err(|e| CmagError::optimizer(e.to_string()))?;
    let res = Executor::new(objective, solver)
        .configure(|state| state.max_iters(opts.optimizer.max_iters))
        .run()
        .map_err(|e| CmagError::optimizer(e.to_string()))?;

    let state = res.state();
    let mut best = state
        .get_best_param()
        .cloned()
        .ok_or_else(|| CmagError::optimizer("solver produced no best parameter"))?;
    let total_area = if opts.fit_total_area {
        let c = best
            .pop()
            .ok_or_else(|| CmagError::optimizer("best parameter vector is empty"))?;
        Some(c * c)
    } else {
        None
    };
    let params = transform.apply_inverse(&best);
    let status = state.get_termination_status();
    let converged = matches!(
        status,
        TerminationStatus::Terminated(TerminationReason::SolverConverged)
    );

    Ok(CumAreaFit {
        params,
        total_area,
        loss: state.get_best_cost(),
        converged,
        iterations: state.get_iter(),
        termination: format!("{:?}", status),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Hh91;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    const FOV: f64 = 200.0;
    const TOTAL_AREA: f64 = 1200.0;

    /// Per-vertex areas whose cumulative sum lands exactly on the model
    /// curve: differences of radial_cumarea at sorted eccentricities.
    fn synthetic_samples(b: f64, n: usize) -> (Vec<f64>, Vec<f64>) {
        let eccen: Vec<f64> = (1..=n).map(|i| 90.0 * i as f64 / (n + 1) as f64).collect();
        let mut areas = Vec::with_capacity(n);
        let mut prev = 0.0;
        for &r in &eccen {
            let c = Hh91.radial_cumarea(r, TOTAL_AREA, FOV, 2.0, &[b]);
            areas.push(c - prev);
            prev = c;
        }
        (areas, eccen)
    }

    fn fit_opts(max_iters: u64) -> FitOptions {
        FitOptions {
            total_area: 800.0,
            optimizer: OptimizerOptions {
                max_iters,
                ..OptimizerOptions::default()
            },
            ..FitOptions::default()
        }
    }

    #[test]
    fn recovers_hh91_parameters_within_one_percent() {
        let (areas, eccen) = synthetic_samples(0.75, 500);
        let cfg = FieldConfig::default();
        let fit = fit_cumarea(
            &areas,
            &eccen,
            FormFn::Model(&Hh91),
            &[2.0],
            &fit_opts(2000),
            &cfg,
        )
        .unwrap();
        let b = fit.params[0];
        let area = fit.total_area.unwrap();
        assert!((b - 0.75).abs() / 0.75 < 0.01, "b = {b}");
        assert!(
            (area - TOTAL_AREA).abs() / TOTAL_AREA < 0.01,
            "area = {area}"
        );
    }

    #[test]
    fn result_is_invariant_under_sample_permutation() {
        let (areas, eccen) = synthetic_samples(0.9, 64);
        let weights: Vec<f64> = (0..64).map(|i| 1.0 + (i % 7) as f64).collect();
        let cfg = FieldConfig::default();
        let opts = FitOptions {
            weights: Some(weights.clone()),
            ..fit_opts(400)
        };
        let fwd = fit_cumarea(&areas, &eccen, FormFn::Model(&Hh91), &[2.0], &opts, &cfg).unwrap();

        let rev_areas: Vec<f64> = areas.iter().rev().cloned().collect();
        let rev_eccen: Vec<f64> = eccen.iter().rev().cloned().collect();
        let rev_weights: Vec<f64> = weights.iter().rev().cloned().collect();
        let opts_rev = FitOptions {
            weights: Some(rev_weights),
            ..fit_opts(400)
        };
        let rev = fit_cumarea(
            &rev_areas,
            &rev_eccen,
            FormFn::Model(&Hh91),
            &[2.0],
            &opts_rev,
            &cfg,
        )
        .unwrap();

        assert_eq!(fwd.params, rev.params);
        assert_eq!(fwd.total_area, rev.total_area);
        assert_eq!(fwd.loss, rev.loss);
    }

    #[test]
    fn unit_weights_match_unweighted_fit() {
        let (areas, eccen) = synthetic_samples(0.75, 64);
        let cfg = FieldConfig::default();
        let plain = fit_cumarea(
            &areas,
            &eccen,
            FormFn::Model(&Hh91),
            &[2.0],
            &fit_opts(400),
            &cfg,
        )
        .unwrap();
        let opts = FitOptions {
            weights: Some(vec![1.0; 64]),
            ..fit_opts(400)
        };
        let weighted =
            fit_cumarea(&areas, &eccen, FormFn::Model(&Hh91), &[2.0], &opts, &cfg).unwrap();
        assert_eq!(plain.params, weighted.params);
        assert_eq!(plain.loss, weighted.loss);
    }

    #[test]
    fn custom_loss_receives_observed_curve_first() {
        // A loss that just reports the last value of its first argument: for
        // the observed cumulative curve [1, 3, 6] that is the total area 6.
        let loss = Loss::Custom(std::sync::Arc::new(|obs: &[f64], _pred: &[f64]| {
            obs[obs.len() - 1]
        }));
        let f = |params: &[f64], eccen: &[f64]| -> Vec<f64> {
            eccen.iter().map(|&r| params[0] * r * 45.0).collect()
        };
        let cfg = FieldConfig::default();
        let opts = FitOptions {
            fit_total_area: false,
            loss,
            ..FitOptions::default()
        };
        let fit = fit_cumarea(
            &[1.0, 2.0, 3.0],
            &[1.0, 2.0, 3.0],
            FormFn::Func(&f),
            &[1.0],
            &opts,
            &cfg,
        )
        .unwrap();
        assert_eq!(fit.loss, 6.0);
    }

    #[test]
    fn zero_weight_excludes_sample_exactly() {
        // Weighting the highest-eccentricity sample by zero must reproduce
        // the fit with that sample removed outright.
        let (areas, eccen) = synthetic_samples(0.75, 64);
        let cfg = FieldConfig::default();
        let mut weights = vec![1.0; 64];
        weights[63] = 0.0;
        let opts = FitOptions {
            weights: Some(weights),
            ..fit_opts(400)
        };
        let zeroed =
            fit_cumarea(&areas, &eccen, FormFn::Model(&Hh91), &[2.0], &opts, &cfg).unwrap();

        let opts_dropped = FitOptions {
            weights: Some(vec![1.0; 63]),
            ..fit_opts(400)
        };
        let dropped = fit_cumarea(
            &areas[..63],
            &eccen[..63],
            FormFn::Model(&Hh91),
            &[2.0],
            &opts_dropped,
            &cfg,
        )
        .unwrap();

        assert_eq!(zeroed.params, dropped.params);
        assert_eq!(zeroed.total_area, dropped.total_area);
        assert_eq!(zeroed.loss, dropped.loss);
    }

    #[test]
    fn recovers_parameters_from_noisy_samples() {
        let (mut areas, eccen) = synthetic_samples(0.75, 500);
        let mut rng = StdRng::seed_from_u64(7);
        for a in &mut areas {
            *a *= rng.gen_range(0.95..1.05);
        }
        let cfg = FieldConfig::default();
        let fit = fit_cumarea(
            &areas,
            &eccen,
            FormFn::Model(&Hh91),
            &[2.0],
            &fit_opts(2000),
            &cfg,
        )
        .unwrap();
        let b = fit.params[0];
        assert!((b - 0.75).abs() / 0.75 < 0.05, "b = {b}");
    }

    #[test]
    fn fitting_total_area_for_bare_function_is_rejected() {
        let f = |params: &[f64], eccen: &[f64]| -> Vec<f64> {
            eccen.iter().map(|&r| params[0] * r).collect()
        };
        let cfg = FieldConfig::default();
        let err = fit_cumarea(
            &[1.0, 2.0],
            &[0.5, 1.5],
            FormFn::Func(&f),
            &[1.0],
            &FitOptions::default(),
            &cfg,
        )
        .unwrap_err();
        assert!(matches!(err, CmagError::InvalidConfig(_)));
    }

    #[test]
    fn bare_function_form_fits_with_fixed_area() {
        let f = |params: &[f64], eccen: &[f64]| -> Vec<f64> {
            eccen.iter().map(|&r| params[0] * r).collect()
        };
        let eccen: Vec<f64> = (1..=20).map(|i| i as f64).collect();
        // Per-sample areas whose cumsum is 3 * r at the sorted eccentricities.
        let areas: Vec<f64> = vec![3.0; 20];
        let cfg = FieldConfig::default();
        let opts = FitOptions {
            fit_total_area: false,
            ..FitOptions::default()
        };
        let fit = fit_cumarea(&areas, &eccen, FormFn::Func(&f), &[1.0], &opts, &cfg).unwrap();
        assert!((fit.params[0] - 3.0).abs() < 1e-3);
        assert!(fit.total_area.is_none());
    }

    #[test]
    fn mismatched_lengths_are_rejected() {
        let cfg = FieldConfig::default();
        let err = fit_cumarea(
            &[1.0, 2.0],
            &[0.5],
            FormFn::Model(&Hh91),
            &[1.0],
            &FitOptions::default(),
            &cfg,
        )
        .unwrap_err();
        assert!(matches!(err, CmagError::InvalidArgument(_)));
    }

    #[test]
    fn wrong_arity_is_rejected() {
        let cfg = FieldConfig::default();
        let err = fit_cumarea(
            &[1.0, 2.0],
            &[0.5, 1.5],
            FormFn::Model(&Hh91),
            &[1.0, 2.0],
            &FitOptions::default(),
            &cfg,
        )
        .unwrap_err();
        assert!(matches!(err, CmagError::InvalidArgument(_)));
    }
}
