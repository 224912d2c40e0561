//! Per-label batch fitting across the visual areas of a subject.

use rayon::prelude::*;

use crate::config::FieldConfig;
use crate::data::SubjectData;
use crate::domain::CumAreaFit;
use crate::error::CmagError;
use crate::fit::engine::{fit_cumarea, FitOptions, FormFn};
use crate::models::CMagRadialModel;

/// Labels with fewer samples than this are skipped rather than fitted.
pub const MIN_LABEL_SAMPLES: usize = 5;

/// All non-background labels of [`crate::config::LABEL_NAMES`].
pub const ALL_LABELS: [i32; 10] = [1, 2, 3, 4, 5, 6, 7, 8, 9, 10];

/// Options specific to batch fitting.
#[derive(Debug, Clone, Copy, Default)]
pub struct BatchOptions {
    /// Weight each vertex by its retinotopy coefficient of determination.
    pub cod_weights: bool,
}

/// Outcome of fitting one label. `fit` is `None` when the label had too few
/// samples.
#[derive(Debug, Clone)]
pub struct LabelFit {
    pub label: i32,
    pub n_samples: usize,
    pub fit: Option<CumAreaFit>,
}

/// Fits `model` independently to each label's vertices, in parallel.
///
/// For each label the initial total area is twice the summed vertex area
/// (the data typically covers one hemifield of a bilateral region), and the
/// total area is always fitted jointly. Because the vertex data is
/// per-hemisphere, `hemifields` defaults to 1 here rather than to the
/// bilateral value in `cfg`; set `opts.hemifields` to override.
pub fn fit_labels<M: CMagRadialModel<f64> + Sync>(
    data: &SubjectData,
    mask: Option<&[bool]>,
    labels: &[i32],
    model: &M,
    params0: &[f64],
    opts: &FitOptions,
    batch: &BatchOptions,
    cfg: &FieldConfig,
) -> Result<Vec<LabelFit>, CmagError> {
    data.validate()?;
    labels
        .par_iter()
        .map(|&label| {
            let samples = data.select(label, mask)?;
            let n_samples = samples.len();
            if n_samples < MIN_LABEL_SAMPLES {
                return Ok(LabelFit {
                    label,
                    n_samples,
                    fit: None,
                });
            }
            let area_sum: f64 = samples.surface_area.iter().sum();
            let mut label_opts = opts.clone();
            label_opts.total_area = 2.0 * area_sum;
            label_opts.fit_total_area = true;
            if label_opts.hemifields.is_none() {
                label_opts.hemifields = Some(1.0);
            }
            if batch.cod_weights {
                label_opts.weights = Some(samples.cod.clone());
            }
            let fit = fit_cumarea(
                &samples.surface_area,
                &samples.eccentricity,
                FormFn::Model(model),
                params0,
                &label_opts,
                cfg,
            )?;
            Ok(LabelFit {
                label,
                n_samples,
                fit: Some(fit),
            })
        })
        .collect()
}
