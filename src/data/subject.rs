//! Columnar per-vertex measurements for one subject.

use serde::{Deserialize, Serialize};

use crate::error::CmagError;

/// Cortical hemisphere a vertex belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Hemisphere {
    Lh,
    Rh,
}

/// Column-oriented per-vertex data for one subject. All columns have the
/// same length, one row per cortical surface vertex.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SubjectData {
    /// Visual-area label per vertex; 0 means unlabeled.
    pub label: Vec<i32>,
    /// Midgray surface area per vertex, in square millimeters.
    pub surface_area: Vec<f64>,
    /// Eccentricity of the vertex's preferred visual position, in degrees.
    pub eccentricity: Vec<f64>,
    /// Coefficient of determination of the retinotopic model fit, in [0, 1].
    pub cod: Vec<f64>,
    /// Hemisphere of origin per vertex.
    pub hemisphere: Vec<Hemisphere>,
}

/// The columns of [`SubjectData`] restricted to a single label, in original
/// row order.
#[derive(Debug, Clone, Default)]
pub struct LabelSamples {
    pub surface_area: Vec<f64>,
    pub eccentricity: Vec<f64>,
    pub cod: Vec<f64>,
}

impl LabelSamples {
    pub fn len(&self) -> usize {
        self.surface_area.len()
    }

    pub fn is_empty(&self) -> bool {
        self.surface_area.is_empty()
    }
}

impl SubjectData {
    /// Builds a single-hemisphere table. Columns must already be equal
    /// length; call [`SubjectData::validate`] to check.
    pub fn hemi(
        hemisphere: Hemisphere,
        label: Vec<i32>,
        surface_area: Vec<f64>,
        eccentricity: Vec<f64>,
        cod: Vec<f64>,
    ) -> Self {
        let n = label.len();
        SubjectData {
            label,
            surface_area,
            eccentricity,
            cod,
            hemisphere: vec![hemisphere; n],
        }
    }

    pub fn len(&self) -> usize {
        self.label.len()
    }

    pub fn is_empty(&self) -> bool {
        self.label.is_empty()
    }

    /// Checks column lengths and value ranges.
    pub fn validate(&self) -> Result<(), CmagError> {
        let n = self.label.len();
        if self.surface_area.len() != n
            || self.eccentricity.len() != n
            || self.cod.len() != n
            || self.hemisphere.len() != n
        {
            return Err(CmagError::invalid_argument(
                "subject data columns have mismatched lengths",
            ));
        }
        for &a in &self.surface_area {
            if !a.is_finite() || a < 0.0 {
                return Err(CmagError::invalid_argument(
                    "surface areas must be finite and non-negative",
                ));
            }
        }
        for &e in &self.eccentricity {
            if !e.is_finite() || e < 0.0 {
                return Err(CmagError::invalid_argument(
                    "eccentricities must be finite and non-negative",
                ));
            }
        }
        for &c in &self.cod {
            if !c.is_finite() {
                return Err(CmagError::invalid_argument(
                    "cod values must be finite",
                ));
            }
        }
        Ok(())
    }

    /// Concatenates left- and right-hemisphere tables into one.
    pub fn join(lh: &SubjectData, rh: &SubjectData) -> SubjectData {
        let mut out = lh.clone();
        out.label.extend_from_slice(&rh.label);
        out.surface_area.extend_from_slice(&rh.surface_area);
        out.eccentricity.extend_from_slice(&rh.eccentricity);
        out.cod.extend_from_slice(&rh.cod);
        out.hemisphere.extend_from_slice(&rh.hemisphere);
        out
    }

    /// Extracts the rows carrying `label`, optionally restricted by a
    /// per-row boolean `mask`.
    pub fn select(&self, label: i32, mask: Option<&[bool]>) -> Result<LabelSamples, CmagError> {
        self.validate()?;
        if let Some(m) = mask {
            if m.len() != self.len() {
                return Err(CmagError::invalid_argument(
                    "mask length does not match subject data",
                ));
            }
        }
        let mut out = LabelSamples::default();
        for i in 0..self.len() {
            if self.label[i] != label {
                continue;
            }
            if let Some(m) = mask {
                if !m[i] {
                    continue;
                }
            }
            out.surface_area.push(self.surface_area[i]);
            out.eccentricity.push(self.eccentricity[i]);
            out.cod.push(self.cod[i]);
        }
        Ok(out)
    }
}
