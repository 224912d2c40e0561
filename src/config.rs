//! Visual-field configuration and the visual-area label table.
//!
//! The fitting engine never hard-codes the field of view or hemifield count.
//! Callers that do not set them explicitly resolve them, in one step, against
//! a [`FieldConfig`] value passed to the fit. `FieldConfig::from_env` honors
//! `CMAG_FOV` / `CMAG_MAX_ECCEN` environment overrides so a deployment can
//! retune the defaults without code changes.

use std::collections::HashMap;
use std::env;
use std::sync::OnceLock;

use serde::{Deserialize, Serialize};

/// Defaults describing the modeled visual field.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FieldConfig {
    /// Diameter of the field of view, in degrees (twice the maximum
    /// eccentricity a visual area receives input from). Magnification is very
    /// low in the far periphery, so fits are not sensitive to small changes
    /// here.
    pub fov: f64,
    /// Maximum eccentricity assumed measured within a visual area, in degrees.
    pub max_eccen: f64,
    /// Number of mirror-symmetric field halves included in surface-area
    /// measurements. 2 = bilateral, 1 = single hemisphere, 0.5 = one quadrant.
    pub hemifields: f64,
}

impl Default for FieldConfig {
    fn default() -> Self {
        Self {
            fov: 200.0,
            max_eccen: 7.0,
            hemifields: 2.0,
        }
    }
}

impl FieldConfig {
    /// Build a config from the defaults, applying any `CMAG_FOV` /
    /// `CMAG_MAX_ECCEN` environment overrides. Unparseable values are ignored.
    pub fn from_env() -> Self {
        let mut cfg = Self::default();
        if let Some(v) = env_f64("CMAG_FOV") {
            cfg.fov = v;
        }
        if let Some(v) = env_f64("CMAG_MAX_ECCEN") {
            cfg.max_eccen = v;
        }
        cfg
    }
}

fn env_f64(name: &str) -> Option<f64> {
    env::var(name).ok()?.parse().ok()
}

/// Names of the visual-area labels, indexed by label number.
/// Label 0 is always the background label.
pub const LABEL_NAMES: [Option<&str>; 11] = [
    None,
    // Early visual cortex (1, 2, 3).
    Some("V1"),
    Some("V2"),
    Some("V3"),
    // Ventral visual cortex (4, 5, 6).
    Some("hV4"),
    Some("VO1"),
    Some("VO2"),
    // Dorsal visual cortex (7, 8, 9, 10).
    Some("V3a"),
    Some("V3b"),
    Some("IPS0"),
    Some("LO1"),
];

/// Look up the label number for a visual-area name, case-insensitively.
///
/// The lookup map is built once from [`LABEL_NAMES`] and is immutable
/// afterwards.
pub fn label_lookup(name: &str) -> Option<i32> {
    static KEY: OnceLock<HashMap<String, i32>> = OnceLock::new();
    let key = KEY.get_or_init(|| {
        LABEL_NAMES
            .iter()
            .enumerate()
            .filter_map(|(index, nm)| nm.map(|nm| (nm.to_ascii_uppercase(), index as i32)))
            .collect()
    });
    key.get(&name.to_ascii_uppercase()).copied()
}
