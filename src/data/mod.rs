//! Per-vertex subject data: labels, surface areas, eccentricities.

pub mod subject;

pub use subject::*;
