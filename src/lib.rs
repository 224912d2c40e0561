//! `cmag` library crate.
//!
//! Fits models of cortical magnification to per-vertex surface-area and
//! eccentricity measurements by the cumulative-area method: sort vertices by
//! eccentricity, accumulate their areas into an empirical cumulative curve,
//! and fit a model's predicted curve to it.
//!
//! - [`models`] holds the model traits and the concrete Horton & Hoyt and
//!   Beta-distribution models
//! - [`fit`] holds the single-curve engine and per-label batch fitting
//! - [`math`] holds the closed-form Horton & Hoyt expressions and the
//!   generic scalar backend (plain floats or dual numbers)

pub mod config;
pub mod data;
pub mod domain;
pub mod error;
pub mod fit;
pub mod math;
pub mod models;
