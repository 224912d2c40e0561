//! Models of cortical magnification.
//!
//! The capability contracts ([`CMagModel`], [`CMagRadialModel`]) let the
//! fitting engine stay generic over the model form. Two concrete models are
//! provided:
//!
//! - [`Hh91`]: the closed-form Horton & Hoyt (1991) law
//! - [`BetaCmag`]: a beta-distribution model using a library CDF

pub mod beta;
pub mod hh91;
pub mod model;

pub use beta::*;
pub use hh91::*;
pub use model::*;
