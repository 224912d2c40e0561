//! Numeric backend and closed-form magnification math.
//!
//! Responsibilities:
//!
//! - define the scalar backend interface ([`Real`]) over which all model
//!   formulas are written, with `f64` (plain) and [`Dual`] (forward-mode
//!   differentiable) implementations
//! - provide the Horton & Hoyt (1991) magnification law, its closed-form
//!   cumulative-area integral, and the algebraic inversion of that integral

pub mod backend;
pub mod hh91;

pub use backend::*;
pub use hh91::*;
