//! Shared domain types.
//!
//! This module defines:
//!
//! - the magnification output mode ([`Output`])
//! - the loss specification for fits ([`Loss`])
//! - the forward/inverse parameter transform pair ([`ParamTransform`])
//! - the immutable fit result record ([`CumAreaFit`])

pub mod types;

pub use types::*;
