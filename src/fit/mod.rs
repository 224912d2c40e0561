//! Cumulative-area fitting: the single-curve engine and per-label batching.

pub mod batch;
pub mod engine;

pub use batch::*;
pub use engine::*;
