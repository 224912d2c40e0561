//! Crate error type.
//!
//! The error surface is intentionally small:
//!
//! - configuration problems are rejected before any optimizer work starts
//! - argument parsing (loss / output names) fails at the string boundary
//! - optimizer *failure* (not non-convergence) is wrapped as `Optimizer`
//!
//! Non-convergence of a fit is never an error; it is reported through the
//! `converged` / `termination` fields of the fit result.

/// Errors produced by the `cmag` library.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CmagError {
    /// The combination of fit inputs and options is invalid (e.g. mismatched
    /// array lengths, or joint total-area fitting requested for a plain
    /// function form).
    InvalidConfig(String),
    /// A single argument value is invalid (e.g. an unrecognized loss name).
    InvalidArgument(String),
    /// The external minimizer failed outright (distinct from halting without
    /// convergence, which is reported in the fit result).
    Optimizer(String),
}

impl CmagError {
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig(message.into())
    }

    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }

    pub fn optimizer(message: impl Into<String>) -> Self {
        Self::Optimizer(message.into())
    }
}

impl std::fmt::Display for CmagError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidConfig(msg) => write!(f, "invalid configuration: {msg}"),
            Self::InvalidArgument(msg) => write!(f, "invalid argument: {msg}"),
            Self::Optimizer(msg) => write!(f, "optimizer error: {msg}"),
        }
    }
}

impl std::error::Error for CmagError {}
