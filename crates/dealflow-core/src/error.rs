//! Core error types.
//!
//! The core data model is deliberately hard to misuse — the only fallible
//! operation it exposes is a proposal revision with an out-of-range
//! discount. Everything else is infallible by construction.

/// Unified error type for the dealflow core data model.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// A proposal revision requested a discount outside the valid range.
    #[error("invalid discount {value}%: must be at least 0 and below 100")]
    InvalidDiscount {
        /// The discount percentage that was rejected.
        value: f64,
    },
}

/// Convenience alias used throughout the core crate.
pub type Result<T> = std::result::Result<T, CoreError>;
