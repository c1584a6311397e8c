//! Core error type
//!
//! Validation outcomes for quotes are data (`ValidationReport`), not errors.
//! This enum covers malformed tables and unparseable raw input.

use thiserror::Error;

/// Errors produced by the core engines
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// Tier table violates an ordering/coverage invariant
    #[error("invalid tier table: {0}")]
    InvalidTierTable(String),

    /// Raw volume text could not be turned into a participant count
    #[error("invalid volume '{input}': {reason}")]
    InvalidVolume { input: String, reason: VolumeProblem },

    /// Opt-in rate outside 0.0..=1.0
    #[error("opt-in rate must be within 0..=1, got {0}")]
    InvalidOptInRate(f64),

    /// Coverage type not offered
    #[error("unknown coverage type '{0}'")]
    UnknownCoverageType(String),

    /// Reporting period not in YYYY-MM form
    #[error("invalid reporting period '{0}', expected YYYY-MM")]
    InvalidPeriod(String),

    /// Schedule or lookup table malformed
    #[error("invalid {table} table: {message}")]
    InvalidTable { table: &'static str, message: String },
}

/// Why a raw volume string was rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VolumeProblem {
    Empty,
    NotANumber,
    NotFinite,
    Negative,
    NotWhole,
}

impl std::fmt::Display for VolumeProblem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let text = match self {
            Self::Empty => "empty input",
            Self::NotANumber => "not a number",
            Self::NotFinite => "not a finite number",
            Self::Negative => "negative",
            Self::NotWhole => "not a whole number",
        };
        f.write_str(text)
    }
}

/// Result alias for core operations
pub type Result<T> = std::result::Result<T, Error>;
