//! Errors raised along the build → solve → assemble pipeline.
//!
//! Every variant is fatal to the current run; nothing is retried and no
//! partial results are handed back.

use spd_core::MarketError;
use thiserror::Error;

/// Dispatch pipeline errors.
#[derive(Error, Debug)]
pub enum DispatchError {
    /// Topology or attribute error surfaced from the registry.
    #[error(transparent)]
    Market(#[from] MarketError),

    /// The market cannot be formulated: a participant enrolled in the
    /// objective is missing an offer, or a sweep is malformed.
    #[error("build error: {0}")]
    Build(String),

    /// The LP has no feasible point.
    #[error("dispatch infeasible: {0}")]
    Infeasible(String),

    /// The LP is unbounded below.
    #[error("dispatch unbounded")]
    Unbounded,

    /// The solver failed for numerical reasons.
    #[error("numerical issue: {0}")]
    NumericalIssue(String),

    /// A constraint dual the assembler queried was never recorded; the
    /// canonical row name pinpoints the formulation drift.
    #[error("no dual recorded for constraint '{0}'")]
    MissingDual(String),

    /// A variable value the assembler queried was never recorded.
    #[error("no value recorded for variable '{0}'")]
    MissingPrimal(String),

    /// I/O failure while exporting the program.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization failure while exporting results.
    #[error("serialisation error: {0}")]
    Serde(#[from] serde_json::Error),
}

/// Convenience alias for Results using DispatchError.
pub type DispatchResult<T> = Result<T, DispatchError>;
