//! Error types for market topology construction and mutation.
//!
//! [`MarketError`] covers everything that can go wrong while a market is
//! being populated or an attribute is being changed: duplicate or unknown
//! participants, malformed branches, and attribute values outside their
//! domain. Formulation and solver failures live in the solve crate.

use thiserror::Error;

/// Error raised by the topology registry.
#[derive(Error, Debug)]
pub enum MarketError {
    /// Structural problems: duplicate names, unknown references, branches
    /// with identical endpoints, risk branches inside a single zone.
    #[error("topology error: {0}")]
    Topology(String),

    /// An attribute mutation that is not in the recognised set for the
    /// target actor, or a value outside the attribute's domain.
    #[error("attribute error: {0}")]
    Attribute(String),
}

/// Convenience alias for Results using MarketError.
pub type MarketResult<T> = Result<T, MarketError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = MarketError::Topology("duplicate node 'N1'".into());
        assert!(err.to_string().contains("topology error"));
        assert!(err.to_string().contains("duplicate node 'N1'"));
    }

    #[test]
    fn test_question_mark_operator() {
        fn inner() -> MarketResult<()> {
            Err(MarketError::Attribute("test".into()))
        }

        fn outer() -> MarketResult<()> {
            inner()?;
            Ok(())
        }

        assert!(outer().is_err());
    }
}
