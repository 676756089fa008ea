//! Sweep specifications: which actor's attribute varies, and over what.

use serde::{Deserialize, Serialize};
use spd_core::{Actor, Attribute};

/// A run specification: either a single settlement, or one actor's
/// attribute swept over an ordered value sequence.
///
/// Construction is infallible; validation happens when the sweep is
/// expanded against a concrete market, where actor references and value
/// domains can actually be checked.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Sweep {
    pub(crate) kind: SweepKind,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) enum SweepKind {
    Single,
    Parametric {
        actor: Actor,
        attribute: Attribute,
        values: Vec<f64>,
    },
}

impl Sweep {
    /// A single-instance run, labelled `Single`.
    pub fn single() -> Self {
        Sweep {
            kind: SweepKind::Single,
        }
    }

    /// Sweep `attribute` of `actor` over `values`, one instance per value.
    pub fn over(actor: Actor, attribute: Attribute, values: impl Into<Vec<f64>>) -> Self {
        Sweep {
            kind: SweepKind::Parametric {
                actor,
                attribute,
                values: values.into(),
            },
        }
    }

    /// Number of instances this sweep expands to.
    pub fn len(&self) -> usize {
        match &self.kind {
            SweepKind::Single => 1,
            SweepKind::Parametric { values, .. } => values.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Render a sweep value as a single `_`-free token safe for LP symbols:
/// integral values drop the decimal point, fractional ones use `p` for the
/// point and `m` for a leading minus.
pub(crate) fn value_token(value: f64) -> String {
    let mut text = if value == value.trunc() && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{}", value)
    };
    text = text.replace('.', "p");
    if let Some(rest) = text.strip_prefix('-') {
        text = format!("m{}", rest);
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_token_integral() {
        assert_eq!(value_token(50.0), "50");
        assert_eq!(value_token(0.0), "0");
        assert_eq!(value_token(-20.0), "m20");
    }

    #[test]
    fn test_value_token_fractional() {
        assert_eq!(value_token(0.5), "0p5");
        assert_eq!(value_token(-2.5), "m2p5");
    }

    #[test]
    fn test_sweep_len() {
        assert_eq!(Sweep::single().len(), 1);
        let sweep = Sweep::over(
            Actor::Node(spd_core::NodeId::new(0)),
            Attribute::Demand,
            vec![1.0, 2.0, 3.0],
        );
        assert_eq!(sweep.len(), 3);
    }
}
