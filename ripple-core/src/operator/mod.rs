//! Operator Strategies
//!
//! A derived node delegates its recomputation to an [`Operator`]. When the
//! wave controller decides a derived node must fire, the dispatcher hands the
//! operator the node's current value together with the current values of
//! every predecessor, in predecessor order, and applies the [`Outcome`].
//!
//! Only [`Take`] ships with the crate. Hosts add their own operators
//! (`map`, `filter`, joins, ...) by implementing the trait and wiring the
//! node with [`Graph::derive`](crate::graph::Graph::derive).

mod take;

pub use take::Take;

use std::fmt;

use crate::error::RecomputeError;

/// Result of a successful recomputation.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome<V> {
    /// The node takes a new value and reports a change downstream.
    Changed(V),
    /// The node keeps its value; successors are told nothing changed.
    Unchanged,
}

impl<V> Outcome<V> {
    /// Whether the operator produced a new value.
    pub fn is_changed(&self) -> bool {
        matches!(self, Outcome::Changed(_))
    }
}

/// Node-kind-specific recompute function.
///
/// Implementations must leave their own state untouched when they return an
/// error: the failing node keeps its pre-wave value and the next wave
/// should see the operator exactly as it was.
pub trait Operator<V>: fmt::Debug + Send {
    /// Short name used in logs and errors.
    fn tag(&self) -> &'static str;

    /// Compute the node's next value from its current one and its inputs.
    fn recompute(&mut self, current: &V, inputs: &[&V]) -> Result<Outcome<V>, RecomputeError>;

    /// Whether the node should leave the graph once the current wave ends.
    fn is_exhausted(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct Negate;

    impl Operator<i64> for Negate {
        fn tag(&self) -> &'static str {
            "negate"
        }

        fn recompute(&mut self, current: &i64, inputs: &[&i64]) -> Result<Outcome<i64>, RecomputeError> {
            let [input] = inputs else {
                return Err(RecomputeError::Arity {
                    operator: self.tag(),
                    expected: 1,
                    found: inputs.len(),
                });
            };
            let next = -**input;
            Ok(if next == *current {
                Outcome::Unchanged
            } else {
                Outcome::Changed(next)
            })
        }
    }

    #[test]
    fn custom_operator_reports_change() {
        let mut op = Negate;
        assert_eq!(op.recompute(&0, &[&4]).unwrap(), Outcome::Changed(-4));
        assert_eq!(op.recompute(&-4, &[&4]).unwrap(), Outcome::Unchanged);
        assert!(!op.is_exhausted());
    }

    #[test]
    fn custom_operator_checks_arity() {
        let mut op = Negate;
        let err = op.recompute(&0, &[&1, &2]).unwrap_err();
        assert_eq!(
            err,
            RecomputeError::Arity {
                operator: "negate",
                expected: 1,
                found: 2
            }
        );
    }
}
