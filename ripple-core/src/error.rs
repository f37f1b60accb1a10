//! Error Types
//!
//! Every fallible operation in the crate returns [`SignalError`]. The more
//! specific error types describe where in the lifecycle of a node the
//! failure happened:
//!
//! - [`ConstructionError`]: invalid operator parameters, raised before any
//!   edge is wired.
//! - [`RecomputeError`]: an operator could not produce a value. Only the
//!   failing node's firing is aborted; the rest of the wave carries on.
//! - [`ObserverError`]: a change hook failed. The remainder of the wave is
//!   abandoned.

use thiserror::Error;

use crate::graph::{NodeId, WaveId};

/// Invalid parameters passed to a derived-node constructor.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConstructionError {
    /// `take` needs a strictly positive count.
    #[error("take count must be positive, got {0}")]
    NonPositiveCount(usize),

    /// A derived node must read from at least one node.
    #[error("a derived node needs at least one predecessor")]
    NoPredecessors,

    /// The same node was listed twice as a predecessor.
    #[error("node {0} listed more than once as a predecessor")]
    DuplicatePredecessor(NodeId),
}

/// An operator strategy failed to produce a value from its inputs.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecomputeError {
    /// An input did not have the payload kind the operator works on.
    #[error("operator `{operator}` expected a {expected} input, found {found}")]
    TypeMismatch {
        operator: &'static str,
        expected: &'static str,
        found: &'static str,
    },

    /// The operator was wired to the wrong number of predecessors.
    #[error("operator `{operator}` takes {expected} input(s), got {found}")]
    Arity {
        operator: &'static str,
        expected: usize,
        found: usize,
    },

    /// Any other operator-specific failure.
    #[error("operator `{operator}` failed: {reason}")]
    Failed {
        operator: &'static str,
        reason: String,
    },
}

impl RecomputeError {
    /// Shorthand for [`RecomputeError::Failed`].
    pub fn failed(operator: &'static str, reason: impl Into<String>) -> Self {
        Self::Failed {
            operator,
            reason: reason.into(),
        }
    }
}

/// A change observer failed.
#[derive(Debug, Error)]
pub enum ObserverError {
    #[error("{0}")]
    Failed(String),

    /// A wave started from inside the observer failed.
    #[error("nested wave failed: {0}")]
    Nested(#[source] Box<SignalError>),
}

impl ObserverError {
    /// Shorthand for [`ObserverError::Failed`].
    pub fn failed(message: impl Into<String>) -> Self {
        Self::Failed(message.into())
    }
}

impl From<SignalError> for ObserverError {
    fn from(err: SignalError) -> Self {
        Self::Nested(Box::new(err))
    }
}

/// Crate-level error.
#[derive(Debug, Error)]
pub enum SignalError {
    #[error("node {0} does not exist")]
    UnknownNode(NodeId),

    #[error("node {0} is not a source and cannot be emitted to")]
    NotASource(NodeId),

    #[error("node {node} holds {expected} payloads, cannot emit a {found}")]
    TypeMismatch {
        node: NodeId,
        expected: &'static str,
        found: &'static str,
    },

    #[error(transparent)]
    Construction(#[from] ConstructionError),

    /// One or more nodes failed to recompute. The wave still ran to
    /// completion; the failing nodes reported "no change" downstream.
    #[error("{} node(s) failed to recompute during wave {wave}", .errors.len())]
    Recompute {
        wave: WaveId,
        errors: Vec<(NodeId, RecomputeError)>,
    },

    #[error("observer on node {node} failed")]
    Observer {
        node: NodeId,
        #[source]
        source: ObserverError,
    },

    /// A nested wave would touch node `node`, which an outer wave still owns.
    #[error("wave from {origin} overlaps wave {owner} at node {node}")]
    OverlappingWave {
        origin: NodeId,
        node: NodeId,
        owner: WaveId,
    },

    #[error("wave nesting exceeded the configured depth of {0}")]
    WaveDepthExceeded(usize),

    /// Structural edits are refused while a wave owns the node.
    #[error("node {0} is part of an in-flight wave")]
    NodeInFlight(NodeId),

    /// The graph was re-entered through a handle while a wave holds it.
    #[error("graph is already borrowed by a running wave; use the graph passed to the observer")]
    Reentrant,
}

pub type Result<T, E = SignalError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn construction_error_converts() {
        let err: SignalError = ConstructionError::NonPositiveCount(0).into();
        assert!(matches!(
            err,
            SignalError::Construction(ConstructionError::NonPositiveCount(0))
        ));
        assert_eq!(err.to_string(), "take count must be positive, got 0");
    }

    #[test]
    fn observer_error_keeps_nested_source() {
        let nested = SignalError::NotASource(NodeId::from(3));
        let err = ObserverError::from(nested);
        let source = err.source().map(|s| s.to_string());
        assert_eq!(
            source.as_deref(),
            Some("node #3 is not a source and cannot be emitted to")
        );
    }
}
