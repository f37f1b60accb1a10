//! The `take(n)` operator.
//!
//! Forwards the first `n` changes of its predecessor and then leaves the
//! graph for good. The value it forwarded last stays readable.

use crate::error::{ConstructionError, RecomputeError};

use super::{Operator, Outcome};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Take {
    remaining: usize,
}

impl Take {
    pub const TAG: &'static str = "take";

    /// Forward the next `count` changes. `count` must be positive.
    pub fn new(count: usize) -> Result<Self, ConstructionError> {
        if count == 0 {
            return Err(ConstructionError::NonPositiveCount(count));
        }
        Ok(Self { remaining: count })
    }

    /// Firings left before the node detaches.
    pub fn remaining(&self) -> usize {
        self.remaining
    }
}

impl<V: Clone> Operator<V> for Take {
    fn tag(&self) -> &'static str {
        Self::TAG
    }

    fn recompute(&mut self, _current: &V, inputs: &[&V]) -> Result<Outcome<V>, RecomputeError> {
        let [input] = inputs else {
            return Err(RecomputeError::Arity {
                operator: Self::TAG,
                expected: 1,
                found: inputs.len(),
            });
        };

        if self.remaining == 0 {
            return Ok(Outcome::Unchanged);
        }
        self.remaining -= 1;
        Ok(Outcome::Changed((*input).clone()))
    }

    fn is_exhausted(&self) -> bool {
        self.remaining == 0
    }
}
