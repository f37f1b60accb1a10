//! Propagation Waves
//!
//! A wave is one complete propagation pass triggered by a single `emit`.
//! It guarantees that every node downstream of the emitting source fires at
//! most once, and only after all of its predecessors inside the wave have
//! reported. A join node below a diamond therefore never sees one updated
//! and one stale input.
//!
//! # Algorithm
//!
//! 1. Collect the wave's scope: every node reachable from the origin through
//!    successor edges. Tag each with the wave id and count, for each, how
//!    many of its predecessors are inside the scope (`expected_arrivals`).
//!    Predecessors outside the scope cannot fire in this wave, so they are
//!    not waited for.
//!
//! 2. Mark the origin changed and notify its successors.
//!
//! 3. A notified node ORs the predecessor's changed flag into its own and
//!    bumps its arrival counter. Until the counter reaches the expected
//!    number of arrivals, the node waits. When it does, the node recomputes
//!    (only if something upstream changed), runs its observers if its value
//!    changed, and notifies its own successors in turn.
//!
//! 4. Pending notifications live on an explicit stack rather than the call
//!    stack, so chain depth is bounded by memory only. A fired node is
//!    reset once everything downstream of it has been handled. When the
//!    stack is empty, every scope node is released and nodes whose
//!    operator is exhausted are detached.
//!
//! Waves may nest: an observer can emit into another source. The nested
//! wave must not share any node with a wave still in flight.

use std::collections::{HashSet, VecDeque};
use std::fmt;

use tracing::{debug, debug_span, trace, warn};

use super::{Graph, NodeId, NodeKind};
use crate::error::{RecomputeError, Result, SignalError};
use crate::value::Payload;

/// Identifier of one propagation wave.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct WaveId(u64);

impl WaveId {
    /// Get the raw ID value.
    pub fn raw(&self) -> u64 {
        self.0
    }
}

impl From<u64> for WaveId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl fmt::Display for WaveId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "w{}", self.0)
    }
}

/// What a completed wave did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WaveReport {
    /// The wave this report describes.
    pub wave: WaveId,

    /// Source the wave was started from.
    pub origin: NodeId,

    /// Derived nodes whose operator ran, in firing order.
    pub fired: Vec<NodeId>,

    /// Nodes whose value changed, origin first, in firing order.
    pub changed: Vec<NodeId>,

    /// Nodes detached once the wave completed.
    pub detached: Vec<NodeId>,
}

impl WaveReport {
    fn new(wave: WaveId, origin: NodeId) -> Self {
        Self {
            wave,
            origin,
            fired: Vec::new(),
            changed: Vec::new(),
            detached: Vec::new(),
        }
    }

    /// Whether `node`'s operator ran during the wave.
    pub fn has_fired(&self, node: NodeId) -> bool {
        self.fired.contains(&node)
    }

    /// Whether `node`'s value changed during the wave.
    pub fn has_changed(&self, node: NodeId) -> bool {
        self.changed.contains(&node)
    }
}

/// Bookkeeping for the wave being propagated.
pub(super) struct WaveRun {
    pub(super) report: WaveReport,
    pub(super) errors: Vec<(NodeId, RecomputeError)>,
    pub(super) exhausted: Vec<NodeId>,
}

impl WaveRun {
    pub(super) fn id(&self) -> WaveId {
        self.report.wave
    }
}

impl<V: Payload> Graph<V> {
    /// Write `value` into `source` and propagate the change.
    ///
    /// The source's own observers run first, then the wave. When an
    /// observer fails the wave stops there; nodes that already fired keep
    /// their new values. Recompute failures do not stop the wave, but are
    /// reported once it has completed.
    pub fn emit(&mut self, source: NodeId, value: V) -> Result<WaveReport> {
        let node = self.node(source)?;
        if node.kind() != NodeKind::Source {
            return Err(SignalError::NotASource(source));
        }
        if self.config.strict_payload_kinds && node.value.kind() != value.kind() {
            return Err(SignalError::TypeMismatch {
                node: source,
                expected: node.value.kind(),
                found: value.kind(),
            });
        }
        let max_depth = self.config.max_wave_depth.get();
        if self.active_waves.len() >= max_depth {
            return Err(SignalError::WaveDepthExceeded(max_depth));
        }
        let scope = self.collect_scope(source)?;

        self.node_mut(source)?.value = value;
        self.run_wave(source, scope)
    }

    fn run_wave(&mut self, origin: NodeId, scope: Vec<NodeId>) -> Result<WaveReport> {
        let wave = WaveId::from(self.next_wave);
        self.next_wave += 1;

        let span = debug_span!("wave", %wave, %origin, depth = self.active_waves.len());
        let _enter = span.enter();

        self.claim(&scope, wave);
        self.active_waves.push(wave);

        let mut run = WaveRun {
            report: WaveReport::new(wave, origin),
            errors: Vec::new(),
            exhausted: Vec::new(),
        };
        let outcome = self.propagate(&mut run, origin);

        for id in &scope {
            if let Some(node) = self.nodes.get_mut(id) {
                node.release();
            }
        }
        self.active_waves.pop();

        for id in std::mem::take(&mut run.exhausted) {
            self.detach(id)?;
            run.report.detached.push(id);
        }

        outcome?;

        debug!(
            scope = scope.len(),
            fired = run.report.fired.len(),
            changed = run.report.changed.len(),
            detached = run.report.detached.len(),
            "wave complete"
        );

        if run.errors.is_empty() {
            Ok(run.report)
        } else {
            Err(SignalError::Recompute {
                wave,
                errors: run.errors,
            })
        }
    }

    /// Every node reachable from `origin`, origin first, breadth-first.
    fn collect_scope(&self, origin: NodeId) -> Result<Vec<NodeId>> {
        let mut scope = vec![origin];
        let mut queue = VecDeque::from([origin]);
        let mut seen = HashSet::from([origin]);

        while let Some(id) = queue.pop_front() {
            let node = self.node(id)?;
            if let Some(owner) = node.wave {
                return Err(SignalError::OverlappingWave {
                    origin,
                    node: id,
                    owner,
                });
            }
            for &succ in node.successors() {
                if seen.insert(succ) {
                    scope.push(succ);
                    queue.push_back(succ);
                }
            }
        }

        Ok(scope)
    }

    /// Tag the scope with `wave` and compute each node's gate.
    fn claim(&mut self, scope: &[NodeId], wave: WaveId) {
        for id in scope {
            if let Some(node) = self.nodes.get_mut(id) {
                node.wave = Some(wave);
            }
        }
        for id in scope {
            let expected = match self.nodes.get(id) {
                Some(node) => node
                    .predecessors
                    .iter()
                    .filter(|p| self.nodes.get(*p).is_some_and(|p| p.wave == Some(wave)))
                    .count(),
                None => continue,
            };
            if let Some(node) = self.nodes.get_mut(id) {
                node.expected_arrivals = expected;
            }
        }
    }

    fn propagate(&mut self, run: &mut WaveRun, origin: NodeId) -> Result<()> {
        let node = self.node_mut(origin)?;
        node.changed = true;
        run.report.changed.push(origin);

        self.run_observers(origin)?;

        let mut stack = Vec::new();
        self.push_successors(&mut stack, origin, true)?;

        while let Some(step) = stack.pop() {
            match step {
                Step::Notify { id, changed, from } => self.notify(run, &mut stack, id, changed, from)?,
                Step::Reset(id) => {
                    let node = self.node_mut(id)?;
                    node.arrival_count = 0;
                    node.changed = false;
                }
            }
        }
        Ok(())
    }

    /// Deliver one arrival to `id`. Once its gate opens, fire it and queue
    /// its successors ahead of its reset.
    fn notify(
        &mut self,
        run: &mut WaveRun,
        stack: &mut Vec<Step>,
        id: NodeId,
        predecessor_changed: bool,
        predecessor: NodeId,
    ) -> Result<()> {
        let node = match self.nodes.get_mut(&id) {
            Some(node) if node.wave == Some(run.id()) => node,
            // Created or rewired after the wave started.
            _ => return Ok(()),
        };

        node.changed |= predecessor_changed;
        node.arrival_count += 1;

        if node.arrival_count < node.expected_arrivals {
            trace!(
                node = %id,
                from = %predecessor,
                arrived = node.arrival_count,
                expected = node.expected_arrivals,
                "waiting for remaining predecessors"
            );
            return Ok(());
        }

        let mut changed = node.changed;
        if changed {
            changed = match self.dispatch(run, id, predecessor) {
                Ok(changed) => changed,
                Err(err) => {
                    warn!(node = %id, error = %err, "recompute failed");
                    run.errors.push((id, err));
                    false
                }
            };
            self.node_mut(id)?.changed = changed;
            if changed {
                run.report.changed.push(id);
                self.run_observers(id)?;
            }
        } else {
            trace!(node = %id, "no predecessor changed, skipping recompute");
        }

        stack.push(Step::Reset(id));
        self.push_successors(stack, id, changed)
    }

    /// Queue a notification for each successor of `id`. They are pushed in
    /// reverse so the first successor is handled first.
    fn push_successors(&self, stack: &mut Vec<Step>, id: NodeId, changed: bool) -> Result<()> {
        let successors = self.node(id)?.successors();
        stack.extend(
            successors
                .iter()
                .rev()
                .map(|&succ| Step::Notify { id: succ, changed, from: id }),
        );
        Ok(())
    }
}

/// Pending work of a wave, handled last-in first-out.
///
/// A fired node pushes its reset below its successors' notifications, so
/// it is reset only once everything downstream of it has been handled.
#[derive(Debug, Clone, Copy)]
enum Step {
    /// `from` reported to `id`, with or without a change.
    Notify { id: NodeId, changed: bool, from: NodeId },
    Reset(NodeId),
}
