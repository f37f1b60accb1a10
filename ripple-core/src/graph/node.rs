//! Graph Nodes
//!
//! This module defines the vertex type of the signal graph.

use std::fmt;

use indexmap::IndexSet;
use smallvec::SmallVec;

use super::wave::WaveId;
use super::Observer;
use crate::operator::Operator;

/// Identifier of a node inside one graph.
///
/// Ids are handed out in creation order and never reused, so they double as
/// a deterministic tie-break key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(u64);

impl NodeId {
    /// Get the raw ID value.
    pub fn raw(&self) -> u64 {
        self.0
    }
}

impl From<u64> for NodeId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// The kind of node in the graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    /// Written directly by `emit`. Has successors but no predecessors.
    Source,

    /// Computed from its predecessors by an operator.
    Derived,
}

/// A vertex of the signal graph.
pub struct Node<V> {
    /// Unique identifier for this node.
    id: NodeId,

    /// What kind of node this is.
    kind: NodeKind,

    /// Current snapshot, replaced by `emit` or by the operator.
    pub(crate) value: V,

    /// `None` for sources. Taken out of the node while it runs.
    pub(crate) operator: Option<Box<dyn Operator<V>>>,

    /// Nodes this node reads from, in the order the operator sees them.
    pub(crate) predecessors: SmallVec<[NodeId; 2]>,

    /// Nodes that read from this node.
    pub(crate) successors: IndexSet<NodeId>,

    /// Change hooks, run in registration order.
    pub(crate) observers: Vec<Observer<V>>,

    // Wave-local state. All of it is back to its resting value between waves.
    pub(crate) wave: Option<WaveId>,
    pub(crate) changed: bool,
    pub(crate) arrival_count: usize,
    pub(crate) expected_arrivals: usize,
}

impl<V> Node<V> {
    pub(crate) fn source(id: NodeId, value: V) -> Self {
        Self::new(id, NodeKind::Source, value, None, SmallVec::new())
    }

    pub(crate) fn derived(
        id: NodeId,
        value: V,
        operator: Box<dyn Operator<V>>,
        predecessors: SmallVec<[NodeId; 2]>,
    ) -> Self {
        Self::new(id, NodeKind::Derived, value, Some(operator), predecessors)
    }

    fn new(
        id: NodeId,
        kind: NodeKind,
        value: V,
        operator: Option<Box<dyn Operator<V>>>,
        predecessors: SmallVec<[NodeId; 2]>,
    ) -> Self {
        Self {
            id,
            kind,
            value,
            operator,
            predecessors,
            successors: IndexSet::new(),
            observers: Vec::new(),
            wave: None,
            changed: false,
            arrival_count: 0,
            expected_arrivals: 0,
        }
    }

    /// Get the node's ID.
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// What kind of node this is.
    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    /// The node's current value.
    pub fn value(&self) -> &V {
        &self.value
    }

    /// Nodes this node reads from, in operator input order.
    pub fn predecessors(&self) -> &[NodeId] {
        &self.predecessors
    }

    /// Nodes reading from this node, in the order they were wired.
    pub fn successors(&self) -> &IndexSet<NodeId> {
        &self.successors
    }

    /// Tag of the operator driving this node, if it is derived.
    pub fn operator_tag(&self) -> Option<&'static str> {
        self.operator.as_ref().map(|op| op.tag())
    }

    /// The wave currently owning this node.
    pub fn wave(&self) -> Option<WaveId> {
        self.wave
    }

    /// Whether the node changed in the wave currently owning it.
    pub fn is_changed(&self) -> bool {
        self.changed
    }

    /// Predecessors that have reported in the current wave.
    pub fn arrival_count(&self) -> usize {
        self.arrival_count
    }

    /// Predecessors the current wave waits for before firing this node.
    pub fn expected_arrivals(&self) -> usize {
        self.expected_arrivals
    }

    /// Whether the node is wired into the graph at all.
    ///
    /// Sources always count as attached; a derived node is attached while it
    /// still has a predecessor.
    pub fn is_attached(&self) -> bool {
        self.kind == NodeKind::Source || !self.predecessors.is_empty()
    }

    /// Number of change observers registered on this node.
    pub fn observer_count(&self) -> usize {
        self.observers.len()
    }

    pub(crate) fn add_successor(&mut self, node_id: NodeId) {
        self.successors.insert(node_id);
    }

    pub(crate) fn remove_successor(&mut self, node_id: NodeId) {
        self.successors.shift_remove(&node_id);
    }

    pub(crate) fn remove_predecessor(&mut self, node_id: NodeId) {
        self.predecessors.retain(|p| *p != node_id);
    }

    /// Reset wave-local state once a wave releases the node.
    pub(crate) fn release(&mut self) {
        self.wave = None;
        self.changed = false;
        self.arrival_count = 0;
        self.expected_arrivals = 0;
    }
}

impl<V: fmt::Debug> fmt::Debug for Node<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Node")
            .field("id", &self.id)
            .field("kind", &self.kind)
            .field("value", &self.value)
            .field("operator", &self.operator_tag())
            .field("predecessors", &self.predecessors)
            .field("successors", &self.successors)
            .field("observers", &self.observers.len())
            .field("wave", &self.wave)
            .finish()
    }
}
