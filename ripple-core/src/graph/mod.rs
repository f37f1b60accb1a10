//! Signal Graph
//!
//! This module owns the nodes of a signal graph and the operations that
//! change its shape.
//!
//! # Overview
//!
//! The graph is a directed acyclic graph where:
//!
//! - Nodes are sources (written by `emit`) or derived nodes (computed by an
//!   operator from their predecessors)
//! - Edges point downstream: if B reads from A there is an edge from A to B,
//!   recorded both in `A.successors` and in `B.predecessors`
//!
//! Emitting into a source starts a propagation wave (see [`wave`]) that
//! recomputes every affected node exactly once, in dependency order.
//!
//! # Design Decisions
//!
//! 1. Nodes live in a single arena indexed by [`NodeId`]. Edge sets store
//!    ids, so there are no owning back-references and no reference cycles.
//!
//! 2. Construction only ever appends a fresh node downstream of existing
//!    ones. A cycle cannot be built through this API.
//!
//! 3. The graph performs no locking. Hosts that share it across threads go
//!    through [`Runtime`](crate::reactive::Runtime).

mod dispatch;
mod node;
mod wave;

pub use node::{Node, NodeId, NodeKind};
pub use wave::{WaveId, WaveReport};

use indexmap::IndexMap;
use smallvec::SmallVec;
use tracing::debug;

use crate::config::GraphConfig;
use crate::error::{ConstructionError, ObserverError, Result, SignalError};
use crate::operator::{Operator, Take};
use crate::value::Payload;

/// Change hook attached to a node.
///
/// Runs synchronously inside the wave, right after the node's value
/// changed. It receives the graph so it can read values or emit into other
/// sources; such an emission runs as a nested wave and completes before the
/// hook returns.
pub type Observer<V> = Box<dyn FnMut(&mut Graph<V>, NodeId) -> Result<(), ObserverError> + Send>;

/// A signal graph holding values of type `V`.
pub struct Graph<V> {
    /// All nodes, in creation order.
    nodes: IndexMap<NodeId, Node<V>>,

    /// Counter for generating node IDs.
    next_node: u64,

    /// Counter for generating wave IDs.
    next_wave: u64,

    /// Waves currently running, innermost last.
    active_waves: SmallVec<[WaveId; 4]>,

    /// Tunables fixed at construction.
    config: GraphConfig,
}

impl<V: Payload> Graph<V> {
    /// Create an empty graph with the default configuration.
    pub fn new() -> Self {
        Self::with_config(GraphConfig::default())
    }

    /// Create an empty graph configured by `config`.
    pub fn with_config(config: GraphConfig) -> Self {
        Self {
            nodes: IndexMap::with_capacity(config.initial_capacity),
            next_node: 0,
            next_wave: 0,
            active_waves: SmallVec::new(),
            config,
        }
    }

    /// The configuration this graph was built with.
    pub fn config(&self) -> &GraphConfig {
        &self.config
    }

    /// Create a source node holding `initial`.
    pub fn source(&mut self, initial: V) -> NodeId {
        let id = self.next_node_id();
        self.nodes.insert(id, Node::source(id, initial));
        debug!(node = %id, "created source");
        id
    }

    /// Create a derived node reading from `predecessors`.
    ///
    /// The new node starts with a snapshot of the first predecessor's
    /// current value, so it can be read before the next emission. No wave
    /// is started.
    pub fn derive(
        &mut self,
        predecessors: &[NodeId],
        operator: impl Operator<V> + 'static,
    ) -> Result<NodeId> {
        self.derive_boxed(predecessors, Box::new(operator))
    }

    /// Same as [`derive`](Self::derive), for an already boxed operator.
    pub fn derive_boxed(
        &mut self,
        predecessors: &[NodeId],
        operator: Box<dyn Operator<V>>,
    ) -> Result<NodeId> {
        let Some(&first) = predecessors.first() else {
            return Err(ConstructionError::NoPredecessors.into());
        };
        for (i, pred) in predecessors.iter().enumerate() {
            if !self.nodes.contains_key(pred) {
                return Err(SignalError::UnknownNode(*pred));
            }
            if predecessors[..i].contains(pred) {
                return Err(ConstructionError::DuplicatePredecessor(*pred).into());
            }
        }

        let snapshot = self.node(first)?.value.clone();
        let id = self.next_node_id();
        let tag = operator.tag();
        self.nodes.insert(
            id,
            Node::derived(id, snapshot, operator, SmallVec::from_slice(predecessors)),
        );
        for pred in predecessors {
            self.node_mut(*pred)?.add_successor(id);
        }

        debug!(node = %id, operator = tag, predecessors = ?predecessors, "created derived node");
        Ok(id)
    }

    /// Create a node that forwards the first `count` changes of `node`.
    pub fn take(&mut self, node: NodeId, count: usize) -> Result<NodeId> {
        let operator = Take::new(count)?;
        self.derive(&[node], operator)
    }

    /// Attach a change hook to `node`.
    pub fn register_on_change<F>(&mut self, node: NodeId, observer: F) -> Result<()>
    where
        F: FnMut(&mut Graph<V>, NodeId) -> Result<(), ObserverError> + Send + 'static,
    {
        self.node_mut(node)?.observers.push(Box::new(observer));
        Ok(())
    }

    /// Current value of `node`.
    ///
    /// Identical to [`now`](Self::now); a host that tracks reads for
    /// automatic dependency discovery hooks in here.
    pub fn value(&self, node: NodeId) -> Result<V> {
        self.now(node)
    }

    /// Current value of `node`.
    pub fn now(&self, node: NodeId) -> Result<V> {
        Ok(self.node(node)?.value.clone())
    }

    /// Borrow the current value without cloning it.
    pub fn peek(&self, node: NodeId) -> Result<&V> {
        Ok(&self.node(node)?.value)
    }

    /// Cut every edge into `node`.
    ///
    /// The node keeps its value and its own successors, but no wave will
    /// reach it again.
    pub fn detach(&mut self, node: NodeId) -> Result<()> {
        self.ensure_at_rest(node)?;
        let predecessors = std::mem::take(&mut self.node_mut(node)?.predecessors);
        for pred in &predecessors {
            if let Some(p) = self.nodes.get_mut(pred) {
                p.remove_successor(node);
            }
        }
        debug!(node = %node, predecessors = predecessors.len(), "detached node");
        Ok(())
    }

    /// Remove `node` and every edge touching it.
    ///
    /// Successors lose a predecessor; a derived node left without any
    /// predecessor stops taking part in waves.
    pub fn remove(&mut self, node: NodeId) -> Result<V> {
        self.ensure_at_rest(node)?;
        let removed = self
            .nodes
            .shift_remove(&node)
            .ok_or(SignalError::UnknownNode(node))?;

        for pred in &removed.predecessors {
            if let Some(p) = self.nodes.get_mut(pred) {
                p.remove_successor(node);
            }
        }
        for succ in &removed.successors {
            if let Some(s) = self.nodes.get_mut(succ) {
                s.remove_predecessor(node);
            }
        }

        debug!(node = %node, "removed node");
        Ok(removed.value)
    }

    /// Get a node by ID.
    pub fn get(&self, node: NodeId) -> Option<&Node<V>> {
        self.nodes.get(&node)
    }

    /// Check if a node exists.
    pub fn contains(&self, node: NodeId) -> bool {
        self.nodes.contains_key(&node)
    }

    /// Whether `node` is a source or a derived node.
    pub fn kind(&self, node: NodeId) -> Result<NodeKind> {
        Ok(self.node(node)?.kind())
    }

    /// Whether `node` can still be reached by a wave.
    pub fn is_attached(&self, node: NodeId) -> Result<bool> {
        Ok(self.node(node)?.is_attached())
    }

    /// Nodes `node` reads from.
    pub fn predecessors(&self, node: NodeId) -> Result<&[NodeId]> {
        Ok(self.node(node)?.predecessors())
    }

    /// Nodes reading from `node`.
    pub fn successors(&self, node: NodeId) -> Result<impl Iterator<Item = NodeId> + '_> {
        Ok(self.node(node)?.successors().iter().copied())
    }

    /// Iterate over all nodes in creation order.
    pub fn nodes(&self) -> impl Iterator<Item = &Node<V>> {
        self.nodes.values()
    }

    /// Get the total number of nodes in the graph.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Check if the graph has no nodes.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Number of waves currently running (nested waves included).
    pub fn wave_depth(&self) -> usize {
        self.active_waves.len()
    }

    fn next_node_id(&mut self) -> NodeId {
        let id = NodeId::from(self.next_node);
        self.next_node += 1;
        id
    }

    pub(crate) fn node(&self, node: NodeId) -> Result<&Node<V>> {
        self.nodes.get(&node).ok_or(SignalError::UnknownNode(node))
    }

    pub(crate) fn node_mut(&mut self, node: NodeId) -> Result<&mut Node<V>> {
        self.nodes.get_mut(&node).ok_or(SignalError::UnknownNode(node))
    }

    fn ensure_at_rest(&self, node: NodeId) -> Result<()> {
        match self.node(node)?.wave {
            Some(_) => Err(SignalError::NodeInFlight(node)),
            None => Ok(()),
        }
    }
}

impl<V: Payload> Default for Graph<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V: Payload> std::fmt::Debug for Graph<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Graph")
            .field("nodes", &self.nodes.len())
            .field("active_waves", &self.active_waves)
            .field("config", &self.config)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_and_remove_nodes() {
        let mut graph = Graph::new();

        let source = graph.source(1);
        let derived = graph.take(source, 3).unwrap();

        assert_eq!(graph.len(), 2);

        assert_eq!(graph.remove(source).unwrap(), 1);
        assert_eq!(graph.len(), 1);
        assert!(!graph.contains(source));
        assert!(graph.contains(derived));
        assert!(graph.predecessors(derived).unwrap().is_empty());
        assert!(!graph.is_attached(derived).unwrap());
    }

    #[test]
    fn edges_are_reciprocal() {
        let mut graph = Graph::new();

        let source = graph.source(0);
        let derived = graph.take(source, 1).unwrap();

        assert!(graph.successors(source).unwrap().any(|s| s == derived));
        assert_eq!(graph.predecessors(derived).unwrap(), &[source]);

        graph.detach(derived).unwrap();

        assert_eq!(graph.successors(source).unwrap().count(), 0);
        assert!(graph.predecessors(derived).unwrap().is_empty());
    }

    #[test]
    fn take_snapshots_current_value() {
        let mut graph = Graph::new();
        let source = graph.source(5);
        let derived = graph.take(source, 2).unwrap();
        assert_eq!(graph.now(derived).unwrap(), 5);
        assert_eq!(graph.value(derived).unwrap(), 5);
        assert_eq!(graph.kind(derived).unwrap(), NodeKind::Derived);
    }

    #[test]
    fn zero_take_creates_nothing() {
        let mut graph = Graph::new();
        let source = graph.source(5);

        let err = graph.take(source, 0).unwrap_err();
        assert!(matches!(
            err,
            SignalError::Construction(ConstructionError::NonPositiveCount(0))
        ));
        assert_eq!(graph.len(), 1);
        assert_eq!(graph.successors(source).unwrap().count(), 0);
    }

    #[test]
    fn derive_validates_predecessors() {
        let mut graph = Graph::new();
        let source = graph.source(0);

        let err = graph.derive(&[], Take::new(1).unwrap()).unwrap_err();
        assert!(matches!(
            err,
            SignalError::Construction(ConstructionError::NoPredecessors)
        ));

        let err = graph.derive(&[source, source], Take::new(1).unwrap()).unwrap_err();
        assert!(matches!(
            err,
            SignalError::Construction(ConstructionError::DuplicatePredecessor(id)) if id == source
        ));

        let missing = NodeId::from(99);
        let err = graph.take(missing, 1).unwrap_err();
        assert!(matches!(err, SignalError::UnknownNode(id) if id == missing));

        assert_eq!(graph.len(), 1);
    }

    #[test]
    fn node_ids_are_never_reused() {
        let mut graph = Graph::new();
        let a = graph.source(0);
        graph.remove(a).unwrap();
        let b = graph.source(0);
        assert_ne!(a, b);
        assert!(b > a);
    }

    #[test]
    fn config_reserves_capacity() {
        let config = GraphConfig {
            initial_capacity: 32,
            ..GraphConfig::default()
        };
        let graph: Graph<i32> = Graph::with_config(config.clone());
        assert_eq!(graph.config(), &config);
        assert!(graph.is_empty());
        assert_eq!(graph.wave_depth(), 0);
    }
}
