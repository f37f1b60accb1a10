//! Signal Handles
//!
//! A [`Signal`] is a handle to one node of a runtime-owned graph. It is the
//! host-facing surface of the engine: create sources, emit into them, read
//! current values, derive `take` nodes and register change observers.
//!
//! Handles are cheap to clone; clones refer to the same node.
//!
//! ```rust
//! use ripple_core::Runtime;
//!
//! let runtime = Runtime::new();
//! let count = runtime.source(0).unwrap();
//! let first = count.take(1).unwrap();
//!
//! count.emit(10).unwrap();
//! count.emit(20).unwrap();
//!
//! assert_eq!(count.now().unwrap(), 20);
//! assert_eq!(first.now().unwrap(), 10);
//! ```

use std::fmt::Debug;

use super::runtime::{with_graph, SharedGraph};
use crate::error::{ObserverError, Result};
use crate::graph::{Graph, NodeId, NodeKind, WaveReport};
use crate::value::Payload;

/// Handle to a node of a shared signal graph.
pub struct Signal<V> {
    id: NodeId,
    graph: SharedGraph<V>,
}

impl<V: Payload> Signal<V> {
    pub(crate) fn new(id: NodeId, graph: SharedGraph<V>) -> Self {
        Self { id, graph }
    }

    /// Get the node's ID.
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// What kind of node this handle points at.
    pub fn kind(&self) -> Result<NodeKind> {
        with_graph(&self.graph, |graph| graph.kind(self.id))?
    }

    /// Write a new value and propagate it through the graph.
    ///
    /// Blocks while another thread runs a wave on the same runtime.
    pub fn emit(&self, value: V) -> Result<WaveReport> {
        with_graph(&self.graph, |graph| graph.emit(self.id, value))?
    }

    /// Current value.
    pub fn value(&self) -> Result<V> {
        with_graph(&self.graph, |graph| graph.value(self.id))?
    }

    /// Current value.
    pub fn now(&self) -> Result<V> {
        with_graph(&self.graph, |graph| graph.now(self.id))?
    }

    /// Derive a signal forwarding the next `count` changes of this one.
    pub fn take(&self, count: usize) -> Result<Signal<V>> {
        let id = with_graph(&self.graph, |graph| graph.take(self.id, count))??;
        Ok(Signal::new(id, self.graph.clone()))
    }

    /// Attach a change observer.
    ///
    /// The observer runs inside the wave with the graph borrowed; emit
    /// through the `&mut Graph` it receives, not through a `Signal`.
    pub fn register_on_change<F>(&self, observer: F) -> Result<()>
    where
        F: FnMut(&mut Graph<V>, NodeId) -> Result<(), ObserverError> + Send + 'static,
    {
        with_graph(&self.graph, |graph| graph.register_on_change(self.id, observer))?
    }

    /// Whether waves can still reach this node.
    pub fn is_attached(&self) -> Result<bool> {
        with_graph(&self.graph, |graph| graph.is_attached(self.id))?
    }

    /// Remove the node from the graph, returning its last value.
    ///
    /// Other handles to the same node report `UnknownNode` afterwards.
    pub fn dispose(self) -> Result<V> {
        with_graph(&self.graph, |graph| graph.remove(self.id))?
    }
}

impl<V> Clone for Signal<V> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            graph: self.graph.clone(),
        }
    }
}

impl<V: Payload> Debug for Signal<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Signal")
            .field("id", &self.id)
            .field("value", &self.now().ok())
            .finish()
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
