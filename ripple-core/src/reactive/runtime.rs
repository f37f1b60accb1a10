//! Reactive Runtime
//!
//! The runtime owns a [`Graph`] and hands out [`Signal`] handles to its
//! nodes. It is the piece to use when a graph has to be shared: handles are
//! cheap to clone and can be sent to other threads.
//!
//! # Thread Safety
//!
//! The graph itself does no locking. The runtime puts it behind a single
//! `parking_lot::ReentrantMutex`, so every wave and every structural edit is
//! serialized. Another thread trying to emit simply waits for the running
//! wave to finish.
//!
//! The same thread re-entering the runtime through a handle while a wave is
//! running (an observer calling `Signal::emit`) gets
//! [`SignalError::Reentrant`] instead of a deadlock. Observers are given the
//! graph directly; that is the way to start a nested wave.

use std::cell::RefCell;
use std::sync::Arc;

use parking_lot::ReentrantMutex;

use super::signal::Signal;
use crate::config::GraphConfig;
use crate::error::{Result, SignalError};
use crate::graph::{Graph, NodeId};
use crate::value::Payload;

pub(crate) type SharedGraph<V> = Arc<ReentrantMutex<RefCell<Graph<V>>>>;

/// Run `f` with exclusive access to the shared graph.
pub(crate) fn with_graph<V, R>(graph: &SharedGraph<V>, f: impl FnOnce(&mut Graph<V>) -> R) -> Result<R> {
    let guard = graph.lock();
    let mut graph = guard.try_borrow_mut().map_err(|_| SignalError::Reentrant)?;
    Ok(f(&mut *graph))
}

/// Shared owner of a signal graph.
pub struct Runtime<V> {
    graph: SharedGraph<V>,
}

impl<V: Payload> Runtime<V> {
    /// Create a runtime over an empty graph with the default configuration.
    pub fn new() -> Self {
        Self::with_config(GraphConfig::default())
    }

    /// Create a runtime over an empty graph configured by `config`.
    pub fn with_config(config: GraphConfig) -> Self {
        Self {
            graph: Arc::new(ReentrantMutex::new(RefCell::new(Graph::with_config(config)))),
        }
    }

    /// Create a source signal holding `initial`.
    pub fn source(&self, initial: V) -> Result<Signal<V>> {
        let id = with_graph(&self.graph, |graph| graph.source(initial))?;
        Ok(Signal::new(id, self.graph.clone()))
    }

    /// Handle to an existing node.
    pub fn signal(&self, id: NodeId) -> Result<Signal<V>> {
        with_graph(&self.graph, |graph| {
            if graph.contains(id) {
                Ok(Signal::new(id, self.graph.clone()))
            } else {
                Err(SignalError::UnknownNode(id))
            }
        })?
    }

    /// Run `f` with exclusive access to the underlying graph.
    ///
    /// Use this to build nodes with custom operators.
    pub fn with_graph<R>(&self, f: impl FnOnce(&mut Graph<V>) -> R) -> Result<R> {
        with_graph(&self.graph, f)
    }

    /// Number of nodes in the graph.
    pub fn len(&self) -> Result<usize> {
        with_graph(&self.graph, |graph| graph.len())
    }

    /// Check if the graph has no nodes.
    pub fn is_empty(&self) -> Result<bool> {
        with_graph(&self.graph, |graph| graph.is_empty())
    }
}

impl<V: Payload> Default for Runtime<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> Clone for Runtime<V> {
    fn clone(&self) -> Self {
        Self {
            graph: Arc::clone(&self.graph),
        }
    }
}

impl<V: Payload> std::fmt::Debug for Runtime<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let guard = self.graph.lock();
        let out = match guard.try_borrow() {
            Ok(graph) => f.debug_struct("Runtime").field("graph", &*graph).finish(),
            Err(_) => f.debug_struct("Runtime").field("graph", &"<in wave>").finish(),
        };
        out
    }
}

#[cfg(test)]
mod tests {
    use parking_lot::Mutex;

    use super::*;
    use crate::operator::Take;

    #[test]
    fn runtime_creates_sources() {
        let runtime = Runtime::new();
        let a = runtime.source(1).unwrap();
        let b = runtime.source(2).unwrap();

        assert_ne!(a.id(), b.id());
        assert_eq!(runtime.len().unwrap(), 2);
        assert!(!runtime.is_empty().unwrap());
    }

    #[test]
    fn runtime_clone_shares_graph() {
        let runtime = Runtime::new();
        let other = runtime.clone();

        let source = runtime.source(7).unwrap();
        let same = other.signal(source.id()).unwrap();
        assert_eq!(same.now().unwrap(), 7);

        assert!(matches!(
            other.signal(NodeId::from(1000)),
            Err(SignalError::UnknownNode(_))
        ));
    }

    #[test]
    fn with_graph_builds_custom_nodes() {
        let runtime = Runtime::new();
        let source = runtime.source(3).unwrap();

        let derived = runtime
            .with_graph(|graph| graph.derive(&[source.id()], Take::new(1).unwrap()))
            .unwrap()
            .unwrap();

        let handle = runtime.signal(derived).unwrap();
        assert_eq!(handle.now().unwrap(), 3);
    }

    #[test]
    fn debug_renders_graph_at_rest_and_in_wave() {
        let runtime = Runtime::new();
        let source = runtime.source(1).unwrap();
        assert!(format!("{runtime:?}").starts_with("Runtime { graph: Graph"));

        let rendered = Arc::new(Mutex::new(String::new()));
        let (inner, rendered_clone) = (runtime.clone(), rendered.clone());
        source
            .register_on_change(move |_, _| {
                *rendered_clone.lock() = format!("{inner:?}");
                Ok(())
            })
            .unwrap();

        source.emit(2).unwrap();
        assert_eq!(*rendered.lock(), r#"Runtime { graph: "<in wave>" }"#);
    }

    #[test]
    fn runtime_is_shareable_across_threads() {
        let runtime = Runtime::new();
        let source = runtime.source(0u64).unwrap();

        let handles: Vec<_> = (1..=4u64)
            .map(|i| {
                let source = source.clone();
                std::thread::spawn(move || source.emit(i).map(|_| ()))
            })
            .collect();
        for handle in handles {
            handle.join().unwrap().unwrap();
        }

        assert!((1..=4).contains(&source.now().unwrap()));
    }
}
