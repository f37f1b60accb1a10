//! Firing a node: operator dispatch and change observers.

use smallvec::SmallVec;
use tracing::trace;

use super::wave::WaveRun;
use super::{Graph, NodeId};
use crate::error::{RecomputeError, Result, SignalError};
use crate::operator::Outcome;
use crate::value::Payload;

impl<V: Payload> Graph<V> {
    /// Run the operator of `id` and write its result.
    ///
    /// Returns whether the node's value changed. On error the node's value
    /// is left as it was.
    pub(super) fn dispatch(
        &mut self,
        run: &mut WaveRun,
        id: NodeId,
        trigger: NodeId,
    ) -> Result<bool, RecomputeError> {
        let Some(node) = self.nodes.get_mut(&id) else {
            return Ok(false);
        };
        // Sources are written by `emit`, never recomputed.
        let Some(mut operator) = node.operator.take() else {
            return Ok(false);
        };

        run.report.fired.push(id);
        trace!(node = %id, operator = operator.tag(), trigger = %trigger, wave = %run.id(), "firing");

        let outcome = match self.nodes.get(&id) {
            Some(node) => {
                let inputs: SmallVec<[&V; 4]> = node
                    .predecessors
                    .iter()
                    .filter_map(|p| self.nodes.get(p).map(|p| &p.value))
                    .collect();
                operator.recompute(&node.value, &inputs)
            }
            None => return Ok(false),
        };

        let exhausted = operator.is_exhausted();
        let Some(node) = self.nodes.get_mut(&id) else {
            return Ok(false);
        };
        node.operator = Some(operator);
        if exhausted {
            run.exhausted.push(id);
        }

        match outcome? {
            Outcome::Changed(value) => {
                node.value = value;
                Ok(true)
            }
            Outcome::Unchanged => Ok(false),
        }
    }

    /// Run every observer registered on `id`.
    ///
    /// The first failure stops the remaining observers of this node.
    pub(super) fn run_observers(&mut self, id: NodeId) -> Result<()> {
        let mut observers = match self.nodes.get_mut(&id) {
            Some(node) if !node.observers.is_empty() => std::mem::take(&mut node.observers),
            _ => return Ok(()),
        };

        let mut result = Ok(());
        for observer in observers.iter_mut() {
            if let Err(source) = observer(self, id) {
                result = Err(SignalError::Observer { node: id, source });
                break;
            }
        }

        // Observers registered while these ran go after the existing ones.
        if let Some(node) = self.nodes.get_mut(&id) {
            observers.append(&mut node.observers);
            node.observers = observers;
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use crate::error::ObserverError;
    use crate::graph::Graph;

    #[test]
    fn observer_runs_once_per_change() {
        let mut graph = Graph::new();
        let source = graph.source(0);
        let taken = graph.take(source, 1).unwrap();

        let calls = Arc::new(AtomicUsize::new(0));
        let seen = Arc::new(AtomicUsize::new(0));
        let (calls_clone, seen_clone) = (calls.clone(), seen.clone());
        graph
            .register_on_change(taken, move |graph, id| {
                calls_clone.fetch_add(1, Ordering::SeqCst);
                seen_clone.store(graph.now(id)? as usize, Ordering::SeqCst);
                Ok(())
            })
            .unwrap();

        graph.emit(source, 10).unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(seen.load(Ordering::SeqCst), 10);

        graph.emit(source, 20).unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(graph.now(taken).unwrap(), 10);
    }

    #[test]
    fn source_observers_run_on_emit() {
        let mut graph = Graph::new();
        let source = graph.source(0u32);

        let calls = Arc::new(AtomicUsize::new(0));
        let calls_clone = calls.clone();
        graph
            .register_on_change(source, move |_, _| {
                calls_clone.fetch_add(1, Ordering::SeqCst);
                Ok(())
            })
            .unwrap();

        graph.emit(source, 1).unwrap();
        graph.emit(source, 2).unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn first_failing_observer_stops_the_rest() {
        let mut graph = Graph::new();
        let source = graph.source(0u32);

        let later = Arc::new(AtomicUsize::new(0));
        let later_clone = later.clone();
        graph
            .register_on_change(source, |_, _| Err(ObserverError::failed("nope")))
            .unwrap();
        graph
            .register_on_change(source, move |_, _| {
                later_clone.fetch_add(1, Ordering::SeqCst);
                Ok(())
            })
            .unwrap();

        assert!(graph.emit(source, 1).is_err());
        assert_eq!(later.load(Ordering::SeqCst), 0);
        assert_eq!(graph.get(source).unwrap().observer_count(), 2);
    }

    #[test]
    fn observer_registered_during_wave_is_kept() {
        let mut graph = Graph::new();
        let source = graph.source(0u32);

        graph
            .register_on_change(source, |graph, id| {
                if graph.get(id).map_or(0, |n| n.observer_count()) == 0 {
                    graph.register_on_change(id, |_, _| Ok(()))?;
                }
                Ok(())
            })
            .unwrap();

        graph.emit(source, 1).unwrap();
        assert_eq!(graph.get(source).unwrap().observer_count(), 2);
    }
}
