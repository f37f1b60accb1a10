use std::hint::black_box;

use criterion::{criterion_group, criterion_main, Criterion};
use ripple_core::telemetry::init_tracing;
use ripple_core::{Graph, NodeId, Operator, Outcome, RecomputeError};

#[derive(Debug)]
struct Relay;

impl Operator<i64> for Relay {
    fn tag(&self) -> &'static str {
        "relay"
    }

    fn recompute(&mut self, _current: &i64, inputs: &[&i64]) -> Result<Outcome<i64>, RecomputeError> {
        Ok(Outcome::Changed(*inputs[0]))
    }
}

#[derive(Debug)]
struct Sum;

impl Operator<i64> for Sum {
    fn tag(&self) -> &'static str {
        "sum"
    }

    fn recompute(&mut self, _current: &i64, inputs: &[&i64]) -> Result<Outcome<i64>, RecomputeError> {
        Ok(Outcome::Changed(inputs.iter().map(|v| **v).sum()))
    }
}

/// A source followed by `len` relays, each reading the previous one.
fn chain(len: usize) -> (Graph<i64>, NodeId, NodeId) {
    let mut graph = Graph::new();
    let source = graph.source(0);
    let mut last = source;
    for _ in 0..len {
        last = graph.derive(&[last], Relay).unwrap();
    }
    (graph, source, last)
}

fn bench_chain(c: &mut Criterion) {
    init_tracing();
    let (mut graph, source, last) = chain(10);
    let mut i = 0i64;

    c.bench_function("chain_10_emit", |b| {
        b.iter(|| {
            i += 1;
            graph.emit(source, black_box(i)).unwrap();
        })
    });

    assert_eq!(graph.now(last).unwrap(), i);
}

fn bench_chain_with_observer(c: &mut Criterion) {
    init_tracing();
    let (mut graph, source, last) = chain(10);
    graph.register_on_change(last, |_, _| Ok(())).unwrap();
    let mut i = 0i64;

    c.bench_function("chain_10_emit_observed", |b| {
        b.iter(|| {
            i += 1;
            graph.emit(source, black_box(i)).unwrap();
        })
    });
}

fn bench_diamond_fan(c: &mut Criterion) {
    init_tracing();
    let mut graph = Graph::new();
    let source = graph.source(0i64);
    let branches: Vec<NodeId> = (0..16)
        .map(|_| graph.derive(&[source], Relay).unwrap())
        .collect();
    let _join = graph.derive(&branches, Sum).unwrap();
    let mut i = 0i64;

    c.bench_function("diamond_16_emit", |b| {
        b.iter(|| {
            i += 1;
            graph.emit(source, black_box(i)).unwrap();
        })
    });
}

criterion_group!(benches, bench_chain, bench_chain_with_observer, bench_diamond_fan);
criterion_main!(benches);
