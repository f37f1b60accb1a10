//! Ripple Core
//!
//! This crate provides a push-based, glitch-free propagation engine for
//! graphs of reactive signals. It implements:
//!
//! - A node arena with reciprocal predecessor/successor edges
//! - Propagation waves that fire every affected node exactly once, in
//!   dependency order, even through diamonds
//! - Pluggable operator strategies for derived nodes, with `take(n)` built in
//! - Change observers that run inside the wave and may start nested waves
//!
//! # Architecture
//!
//! The crate is organized into several modules:
//!
//! - `graph`: node arena, graph construction, wave controller, dispatch
//! - `operator`: the operator strategy trait and the `take` operator
//! - `reactive`: shared runtime and clonable signal handles
//! - `value`: payload typing and the dynamically typed `Value`
//! - `config`, `error`, `telemetry`: configuration, error types, logging
//!
//! # Example
//!
//! ```rust
//! use ripple_core::Graph;
//!
//! let mut graph = Graph::new();
//! let source = graph.source(0);
//! let first_two = graph.take(source, 2).unwrap();
//!
//! graph.register_on_change(first_two, |graph, id| {
//!     println!("take(2) is now {}", graph.now(id)?);
//!     Ok(())
//! }).unwrap();
//!
//! graph.emit(source, 1).unwrap();
//! graph.emit(source, 2).unwrap();
//! graph.emit(source, 3).unwrap();
//!
//! assert_eq!(graph.now(first_two).unwrap(), 2);
//! assert!(!graph.is_attached(first_two).unwrap());
//! ```

pub mod config;
pub mod error;
pub mod graph;
pub mod operator;
pub mod reactive;
pub mod telemetry;
pub mod value;

pub use config::GraphConfig;
pub use error::{ConstructionError, ObserverError, RecomputeError, SignalError};
pub use graph::{Graph, Node, NodeId, NodeKind, Observer, WaveId, WaveReport};
pub use operator::{Operator, Outcome, Take};
pub use reactive::{Runtime, Signal};
pub use value::{Payload, Value};
