//! Reactive Handles
//!
//! This module wraps a [`Graph`](crate::graph::Graph) for hosts that want
//! value-like handles instead of ids.
//!
//! # Concepts
//!
//! ## Runtime
//!
//! A [`Runtime`] owns one graph and serializes access to it. Everything
//! created from the same runtime lives in the same graph and can be wired
//! together.
//!
//! ## Signals
//!
//! A [`Signal`] is a handle to one node. Source signals accept `emit`;
//! every signal can be read, observed, and used as the predecessor of a
//! derived signal such as `take`.

mod runtime;
mod signal;

pub use runtime::Runtime;
pub use signal::Signal;
