//! Tooling primitives for deterministic agent simulation.
//!
//! This crate is intentionally lightweight and engine-agnostic: simulation
//! layers record [`TraceEvent`]s into whichever [`TraceSink`] the host wires
//! in, and tooling renders them later.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![forbid(unsafe_code)]

pub mod trace;

pub use trace::{NullTraceSink, TraceEvent, TraceLog, TraceSink};
