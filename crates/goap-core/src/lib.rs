//! Deterministic, engine-agnostic goal-oriented planning primitives.
//!
//! This crate holds only data: facts about a shared world, the stores that
//! scope them, declarative action templates, prioritized goals, and ordered
//! plans. Search lives in `goap-planner`; execution belongs to the host
//! simulation.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![forbid(unsafe_code)]

pub mod action;
pub mod fact;
pub mod goal;
pub mod plan;
pub mod state;

pub use action::ActionSpec;
pub use fact::{Fact, FactKey, FactValue};
pub use goal::Goal;
pub use plan::Plan;
pub use state::{FactSet, FactStore};
