//! Goal-regression search over declarative action specs.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![forbid(unsafe_code)]

pub mod planner;

pub use planner::{Planner, PlannerConfig};
