//! Statistical Anomaly Subsystem
//!
//! Per-subject behavior profiles over a rolling observation window, with
//! entropy, z-score, Bayesian, correlation and CPU-consistency checks.

pub mod engine;
pub mod stats;

pub use engine::{AnomalyEngine, Observation, SubjectId};
