//! ollabench-core: Task registry, scoring, and run orchestration.
//!
//! This crate defines the benchmark data model, the fixed logic/math/coding
//! tasks, the pure scoring rules, and the sequential orchestrator that drives
//! an [`traits::InferenceClient`] over every model × task pair.

pub mod engine;
pub mod enumerator;
pub mod error;
pub mod model;
pub mod report;
pub mod scoring;
pub mod tasks;
pub mod traits;
