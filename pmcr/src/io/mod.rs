//! Side-effecting operations: the generative backend boundary, child
//! processes, sink files and configuration. Isolated from [`crate::core`] so
//! tests can substitute scripted backends and in-memory sinks.

pub mod audit;
pub mod config;
pub mod generator;
pub mod knowledge;
pub mod process;
