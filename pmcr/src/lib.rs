//! Fixed-topology agent pipeline with schema-enforced stage contracts.
//!
//! A goal enters a linear Plan-Make-Check-Reflect chain: an orchestrator
//! routes it, a planner breaks it down, a maker executes, a checker validates
//! and a reflector distills lessons, followed by knowledge persistence and an
//! audit close. Every agent stage speaks to its generative backend through
//! the contract executor in [`contract`], which guarantees a schema-valid
//! typed output or an annotated fallback; raw backend text never crosses a
//! stage boundary. The architecture enforces a strict separation:
//!
//! - **[`core`]**: Pure, deterministic logic (typed contracts, payload
//!   extraction, fallbacks, insight heuristics, topology validation).
//!   No I/O, fully testable in isolation.
//! - **[`io`]**: Side-effecting operations (backend processes, append-only
//!   sinks, configuration). Isolated to enable mocking in tests.
//!
//! [`contract`], [`agents`] and [`run`] coordinate core logic with I/O to
//! drive a run from goal to report.

pub mod agents;
pub mod contract;
pub mod core;
pub mod io;
pub mod logging;
pub mod run;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
