//! Pure, deterministic pipeline logic.
//!
//! Nothing in this module performs I/O or talks to the generative backend;
//! everything here is fully testable in isolation.

pub mod extract;
pub mod fallback;
pub mod insight;
pub mod topology;
pub mod types;
