//! Step definitions for task review cycle scenarios.

pub mod then;
pub mod world;
