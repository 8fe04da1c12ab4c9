//! Task lifecycle management for labelforge.
//!
//! Tasks are generated in batches from dataset contents, move through a
//! validated status workflow, get distributed across annotators by pluggable
//! strategies, and leave an append-only audit trail that survives deletion.
//! The module follows hexagonal architecture:
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - Orchestration services in [`services`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;
