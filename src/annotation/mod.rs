//! Annotation capture for labelforge.
//!
//! Annotators save their work as append-only revisions against a task, one
//! strictly increasing version series per `(task, annotator)` pair.
//! Submitting a revision hands the parent task over for review. The module
//! follows hexagonal architecture:
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - Orchestration services in [`services`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;
