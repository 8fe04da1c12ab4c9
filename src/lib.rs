//! Labelforge: task lifecycle and assignment core for a data-annotation
//! platform.
//!
//! This crate provides the backend building blocks for annotation projects:
//! creating tasks from dataset items, moving them through a validated status
//! workflow, distributing them across annotators, and recording versioned
//! annotation payloads against each task.
//!
//! # Architecture
//!
//! Labelforge follows hexagonal architecture principles:
//!
//! - **Domain**: Pure business logic with no infrastructure dependencies
//! - **Ports**: Abstract trait interfaces for external interactions
//! - **Adapters**: Concrete implementations of ports (database, in-memory)
//!
//! # Modules
//!
//! - [`task`]: Task records, status workflow, assignment, and audit events
//! - [`annotation`]: Versioned annotation payloads and submission
//! - [`export`]: CSV rendering of task sets

pub mod annotation;
pub mod export;
pub mod task;
