//! Storage adapters implementing the task context ports.

pub mod memory;
pub mod postgres;
