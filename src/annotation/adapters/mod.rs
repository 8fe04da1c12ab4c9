//! Storage adapters implementing the annotation context ports.

pub mod memory;
pub mod postgres;
