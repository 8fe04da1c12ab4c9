//! In-memory adapters for the annotation context.

mod repository;

pub use repository::InMemoryAnnotationRepository;
