//! `PostgreSQL` persistence adapters for the annotation context.

mod models;
mod repository;
mod schema;

pub use repository::{AnnotationPgPool, PostgresAnnotationRepository};
