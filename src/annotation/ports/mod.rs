//! Port contracts for the annotation context.

mod repository;

pub use repository::{
    AnnotationRepository, AnnotationRepositoryError, AnnotationRepositoryResult,
};
