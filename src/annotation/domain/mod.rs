//! Domain model for annotation capture.
//!
//! Annotations are immutable revisions of one annotator's work on one task.
//! Task and user identifiers are shared with [`crate::task::domain`]; the
//! types here cover only what is particular to annotation rows.

mod annotation;
mod error;
mod ids;
mod status;

pub use annotation::{
    Annotation, AnnotationKind, AnnotationVersion, NewAnnotationRecord, PersistedAnnotationData,
};
pub use error::{AnnotationDomainError, ParseAnnotationStatusError, ParseSaveModeError};
pub use ids::AnnotationId;
pub use status::{AnnotationStatus, SaveMode};
