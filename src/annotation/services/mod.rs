//! Orchestration services for the annotation context.

mod workbench;

pub use workbench::{
    AnnotationWorkbenchError, AnnotationWorkbenchResult, AnnotationWorkbenchService,
    SaveAnnotationRequest,
};
