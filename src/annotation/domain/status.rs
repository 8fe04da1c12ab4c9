//! Annotation lifecycle states and save modes.

use super::{ParseAnnotationStatusError, ParseSaveModeError};
use serde::{Deserialize, Serialize};
use std::fmt;

/// How far one annotation revision has progressed.
///
/// Each saved revision carries its own status; there is no transition
/// table because revisions are append-only and never mutated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AnnotationStatus {
    /// Work in progress, not yet counted as a deliverable.
    Draft,
    /// A kept revision the annotator may still build on.
    Saved,
    /// A finished revision handed over for review.
    Submitted,
}

impl AnnotationStatus {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Draft => "DRAFT",
            Self::Saved => "SAVED",
            Self::Submitted => "SUBMITTED",
        }
    }
}

impl fmt::Display for AnnotationStatus {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

impl TryFrom<&str> for AnnotationStatus {
    type Error = ParseAnnotationStatusError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_uppercase();
        match normalized.as_str() {
            "DRAFT" => Ok(Self::Draft),
            "SAVED" => Ok(Self::Saved),
            "SUBMITTED" => Ok(Self::Submitted),
            _ => Err(ParseAnnotationStatusError(value.to_owned())),
        }
    }
}

/// How a caller wants one revision recorded.
///
/// The mode arrives as lower-case request text and decides the status the
/// new revision carries; `Submit` additionally hands the task over for
/// review.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SaveMode {
    /// Record a [`AnnotationStatus::Draft`] revision.
    Draft,
    /// Record a [`AnnotationStatus::Saved`] revision.
    Save,
    /// Record a [`AnnotationStatus::Submitted`] revision and park the task
    /// for review.
    Submit,
}

impl SaveMode {
    /// Returns the canonical request representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Save => "save",
            Self::Submit => "submit",
        }
    }

    /// Returns the status a revision recorded in this mode carries.
    #[must_use]
    pub const fn resulting_status(self) -> AnnotationStatus {
        match self {
            Self::Draft => AnnotationStatus::Draft,
            Self::Save => AnnotationStatus::Saved,
            Self::Submit => AnnotationStatus::Submitted,
        }
    }
}

impl fmt::Display for SaveMode {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

impl TryFrom<&str> for SaveMode {
    type Error = ParseSaveModeError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "draft" => Ok(Self::Draft),
            "save" => Ok(Self::Save),
            "submit" => Ok(Self::Submit),
            _ => Err(ParseSaveModeError(value.to_owned())),
        }
    }
}
