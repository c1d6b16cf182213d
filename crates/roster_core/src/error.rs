//! Error taxonomy for codec and service operations.
//!
//! Callers branch on the variant; none of these is ever reported as an empty
//! success.

use crate::model::personal::{PersonalId, PersonalTag, ValidationError};
use crate::storage::FileFormat;
use std::path::{Path, PathBuf};

pub type PersonalResult<T> = Result<T, PersonalError>;

#[derive(Debug, thiserror::Error)]
pub enum PersonalError {
    /// Missing, unreadable or empty file, or an extension that does not match
    /// the codec.
    #[error("storage error at `{}`: {reason}", path.display())]
    Storage { path: PathBuf, reason: String },

    /// Content does not parse as the declared format.
    #[error("malformed {format} input: {message}")]
    MalformedInput { format: FileFormat, message: String },

    /// Discriminator tag outside the known variant set.
    #[error("unknown personnel type `{0}`")]
    UnknownVariant(String),

    #[error("personnel record not found: {0}")]
    NotFound(PersonalId),

    /// Update attempted to change a record's variant.
    #[error("personnel record {id} is a {stored} and cannot become a {requested}")]
    VariantMismatch {
        id: PersonalId,
        stored: PersonalTag,
        requested: PersonalTag,
    },

    #[error("invalid personnel record: {0}")]
    Validation(#[from] ValidationError),

    /// Every positive id up to `i64::MAX` has been handed out or observed.
    #[error("no personnel ids left to assign")]
    IdSpaceExhausted,
}

impl PersonalError {
    pub(crate) fn storage(path: &Path, reason: impl Into<String>) -> Self {
        Self::Storage {
            path: path.to_path_buf(),
            reason: reason.into(),
        }
    }

    pub(crate) fn malformed(format: FileFormat, message: impl ToString) -> Self {
        Self::MalformedInput {
            format,
            message: message.to_string(),
        }
    }

    /// Stable machine-readable code used in log lines.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Storage { .. } => "storage_error",
            Self::MalformedInput { .. } => "malformed_input",
            Self::UnknownVariant(_) => "unknown_variant",
            Self::NotFound(_) => "not_found",
            Self::VariantMismatch { .. } => "variant_mismatch",
            Self::Validation(_) => "validation_failed",
            Self::IdSpaceExhausted => "id_space_exhausted",
        }
    }
}
