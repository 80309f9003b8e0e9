use crate::patchers::PatchError;
use thiserror::Error;

/// Outcome of a target that did not end in an update.
#[derive(Debug, Error)]
pub enum UpdateError {
    /// Nothing is configured for the target.
    #[error("Nothing to do for `{section}`: {reason}")]
    Skipped { section: String, reason: String },
    #[error(transparent)]
    Failed(#[from] PatchError),
}

impl UpdateError {
    pub fn skipped(section: impl Into<String>, reason: impl Into<String>) -> Self {
        UpdateError::Skipped { section: section.into(), reason: reason.into() }
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self, UpdateError::Skipped { .. })
    }
}
