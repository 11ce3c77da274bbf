//! Error types for pull-list operations.

use thiserror::Error;

use crate::catalog::VolumeId;
use crate::readlist::ReadingListError;

/// Errors that can occur during pull-list operations.
#[derive(Debug, Error)]
pub enum PullListError {
    /// A query failed.
    #[error("pull database error: {0}")]
    Database(#[from] sqlx::Error),

    /// The volume is not on the pull list.
    #[error(
        "volume {0} is not on the pull list\n  Suggestion: Add it first with `comicpull volumes add {0}`"
    )]
    VolumeNotFound(VolumeId),

    /// New issues could not be written to the reading list.
    #[error(transparent)]
    ReadingList(#[from] ReadingListError),
}
