//! Sync directory maintenance.
//!
//! A sync directory mirrors the first N issues of the reading list onto an
//! e-reader. Each file is named `[<index> ]<title> (<id>).<format>`; the
//! index prefix makes the device's alphabetical listing follow the reading
//! order.
//!
//! - [`SyncDirectory`] - records of the files currently synced
//! - [`reindex`] - prunes, exports and renames so the directory follows the list
//! - [`new_indexes`] - fractional index interpolation
//! - [`matching_blocks`] - the alignment used to find files already in order

mod directory;
mod error;
pub(crate) mod filename;
mod index;
mod matcher;
mod reindex;

pub use directory::{SyncDirectory, SyncedFile};
pub use error::{ReindexError, SyncError};
pub use filename::{
    SYNC_FORMATS, SyncedName, format_index, parse_synced_filename, sync_format, synced_filename,
};
pub use index::{
    APPEND_SPACING, INDEX_LIMIT, MIN_INDEX_SPACING, append_indexes, new_indexes, renumber,
};
pub use matcher::{MatchingBlock, common_elements, matching_blocks};
pub use reindex::{ReindexPlan, SyncReport, plan_reindex, reindex};

/// Result type for sync directory operations.
pub type Result<T> = std::result::Result<T, SyncError>;
