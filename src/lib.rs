//! Comicpull Core Library
//!
//! Maintains a comic reading queue: pulling new issues of followed volumes
//! from a library catalog, sorting the queue so publishers and backlogs are
//! interleaved evenly, and mirroring the head of the queue onto an e-reader.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//! - [`catalog`] - Library metadata lookup and file export
//! - [`readlist`] - Reading list file handling
//! - [`stream`] - Stream classification and weighted merge
//! - [`sync`] - Sync directory reindexing
//! - [`stats`] - Sorted list drift detection
//! - [`db`] / [`pulldb`] - Pull-list database

// Clippy lints - strict for library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod catalog;
pub mod db;
pub mod pulldb;
pub mod readlist;
pub mod stats;
pub mod stream;
pub mod sync;

// Re-export commonly used types
pub use catalog::{
    CatalogError, CatalogExporter, Exporter, IssueId, IssueMetadata, JsonCatalog, MetadataSource,
    VolumeId, VolumeInfo,
};
pub use db::{Database, DbError};
pub use pulldb::{DEFAULT_EXPIRY_DAYS, ExpiredVolume, PullList, PullListError, PulledVolume};
pub use readlist::{ReadingList, ReadingListEntry, ReadingListError};
pub use stats::{DriftReason, ListStats, StreamStats, compare_stats, stream_stats};
pub use stream::{
    DEFAULT_SPARSE_INTERVAL, MergedLine, MergedStreams, StreamClassifier, StreamError, Streams,
    merge,
};
pub use sync::{ReindexError, SyncDirectory, SyncError, SyncReport, reindex};
