//! Error types for stream configuration and merging.

use thiserror::Error;

use crate::catalog::VolumeId;

/// Configuration errors. These abort a sort before any output is written.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StreamError {
    /// A catchup spec is not of the form `name:id,id,...`.
    #[error(
        "invalid catchup stream '{spec}'\n  Suggestion: Use the form name:volume_id,volume_id,..."
    )]
    InvalidCatchupSpec {
        /// Spec as given
        spec: String,
    },

    /// A catchup spec lists something that is not a volume identifier.
    #[error("invalid volume id '{value}' in catchup stream '{spec}'")]
    InvalidVolumeId {
        /// Spec as given
        spec: String,
        /// Offending value
        value: String,
    },

    /// A publisher spec has no publisher names.
    #[error(
        "invalid publisher stream '{spec}'\n  Suggestion: Use the form publisher,alias,alias,..."
    )]
    InvalidPublisherSpec {
        /// Spec as given
        spec: String,
    },

    /// A volume is routed to more than one catchup stream.
    #[error(
        "volume {volume} is listed in catchup streams '{first}' and '{second}'\n  Suggestion: Keep each volume in exactly one catchup stream"
    )]
    DuplicateVolume {
        /// Volume identifier
        volume: VolumeId,
        /// Stream that declared it first
        first: String,
        /// Stream that declared it again
        second: String,
    },

    /// A publisher is routed to more than one stream.
    #[error(
        "publisher '{publisher}' is listed in publisher streams '{first}' and '{second}'\n  Suggestion: Keep each publisher name in exactly one publisher stream"
    )]
    DuplicatePublisher {
        /// Publisher name
        publisher: String,
        /// Stream that declared it first
        first: String,
        /// Stream that declared it again
        second: String,
    },

    /// A stream was registered but holds no entries, so it has no weight.
    #[error("stream '{name}' has no entries and cannot be weighted")]
    EmptyStream {
        /// Stream name, empty for the default stream
        name: String,
    },
}
