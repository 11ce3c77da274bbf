//! CLI argument definitions using clap derive macros.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use comicpull_core::{DEFAULT_EXPIRY_DAYS, VolumeId};

/// Default number of lines taken from the first file per line of the second.
pub const DEFAULT_MERGE_RATE: u64 = 10;

/// Track a comic pull list, sort the reading queue and sync it to a device.
///
/// Comicpull appends newly released issues of followed volumes to a reading
/// list, interleaves that list so publishers and backlogs are spread evenly,
/// and mirrors the head of the list onto an e-reader directory.
#[derive(Parser, Debug)]
#[command(name = "comicpull")]
#[command(author, version, about)]
pub struct Cli {
    /// Increase output verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Sort a reading list into evenly interleaved streams
    Sort(SortArgs),

    /// Mirror the head of a reading list into a sync directory
    Sync(SyncArgs),

    /// Report whether candidate sorts drift from a reference list
    Compare(CompareArgs),

    /// Add new issues of followed volumes to the reading list
    Pull(PullArgs),

    /// Manage the volumes on the pull list
    Volumes(VolumesArgs),

    /// List the volumes referenced by a reading list
    ReadingVolumes(ReadingVolumesArgs),

    /// Report issues read out of order
    Ooo(OooArgs),

    /// Interleave two line-oriented files at a fixed rate
    Listmerge(ListmergeArgs),

    /// Inspect configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigCommand {
    /// Print the effective configuration
    Show,
}

#[derive(Args, Debug, Clone, Default)]
pub struct SortArgs {
    /// Reading list to sort (stdin when omitted)
    #[arg(short, long)]
    pub input: Option<PathBuf>,

    /// Where to write the sorted list (stdout when omitted)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Library catalog document (JSON)
    #[arg(long)]
    pub catalog: Option<PathBuf>,

    /// Catchup stream, e.g. `ss:18436,18519` (repeatable)
    #[arg(short = 'c', long = "catchup-stream")]
    pub catchup_streams: Vec<String>,

    /// Publisher stream, e.g. `Marvel,Max` (repeatable)
    #[arg(short = 'p', long = "publisher")]
    pub publishers: Vec<String>,

    /// Streams spaced wider than this many lines are logged as sparse
    #[arg(long)]
    pub sparse_interval: Option<f64>,
}

#[derive(Args, Debug, Clone, Default)]
pub struct SyncArgs {
    /// Reading list whose head is synced
    #[arg(short = 't', long)]
    pub toread: Option<PathBuf>,

    /// Directory to sync issues into
    #[arg(short = 'd', long)]
    pub sync_dir: Option<PathBuf>,

    /// Library catalog document (JSON)
    #[arg(long)]
    pub catalog: Option<PathBuf>,

    /// Number of issues to keep synced
    #[arg(short = 'n', long, value_parser = clap::value_parser!(u64).range(1..))]
    pub count: Option<u64>,
}

#[derive(Args, Debug, Clone)]
pub struct CompareArgs {
    /// Reading list currently in use
    #[arg(short, long)]
    pub reference: PathBuf,

    /// Freshly sorted candidate list (repeatable)
    #[arg(short, long, required = true)]
    pub candidate: Vec<PathBuf>,
}

#[derive(Args, Debug, Clone, Default)]
pub struct PullArgs {
    /// Reading list new issues are appended to
    #[arg(long)]
    pub todo_file: Option<PathBuf>,

    /// Pull-list database
    #[arg(long)]
    pub pulldb: Option<PathBuf>,

    /// Library catalog document (JSON)
    #[arg(long)]
    pub catalog: Option<PathBuf>,

    /// Volume to start following (repeatable, comma separated)
    #[arg(short = 'a', long = "add-volume", value_delimiter = ',')]
    pub add_volumes: Vec<VolumeId>,

    /// Only add volumes; do not look for new issues
    #[arg(long)]
    pub nopull: bool,
}

#[derive(Args, Debug, Clone)]
pub struct VolumesArgs {
    /// Pull-list database
    #[arg(long, global = true)]
    pub pulldb: Option<PathBuf>,

    /// Library catalog document (JSON)
    #[arg(long, global = true)]
    pub catalog: Option<PathBuf>,

    #[command(subcommand)]
    pub command: VolumesCommand,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum VolumesCommand {
    /// List followed volumes
    List,

    /// Follow volumes
    Add {
        /// Volume ids (comma separated or repeated)
        #[arg(required = true, value_delimiter = ',')]
        volumes: Vec<VolumeId>,
    },

    /// Stop following volumes and forget their seen issues
    Remove {
        /// Volume ids (comma separated or repeated)
        #[arg(required = true, value_delimiter = ',')]
        volumes: Vec<VolumeId>,
    },

    /// Report followed volumes with no recent issues
    Expire {
        /// Expiry period in days
        #[arg(long, default_value_t = DEFAULT_EXPIRY_DAYS, value_parser = clap::value_parser!(i64).range(0..))]
        days: i64,
    },
}

#[derive(Args, Debug, Clone, Default)]
pub struct ReadingVolumesArgs {
    /// Reading list to inspect
    #[arg(long)]
    pub todo_file: Option<PathBuf>,

    /// Library catalog document (JSON)
    #[arg(long)]
    pub catalog: Option<PathBuf>,
}

#[derive(Args, Debug, Clone)]
pub struct OooArgs {
    /// Reading lists to check
    #[arg(required = true)]
    pub files: Vec<PathBuf>,
}

#[derive(Args, Debug, Clone)]
pub struct ListmergeArgs {
    /// Lines taken from the first file per line of the second
    #[arg(short, long, default_value_t = DEFAULT_MERGE_RATE, value_parser = clap::value_parser!(u64).range(1..))]
    pub rate: u64,

    /// Primary file
    pub first: PathBuf,

    /// File sprinkled into the primary one
    pub second: PathBuf,
}
