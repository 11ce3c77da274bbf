//! Pull list: the volumes being followed and the issues already pulled.
//!
//! # Overview
//!
//! - [`PullList`] - `SQLite`-backed volume and seen-issue records
//! - [`PulledVolume`] - a followed volume with its cached metadata
//! - [`ExpiredVolume`] - a followed volume with no recent issues
//!
//! Pulling walks every followed volume in the catalog and appends issues not
//! yet seen to the reading list.

mod error;

pub use error::PullListError;

use std::collections::{HashMap, HashSet};

use chrono::NaiveDate;
use tracing::{debug, info, instrument, warn};

use crate::catalog::{IssueId, MetadataSource, VolumeId, VolumeInfo};
use crate::db::Database;
use crate::readlist::{ReadingList, ReadingListEntry};

/// Result type for pull-list operations.
pub type Result<T> = std::result::Result<T, PullListError>;

/// Default number of days without a new issue before a volume is reported.
pub const DEFAULT_EXPIRY_DAYS: i64 = 90;

/// A volume on the pull list.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct PulledVolume {
    /// Volume identifier.
    pub volume: VolumeId,
    /// Cached series name.
    pub name: Option<String>,
    /// Cached start date (January 1st of the start year).
    pub start_date: Option<NaiveDate>,
}

/// A followed volume whose newest issue is older than the expiry period.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpiredVolume {
    /// Volume identifier.
    pub volume: VolumeId,
    /// Series name, when known.
    pub name: Option<String>,
    /// Publication date of the newest dated issue in the catalog.
    pub last_issue: Option<NaiveDate>,
}

fn check_affected(volume: VolumeId, rows_affected: u64) -> Result<()> {
    if rows_affected == 0 {
        Err(PullListError::VolumeNotFound(volume))
    } else {
        Ok(())
    }
}

/// Pull-list manager.
#[derive(Debug, Clone)]
pub struct PullList {
    db: Database,
}

impl PullList {
    /// Creates a pull-list manager over an open database.
    #[must_use]
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Closes the underlying database.
    pub async fn close(self) {
        self.db.close().await;
    }

    /// Adds a volume. Returns false when it was already on the list.
    ///
    /// When `info` is given, the cached name and start date are updated
    /// either way.
    ///
    /// # Errors
    ///
    /// Returns [`PullListError::Database`] if a query fails.
    #[instrument(skip(self, info))]
    pub async fn add_volume(&self, volume: VolumeId, info: Option<&VolumeInfo>) -> Result<bool> {
        let inserted = sqlx::query("INSERT OR IGNORE INTO pull_volumes (volume) VALUES (?)")
            .bind(volume)
            .execute(self.db.pool())
            .await?
            .rows_affected()
            > 0;
        if inserted {
            debug!(volume, "Added volume to pull list");
        } else {
            warn!(volume, "Volume is already on the pull list");
        }

        if let Some(info) = info {
            sqlx::query("UPDATE pull_volumes SET name = ?, start_date = ? WHERE volume = ?")
                .bind(&info.name)
                .bind(info.start_date())
                .bind(volume)
                .execute(self.db.pool())
                .await?;
        }
        Ok(inserted)
    }

    /// Removes a volume and forgets every issue seen for it.
    ///
    /// # Errors
    ///
    /// Returns [`PullListError::Database`] if a query fails.
    #[instrument(skip(self))]
    pub async fn remove_volume(&self, volume: VolumeId) -> Result<()> {
        info!(volume, "Removing volume and its seen issues from pull list");
        let mut tx = self.db.pool().begin().await?;
        sqlx::query("DELETE FROM seen_issues WHERE volume = ?")
            .bind(volume)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM pull_volumes WHERE volume = ?")
            .bind(volume)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(())
    }

    /// Returns true when the volume is on the pull list.
    ///
    /// # Errors
    ///
    /// Returns [`PullListError::Database`] if the query fails.
    #[instrument(skip(self))]
    pub async fn pull_volume(&self, volume: VolumeId) -> Result<bool> {
        let row: Option<(i64,)> = sqlx::query_as("SELECT volume FROM pull_volumes WHERE volume = ?")
            .bind(volume)
            .fetch_optional(self.db.pool())
            .await?;
        Ok(row.is_some())
    }

    /// Identifiers of every followed volume, ascending.
    ///
    /// # Errors
    ///
    /// Returns [`PullListError::Database`] if the query fails.
    pub async fn volumes(&self) -> Result<Vec<VolumeId>> {
        let rows: Vec<(i64,)> = sqlx::query_as("SELECT volume FROM pull_volumes ORDER BY volume")
            .fetch_all(self.db.pool())
            .await?;
        Ok(rows.into_iter().map(|(volume,)| volume).collect())
    }

    /// Every followed volume with its cached metadata, ascending.
    ///
    /// # Errors
    ///
    /// Returns [`PullListError::Database`] if the query fails.
    pub async fn pulled_volumes(&self) -> Result<Vec<PulledVolume>> {
        let volumes = sqlx::query_as::<_, PulledVolume>(
            "SELECT volume, name, start_date FROM pull_volumes ORDER BY volume",
        )
        .fetch_all(self.db.pool())
        .await?;
        Ok(volumes)
    }

    /// Records an issue as seen, replacing any previous record for it.
    ///
    /// # Errors
    ///
    /// Returns [`PullListError::Database`] if the insert fails.
    #[instrument(skip(self))]
    pub async fn add_issue(
        &self,
        issue: IssueId,
        volume: Option<VolumeId>,
        cvid: Option<i64>,
    ) -> Result<()> {
        sqlx::query("INSERT OR REPLACE INTO seen_issues (issue, volume, cvid) VALUES (?, ?, ?)")
            .bind(issue)
            .bind(volume)
            .bind(cvid)
            .execute(self.db.pool())
            .await?;
        Ok(())
    }

    /// Returns true when the issue has been pulled before, under any volume.
    ///
    /// # Errors
    ///
    /// Returns [`PullListError::Database`] if the query fails.
    #[instrument(skip(self))]
    pub async fn seen_issue(&self, issue: IssueId) -> Result<bool> {
        let row: Option<(i64,)> = sqlx::query_as("SELECT issue FROM seen_issues WHERE issue = ?")
            .bind(issue)
            .fetch_optional(self.db.pool())
            .await?;
        Ok(row.is_some())
    }

    /// Issues seen for a volume, or those recorded without a volume when
    /// `volume` is `None`.
    ///
    /// # Errors
    ///
    /// Returns [`PullListError::Database`] if the query fails.
    #[instrument(skip(self))]
    pub async fn seen_issues(&self, volume: Option<VolumeId>) -> Result<Vec<IssueId>> {
        let rows: Vec<(i64,)> = match volume {
            Some(volume) => {
                sqlx::query_as("SELECT issue FROM seen_issues WHERE volume = ? ORDER BY issue")
                    .bind(volume)
                    .fetch_all(self.db.pool())
                    .await?
            }
            None => {
                sqlx::query_as("SELECT issue FROM seen_issues WHERE volume IS NULL ORDER BY issue")
                    .fetch_all(self.db.pool())
                    .await?
            }
        };
        Ok(rows.into_iter().map(|(issue,)| issue).collect())
    }

    /// Start date of every followed volume; unknown dates map to
    /// [`NaiveDate::MIN`].
    ///
    /// # Errors
    ///
    /// Returns [`PullListError::Database`] if the query fails.
    pub async fn volume_starts(&self) -> Result<HashMap<VolumeId, NaiveDate>> {
        Ok(self
            .pulled_volumes()
            .await?
            .into_iter()
            .map(|volume| (volume.volume, volume.start_date.unwrap_or(NaiveDate::MIN)))
            .collect())
    }

    /// Cached start date of a volume.
    ///
    /// # Errors
    ///
    /// Returns [`PullListError::Database`] if the query fails.
    pub async fn start_date(&self, volume: VolumeId) -> Result<Option<NaiveDate>> {
        let row: Option<(Option<NaiveDate>,)> =
            sqlx::query_as("SELECT start_date FROM pull_volumes WHERE volume = ?")
                .bind(volume)
                .fetch_optional(self.db.pool())
                .await?;
        Ok(row.and_then(|(date,)| date))
    }

    /// Updates the cached start date of a volume.
    ///
    /// # Errors
    ///
    /// Returns [`PullListError::VolumeNotFound`] when the volume is not
    /// followed and [`PullListError::Database`] if the update fails.
    #[instrument(skip(self))]
    pub async fn set_start_date(&self, volume: VolumeId, start_date: NaiveDate) -> Result<()> {
        let result = sqlx::query("UPDATE pull_volumes SET start_date = ? WHERE volume = ?")
            .bind(start_date)
            .bind(volume)
            .execute(self.db.pool())
            .await?;
        check_affected(volume, result.rows_affected())
    }

    /// Cached name of a volume.
    ///
    /// # Errors
    ///
    /// Returns [`PullListError::Database`] if the query fails.
    pub async fn volume_name(&self, volume: VolumeId) -> Result<Option<String>> {
        let row: Option<(Option<String>,)> =
            sqlx::query_as("SELECT name FROM pull_volumes WHERE volume = ?")
                .bind(volume)
                .fetch_optional(self.db.pool())
                .await?;
        Ok(row.and_then(|(name,)| name))
    }

    /// Updates the cached name of a volume.
    ///
    /// # Errors
    ///
    /// Returns [`PullListError::VolumeNotFound`] when the volume is not
    /// followed and [`PullListError::Database`] if the update fails.
    #[instrument(skip(self))]
    pub async fn set_volume_name(&self, volume: VolumeId, name: &str) -> Result<()> {
        let result = sqlx::query("UPDATE pull_volumes SET name = ? WHERE volume = ?")
            .bind(name)
            .bind(volume)
            .execute(self.db.pool())
            .await?;
        check_affected(volume, result.rows_affected())
    }

    /// Appends every unseen catalog issue of the followed volumes to the
    /// reading list and records them as seen.
    ///
    /// An issue already seen under a different volume is skipped with a
    /// warning; it was most likely retagged after being pulled.
    ///
    /// # Errors
    ///
    /// Returns [`PullListError`] if the database or reading list cannot be
    /// updated.
    #[instrument(skip_all, fields(list = %list.path().display()))]
    pub async fn pull_issues(
        &self,
        source: &dyn MetadataSource,
        list: &ReadingList,
    ) -> Result<Vec<ReadingListEntry>> {
        let mut new_issues = Vec::new();
        for volume in self.volumes().await? {
            info!(volume, "Checking volume for new issues");
            let seen: HashSet<IssueId> = self.seen_issues(Some(volume)).await?.into_iter().collect();
            for issue in source.issues_in_volume(volume) {
                if seen.contains(&issue.id) {
                    debug!(id = issue.id, volume, "Issue already seen");
                    continue;
                }
                if self.seen_issue(issue.id).await? {
                    warn!(
                        id = issue.id,
                        volume, "Issue seen but not associated with this volume"
                    );
                    continue;
                }
                info!(id = issue.id, title = %issue.title, "Found unseen issue");
                new_issues.push((volume, issue));
            }
        }

        if new_issues.is_empty() {
            return Ok(Vec::new());
        }
        let entries: Vec<ReadingListEntry> = new_issues
            .iter()
            .map(|(_, issue)| ReadingListEntry::new(issue.id, issue.title.clone()))
            .collect();
        list.append(&entries)?;

        let mut tx = self.db.pool().begin().await?;
        for (volume, issue) in &new_issues {
            sqlx::query(
                "INSERT OR REPLACE INTO seen_issues (issue, volume, cvid) VALUES (?, ?, ?)",
            )
            .bind(issue.id)
            .bind(*volume)
            .bind(issue.comicvine_id)
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;
        Ok(entries)
    }

    /// Followed volumes with no catalog issue published within `days` of
    /// `today`. Volumes with no dated issues at all are included.
    ///
    /// # Errors
    ///
    /// Returns [`PullListError::Database`] if the volume list cannot be read.
    pub async fn expired_volumes(
        &self,
        source: &dyn MetadataSource,
        today: NaiveDate,
        days: i64,
    ) -> Result<Vec<ExpiredVolume>> {
        let mut expired = Vec::new();
        for pulled in self.pulled_volumes().await? {
            let last_issue = source
                .issues_in_volume(pulled.volume)
                .iter()
                .filter_map(|issue| issue.pubdate)
                .max();
            let fresh = last_issue.is_some_and(|date| (today - date).num_days() <= days);
            if fresh {
                continue;
            }
            let name = pulled
                .name
                .or_else(|| source.volume(pulled.volume).map(|info| info.name));
            warn!(
                volume = pulled.volume,
                name = name.as_deref().unwrap_or(""),
                days,
                "Volume has no recent issues"
            );
            expired.push(ExpiredVolume {
                volume: pulled.volume,
                name,
                last_issue,
            });
        }
        Ok(expired)
    }
}
