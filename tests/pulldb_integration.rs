//! Integration tests for the pull-list database.
//!
//! These tests verify PullList operations against a real SQLite file, a
//! catalog document and a reading list on disk.

use std::fs;

use chrono::NaiveDate;
use comicpull_core::{Database, JsonCatalog, PullList, ReadingList};
use tempfile::TempDir;

/// Helper to create a file-backed pull list and a two-volume catalog.
async fn setup() -> (PullList, JsonCatalog, ReadingList, TempDir) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let db = Database::new(&temp_dir.path().join("pull.db"))
        .await
        .expect("Failed to create database");

    let catalog_path = temp_dir.path().join("catalog.json");
    fs::write(
        &catalog_path,
        r#"[
  {"id": 1, "title": "Saga #1", "series": "Saga", "volume": 100, "comicvine_id": 9001, "pubdate": "2012-03-14"},
  {"id": 2, "title": "Saga #2", "series": "Saga", "volume": 100, "comicvine_id": 9002, "pubdate": "2012-04-11"},
  {"id": 3, "title": "Paper Girls #1", "series": "Paper Girls", "volume": 200, "pubdate": "2015-10-07"}
]"#,
    )
    .unwrap();
    let catalog = JsonCatalog::load(&catalog_path).expect("catalog should load");
    let list = ReadingList::new(temp_dir.path().join("todo.txt"));

    (PullList::new(db), catalog, list, temp_dir)
}

#[tokio::test]
async fn test_pull_issues_appends_unseen_issues_once() {
    let (pulls, catalog, list, _temp_dir) = setup().await;
    pulls.add_volume(100, None).await.unwrap();

    let added = pulls.pull_issues(&catalog, &list).await.unwrap();
    assert_eq!(added.len(), 2);
    assert_eq!(
        list.lines().unwrap(),
        vec!["1 Saga #1".to_string(), "2 Saga #2".to_string()]
    );
    assert_eq!(pulls.seen_issues(Some(100)).await.unwrap(), vec![1, 2]);

    let again = pulls.pull_issues(&catalog, &list).await.unwrap();
    assert!(again.is_empty());
    assert_eq!(list.lines().unwrap().len(), 2);
}

#[tokio::test]
async fn test_pull_issues_skips_issue_seen_under_other_volume() {
    let (pulls, catalog, list, _temp_dir) = setup().await;
    pulls.add_volume(200, None).await.unwrap();
    pulls.add_issue(3, Some(100), None).await.unwrap();

    let added = pulls.pull_issues(&catalog, &list).await.unwrap();

    assert!(added.is_empty());
    assert!(!list.path().exists());
}

#[tokio::test]
async fn test_remove_volume_forgets_seen_issues() {
    let (pulls, catalog, list, _temp_dir) = setup().await;
    pulls.add_volume(100, None).await.unwrap();
    pulls.pull_issues(&catalog, &list).await.unwrap();

    pulls.remove_volume(100).await.unwrap();

    assert!(pulls.volumes().await.unwrap().is_empty());
    assert!(!pulls.seen_issue(1).await.unwrap());
}

#[tokio::test]
async fn test_expired_volumes_reports_stale_volumes() {
    let (pulls, catalog, _list, _temp_dir) = setup().await;
    pulls.add_volume(100, None).await.unwrap();
    pulls.add_volume(200, None).await.unwrap();
    pulls.add_volume(300, None).await.unwrap();

    let today = NaiveDate::from_ymd_opt(2015, 11, 1).unwrap();
    let expired = pulls.expired_volumes(&catalog, today, 90).await.unwrap();

    let ids: Vec<i64> = expired.iter().map(|volume| volume.volume).collect();
    assert_eq!(ids, vec![100, 300]);
    assert_eq!(expired[0].name.as_deref(), Some("Saga"));
    assert_eq!(expired[0].last_issue, NaiveDate::from_ymd_opt(2012, 4, 11));
    assert_eq!(expired[1].last_issue, None);
}

#[tokio::test]
async fn test_pull_list_survives_reopen() {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("pull.db");

    let pulls = PullList::new(Database::new(&db_path).await.unwrap());
    pulls.add_volume(100, None).await.unwrap();
    pulls.add_issue(1, Some(100), Some(9001)).await.unwrap();
    pulls.close().await;

    let reopened = PullList::new(Database::new(&db_path).await.unwrap());
    assert_eq!(reopened.volumes().await.unwrap(), vec![100]);
    assert!(reopened.seen_issue(1).await.unwrap());
}
