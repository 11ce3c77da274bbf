//! Integration tests for sync directory reindexing.
//!
//! These tests run the full prune/export/rename cycle against real files.

use std::fs;
use std::path::Path;

use comicpull_core::{
    CatalogExporter, JsonCatalog, ReadingList, ReadingListEntry, SyncDirectory, SyncError,
    reindex,
};
use tempfile::TempDir;

/// Library with three issues, each stored as a cbz next to the catalog.
fn setup_library() -> (TempDir, JsonCatalog) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let library = temp_dir.path().join("library");
    fs::create_dir_all(&library).unwrap();
    for id in [55, 56, 57] {
        fs::write(library.join(format!("{id}.cbz")), format!("issue {id}")).unwrap();
    }
    let catalog_path = library.join("catalog.json");
    fs::write(
        &catalog_path,
        r#"[
  {"id": 55, "title": "Foo", "files": ["55.cbz"]},
  {"id": 56, "title": "Bar", "files": ["56.cbz"]},
  {"id": 57, "title": "Baz", "files": ["57.cbz", "57.pdf"]}
]"#,
    )
    .unwrap();
    let catalog = JsonCatalog::load(&catalog_path).expect("catalog should load");
    (temp_dir, catalog)
}

fn sync_dir(temp_dir: &TempDir) -> std::path::PathBuf {
    let dir = temp_dir.path().join("device");
    fs::create_dir_all(&dir).unwrap();
    dir
}

fn listing(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

fn desired() -> Vec<ReadingListEntry> {
    vec![
        ReadingListEntry::new(56, "Bar"),
        ReadingListEntry::new(55, "Foo"),
        ReadingListEntry::new(57, "Baz"),
    ]
}

#[test]
fn test_reindex_keeps_stable_file_and_moves_others() {
    let (temp_dir, catalog) = setup_library();
    let dir = sync_dir(&temp_dir);
    fs::write(dir.join("0001 Foo (55).cbz"), "issue 55").unwrap();
    fs::write(dir.join("0002 Bar (56).cbz"), "issue 56").unwrap();

    let mut directory = SyncDirectory::scan(&dir).unwrap();
    let exporter = CatalogExporter::new(&catalog);
    let report = reindex(&mut directory, &desired(), &exporter).unwrap();

    assert_eq!(report.stable, 1);
    assert_eq!(report.exported, 1);
    assert_eq!(report.renamed, 2);
    assert_eq!(
        listing(&dir),
        vec!["0002 Bar (56).cbz", "0012 Foo (55).cbz", "0022 Baz (57).cbz"]
    );
    assert_eq!(
        fs::read_to_string(dir.join("0022 Baz (57).cbz")).unwrap(),
        "issue 57"
    );
}

#[test]
fn test_reindex_second_run_is_noop() {
    let (temp_dir, catalog) = setup_library();
    let dir = sync_dir(&temp_dir);
    fs::write(dir.join("0001 Foo (55).cbz"), "issue 55").unwrap();
    fs::write(dir.join("0002 Bar (56).cbz"), "issue 56").unwrap();
    let exporter = CatalogExporter::new(&catalog);

    let mut directory = SyncDirectory::scan(&dir).unwrap();
    reindex(&mut directory, &desired(), &exporter).unwrap();
    let first = listing(&dir);

    let mut directory = SyncDirectory::scan(&dir).unwrap();
    let report = reindex(&mut directory, &desired(), &exporter).unwrap();

    assert_eq!(report.renamed, 0);
    assert_eq!(report.exported, 0);
    assert_eq!(report.removed, 0);
    assert_eq!(report.stable, 3);
    assert_eq!(listing(&dir), first);
}

#[test]
fn test_reindex_prunes_issues_that_left_the_list() {
    let (temp_dir, catalog) = setup_library();
    let dir = sync_dir(&temp_dir);
    fs::write(dir.join("0010 Foo (55).cbz"), "issue 55").unwrap();
    fs::write(dir.join("0020 Gone (99).cbr"), "old").unwrap();
    fs::write(dir.join("notes.txt"), "not a synced issue").unwrap();

    let mut directory = SyncDirectory::scan(&dir).unwrap();
    let exporter = CatalogExporter::new(&catalog);
    let report = reindex(
        &mut directory,
        &[ReadingListEntry::new(55, "Foo")],
        &exporter,
    )
    .unwrap();

    assert_eq!(report.removed, 1);
    assert_eq!(listing(&dir), vec!["0010 Foo (55).cbz", "notes.txt"]);
}

#[test]
fn test_reindex_counts_export_failures() {
    let (temp_dir, catalog) = setup_library();
    let dir = sync_dir(&temp_dir);

    let mut directory = SyncDirectory::scan(&dir).unwrap();
    let exporter = CatalogExporter::new(&catalog);
    let report = reindex(
        &mut directory,
        &[
            ReadingListEntry::new(56, "Bar"),
            ReadingListEntry::new(404, "Missing"),
        ],
        &exporter,
    )
    .unwrap();

    assert_eq!(report.exported, 1);
    assert_eq!(report.export_failed, 1);
    assert_eq!(listing(&dir), vec!["0010 Bar (56).cbz"]);
}

#[test]
fn test_rename_refuses_format_change() {
    let temp_dir = TempDir::new().unwrap();
    let dir = sync_dir(&temp_dir);
    fs::write(dir.join("0001 Foo (55).cbz"), "issue 55").unwrap();

    let mut directory = SyncDirectory::scan(&dir).unwrap();
    let err = directory.rename(55, "0001 Foo (55).cbr").unwrap_err();

    assert!(matches!(err, SyncError::FormatChange { id: 55, .. }));
    assert_eq!(listing(&dir), vec!["0001 Foo (55).cbz"]);
}

#[test]
fn test_sync_from_reading_list_prefix() {
    let (temp_dir, catalog) = setup_library();
    let dir = sync_dir(&temp_dir);
    let toread = temp_dir.path().join("toread.txt");
    fs::write(&toread, "57 Baz +dc\n55 Foo\n56 Bar +marvel\n").unwrap();

    let desired = ReadingList::new(&toread).prefix(2).unwrap();
    let mut directory = SyncDirectory::scan(&dir).unwrap();
    let exporter = CatalogExporter::new(&catalog);
    reindex(&mut directory, &desired, &exporter).unwrap();

    assert_eq!(
        listing(&dir),
        vec!["0010 Baz (57).cbz", "0020 Foo (55).cbz"]
    );
}

#[test]
fn test_numeric_title_gets_real_index_prefix() {
    let temp_dir = TempDir::new().unwrap();
    let library = temp_dir.path().join("library");
    fs::create_dir_all(&library).unwrap();
    fs::write(library.join("7.cbz"), "issue 7").unwrap();
    fs::write(library.join("8.cbz"), "issue 8").unwrap();
    let catalog_path = library.join("catalog.json");
    fs::write(
        &catalog_path,
        r#"[
  {"id": 7, "title": "2000 AD Prog 1", "files": ["7.cbz"]},
  {"id": 8, "title": "Foo", "files": ["8.cbz"]}
]"#,
    )
    .unwrap();
    let catalog = JsonCatalog::load(&catalog_path).unwrap();
    let dir = sync_dir(&temp_dir);
    fs::write(dir.join("0001 Bar (9).cbz"), "issue 9").unwrap();

    let desired = vec![
        ReadingListEntry::new(9, "Bar"),
        ReadingListEntry::new(7, "2000 AD Prog 1"),
        ReadingListEntry::new(8, "Foo"),
    ];
    let mut directory = SyncDirectory::scan(&dir).unwrap();
    let exporter = CatalogExporter::new(&catalog);
    let report = reindex(&mut directory, &desired, &exporter).unwrap();

    assert_eq!(report.stable, 1);
    assert_eq!(
        listing(&dir),
        vec![
            "0001 Bar (9).cbz",
            "0011 2000 AD Prog 1 (7).cbz",
            "0021 Foo (8).cbz"
        ]
    );
}

#[test]
fn test_reindex_renumbers_before_prefix_outgrows_four_digits() {
    let (temp_dir, catalog) = setup_library();
    let dir = sync_dir(&temp_dir);
    fs::write(dir.join("9995 Foo (55).cbz"), "issue 55").unwrap();

    let mut directory = SyncDirectory::scan(&dir).unwrap();
    let exporter = CatalogExporter::new(&catalog);
    reindex(
        &mut directory,
        &[ReadingListEntry::new(55, "Foo"), ReadingListEntry::new(56, "Bar")],
        &exporter,
    )
    .unwrap();

    assert_eq!(listing(&dir), vec!["0010 Foo (55).cbz", "0020 Bar (56).cbz"]);
}
