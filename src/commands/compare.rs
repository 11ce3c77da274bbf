//! Compare command handler: decide whether a candidate sort is worth installing.

use std::path::{Path, PathBuf};

use anyhow::Result;
use comicpull_core::{DriftReason, ReadingList, compare_stats, stream_stats};
use tracing::info;

use crate::cli::CompareArgs;

pub fn run_compare_command(args: &CompareArgs, quiet: bool) -> Result<()> {
    if let Some((candidate, reasons)) = first_drifting(&args.reference, &args.candidate)? {
        info!(candidate = %candidate.display(), "Candidate drifts from reference");
        if !quiet {
            for reason in &reasons {
                println!("Threshold passed: {reason}");
            }
        }
        println!("OK");
    }
    Ok(())
}

/// Returns the first candidate whose statistics drift from the reference,
/// with the reasons. Later candidates are not read.
pub(crate) fn first_drifting(
    reference: &Path,
    candidates: &[PathBuf],
) -> Result<Option<(PathBuf, Vec<DriftReason>)>> {
    info!(reference = %reference.display(), "Processing reference file");
    let reference_stats = stream_stats(&ReadingList::new(reference).tagged_entries()?);
    for candidate in candidates {
        info!(candidate = %candidate.display(), "Processing candidate file");
        let candidate_stats = stream_stats(&ReadingList::new(candidate).tagged_entries()?);
        let reasons = compare_stats(&reference_stats, &candidate_stats);
        if !reasons.is_empty() {
            return Ok(Some((candidate.clone(), reasons)));
        }
    }
    Ok(None)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::fs;

    use super::*;

    fn write(dir: &Path, name: &str, tags: &[&str]) -> PathBuf {
        let text: String = tags
            .iter()
            .enumerate()
            .map(|(i, tag)| format!("{i} Issue {i} +{tag}\n"))
            .collect();
        let path = dir.join(name);
        fs::write(&path, text).unwrap();
        path
    }

    #[test]
    fn test_first_drifting_skips_matching_candidates() {
        let dir = tempfile::tempdir().unwrap();
        let alternating = ["a", "b", "a", "b", "a", "b", "a", "b"];
        let reference = write(dir.path(), "ref.txt", &alternating);
        let same = write(dir.path(), "same.txt", &alternating);
        let changed = write(dir.path(), "changed.txt", &["a", "c", "a", "c"]);

        let (candidate, reasons) = first_drifting(&reference, &[same, changed.clone()])
            .unwrap()
            .unwrap();

        assert_eq!(candidate, changed);
        assert!(matches!(reasons[0], DriftReason::StreamsChanged { .. }));
    }

    #[test]
    fn test_first_drifting_none_when_all_match() {
        let dir = tempfile::tempdir().unwrap();
        let tags = ["a", "b", "a", "b"];
        let reference = write(dir.path(), "ref.txt", &tags);
        let same = write(dir.path(), "same.txt", &tags);
        assert!(first_drifting(&reference, &[same]).unwrap().is_none());
    }

    #[test]
    fn test_first_drifting_reads_tags_inside_lines() {
        let dir = tempfile::tempdir().unwrap();
        let reference = write(dir.path(), "ref.txt", &["a", "b", "a", "b"]);
        let edited = dir.path().join("edited.txt");
        fs::write(&edited, "0 Issue 0 +a\n1 Issue 1 +b read later\n2 Issue 2 +a\n3 Issue 3 +b\n")
            .unwrap();
        assert!(first_drifting(&reference, &[edited]).unwrap().is_none());
    }

    #[test]
    fn test_first_drifting_missing_reference_fails() {
        let dir = tempfile::tempdir().unwrap();
        assert!(first_drifting(&dir.path().join("missing.txt"), &[]).is_err());
    }
}
