//! Sort command handler: classify a reading list and merge its streams.

use std::fs;
use std::io::{self, BufWriter, Read, Write};
use std::path::Path;

use anyhow::{Context, Result, bail};
use comicpull_core::{MetadataSource, StreamClassifier, Streams, merge};
use tracing::info;

use super::load_catalog;
use crate::app::config_runtime::Settings;
use crate::cli::SortArgs;

pub fn run_sort_command(args: &SortArgs, settings: &Settings) -> Result<()> {
    let catalog_path = Settings::require(
        args.catalog.as_ref(),
        settings.catalog.as_ref(),
        "--catalog",
        "catalog",
    )?;
    let sparse_interval = args.sparse_interval.unwrap_or(settings.sparse_interval);
    if !(sparse_interval.is_finite() && sparse_interval > 0.0) {
        bail!("Invalid --sparse-interval value: {sparse_interval}. Expected a positive number");
    }

    let mut catchup_streams = settings.catchup_streams.clone();
    catchup_streams.extend(args.catchup_streams.iter().cloned());
    let mut publishers = settings.publishers.clone();
    publishers.extend(args.publishers.iter().cloned());
    let mut classifier = StreamClassifier::from_specs(&catchup_streams, &publishers)?;

    let catalog = load_catalog(&catalog_path)?;
    let input = read_input(args.input.as_deref())?;
    let sorted = sort_lines(&input, &mut classifier, &catalog, sparse_interval)?;
    info!(lines = sorted.len(), "Sorted reading list");

    match &args.output {
        Some(path) => {
            let mut text = sorted.join("\n");
            if !text.is_empty() {
                text.push('\n');
            }
            fs::write(path, text)
                .with_context(|| format!("Failed to write sorted list '{}'", path.display()))?;
        }
        None => {
            let stdout = io::stdout();
            let mut out = BufWriter::new(stdout.lock());
            for line in &sorted {
                writeln!(out, "{line}")?;
            }
            out.flush()?;
        }
    }
    Ok(())
}

fn read_input(path: Option<&Path>) -> Result<String> {
    match path {
        Some(path) => fs::read_to_string(path)
            .with_context(|| format!("Failed to read reading list '{}'", path.display())),
        None => {
            let mut buffer = String::new();
            io::stdin()
                .read_to_string(&mut buffer)
                .context("Failed to read reading list from stdin")?;
            Ok(buffer)
        }
    }
}

/// Classifies `input` and renders the merged order, one line per entry.
pub(crate) fn sort_lines(
    input: &str,
    classifier: &mut StreamClassifier,
    source: &dyn MetadataSource,
    sparse_interval: f64,
) -> Result<Vec<String>> {
    let streams = Streams::classify_lines(input.lines(), classifier, source);
    for error in streams.errors() {
        info!(line = %error.line, reason = ?error.reason, "Line kept unsorted");
    }
    classifier.finish();
    let merged = merge(streams, sparse_interval)?;
    Ok(merged.map(|line| line.to_string()).collect())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::NaiveDate;
    use comicpull_core::{IssueMetadata, JsonCatalog};

    use super::*;

    fn issue(id: i64, publisher: &str, volume: i64, day: u32) -> IssueMetadata {
        IssueMetadata {
            id,
            title: format!("Issue {id}"),
            title_sort: None,
            series: None,
            issue_number: None,
            publisher: Some(publisher.to_string()),
            volume: Some(volume),
            comicvine_id: None,
            pubdate: NaiveDate::from_ymd_opt(2020, 1, day),
            files: Vec::new(),
        }
    }

    #[test]
    fn test_sort_lines_interleaves_publishers_and_keeps_errors_first() {
        let catalog = JsonCatalog::from_issues(vec![
            issue(1, "Marvel", 10, 4),
            issue(2, "Marvel", 10, 3),
            issue(3, "DC Comics", 20, 2),
            issue(4, "Marvel", 10, 1),
        ])
        .unwrap();
        let mut classifier = StreamClassifier::from_specs::<&str, &str>(&[], &["Marvel"]).unwrap();
        let input = "1 Issue 1\n3 Issue 3\nnot a line\n2 Issue 2\n\n4 Issue 4\n99 Ghost\n";

        let sorted = sort_lines(input, &mut classifier, &catalog, 20.0).unwrap();

        assert_eq!(
            sorted,
            vec![
                "not a line",
                "99 Ghost",
                "4 Issue 4 +marvel",
                "2 Issue 2 +marvel",
                "1 Issue 1 +marvel",
                "3 Issue 3",
            ]
        );
    }
}
