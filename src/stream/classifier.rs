//! Routing of issues into named streams.

use std::collections::{HashMap, HashSet};

use tracing::{debug, info};

use super::{Entry, ErrorEntry, ErrorReason, StreamError};
use crate::catalog::{IssueMetadata, MetadataSource, VolumeId};
use crate::readlist::ReadingListEntry;

/// Classification rules: catchup rules by volume, then publisher rules.
///
/// A catchup match always wins over a publisher match. Issues matching
/// neither rule go to the default stream.
#[derive(Debug, Clone, Default)]
pub struct StreamClassifier {
    catchup: HashMap<VolumeId, String>,
    publishers: HashMap<String, String>,
    seen: HashSet<VolumeId>,
}

/// Lowercases a stream name and folds characters that cannot appear in a
/// ` +<stream>` tag into `_`.
fn stream_name(raw: &str) -> String {
    raw.trim()
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect::<String>()
        .to_lowercase()
}

impl StreamClassifier {
    /// Creates a classifier with no rules.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a classifier from catchup and publisher specs.
    ///
    /// # Errors
    ///
    /// See [`StreamClassifier::add_streams`].
    pub fn from_specs<C, P>(catchup_specs: &[C], publisher_specs: &[P]) -> Result<Self, StreamError>
    where
        C: AsRef<str>,
        P: AsRef<str>,
    {
        let mut classifier = Self::new();
        classifier.add_streams(catchup_specs, publisher_specs)?;
        Ok(classifier)
    }

    /// Adds catchup specs (`name:volume,volume,...`) and publisher specs
    /// (`publisher,alias,alias,...`, stream named after the first publisher).
    ///
    /// # Errors
    ///
    /// Returns [`StreamError`] when a spec is malformed or when a volume or
    /// publisher is declared more than once.
    pub fn add_streams<C, P>(
        &mut self,
        catchup_specs: &[C],
        publisher_specs: &[P],
    ) -> Result<(), StreamError>
    where
        C: AsRef<str>,
        P: AsRef<str>,
    {
        for spec in catchup_specs {
            self.add_catchup(spec.as_ref())?;
        }
        for spec in publisher_specs {
            self.add_publisher(spec.as_ref())?;
        }
        Ok(())
    }

    fn add_catchup(&mut self, spec: &str) -> Result<(), StreamError> {
        let invalid = || StreamError::InvalidCatchupSpec {
            spec: spec.to_string(),
        };
        let (name, ids) = spec.split_once(':').ok_or_else(invalid)?;
        let name = stream_name(name);
        if name.is_empty() {
            return Err(invalid());
        }

        for value in ids.split(',').map(str::trim) {
            let volume = value
                .parse::<VolumeId>()
                .map_err(|_| StreamError::InvalidVolumeId {
                    spec: spec.to_string(),
                    value: value.to_string(),
                })?;
            if let Some(first) = self.catchup.get(&volume) {
                return Err(StreamError::DuplicateVolume {
                    volume,
                    first: first.clone(),
                    second: name,
                });
            }
            debug!(volume, stream = %name, "Catchup rule");
            self.catchup.insert(volume, name.clone());
        }
        Ok(())
    }

    fn add_publisher(&mut self, spec: &str) -> Result<(), StreamError> {
        let publishers: Vec<&str> = spec
            .split(',')
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .collect();
        let Some(first) = publishers.first() else {
            return Err(StreamError::InvalidPublisherSpec {
                spec: spec.to_string(),
            });
        };
        let name = stream_name(first);

        for publisher in publishers {
            if let Some(existing) = self.publishers.get(publisher) {
                return Err(StreamError::DuplicatePublisher {
                    publisher: publisher.to_string(),
                    first: existing.clone(),
                    second: name,
                });
            }
            debug!(publisher, stream = %name, "Publisher rule");
            self.publishers.insert(publisher.to_string(), name.clone());
        }
        Ok(())
    }

    /// Returns the stream for an issue, or `None` for the default stream.
    ///
    /// Records the issue's volume as seen on a catchup match.
    pub fn classify(&mut self, issue: &IssueMetadata) -> Option<String> {
        if let Some(volume) = issue.volume
            && let Some(stream) = self.catchup.get(&volume)
        {
            self.seen.insert(volume);
            return Some(stream.clone());
        }
        issue
            .publisher
            .as_deref()
            .and_then(|publisher| self.publishers.get(publisher))
            .cloned()
    }

    /// Parses and classifies a reading list line.
    ///
    /// Any existing stream tag is discarded; the stream is always recomputed.
    ///
    /// # Errors
    ///
    /// Returns the line as an [`ErrorEntry`] when it does not parse or the
    /// metadata source does not know its identifier.
    pub fn identify(
        &mut self,
        line: &str,
        source: &dyn MetadataSource,
    ) -> Result<Entry, ErrorEntry> {
        let parsed = ReadingListEntry::parse(line).map_err(|_| {
            debug!(line, "Unparseable reading list line");
            ErrorEntry {
                line: line.to_string(),
                reason: ErrorReason::Parse,
            }
        })?;
        let Some(issue) = source.lookup(parsed.id) else {
            debug!(id = parsed.id, "Issue not in catalog");
            return Err(ErrorEntry {
                line: line.to_string(),
                reason: ErrorReason::Lookup,
            });
        };

        Ok(Entry {
            id: parsed.id,
            title: parsed.title,
            stream: self.classify(&issue),
            pubdate: issue.pubdate,
            sort_title: issue.sort_title().to_string(),
        })
    }

    /// Catchup volumes configured but never matched, in ascending order.
    #[must_use]
    pub fn unseen_volumes(&self) -> Vec<VolumeId> {
        let mut unseen: Vec<VolumeId> = self
            .catchup
            .keys()
            .filter(|volume| !self.seen.contains(volume))
            .copied()
            .collect();
        unseen.sort_unstable();
        unseen
    }

    /// End-of-run check: logs every catchup volume that matched nothing.
    /// Such volumes usually mean a finished backlog or a typo.
    pub fn finish(&self) -> Vec<VolumeId> {
        let unseen = self.unseen_volumes();
        for volume in &unseen {
            let stream = self.catchup.get(volume).map_or("", String::as_str);
            info!(volume, stream, "Catchup volume matched no issues");
        }
        unseen
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::catalog::{IssueId, JsonCatalog};

    fn issue(id: IssueId, volume: Option<VolumeId>, publisher: Option<&str>) -> IssueMetadata {
        IssueMetadata {
            id,
            title: format!("Issue {id}"),
            title_sort: None,
            series: None,
            issue_number: None,
            publisher: publisher.map(str::to_string),
            volume,
            comicvine_id: None,
            pubdate: None,
            files: Vec::new(),
        }
    }

    #[test]
    fn test_catchup_wins_over_publisher() {
        let mut classifier =
            StreamClassifier::from_specs(&["xmen:100,101"], &["Marvel,Marvel Comics"]).unwrap();
        assert_eq!(
            classifier.classify(&issue(1, Some(100), Some("Marvel"))),
            Some("xmen".to_string())
        );
        assert_eq!(
            classifier.classify(&issue(2, Some(5), Some("Marvel Comics"))),
            Some("marvel".to_string())
        );
        assert_eq!(classifier.classify(&issue(3, Some(5), Some("DC"))), None);
        assert_eq!(classifier.classify(&issue(4, None, None)), None);
    }

    #[test]
    fn test_stream_names_are_normalized() {
        let mut classifier =
            StreamClassifier::from_specs(&["X-Men:7"], &["DC Comics,DC"]).unwrap();
        assert_eq!(
            classifier.classify(&issue(1, Some(7), None)),
            Some("x_men".to_string())
        );
        assert_eq!(
            classifier.classify(&issue(2, None, Some("DC"))),
            Some("dc_comics".to_string())
        );
    }

    #[test]
    fn test_duplicate_volume_rejected() {
        let err = StreamClassifier::from_specs(&["a:1,2", "b:2"], &[] as &[&str]).unwrap_err();
        assert_eq!(
            err,
            StreamError::DuplicateVolume {
                volume: 2,
                first: "a".to_string(),
                second: "b".to_string()
            }
        );
    }

    #[test]
    fn test_duplicate_publisher_rejected() {
        let err =
            StreamClassifier::from_specs(&[] as &[&str], &["Marvel,Epic", "Epic"]).unwrap_err();
        assert!(matches!(err, StreamError::DuplicatePublisher { .. }));
    }

    #[test]
    fn test_malformed_specs_rejected() {
        let none: &[&str] = &[];
        assert!(matches!(
            StreamClassifier::from_specs(&["xmen"], none),
            Err(StreamError::InvalidCatchupSpec { .. })
        ));
        assert!(matches!(
            StreamClassifier::from_specs(&[":1"], none),
            Err(StreamError::InvalidCatchupSpec { .. })
        ));
        assert!(matches!(
            StreamClassifier::from_specs(&["xmen:1,abc"], none),
            Err(StreamError::InvalidVolumeId { .. })
        ));
        assert!(matches!(
            StreamClassifier::from_specs(none, &[" , "]),
            Err(StreamError::InvalidPublisherSpec { .. })
        ));
    }

    #[test]
    fn test_unseen_volumes_reported() {
        let mut classifier =
            StreamClassifier::from_specs(&["xmen:100,101,102"], &[] as &[&str]).unwrap();
        classifier.classify(&issue(1, Some(101), None));
        assert_eq!(classifier.unseen_volumes(), vec![100, 102]);
        assert_eq!(classifier.finish(), vec![100, 102]);
    }

    #[test]
    fn test_identify_buckets_failures() {
        let catalog = JsonCatalog::from_issues(vec![issue(5, Some(100), None)]).unwrap();
        let mut classifier =
            StreamClassifier::from_specs(&["xmen:100"], &[] as &[&str]).unwrap();

        let entry = classifier.identify("5 Issue five +old", &catalog).unwrap();
        assert_eq!(entry.title, "Issue five");
        assert_eq!(entry.stream.as_deref(), Some("xmen"));

        let parse = classifier.identify("no id here", &catalog).unwrap_err();
        assert_eq!(parse.reason, ErrorReason::Parse);
        assert_eq!(parse.line, "no id here");

        let lookup = classifier.identify("6 Unknown", &catalog).unwrap_err();
        assert_eq!(lookup.reason, ErrorReason::Lookup);
    }
}
