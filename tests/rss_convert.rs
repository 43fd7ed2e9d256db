//! Contract tests for the RSS converter: ordering, partial failure,
//! metadata precedence, and idempotence at the crate boundary.

use feedstack::convert::{ConvertError, EntryExtraction, MetaSpec, RssConverter};
use feedstack::document::{Meta, MetaValue};
use feedstack::source::{ByteStream, Source};
use pretty_assertions::assert_eq;
use proptest::prelude::*;

fn feed_with_marker(marker: usize) -> String {
    format!(
        r#"<?xml version="1.0"?>
<rss version="2.0"><channel>
    <title>Feed {marker}</title>
    <item><title>marker-{marker}</title><description>body</description></item>
</channel></rss>"#
    )
}

fn stream(xml: &str) -> Source {
    Source::Stream(ByteStream::new(xml.as_bytes().to_vec()))
}

#[test]
fn test_every_source_accounted_for_as_document_or_failure() {
    let converter = RssConverter::new();
    let sources = vec![
        stream(&feed_with_marker(0)),
        stream("garbage that is not xml"),
        stream(&feed_with_marker(2)),
        Source::from("/nonexistent/feedstack.rss"),
    ];

    let converted = converter.convert(sources, MetaSpec::None).unwrap();

    assert_eq!(converted.documents.len(), 2);
    assert_eq!(converted.failures.len(), 2);
}

#[test]
fn test_all_clean_sources_means_no_gaps() {
    let converter = RssConverter::new();
    let sources: Vec<Source> = (0..5).map(|i| stream(&feed_with_marker(i))).collect();

    let converted = converter.convert(sources, MetaSpec::None).unwrap();

    assert_eq!(converted.documents.len(), 5);
    assert!(converted.failures.is_empty());
}

#[test]
fn test_unreadable_second_source_leaves_one_document_one_failure() {
    let converter = RssConverter::new();
    let sources = vec![
        stream(&feed_with_marker(1)),
        Source::from("/nonexistent/feedstack-second.rss"),
    ];

    let converted = converter.convert(sources, MetaSpec::None).unwrap();

    assert_eq!(converted.documents.len(), 1);
    assert_eq!(converted.documents[0].content, "marker-1 body");
    assert_eq!(converted.failures.len(), 1);
    assert!(converted.failures[0].source.contains("feedstack-second.rss"));
}

#[test]
fn test_file_sources_convert_and_carry_file_path_meta() {
    let dir = std::env::temp_dir().join("feedstack_rss_convert_test");
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join("feed.rss");
    std::fs::write(&path, feed_with_marker(7)).unwrap();

    let converter = RssConverter::new();
    let converted = converter
        .convert(vec![Source::Path(path.clone())], MetaSpec::None)
        .unwrap();

    assert_eq!(converted.documents.len(), 1);
    assert_eq!(converted.documents[0].content, "marker-7 body");
    assert_eq!(
        converted.documents[0].meta.get("file_path"),
        Some(&MetaValue::Str(path.display().to_string()))
    );

    std::fs::remove_dir_all(&dir).ok();
}

#[test]
fn test_per_source_meta_aligns_with_sources() {
    let converter = RssConverter::new();
    let sources = vec![stream(&feed_with_marker(0)), stream(&feed_with_marker(1))];

    let mut first = Meta::new();
    first.insert("topic".to_string(), MetaValue::from("music"));
    let mut second = Meta::new();
    second.insert("topic".to_string(), MetaValue::from("news"));

    let converted = converter
        .convert(sources, MetaSpec::PerSource(vec![first, second]))
        .unwrap();

    assert_eq!(
        converted.documents[0].meta.get("topic"),
        Some(&MetaValue::from("music"))
    );
    assert_eq!(
        converted.documents[1].meta.get("topic"),
        Some(&MetaValue::from("news"))
    );
}

#[test]
fn test_meta_length_mismatch_emits_nothing() {
    let converter = RssConverter::new();
    // The unreadable path would be recorded as a failure if any source
    // were resolved; the mismatch error proves the check runs first.
    let sources = vec![
        stream(&feed_with_marker(0)),
        stream(&feed_with_marker(1)),
        stream(&feed_with_marker(2)),
        Source::from("/nonexistent/feedstack-mismatch.rss"),
    ];

    let result = converter.convert(sources, MetaSpec::PerSource(vec![Meta::new(); 2]));

    match result {
        Err(ConvertError::MetaLengthMismatch { sources, meta }) => {
            assert_eq!(sources, 4);
            assert_eq!(meta, 2);
        }
        other => panic!("Expected MetaLengthMismatch, got {:?}", other),
    }
}

#[test]
fn test_tolerant_and_strict_differ_only_on_incomplete_entries() {
    let incomplete = r#"<?xml version="1.0"?>
<rss version="2.0"><channel>
    <item><title>Complete</title><description>entry</description></item>
    <item><title>No description here</title></item>
</channel></rss>"#;

    let strict = RssConverter::new()
        .convert(vec![stream(incomplete)], MetaSpec::None)
        .unwrap();
    assert!(strict.documents.is_empty());
    assert_eq!(strict.failures.len(), 1);

    let tolerant = RssConverter::with_extraction(EntryExtraction::Tolerant)
        .convert(vec![stream(incomplete)], MetaSpec::None)
        .unwrap();
    assert_eq!(tolerant.documents.len(), 1);
    assert_eq!(
        tolerant.documents[0].content,
        "Complete entry No description here"
    );
}

#[test]
fn test_converting_twice_yields_identical_documents() {
    let converter = RssConverter::new();
    let mut shared = Meta::new();
    shared.insert("run".to_string(), MetaValue::from("nightly"));

    let first = converter
        .convert(
            vec![stream(&feed_with_marker(3))],
            MetaSpec::Shared(shared.clone()),
        )
        .unwrap();
    let second = converter
        .convert(vec![stream(&feed_with_marker(3))], MetaSpec::Shared(shared))
        .unwrap();

    assert_eq!(first.documents, second.documents);
}

proptest! {
    /// Successful sources come out in input order, failures leave gaps:
    /// the emitted contents are exactly the markers of the valid sources.
    #[test]
    fn test_output_order_is_subsequence_of_input(validity in proptest::collection::vec(any::<bool>(), 0..12)) {
        let converter = RssConverter::new();
        let sources: Vec<Source> = validity
            .iter()
            .enumerate()
            .map(|(i, &valid)| {
                if valid {
                    stream(&feed_with_marker(i))
                } else {
                    stream("<broken")
                }
            })
            .collect();

        let converted = converter.convert(sources, MetaSpec::None).unwrap();

        let expected: Vec<String> = validity
            .iter()
            .enumerate()
            .filter(|(_, &valid)| valid)
            .map(|(i, _)| format!("marker-{} body", i))
            .collect();
        let actual: Vec<String> = converted
            .documents
            .iter()
            .map(|d| d.content.clone())
            .collect();

        prop_assert_eq!(actual, expected);
        prop_assert!(converted.documents.len() <= validity.len());
        prop_assert_eq!(
            converted.documents.len() + converted.failures.len(),
            validity.len()
        );
    }
}
