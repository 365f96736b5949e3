//! Tests for chunk normalization and the minimum-length filter.

use proptest::prelude::*;
use smartpdf_rag::{Chunk, ChunkFilter};

#[test]
fn drops_short_chunks_and_collapses_whitespace() {
    let long = "A paragraph   with\n\nplenty of\ttext to clear the fifty character bar.";
    let chunks = vec![
        Chunk::new("Page 3", "a.pdf", Some(2)),
        Chunk::new(long, "a.pdf", Some(2)),
        Chunk::new("   \n\n  ", "a.pdf", Some(3)),
    ];

    let kept = ChunkFilter::default().apply(chunks);

    assert_eq!(kept.len(), 1);
    assert_eq!(kept[0].text, "A paragraph with plenty of text to clear the fifty character bar.");
    assert_eq!(kept[0].metadata.page, Some(2));
    assert_eq!(kept[0].source(), "a.pdf");
}

#[test]
fn threshold_is_exclusive() {
    let filter = ChunkFilter::new(5);
    let kept = filter.apply(vec![
        Chunk::new("abcde", "x", None),
        Chunk::new("abcdef", "x", None),
        Chunk::new("  abc   de  ", "x", None),
    ]);
    let texts: Vec<&str> = kept.iter().map(|c| c.text.as_str()).collect();
    assert_eq!(texts, vec!["abcdef", "abc de"]);
}

/// **Property: filter output**
/// *For any* chunks, every surviving chunk is longer than the minimum after
/// normalization, contains no whitespace runs, and survivors keep their
/// relative input order.
mod prop_filter {
    use super::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(128))]

        #[test]
        fn survivors_are_long_normalized_and_ordered(
            texts in proptest::collection::vec("[a-z \\t\\n]{0,40}", 0..30),
            min_chars in 0usize..20,
        ) {
            let chunks: Vec<Chunk> = texts
                .iter()
                .enumerate()
                .map(|(i, text)| Chunk::new(text.clone(), format!("doc{i}"), Some(i)))
                .collect();

            let kept = ChunkFilter::new(min_chars).apply(chunks);

            let mut last_page = None;
            for chunk in &kept {
                prop_assert!(chunk.len() > min_chars);
                prop_assert!(!chunk.text.contains("  "));
                prop_assert!(!chunk.text.contains(['\t', '\n']));
                prop_assert_eq!(chunk.text.trim(), chunk.text.as_str());
                prop_assert_eq!(chunk.source(), format!("doc{}", chunk.metadata.page.unwrap()));
                prop_assert!(last_page < chunk.metadata.page);
                last_page = chunk.metadata.page;
            }
        }
    }
}
