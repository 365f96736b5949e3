//! Tests for recursive chunking: separator priority, size and overlap bounds.

use proptest::prelude::*;
use smartpdf_rag::{Chunker, Page, RecursiveChunker};

fn page(index: usize, text: &str) -> Page {
    Page { index, text: text.to_string() }
}

/// Longest suffix of `a` that is also a prefix of `b`, in characters.
fn shared_len(a: &str, b: &str) -> usize {
    b.char_indices()
        .map(|(i, c)| i + c.len_utf8())
        .filter(|&end| a.ends_with(&b[..end]))
        .map(|end| b[..end].chars().count())
        .max()
        .unwrap_or(0)
}

#[test]
fn sentence_boundary_is_used_before_character_cuts() {
    let chunker = RecursiveChunker::new(10, 0);
    assert_eq!(chunker.split_text("AAAA. BBBB. CCCC."), vec!["AAAA.", "BBBB.", "CCCC."]);

    let with_overlap = RecursiveChunker::new(10, 5);
    assert_eq!(with_overlap.split_text("AAAA. BBBB. CCCC."), vec!["AAAA.", "BBBB.", "CCCC."]);
}

#[test]
fn paragraph_break_is_preferred_over_sentence_break() {
    let chunker = RecursiveChunker::new(30, 0);
    let chunks = chunker.split_text("First paragraph here.\n\nSecond paragraph here.");
    assert_eq!(chunks, vec!["First paragraph here.", "Second paragraph here."]);
}

#[test]
fn line_break_is_used_inside_an_oversized_paragraph() {
    let chunker = RecursiveChunker::new(25, 0);
    let text = "alpha beta gamma\ndelta epsilon zeta\n\nshort";
    let chunks = chunker.split_text(text);
    assert_eq!(chunks, vec!["alpha beta gamma", "delta epsilon zeta", "short"]);
}

#[test]
fn unbroken_text_falls_back_to_character_cuts_with_overlap() {
    let chunker = RecursiveChunker::new(10, 3);
    let chunks = chunker.split_text("abcdefghijklmnopqrstuvwxyz");
    assert_eq!(chunks, vec!["abcdefghij", "hijklmnopq", "opqrstuvwx", "vwxyz"]);
}

#[test]
fn short_page_yields_a_single_chunk() {
    let chunker = RecursiveChunker::new(800, 150);
    assert_eq!(chunker.split_text("Tiny page."), vec!["Tiny page."]);
    assert!(chunker.split_text(" \n\n ").is_empty());
}

#[test]
fn multibyte_text_is_measured_in_characters() {
    let chunker = RecursiveChunker::new(4, 0);
    let chunks = chunker.split_text("ééééé");
    assert_eq!(chunks, vec!["éééé", "é"]);
}

#[test]
fn repeated_paragraphs_are_all_kept() {
    let paragraph = "Quarterly revenue rose by four percent on strong demand. ".repeat(10);
    let paragraph = paragraph.trim();
    let text = format!("{paragraph}\n\n{paragraph}");

    let chunks = RecursiveChunker::new(800, 150).split_text(&text);

    assert_eq!(chunks, vec![paragraph, paragraph]);
}

#[test]
fn repeated_characters_survive_single_character_chunks() {
    let chunker = RecursiveChunker::new(1, 0);
    assert_eq!(chunker.split_text("éé"), vec!["é", "é"]);
    assert_eq!(chunker.split_text("aaa"), vec!["a", "a", "a"]);
}

#[test]
fn chunks_carry_source_and_page() {
    let chunker = RecursiveChunker::new(40, 0);
    let pages = vec![
        page(0, "The first page talks about ownership."),
        page(1, "   \n  "),
        page(2, "The third page talks about borrowing and lifetimes in detail."),
    ];

    let chunks = chunker.chunk("guide.pdf", &pages);

    assert!(chunks.len() >= 2);
    assert!(chunks.iter().all(|c| c.source() == "guide.pdf"));
    assert_eq!(chunks[0].metadata.page, Some(0));
    assert!(chunks[1..].iter().all(|c| c.metadata.page == Some(2)));
}

#[test]
fn default_chunker_uses_800_and_150() {
    let text = "word ".repeat(1000);
    let chunks = RecursiveChunker::default().split_text(&text);
    assert!(chunks.iter().all(|c| c.chars().count() <= 800));
    assert!(chunks.len() > 5);
}

fn separator() -> impl Strategy<Value = &'static str> {
    prop_oneof![Just(" "), Just(" "), Just("\n"), Just("\n\n"), Just(". "), Just("! "), Just("? ")]
}

fn arb_text() -> impl Strategy<Value = String> {
    proptest::collection::vec(("[a-z]{1,10}", separator()), 1..120).prop_map(|tokens| {
        tokens
            .into_iter()
            .enumerate()
            .map(|(i, (word, sep))| format!("w{i}x{word}{sep}"))
            .collect()
    })
}

/// **Property: chunk bounds**
/// *For any* text, every chunk is non-empty and at most `chunk_size`
/// characters, consecutive chunks overlap by at most `chunk_overlap`
/// characters and are never identical, and every token survives in some chunk.
mod prop_chunk_bounds {
    use super::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(128))]

        #[test]
        fn chunks_respect_size_and_overlap(
            text in arb_text(),
            chunk_size in 20usize..300,
            overlap_ratio in 0.0f64..0.5,
        ) {
            let chunk_overlap = (chunk_size as f64 * overlap_ratio) as usize;
            let chunks = RecursiveChunker::new(chunk_size, chunk_overlap).split_text(&text);

            prop_assert!(!chunks.is_empty());
            for chunk in &chunks {
                prop_assert!(!chunk.is_empty());
                let len = chunk.chars().count();
                prop_assert!(len <= chunk_size, "chunk too long: {}", len);
            }
            for pair in chunks.windows(2) {
                prop_assert_ne!(&pair[0], &pair[1]);
                let shared = shared_len(&pair[0], &pair[1]);
                prop_assert!(shared <= chunk_overlap, "overlap {} > {}", shared, chunk_overlap);
            }
            for token in text.split_whitespace() {
                let token = token.trim_end_matches(['.', '!', '?']);
                prop_assert!(chunks.iter().any(|c| c.contains(token)), "lost token {}", token);
            }
        }
    }
}
