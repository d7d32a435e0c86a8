//! Overlapping text windows with layered separator preference.
//!
//! Splits document text at the highest-priority separator (paragraph break,
//! then line break, then space) that keeps every window within
//! `max_chunk_size` bytes, falling back to character boundaries for
//! unbreakable runs. Consecutive windows share up to `overlap_size` bytes
//! of boundary text so that meaning spanning a cut survives retrieval.
//!
//! Splitting is a pure function of its input and configuration: the same
//! document and settings always produce the same windows, which keeps
//! chunk ids stable across re-ingestion.

use crate::config::ChunkingConfig;
use crate::enrich;
use crate::models::{Chunk, RawDocument};

const SEPARATORS: [&str; 3] = ["\n\n", "\n", " "];

/// Split `text` into windows of at most `max_chunk_size` bytes with
/// `overlap_size` bytes of shared boundary context. Empty or whitespace-only
/// text produces zero windows.
pub fn split_text(text: &str, cfg: &ChunkingConfig) -> Vec<String> {
    if text.trim().is_empty() {
        return Vec::new();
    }
    let mut fragments = Vec::new();
    split_level(text, &SEPARATORS, cfg.max_chunk_size, &mut fragments);
    merge_fragments(fragments, cfg.max_chunk_size, cfg.overlap_size)
}

/// Chunk every document, numbering each document's windows `0..n-1` and
/// assigning run-wide ordinals so chunk ids stay unique even when one
/// source loads as many documents.
pub fn chunk_documents(documents: &[RawDocument], cfg: &ChunkingConfig) -> Vec<Chunk> {
    let mut chunks = Vec::new();
    let mut ordinal = 0usize;

    for doc in documents {
        let windows = split_text(&doc.text, cfg);
        let total = windows.len();
        for (index, text) in windows.into_iter().enumerate() {
            chunks.push(enrich::stamp_chunk(&doc.meta, text, ordinal, index, total));
            ordinal += 1;
        }
    }

    chunks
}

/// Break `text` into fragments no larger than `max`, preferring the
/// earliest separator in `seps` that actually occurs. Separators stay
/// attached to the preceding fragment so merging is plain concatenation.
fn split_level(text: &str, seps: &[&str], max: usize, out: &mut Vec<String>) {
    if text.len() <= max {
        if !text.is_empty() {
            out.push(text.to_string());
        }
        return;
    }

    match seps.split_first() {
        Some((sep, rest)) => {
            if text.contains(sep) {
                for piece in split_keep_separator(text, sep) {
                    if piece.len() <= max {
                        out.push(piece.to_string());
                    } else {
                        split_level(piece, rest, max, out);
                    }
                }
            } else {
                split_level(text, rest, max, out);
            }
        }
        None => split_chars(text, max, out),
    }
}

/// Split on `sep`, keeping the separator on the end of each piece.
fn split_keep_separator<'a>(text: &'a str, sep: &str) -> Vec<&'a str> {
    let mut pieces = Vec::new();
    let mut start = 0;
    for (idx, matched) in text.match_indices(sep) {
        let end = idx + matched.len();
        pieces.push(&text[start..end]);
        start = end;
    }
    if start < text.len() {
        pieces.push(&text[start..]);
    }
    pieces
}

/// Last-resort split for runs with no separator at all: hard windows on
/// character boundaries.
fn split_chars(text: &str, max: usize, out: &mut Vec<String>) {
    let mut buf = String::new();
    for ch in text.chars() {
        if !buf.is_empty() && buf.len() + ch.len_utf8() > max {
            out.push(std::mem::take(&mut buf));
        }
        buf.push(ch);
    }
    if !buf.is_empty() {
        out.push(buf);
    }
}

/// Greedily pack fragments into windows of at most `max` bytes. When a
/// window is emitted, up to `overlap` trailing bytes are carried into the
/// next window (shrunk if the incoming fragment would not otherwise fit).
fn merge_fragments(fragments: Vec<String>, max: usize, overlap: usize) -> Vec<String> {
    let mut chunks: Vec<String> = Vec::new();
    let mut buf = String::new();

    for frag in fragments {
        if !buf.is_empty() && buf.len() + frag.len() > max {
            let carry = overlap.min(max.saturating_sub(frag.len()));
            let flushed = std::mem::take(&mut buf);
            buf.push_str(tail(&flushed, carry));
            if !flushed.trim().is_empty() {
                chunks.push(flushed);
            }
        }
        buf.push_str(&frag);
    }

    if !buf.trim().is_empty() {
        chunks.push(buf);
    }

    chunks
}

/// Suffix of at most `max_bytes`, aligned to a character boundary.
fn tail(text: &str, max_bytes: usize) -> &str {
    if text.len() <= max_bytes {
        return text;
    }
    let mut start = text.len() - max_bytes;
    while !text.is_char_boundary(start) {
        start += 1;
    }
    &text[start..]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ContentKind, DocumentMeta};

    fn cfg(max: usize, overlap: usize) -> ChunkingConfig {
        ChunkingConfig {
            max_chunk_size: max,
            overlap_size: overlap,
        }
    }

    fn doc(source: &str, text: &str) -> RawDocument {
        RawDocument {
            text: text.to_string(),
            meta: DocumentMeta {
                source: source.to_string(),
                source_type: ContentKind::Text,
                ingestion_timestamp: "2026-01-01T00:00:00+00:00".to_string(),
            },
        }
    }

    #[test]
    fn windows_respect_max_size() {
        let text = "one two three four five six seven eight nine ten eleven twelve";
        for (max, overlap) in [(20, 5), (15, 4), (30, 10)] {
            let windows = split_text(text, &cfg(max, overlap));
            assert!(!windows.is_empty());
            for w in &windows {
                assert!(w.len() <= max, "window '{}' exceeds {} bytes", w, max);
            }
        }
    }

    #[test]
    fn consecutive_windows_share_boundary_text() {
        let text = "alpha beta gamma delta epsilon zeta eta theta iota kappa";
        let overlap = 8;
        let windows = split_text(text, &cfg(24, overlap));
        assert!(windows.len() > 1);
        for pair in windows.windows(2) {
            let shared = (1..=overlap.min(pair[0].len()))
                .rev()
                .find(|&o| pair[1].starts_with(&pair[0][pair[0].len() - o..]));
            assert!(
                shared.is_some(),
                "'{}' and '{}' share no boundary text",
                pair[0],
                pair[1]
            );
        }
    }

    #[test]
    fn prefers_paragraph_breaks_over_spaces() {
        let text = "first paragraph here\n\nsecond paragraph here";
        let windows = split_text(text, &cfg(25, 0));
        assert_eq!(windows.len(), 2);
        assert!(windows[0].starts_with("first paragraph"));
        assert!(windows[1].starts_with("second paragraph"));
    }

    #[test]
    fn unbreakable_run_hard_splits_without_loss() {
        let text = "a".repeat(95);
        let overlap = 5;
        let windows = split_text(&text, &cfg(10, overlap));
        for w in &windows {
            assert!(w.len() <= 10);
            assert!(w.bytes().all(|b| b == b'a'), "window holds foreign bytes");
        }
        // Windows cover the whole input; boundary bytes may be duplicated,
        // but never by more than the configured overlap per boundary.
        let total: usize = windows.iter().map(String::len).sum();
        assert!(total >= text.len(), "input bytes were dropped");
        assert!(total <= text.len() + overlap * (windows.len() - 1));
    }

    #[test]
    fn empty_and_blank_documents_produce_no_windows() {
        assert!(split_text("", &cfg(100, 10)).is_empty());
        assert!(split_text("   \n\n  ", &cfg(100, 10)).is_empty());
    }

    #[test]
    fn splitting_is_deterministic() {
        let text = "The sky is blue. Grass is green. Roses are red and violets are blue.";
        let a = split_text(text, &cfg(20, 5));
        let b = split_text(text, &cfg(20, 5));
        assert_eq!(a, b);
    }

    #[test]
    fn sky_scenario_yields_small_overlapping_windows() {
        let windows = split_text("The sky is blue. Grass is green.", &cfg(20, 5));
        assert!((2..=3).contains(&windows.len()), "got {:?}", windows);
        for w in &windows {
            assert!(w.len() <= 20);
        }
        assert!(windows.iter().any(|w| w.contains("sky is blue")));
    }

    #[test]
    fn chunk_ids_are_unique_and_stable() {
        let docs = vec![doc("notes.txt", "alpha beta gamma delta epsilon zeta")];
        let first = chunk_documents(&docs, &cfg(12, 3));
        let second = chunk_documents(&docs, &cfg(12, 3));

        let ids: Vec<&str> = first.iter().map(|c| c.meta.chunk_id.as_str()).collect();
        let mut deduped = ids.clone();
        deduped.dedup();
        assert_eq!(ids, deduped, "chunk ids must be unique within a run");

        assert_eq!(ids[0], "notes.txt_0");
        let again: Vec<&str> = second.iter().map(|c| c.meta.chunk_id.as_str()).collect();
        assert_eq!(ids, again, "re-chunking must produce identical ids in order");
    }

    #[test]
    fn multi_document_sources_keep_ids_unique() {
        let docs = vec![
            doc("rows.csv", "name: ada\nrole: engineer"),
            doc("rows.csv", "name: grace\nrole: admiral"),
        ];
        let chunks = chunk_documents(&docs, &cfg(100, 10));
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].meta.chunk_id, "rows.csv_0");
        assert_eq!(chunks[1].meta.chunk_id, "rows.csv_1");
        // Per-document numbering restarts; run-wide ordinals do not.
        assert_eq!(chunks[1].meta.chunk_index, 0);
        assert_eq!(chunks[1].ordinal, 1);
    }

    #[test]
    fn per_document_numbering_and_totals() {
        let docs = vec![doc("long.txt", "alpha beta gamma delta epsilon zeta eta theta")];
        let chunks = chunk_documents(&docs, &cfg(16, 4));
        let total = chunks.len();
        assert!(total > 1);
        for (i, c) in chunks.iter().enumerate() {
            assert_eq!(c.meta.chunk_index, i);
            assert_eq!(c.meta.total_chunks, total);
            assert_eq!(c.meta.original_source, "long.txt");
        }
    }
}
