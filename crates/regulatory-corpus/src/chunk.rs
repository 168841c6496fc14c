//! Text chunking for index ingestion
//!
//! Splits cleaned source text into overlapping windows, preferring to break
//! at a sentence boundary when one falls near the window end. Ingestion
//! itself (fetching, parsing, embedding the chunks) is the caller's job.

pub const DEFAULT_CHUNK_SIZE: usize = 1000;
pub const DEFAULT_CHUNK_OVERLAP: usize = 120;

/// How far back from the window end a sentence boundary is still preferred.
const BOUNDARY_LOOKBACK: usize = 100;

/// Collapses whitespace runs to single spaces and strips control characters.
pub fn clean_text(text: &str) -> String {
    let printable: String = text
        .chars()
        .filter(|c| !c.is_control() || c.is_whitespace())
        .collect();
    printable.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Splits `text` into chunks of at most `chunk_size` characters with
/// `overlap` characters carried between consecutive chunks.
pub fn chunk_text(text: &str, chunk_size: usize, overlap: usize) -> Vec<String> {
    let cleaned = clean_text(text);
    let chars: Vec<char> = cleaned.chars().collect();
    if chars.is_empty() || chunk_size == 0 {
        return Vec::new();
    }
    if chars.len() <= chunk_size {
        return vec![cleaned];
    }
    let overlap = overlap.min(chunk_size - 1);

    let mut chunks = Vec::new();
    let mut start = 0usize;
    while start < chars.len() {
        let mut end = (start + chunk_size).min(chars.len());
        if end < chars.len() {
            if let Some(boundary) = sentence_boundary(&chars, start, end) {
                end = boundary;
            }
        }
        let chunk: String = chars[start..end].iter().collect();
        let trimmed = chunk.trim();
        if !trimmed.is_empty() {
            chunks.push(trimmed.to_string());
        }
        if end >= chars.len() {
            break;
        }
        let next = end.saturating_sub(overlap);
        start = if next > start { next } else { end };
    }
    chunks
}

/// Finds the last ". " inside the lookback window, returning the index just
/// past the period.
fn sentence_boundary(chars: &[char], start: usize, end: usize) -> Option<usize> {
    let floor = end.saturating_sub(BOUNDARY_LOOKBACK).max(start + 1);
    for i in (floor..end.saturating_sub(1)).rev() {
        if chars[i] == '.' && chars[i + 1] == ' ' {
            return Some(i + 1);
        }
    }
    None
}
