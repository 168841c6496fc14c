//! Process and entity-type detection
//!
//! Process detection scores the total pattern-match count per candidate and
//! keeps the strict maximum; entity detection walks an ordered list and stops
//! at the first hit. The asymmetry is deliberate: process vocabularies
//! overlap across a document set, entity phrasing is a priority list.

use lazy_static::lazy_static;
use regex::Regex;
use shared_types::ParsedDocument;

/// Sentinel process when no pattern matches at all.
pub const GENERAL_REVIEW: &str = "General Review";

/// Candidate processes in declaration order; order breaks score ties.
const PROCESS_PATTERNS: &[(&str, &[&str])] = &[
    (
        "Company Incorporation",
        &[
            r"incorporation",
            r"articles of association",
            r"memorandum of association",
            r"register of members",
            r"register of directors",
            r"ubo declaration",
            r"name reservation",
        ],
    ),
    (
        "Employment",
        &[
            r"employment contract",
            r"employee handbook",
            r"terms of employment",
            r"er 2024",
            r"employment regulations",
        ],
    ),
    (
        "Post Registration",
        &[
            r"articles amendment",
            r"shareholder resolution",
            r"board resolution",
            r"change of directors",
            r"change of registered office",
        ],
    ),
    (
        "Annual Filings",
        &[
            r"annual accounts",
            r"annual return",
            r"annual filing",
            r"financial statements",
        ],
    ),
];

/// Entity types in priority order; the first matching pattern decides.
const ENTITY_PATTERNS: &[(&str, &[&str])] = &[
    (
        "Private Company Limited by Shares (Non-Financial)",
        &[
            r"private company limited by shares",
            r"limited by shares",
            r"share capital",
            r"shares issued",
        ],
    ),
    (
        "Private Company Limited by Guarantee (Non-Financial)",
        &[
            r"limited by guarantee",
            r"guarantee company",
            r"no share capital",
        ],
    ),
    (
        "Branch (Non-Financial)",
        &[r"branch office", r"branch registration", r"foreign company"],
    ),
];

lazy_static! {
    static ref PROCESS_REGEXES: Vec<(&'static str, Vec<Regex>)> = compile_table(PROCESS_PATTERNS);
    static ref ENTITY_REGEXES: Vec<(&'static str, Vec<Regex>)> = compile_table(ENTITY_PATTERNS);
}

fn compile_table(table: &[(&'static str, &[&str])]) -> Vec<(&'static str, Vec<Regex>)> {
    table
        .iter()
        .map(|(label, patterns)| {
            let regexes = patterns
                .iter()
                .map(|p| Regex::new(p).unwrap())
                .collect::<Vec<_>>();
            (*label, regexes)
        })
        .collect()
}

fn combined_text(documents: &[ParsedDocument]) -> String {
    documents
        .iter()
        .map(|d| d.full_text.to_lowercase())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Picks the process whose patterns match most often across all documents.
/// Ties keep the earlier table entry; zero matches everywhere yields
/// [`GENERAL_REVIEW`].
pub fn detect_process(documents: &[ParsedDocument]) -> String {
    let text = combined_text(documents);
    let mut best: Option<(&str, usize)> = None;
    for (process, regexes) in PROCESS_REGEXES.iter() {
        let count: usize = regexes.iter().map(|r| r.find_iter(&text).count()).sum();
        tracing::debug!("Process '{}' scored {} pattern matches", process, count);
        if count > 0 && best.map_or(true, |(_, top)| count > top) {
            best = Some((process, count));
        }
    }
    best.map(|(process, _)| process.to_string())
        .unwrap_or_else(|| GENERAL_REVIEW.to_string())
}

/// Returns the first entity type with any pattern hit, else the configured
/// default. List order encodes priority.
pub fn detect_entity_type(documents: &[ParsedDocument], default_entity_type: &str) -> String {
    let text = combined_text(documents);
    for (entity_type, regexes) in ENTITY_REGEXES.iter() {
        if regexes.iter().any(|r| r.is_match(&text)) {
            return entity_type.to_string();
        }
    }
    tracing::debug!(
        "No entity-type pattern matched, defaulting to '{}'",
        default_entity_type
    );
    default_entity_type.to_string()
}
