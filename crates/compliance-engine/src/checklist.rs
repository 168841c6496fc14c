//! Checklist lookup and requirement matching
//!
//! Checklists are keyed by their `process` field (file stem as fallback)
//! and selected in three stages: exact key match, substring match in
//! either direction, then equality on the `process` field. Every stage
//! also requires the checklist's entity-type restriction to pass.

use std::path::Path;

use regex::Regex;
use shared_types::{
    ChecklistDefinition, FoundRequirement, MissingRequirement, ParsedDocument, RequirementResult,
};

use crate::conditions::{self, ConditionContext};
use crate::error::EngineError;

/// Broader content patterns per requirement family. A requirement picks up
/// every family whose keyword appears in its name.
const CATEGORY_PATTERNS: &[(&str, &[&str])] = &[
    (
        "articles",
        &[
            "articles of association",
            "memorandum of association",
            "constitution",
        ],
    ),
    (
        "register",
        &[
            "register of members",
            "register of directors",
            "share register",
            "member register",
        ],
    ),
    (
        "declaration",
        &[
            "ubo declaration",
            "ultimate beneficial owner",
            "beneficial ownership",
        ],
    ),
    (
        "application",
        &[
            "incorporation application",
            "application form",
            "registration application",
        ],
    ),
    (
        "reservation",
        &["name reservation", "reserved name", "company name"],
    ),
];

/// Loaded checklists in declaration order. Lookup prefers earlier entries.
#[derive(Debug, Clone, Default)]
pub struct ChecklistTable {
    checklists: Vec<ChecklistDefinition>,
}

impl ChecklistTable {
    pub fn new(checklists: Vec<ChecklistDefinition>) -> Self {
        let checklists = checklists.into_iter().map(|def| keyed(def, None)).collect();
        Self { checklists }
    }

    /// Checklists compiled into the engine.
    pub fn builtin() -> Self {
        let sources = [
            include_str!("../rules/checklists/company_incorporation.yml"),
            include_str!("../rules/checklists/employment.yml"),
            include_str!("../rules/checklists/annual_filings.yml"),
        ];
        let mut checklists = Vec::new();
        for source in sources {
            match serde_yaml::from_str::<ChecklistDefinition>(source) {
                Ok(def) => checklists.push(keyed(def, None)),
                Err(err) => {
                    tracing::warn!("Skipping malformed built-in checklist: {}", err);
                }
            }
        }
        Self { checklists }
    }

    /// Loads every `.yml`/`.yaml` checklist under `dir`, in path order.
    /// Malformed files are logged and skipped.
    pub fn load_dir(dir: &Path) -> Result<Self, EngineError> {
        let mut paths: Vec<_> = std::fs::read_dir(dir)?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| {
                matches!(
                    path.extension().and_then(|ext| ext.to_str()),
                    Some("yml") | Some("yaml")
                )
            })
            .collect();
        paths.sort();

        let mut checklists = Vec::new();
        for path in paths {
            let contents = std::fs::read_to_string(&path)?;
            match serde_yaml::from_str::<ChecklistDefinition>(&contents) {
                Ok(def) => {
                    let stem = path.file_stem().and_then(|s| s.to_str());
                    checklists.push(keyed(def, stem));
                }
                Err(err) => {
                    tracing::warn!("Skipping malformed checklist {}: {}", path.display(), err);
                }
            }
        }
        tracing::info!("Loaded {} checklists from {}", checklists.len(), dir.display());
        Ok(Self { checklists })
    }

    pub fn names(&self) -> Vec<String> {
        self.checklists.iter().map(|c| c.name.clone()).collect()
    }

    /// Finds the first checklist compatible with the detected process and
    /// entity type, or `None` when nothing fits.
    pub fn get_applicable(
        &self,
        process: &str,
        entity_type: &str,
    ) -> Option<&ChecklistDefinition> {
        let process_lower = process.to_lowercase();

        if let Some(checklist) = self.checklists.iter().find(|c| c.name == process) {
            if checklist_applies(checklist, entity_type) {
                return Some(checklist);
            }
            tracing::warn!(
                "Checklist '{}' matches process but not entity type: {}",
                checklist.name,
                entity_type
            );
        }

        for checklist in &self.checklists {
            let name_lower = checklist.name.to_lowercase();
            if (name_lower.contains(&process_lower) || process_lower.contains(&name_lower))
                && checklist_applies(checklist, entity_type)
            {
                return Some(checklist);
            }
        }

        self.checklists.iter().find(|c| {
            !c.process.is_empty()
                && c.process.to_lowercase() == process_lower
                && checklist_applies(c, entity_type)
        })
    }
}

fn keyed(mut def: ChecklistDefinition, stem: Option<&str>) -> ChecklistDefinition {
    if def.name.is_empty() {
        def.name = if def.process.is_empty() {
            stem.unwrap_or_default().to_string()
        } else {
            def.process.clone()
        };
    }
    def
}

/// True when the checklist's entity-type restriction allows `entity_type`.
/// An empty restriction allows everything; otherwise an exact match or a
/// case-insensitive substring in either direction passes.
pub fn checklist_applies(checklist: &ChecklistDefinition, entity_type: &str) -> bool {
    let restriction = &checklist.entity_type;
    if restriction.is_empty() {
        return true;
    }
    if entity_type == restriction {
        return true;
    }
    let entity_lower = entity_type.to_lowercase();
    let restriction_lower = restriction.to_lowercase();
    entity_lower.contains(&restriction_lower) || restriction_lower.contains(&entity_lower)
}

/// Matches the documents against every applicable checklist requirement.
///
/// The compliance score divides mandatory requirements found by all
/// mandatory requirements in the checklist, including any excluded by
/// their `applies_if` condition.
pub fn check_requirements(
    documents: &[ParsedDocument],
    checklist: &ChecklistDefinition,
    ctx: &ConditionContext,
) -> RequirementResult {
    let doc_names: Vec<String> = documents
        .iter()
        .map(|doc| doc.filename.to_lowercase())
        .collect();
    let doc_contents: Vec<String> = documents
        .iter()
        .map(|doc| doc.full_text.to_lowercase())
        .collect();
    let combined = doc_contents.join(" ");

    let mut found_requirements = Vec::new();
    let mut missing_requirements = Vec::new();

    for requirement in &checklist.requirements {
        if !conditions::applies(&requirement.applies_if, ctx) {
            continue;
        }
        match requirement_presence(&requirement.name, &doc_names, &doc_contents, &combined) {
            Some((confidence, found_in)) => found_requirements.push(FoundRequirement {
                requirement: requirement.name.clone(),
                confidence,
                found_in,
                mandatory: requirement.mandatory,
            }),
            None => missing_requirements.push(MissingRequirement {
                requirement: requirement.name.clone(),
                mandatory: requirement.mandatory,
                sources: requirement.sources.clone(),
            }),
        }
    }

    let mandatory_total = checklist.requirements.iter().filter(|r| r.mandatory).count();
    let mandatory_found = found_requirements.iter().filter(|r| r.mandatory).count();
    let compliance_score = if mandatory_total > 0 {
        mandatory_found as f64 / mandatory_total as f64
    } else {
        0.0
    };

    RequirementResult {
        total_requirements: checklist.requirements.len(),
        found_requirements,
        missing_requirements,
        compliance_score,
    }
}

/// Scores one requirement against the documents over three channels:
/// filename (+0.6), verbatim name in a document body (+0.3), and broader
/// content patterns over all bodies combined (+0.1). Each channel counts
/// once however many documents it matched; the sum is capped at 1.0.
fn requirement_presence(
    name: &str,
    doc_names: &[String],
    doc_contents: &[String],
    combined: &str,
) -> Option<(f64, Vec<String>)> {
    let name_lower = name.to_lowercase();
    let words: Vec<&str> = name_lower.split_whitespace().collect();

    let matched_names: Vec<String> = doc_names
        .iter()
        .filter(|doc_name| {
            doc_name.contains(&name_lower) || words.iter().any(|word| doc_name.contains(word))
        })
        .cloned()
        .collect();

    let matched_docs: Vec<String> = doc_contents
        .iter()
        .enumerate()
        .filter(|(_, content)| content.contains(&name_lower))
        .map(|(i, _)| format!("Document {}", i + 1))
        .collect();

    let matched_patterns: Vec<String> = requirement_patterns(name)
        .into_iter()
        .filter(|pattern| matches_insensitive(pattern, combined))
        .collect();

    let mut confidence: f64 = 0.0;
    let mut found_in = Vec::new();

    if !matched_names.is_empty() {
        confidence += 0.6;
        found_in.extend(matched_names);
    }
    if !matched_docs.is_empty() {
        confidence += 0.3;
        found_in.extend(matched_docs);
    }
    if !matched_patterns.is_empty() {
        confidence += 0.1;
        found_in.push(format!("Pattern matches: {}", matched_patterns.join(", ")));
    }

    (confidence > 0.0).then(|| (confidence.min(1.0), found_in))
}

fn requirement_patterns(name: &str) -> Vec<String> {
    let name_lower = name.to_lowercase();
    let mut patterns: Vec<String> = Vec::new();
    for (keyword, family) in CATEGORY_PATTERNS {
        if name_lower.contains(keyword) {
            patterns.extend(family.iter().map(|p| (*p).to_string()));
        }
    }
    patterns.push(regex::escape(name));
    patterns
}

fn matches_insensitive(pattern: &str, text: &str) -> bool {
    match Regex::new(&format!("(?i){pattern}")) {
        Ok(re) => re.is_match(text),
        Err(err) => {
            tracing::warn!("Skipping invalid requirement pattern '{}': {}", pattern, err);
            false
        }
    }
}
