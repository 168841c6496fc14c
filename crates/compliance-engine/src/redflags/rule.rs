//! Red-flag rule configuration: serde model, YAML loading, built-in sets

use serde::{Deserialize, Serialize};
use shared_types::Severity;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::EngineError;

/// Wildcard scope: the rule set applies to every detected process.
pub const GENERAL_SCOPE: &str = "General Corporate Docs";

/// Wildcard entry in `applies_to_docs`.
pub const ALL_DOCS: &str = "All";

/// One YAML file's worth of rules, gated by process scope. Rules live in a
/// BTreeMap so evaluation order is stable regardless of YAML key order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedFlagRuleSet {
    pub scope: String,
    pub rules: BTreeMap<String, RuleConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleConfig {
    #[serde(default = "default_applies_if")]
    pub applies_if: String,
    /// Entity-type conditions, OR-combined. Empty means unconditional.
    #[serde(default)]
    pub trigger_if: Vec<String>,
    /// Exact filenames this rule inspects, or the wildcard "All".
    #[serde(default = "default_applies_to_docs")]
    pub applies_to_docs: Vec<String>,
    /// Unset falls back to the kind's default severity.
    #[serde(default)]
    pub severity: Option<Severity>,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub citations: Vec<String>,
    #[serde(flatten)]
    pub kind: RuleKind,
}

fn default_applies_if() -> String {
    "always".to_string()
}

fn default_applies_to_docs() -> Vec<String> {
    vec![ALL_DOCS.to_string()]
}

/// The closed set of rule kinds, dispatched on the YAML `kind` field.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RuleKind {
    /// Forbidden pattern present and, when `require_phrase` is set, the
    /// counter-phrase absent.
    PatternPresence {
        patterns_any: Vec<String>,
        #[serde(default)]
        require_phrase: Option<String>,
    },
    /// Named structural probes that must all pass; failures are reported in
    /// one combined issue.
    StructuralCheck { checks: Vec<String> },
    /// Any forbidden phrase present.
    SemanticCheck { forbidden_phrases: Vec<String> },
    /// Curated indicators with hard-wired detection logic.
    Heuristic { indicators_any: Vec<String> },
}

impl RuleKind {
    pub fn default_severity(&self) -> Severity {
        match self {
            RuleKind::PatternPresence { .. } => Severity::Medium,
            RuleKind::StructuralCheck { .. } => Severity::Medium,
            RuleKind::SemanticCheck { .. } => Severity::High,
            RuleKind::Heuristic { .. } => Severity::Low,
        }
    }
}

impl RedFlagRuleSet {
    pub fn from_yaml(yaml: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(yaml)
    }

    pub fn from_file(path: &Path) -> Result<Self, EngineError> {
        let text = fs::read_to_string(path)?;
        Self::from_yaml(&text).map_err(|source| EngineError::Configuration {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// Loads every `.yml`/`.yaml` rule set under `dir`, in filename order.
/// Malformed files are logged and skipped; only directory access errors
/// surface.
pub fn load_rule_sets(dir: &Path) -> Result<Vec<RedFlagRuleSet>, EngineError> {
    let mut paths: Vec<PathBuf> = fs::read_dir(dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| {
            matches!(
                p.extension().and_then(|e| e.to_str()),
                Some("yml") | Some("yaml")
            )
        })
        .collect();
    paths.sort();

    let mut sets = Vec::new();
    for path in paths {
        match RedFlagRuleSet::from_file(&path) {
            Ok(set) => sets.push(set),
            Err(err) => {
                tracing::error!("Skipping rule file {}: {}", path.display(), err);
            }
        }
    }
    Ok(sets)
}

/// Rule sets compiled into the binary; the starting point when no rules
/// directory is supplied.
pub fn builtin_rule_sets() -> Vec<RedFlagRuleSet> {
    const SOURCES: &[(&str, &str)] = &[
        (
            "general_corporate.yml",
            include_str!("../../rules/redflags/general_corporate.yml"),
        ),
        (
            "incorporation.yml",
            include_str!("../../rules/redflags/incorporation.yml"),
        ),
        (
            "employment.yml",
            include_str!("../../rules/redflags/employment.yml"),
        ),
    ];
    SOURCES
        .iter()
        .filter_map(|(name, text)| match RedFlagRuleSet::from_yaml(text) {
            Ok(set) => Some(set),
            Err(err) => {
                tracing::error!("Built-in rule set {} failed to parse: {}", name, err);
                None
            }
        })
        .collect()
}
