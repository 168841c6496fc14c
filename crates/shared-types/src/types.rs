#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Paragraph {
    pub text: String,
    pub style: String, // style tag from the source document, e.g. "Heading 1"
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Table {
    pub rows: Vec<Vec<String>>,
}

/// A document after text extraction. Owned by the caller; the engine only
/// ever reads it.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ParsedDocument {
    pub filename: String,
    pub full_text: String,
    pub paragraphs: Vec<Paragraph>,
    pub tables: Vec<Table>,
}

impl ParsedDocument {
    /// Build a document from bare text (for testing and plain-text callers).
    pub fn from_text(filename: impl Into<String>, full_text: impl Into<String>) -> Self {
        let full_text = full_text.into();
        let paragraphs = full_text
            .split("\n\n")
            .filter(|p| !p.trim().is_empty())
            .map(|p| Paragraph {
                text: p.trim().to_string(),
                style: "Normal".to_string(),
            })
            .collect();
        Self {
            filename: filename.into(),
            full_text,
            paragraphs,
            tables: Vec::new(),
        }
    }

    pub fn word_count(&self) -> usize {
        self.full_text.split_whitespace().count()
    }

    pub fn paragraph_count(&self) -> usize {
        self.paragraphs.len()
    }

    pub fn table_count(&self) -> usize {
        self.tables.len()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum Severity {
    High,
    Medium,
    Low,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::High => "High",
            Severity::Medium => "Medium",
            Severity::Low => "Low",
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A detected red flag. Appended to a flat list, never mutated afterwards.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Issue {
    pub rule: String,
    pub document: String, // resolves to a ParsedDocument filename
    pub issue: String,
    pub severity: Severity,
    pub citations: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Requirement {
    pub name: String,
    #[serde(default = "default_mandatory")]
    pub mandatory: bool,
    #[serde(default = "default_applies_if")]
    pub applies_if: String,
    #[serde(default)]
    pub sources: Vec<String>,
}

fn default_mandatory() -> bool {
    true
}

fn default_applies_if() -> String {
    "always".to_string()
}

/// One jurisdiction checklist, keyed by `name` in the loaded table. An empty
/// `entity_type` means the checklist applies to every entity type.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ChecklistDefinition {
    /// Table key; the loader falls back to `process`, then the file stem.
    #[serde(default)]
    pub name: String,
    pub process: String,
    #[serde(default)]
    pub entity_type: String,
    pub requirements: Vec<Requirement>,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct FoundRequirement {
    pub requirement: String,
    pub confidence: f64, // in [0, 1]
    pub found_in: Vec<String>,
    pub mandatory: bool,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct MissingRequirement {
    pub requirement: String,
    pub mandatory: bool,
    pub sources: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct RequirementResult {
    pub total_requirements: usize,
    pub found_requirements: Vec<FoundRequirement>,
    pub missing_requirements: Vec<MissingRequirement>,
    pub compliance_score: f64, // mandatory found / mandatory total; 0 when none are mandatory
}
