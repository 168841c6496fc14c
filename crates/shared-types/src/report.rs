use crate::types::{Issue, RequirementResult, Severity};

/// Banded compliance verdict derived from the mandatory-requirement score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum ComplianceStatus {
    #[serde(rename = "Compliant")]
    Compliant,
    #[serde(rename = "Mostly Compliant")]
    MostlyCompliant,
    #[serde(rename = "Partially Compliant")]
    PartiallyCompliant,
    #[serde(rename = "Non-Compliant")]
    NonCompliant,
}

impl ComplianceStatus {
    pub fn from_score(score: f64) -> Self {
        if score >= 0.9 {
            ComplianceStatus::Compliant
        } else if score >= 0.7 {
            ComplianceStatus::MostlyCompliant
        } else if score >= 0.5 {
            ComplianceStatus::PartiallyCompliant
        } else {
            ComplianceStatus::NonCompliant
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ComplianceStatus::Compliant => "Compliant",
            ComplianceStatus::MostlyCompliant => "Mostly Compliant",
            ComplianceStatus::PartiallyCompliant => "Partially Compliant",
            ComplianceStatus::NonCompliant => "Non-Compliant",
        }
    }
}

impl std::fmt::Display for ComplianceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Remediation step for a missing requirement.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Suggestion {
    pub requirement: String,
    pub action: String,
    pub priority: Severity,
    pub sources: Vec<String>,
    pub estimated_time: String,
    pub notes: String,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct RegulatorySource {
    pub title: String,
    pub url: String,
    pub relevance_score: f64,
}

/// Regulatory background retrieved for the detected process. Empty when
/// retrieval degraded; that is "no authoritative source found", not an error.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct RegulatoryContext {
    pub relevant_sources: Vec<RegulatorySource>,
    pub key_regulations: Vec<String>,
    pub compliance_deadlines: Vec<String>,
}

/// Output of the first analysis pass: classification plus red flags.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct DocumentAnalysis {
    pub process: String,
    pub entity_type: String,
    pub redflags: Vec<Issue>,
    pub document_count: usize,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct GapReport {
    pub process: String,
    pub entity_type: String,
    pub checklist_used: String,
    pub documents_uploaded: usize,
    pub requirement_analysis: RequirementResult,
    pub suggestions: Vec<Suggestion>,
    pub regulatory_context: RegulatoryContext,
    pub compliance_status: ComplianceStatus,
}

/// Issue as it appears in the final report, with remediation advice attached.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ReportIssue {
    pub document: String,
    pub section: String,
    pub issue: String,
    pub severity: Severity,
    pub suggestion: String,
}

/// Flat, immutable snapshot of one analysis run.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct AnalysisReport {
    pub process: String,
    pub entity_type: String,
    pub documents_uploaded: usize,
    pub required_documents: usize,
    pub missing_document: Option<String>,
    pub issues_found: Vec<ReportIssue>,
    pub compliance_score: f64,
    pub compliance_status: ComplianceStatus,
    pub suggestions: Vec<Suggestion>,
    pub regulatory_context: RegulatoryContext,
    pub citations: Vec<String>,
    pub analysis_timestamp: String, // RFC 3339, UTC
}
