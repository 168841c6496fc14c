//! Report synthesis
//!
//! Merges classification, requirement matching, red flags, and regulatory
//! context into one flat, immutable report object.

use std::collections::HashSet;
use std::path::Path;

use chrono::{DateTime, Utc};
use shared_types::{
    AnalysisReport, ComplianceStatus, DocumentAnalysis, GapReport, Issue, MissingRequirement,
    ParsedDocument, RegulatoryContext, ReportIssue, Severity, Suggestion,
};

use crate::error::EngineError;

/// Remediation advice keyed by a word in the issue text. First hit wins.
const ISSUE_ADVICE: &[(&str, &str)] = &[
    (
        "jurisdiction",
        "Update jurisdiction clause to reference ADGM laws and courts.",
    ),
    (
        "signature",
        "Ensure all required signatures are present with proper capacity and dates.",
    ),
    (
        "register",
        "Prepare and maintain the required register as per ADGM regulations.",
    ),
    (
        "template",
        "Complete all template fields and remove placeholder text.",
    ),
    (
        "share capital",
        "Remove references to share capital for companies limited by guarantee.",
    ),
];

const GENERIC_ADVICE: &str =
    "Please review and address the identified issue according to ADGM requirements.";

const TIME_ESTIMATES: &[(&str, &str)] = &[
    ("articles of association", "1-2 days"),
    ("register of members", "1 day"),
    ("register of directors", "1 day"),
    ("ubo declaration", "2-3 days"),
    ("incorporation application", "1 day"),
    ("name reservation", "1 day"),
];

const REQUIREMENT_NOTES: &[(&str, &str)] = &[
    (
        "articles of association",
        "Must comply with ADGM Companies Regulations 2020",
    ),
    (
        "register of members",
        "Must be maintained and updated within 14 days of changes",
    ),
    (
        "register of directors",
        "Must include residential address and date of birth",
    ),
    (
        "ubo declaration",
        "Must identify ultimate beneficial owners with 25%+ ownership",
    ),
    (
        "incorporation application",
        "Must be signed by all proposed directors",
    ),
    (
        "name reservation",
        "Name must be available and comply with naming conventions",
    ),
];

const GENERIC_NOTE: &str = "Please refer to ADGM guidance for specific requirements.";

/// Builds the final flat report from the analysis and gap-report stages.
/// `documents` is the analyzed batch, used to resolve issue locations back
/// to uploaded filenames.
pub fn build_report(
    analysis: &DocumentAnalysis,
    gap: &GapReport,
    documents: &[ParsedDocument],
) -> AnalysisReport {
    let issues_found = analysis
        .redflags
        .iter()
        .map(|issue| report_issue(issue, documents))
        .collect();

    AnalysisReport {
        process: analysis.process.clone(),
        entity_type: analysis.entity_type.clone(),
        documents_uploaded: gap.documents_uploaded,
        required_documents: gap.requirement_analysis.total_requirements,
        missing_document: missing_document(&gap.requirement_analysis.missing_requirements),
        issues_found,
        compliance_score: gap.requirement_analysis.compliance_score,
        compliance_status: gap.compliance_status,
        suggestions: gap.suggestions.clone(),
        regulatory_context: gap.regulatory_context.clone(),
        citations: collect_report_citations(&analysis.redflags, &gap.regulatory_context),
        analysis_timestamp: Utc::now().to_rfc3339(),
    }
}

/// The single most pressing gap: the first mandatory missing requirement,
/// else the first missing requirement of any kind.
pub fn missing_document(missing: &[MissingRequirement]) -> Option<String> {
    missing
        .iter()
        .find(|req| req.mandatory)
        .or_else(|| missing.first())
        .map(|req| req.requirement.clone())
}

/// One remediation suggestion per missing requirement.
pub fn suggestions_for_missing(missing: &[MissingRequirement]) -> Vec<Suggestion> {
    missing
        .iter()
        .map(|req| Suggestion {
            requirement: req.requirement.clone(),
            action: format!("Obtain or prepare {}", req.requirement),
            priority: if req.mandatory {
                Severity::High
            } else {
                Severity::Medium
            },
            sources: req.sources.clone(),
            estimated_time: estimated_completion_time(&req.requirement).to_string(),
            notes: requirement_notes(&req.requirement).to_string(),
        })
        .collect()
}

/// Citations from every issue plus every retrieved source URL, first seen
/// first, duplicates and empty strings dropped.
pub fn collect_report_citations(issues: &[Issue], context: &RegulatoryContext) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut citations = Vec::new();
    let sources = issues
        .iter()
        .flat_map(|issue| issue.citations.iter())
        .chain(context.relevant_sources.iter().map(|source| &source.url));
    for citation in sources {
        if citation.is_empty() {
            continue;
        }
        if seen.insert(citation.clone()) {
            citations.push(citation.clone());
        }
    }
    citations
}

/// Writes the report as pretty-printed JSON, creating parent directories
/// as needed.
pub fn save_report(report: &AnalysisReport, path: &Path) -> Result<(), EngineError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(report)?;
    std::fs::write(path, json)?;
    tracing::info!("Report saved to: {}", path.display());
    Ok(())
}

/// Standardized report filename, e.g.
/// `adgm_analysis_company_incorporation_branch_(non-financial)_20240312_093000.json`.
pub fn report_filename(process: &str, entity_type: &str, timestamp: DateTime<Utc>) -> String {
    format!(
        "adgm_analysis_{}_{}_{}.json",
        filename_component(process),
        filename_component(entity_type),
        timestamp.format("%Y%m%d_%H%M%S")
    )
}

fn filename_component(part: &str) -> String {
    part.replace(' ', "_").replace('/', "_").to_lowercase()
}

/// Condensed view of a report for listings and logs.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ReportSummary {
    pub process: String,
    pub entity_type: String,
    pub compliance_status: ComplianceStatus,
    pub compliance_score: f64,
    pub total_issues: usize,
    pub critical_issues: usize,
    pub missing_requirements: usize,
    pub key_missing_document: Option<String>,
    pub analysis_timestamp: String,
}

pub fn summarize(report: &AnalysisReport) -> ReportSummary {
    ReportSummary {
        process: report.process.clone(),
        entity_type: report.entity_type.clone(),
        compliance_status: report.compliance_status,
        compliance_score: report.compliance_score,
        total_issues: report.issues_found.len(),
        critical_issues: report
            .issues_found
            .iter()
            .filter(|issue| issue.severity == Severity::High)
            .count(),
        missing_requirements: report.suggestions.len(),
        key_missing_document: report.missing_document.clone(),
        analysis_timestamp: report.analysis_timestamp.clone(),
    }
}

fn report_issue(issue: &Issue, documents: &[ParsedDocument]) -> ReportIssue {
    let document = resolve_document(documents, &issue.document)
        .map(|doc| doc.filename.clone())
        .unwrap_or_else(|| issue.document.clone());
    ReportIssue {
        document,
        section: String::new(),
        issue: issue.issue.clone(),
        severity: issue.severity,
        suggestion: issue_suggestion(&issue.issue).to_string(),
    }
}

/// Exact filename match first, then a case-insensitive substring in either
/// direction.
fn resolve_document<'a>(
    documents: &'a [ParsedDocument],
    name: &str,
) -> Option<&'a ParsedDocument> {
    let name_lower = name.to_lowercase();
    documents
        .iter()
        .find(|doc| doc.filename.to_lowercase() == name_lower)
        .or_else(|| {
            documents.iter().find(|doc| {
                let filename_lower = doc.filename.to_lowercase();
                name_lower.contains(&filename_lower) || filename_lower.contains(&name_lower)
            })
        })
}

fn issue_suggestion(issue_text: &str) -> &'static str {
    let issue_lower = issue_text.to_lowercase();
    ISSUE_ADVICE
        .iter()
        .find(|(keyword, _)| issue_lower.contains(keyword))
        .map(|(_, advice)| *advice)
        .unwrap_or(GENERIC_ADVICE)
}

fn estimated_completion_time(requirement: &str) -> &'static str {
    let req_lower = requirement.to_lowercase();
    TIME_ESTIMATES
        .iter()
        .find(|(key, _)| req_lower.contains(key))
        .map(|(_, estimate)| *estimate)
        .unwrap_or("1-3 days")
}

fn requirement_notes(requirement: &str) -> &'static str {
    let req_lower = requirement.to_lowercase();
    REQUIREMENT_NOTES
        .iter()
        .find(|(key, _)| req_lower.contains(key))
        .map(|(_, note)| *note)
        .unwrap_or(GENERIC_NOTE)
}
