pub mod report;
pub mod types;

pub use report::{
    AnalysisReport, ComplianceStatus, DocumentAnalysis, GapReport, RegulatoryContext,
    RegulatorySource, ReportIssue, Suggestion,
};
pub use types::{
    ChecklistDefinition, FoundRequirement, Issue, MissingRequirement, Paragraph, ParsedDocument,
    Requirement, RequirementResult, Severity, Table,
};
