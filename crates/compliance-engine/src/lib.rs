pub mod checklist;
pub mod conditions;
pub mod config;
pub mod detect;
pub mod error;
pub mod redflags;
pub mod report;

use std::sync::Arc;

use regulatory_corpus::RegulatoryRetriever;
use shared_types::{
    AnalysisReport, ComplianceStatus, DocumentAnalysis, GapReport, ParsedDocument,
    RegulatoryContext, RegulatorySource,
};

pub use checklist::ChecklistTable;
pub use config::EngineConfig;
pub use error::EngineError;
pub use redflags::RedFlagRuleSet;

use conditions::ConditionContext;

/// Engine entry point. Construct once with its rule and checklist tables,
/// then reuse read-only across analyses.
pub struct ComplianceAnalyzer {
    config: EngineConfig,
    checklists: ChecklistTable,
    rule_sets: Vec<RedFlagRuleSet>,
    retriever: Option<Arc<RegulatoryRetriever>>,
}

impl ComplianceAnalyzer {
    /// Analyzer with the built-in checklists and red-flag rules.
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            checklists: ChecklistTable::builtin(),
            rule_sets: redflags::builtin_rule_sets(),
            retriever: None,
        }
    }

    pub fn with_checklists(mut self, checklists: ChecklistTable) -> Self {
        self.checklists = checklists;
        self
    }

    pub fn with_rules(mut self, rule_sets: Vec<RedFlagRuleSet>) -> Self {
        self.rule_sets = rule_sets;
        self
    }

    /// Attaches a retrieval pipeline for regulatory context. Without one,
    /// gap reports carry an empty context.
    pub fn with_retriever(mut self, retriever: Arc<RegulatoryRetriever>) -> Self {
        self.retriever = Some(retriever);
        self
    }

    /// Classifies the batch and evaluates red-flag rules. Pure function of
    /// the documents and the loaded tables.
    pub fn analyze(&self, documents: &[ParsedDocument]) -> DocumentAnalysis {
        tracing::info!("Analyzing {} documents", documents.len());

        let process = detect::detect_process(documents);
        let entity_type =
            detect::detect_entity_type(documents, &self.config.default_entity_type);
        let redflags =
            redflags::evaluate_rule_sets(&self.rule_sets, documents, &process, &entity_type);

        tracing::info!(
            "Detected process={}, entity_type={}, issues={}",
            process,
            entity_type,
            redflags.len()
        );

        DocumentAnalysis {
            process,
            entity_type,
            redflags,
            document_count: documents.len(),
        }
    }

    /// Analyzes a batch where individual documents may have failed to
    /// parse. Failures are logged and skipped; errors only when every
    /// document failed.
    pub fn analyze_parsed<E: std::fmt::Display>(
        &self,
        parsed: Vec<Result<ParsedDocument, E>>,
    ) -> Result<(DocumentAnalysis, Vec<ParsedDocument>), EngineError> {
        let mut documents = Vec::new();
        for result in parsed {
            match result {
                Ok(doc) => documents.push(doc),
                Err(err) => {
                    tracing::error!("Skipping document that failed to parse: {}", err);
                }
            }
        }
        if documents.is_empty() {
            return Err(EngineError::NoValidDocuments);
        }
        let analysis = self.analyze(&documents);
        Ok((analysis, documents))
    }

    /// Matches the documents against the applicable checklist and attaches
    /// suggestions and regulatory context. Fails with
    /// [`EngineError::NoApplicableChecklist`] when no checklist fits the
    /// detected process and entity type.
    pub async fn generate_gap_report(
        &self,
        analysis: &DocumentAnalysis,
        documents: &[ParsedDocument],
    ) -> Result<GapReport, EngineError> {
        let checklist = self
            .checklists
            .get_applicable(&analysis.process, &analysis.entity_type)
            .ok_or_else(|| EngineError::NoApplicableChecklist {
                process: analysis.process.clone(),
                entity_type: analysis.entity_type.clone(),
                available_checklists: self.checklists.names(),
            })?;

        let ctx = ConditionContext {
            process: &analysis.process,
            entity_type: &analysis.entity_type,
        };
        let requirement_analysis = checklist::check_requirements(documents, checklist, &ctx);
        let suggestions =
            report::suggestions_for_missing(&requirement_analysis.missing_requirements);
        let regulatory_context = self
            .regulatory_context(&analysis.process, &analysis.entity_type)
            .await;
        let compliance_status = ComplianceStatus::from_score(requirement_analysis.compliance_score);

        Ok(GapReport {
            process: analysis.process.clone(),
            entity_type: analysis.entity_type.clone(),
            checklist_used: checklist.process.clone(),
            documents_uploaded: documents.len(),
            requirement_analysis,
            suggestions,
            regulatory_context,
            compliance_status,
        })
    }

    /// Builds the final flat report from the two analysis stages.
    pub fn build_report(
        &self,
        analysis: &DocumentAnalysis,
        gap: &GapReport,
        documents: &[ParsedDocument],
    ) -> AnalysisReport {
        report::build_report(analysis, gap, documents)
    }

    /// Top-3 retrieved sources for the detected process. Degrades to an
    /// empty context when no retriever is attached or retrieval fails.
    async fn regulatory_context(&self, process: &str, entity_type: &str) -> RegulatoryContext {
        let Some(retriever) = &self.retriever else {
            return RegulatoryContext::default();
        };

        let query = format!("{process} {entity_type} ADGM requirements");
        let chunks = retriever.retrieve_and_rerank(&query).await;

        let relevant_sources = chunks
            .iter()
            .take(3)
            .map(|chunk| RegulatorySource {
                title: if chunk.metadata.title.is_empty() {
                    "Unknown".to_string()
                } else {
                    chunk.metadata.title.clone()
                },
                url: chunk.metadata.source_url.clone(),
                relevance_score: f64::from(chunk.similarity_score),
            })
            .collect();

        RegulatoryContext {
            relevant_sources,
            key_regulations: Vec::new(),
            compliance_deadlines: Vec::new(),
        }
    }
}

impl Default for ComplianceAnalyzer {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}
