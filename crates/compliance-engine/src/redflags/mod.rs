//! Red-flag rule evaluation
//!
//! A rule set is scoped to a process: the general corporate set always
//! applies, any other set applies when its scope appears in the detected
//! process name. Within a set, each rule passes its `applies_if` and
//! `trigger_if` condition gates once, then runs its kind-specific check
//! against every document named by `applies_to_docs`. A rule raises at
//! most one issue per document.

pub mod rule;
pub mod structural;

pub use rule::{builtin_rule_sets, load_rule_sets, RedFlagRuleSet, RuleConfig, RuleKind};

use lazy_static::lazy_static;
use regex::Regex;
use shared_types::{Issue, ParsedDocument};

use crate::conditions::{self, ConditionContext};

lazy_static! {
    static ref TEMPLATE_PLACEHOLDERS: Regex = Regex::new(r"\[\[.*?\]\]|_{3,}").unwrap();
}

const TEMPLATE_INDICATOR: &str = "Template fields left blank";
const LOREM_INDICATOR: &str = "Lorem ipsum";

/// Evaluates every applicable rule set against the parsed documents.
///
/// Order is deterministic: rule sets in the order given, rules in name
/// order within each set, documents in upload order.
pub fn evaluate_rule_sets(
    rule_sets: &[RedFlagRuleSet],
    documents: &[ParsedDocument],
    process: &str,
    entity_type: &str,
) -> Vec<Issue> {
    let ctx = ConditionContext {
        process,
        entity_type,
    };
    let process_lower = process.to_lowercase();
    let mut issues = Vec::new();

    for set in rule_sets {
        if !scope_matches(&set.scope, &process_lower) {
            continue;
        }
        for (rule_name, config) in &set.rules {
            if !conditions::applies(&config.applies_if, &ctx) {
                continue;
            }
            if !conditions::triggers(&config.trigger_if, &ctx) {
                continue;
            }
            for doc in documents {
                if !applies_to_document(&config.applies_to_docs, &doc.filename) {
                    continue;
                }
                if let Some(issue) = evaluate_rule(rule_name, config, doc) {
                    issues.push(issue);
                }
            }
        }
    }

    issues
}

fn scope_matches(scope: &str, process_lower: &str) -> bool {
    scope == rule::GENERAL_SCOPE || process_lower.contains(&scope.to_lowercase())
}

fn applies_to_document(applies_to_docs: &[String], filename: &str) -> bool {
    applies_to_docs
        .iter()
        .any(|name| name == rule::ALL_DOCS || name == filename)
}

fn evaluate_rule(rule_name: &str, config: &RuleConfig, doc: &ParsedDocument) -> Option<Issue> {
    let text = &doc.full_text;
    let message = match &config.kind {
        RuleKind::PatternPresence {
            patterns_any,
            require_phrase,
        } => pattern_presence(patterns_any, require_phrase.as_deref(), text)
            .then(|| configured_message(config, "Pattern presence issue detected")),
        // Structural issues always list the failing elements, even when the
        // rule configures a message.
        RuleKind::StructuralCheck { checks } => {
            let missing = structural::missing_elements(checks, text);
            (!missing.is_empty())
                .then(|| format!("Missing structural elements: {}", missing.join(", ")))
        }
        RuleKind::SemanticCheck { forbidden_phrases } => first_forbidden(forbidden_phrases, text)
            .map(|phrase| configured_message(config, &format!("Forbidden phrase found: {phrase}"))),
        RuleKind::Heuristic { indicators_any } => {
            heuristic_hit(indicators_any, text).map(|default| configured_message(config, default))
        }
    }?;

    Some(Issue {
        rule: rule_name.to_string(),
        document: doc.filename.clone(),
        issue: message,
        severity: config
            .severity
            .unwrap_or_else(|| config.kind.default_severity()),
        citations: config.citations.clone(),
    })
}

fn configured_message(config: &RuleConfig, default: &str) -> String {
    if config.message.is_empty() {
        default.to_string()
    } else {
        config.message.clone()
    }
}

/// True when a forbidden pattern is present and the counter-phrase, if the
/// rule names one, is not.
fn pattern_presence(patterns: &[String], require_phrase: Option<&str>, text: &str) -> bool {
    let hit = patterns
        .iter()
        .any(|pattern| compile_insensitive(pattern).is_some_and(|re| re.is_match(text)));
    if !hit {
        return false;
    }
    match require_phrase {
        Some(phrase) if !phrase.is_empty() => match compile_insensitive(phrase) {
            Some(re) => !re.is_match(text),
            // An unreadable counter-phrase cannot suppress the finding
            None => true,
        },
        _ => true,
    }
}

fn first_forbidden<'a>(phrases: &'a [String], text: &str) -> Option<&'a str> {
    phrases
        .iter()
        .map(String::as_str)
        .find(|phrase| compile_insensitive(phrase).is_some_and(|re| re.is_match(text)))
}

fn heuristic_hit(indicators: &[String], text: &str) -> Option<&'static str> {
    for indicator in indicators {
        if indicator.contains(TEMPLATE_INDICATOR) {
            if TEMPLATE_PLACEHOLDERS.is_match(text) {
                return Some("Template placeholders found");
            }
        } else if indicator.contains(LOREM_INDICATOR) {
            if text.to_lowercase().contains("lorem ipsum") {
                return Some("Lorem ipsum text found");
            }
        }
    }
    None
}

fn compile_insensitive(pattern: &str) -> Option<Regex> {
    match Regex::new(&format!("(?i){pattern}")) {
        Ok(re) => Some(re),
        Err(err) => {
            tracing::warn!("Skipping invalid rule pattern '{}': {}", pattern, err);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use shared_types::Severity;

    fn doc(filename: &str, text: &str) -> ParsedDocument {
        ParsedDocument::from_text(filename, text)
    }

    fn jurisdiction_set() -> RedFlagRuleSet {
        RedFlagRuleSet::from_yaml(
            r#"
scope: "General Corporate Docs"
rules:
  jurisdiction_mismatch:
    kind: pattern_presence
    patterns_any:
      - "UAE Federal Courts"
      - "Dubai Courts"
    require_phrase: "ADGM"
    severity: High
    message: "Document references non-ADGM jurisdiction"
    citations:
      - "ADGM Companies Regulations 2020, Art. 6"
"#,
        )
        .unwrap()
    }

    #[test]
    fn test_pattern_presence_flags_foreign_jurisdiction() {
        let sets = vec![jurisdiction_set()];
        let docs = vec![doc(
            "articles.docx",
            "Disputes shall be settled before the UAE Federal Courts.",
        )];
        let issues = evaluate_rule_sets(&sets, &docs, "Company Incorporation", "any");
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].rule, "jurisdiction_mismatch");
        assert_eq!(issues[0].document, "articles.docx");
        assert_eq!(issues[0].issue, "Document references non-ADGM jurisdiction");
        assert_eq!(issues[0].severity, Severity::High);
        assert_eq!(
            issues[0].citations,
            vec!["ADGM Companies Regulations 2020, Art. 6".to_string()]
        );
    }

    #[test]
    fn test_pattern_presence_suppressed_by_counter_phrase() {
        let sets = vec![jurisdiction_set()];
        let docs = vec![doc(
            "articles.docx",
            "Disputes go to the UAE Federal Courts unless ADGM courts have jurisdiction.",
        )];
        let issues = evaluate_rule_sets(&sets, &docs, "Company Incorporation", "any");
        assert!(issues.is_empty());
    }

    #[test]
    fn test_pattern_presence_fires_without_counter_phrase() {
        let set = RedFlagRuleSet::from_yaml(
            r#"
scope: "General Corporate Docs"
rules:
  dubai_reference:
    kind: pattern_presence
    patterns_any:
      - "Dubai Courts"
"#,
        )
        .unwrap();
        let docs = vec![doc("moa.docx", "Subject to the Dubai Courts.")];
        let issues = evaluate_rule_sets(&[set], &docs, "General Review", "any");
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].issue, "Pattern presence issue detected");
        assert_eq!(issues[0].severity, Severity::Medium);
    }

    #[test]
    fn test_semantic_check_reports_first_matching_phrase() {
        let set = RedFlagRuleSet::from_yaml(
            r#"
scope: "Incorporation"
rules:
  share_capital_in_guarantee:
    kind: semantic_check
    forbidden_phrases:
      - "share capital"
      - "shares issued"
"#,
        )
        .unwrap();
        let docs = vec![doc(
            "guarantee_articles.docx",
            "The company has Share Capital of AED 1 and shares issued to members.",
        )];
        let issues = evaluate_rule_sets(&[set], &docs, "Company Incorporation", "any");
        // One issue per rule and document, naming the first phrase only
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].issue, "Forbidden phrase found: share capital");
        assert_eq!(issues[0].severity, Severity::High);
    }

    #[test]
    fn test_structural_check_lists_missing_elements() {
        let set = RedFlagRuleSet::from_yaml(
            r#"
scope: "General Corporate Docs"
rules:
  missing_signature_block:
    kind: structural_check
    checks:
      - has_signatory_name
      - has_capacity
      - has_signature_or_e-sign
      - has_date
    message: "Configured message is ignored for structural rules"
"#,
        )
        .unwrap();
        let docs = vec![doc("resolution.docx", "The board resolves as follows.")];
        let issues = evaluate_rule_sets(&[set], &docs, "General Review", "any");
        assert_eq!(issues.len(), 1);
        assert_eq!(
            issues[0].issue,
            "Missing structural elements: signatory name, capacity, signature, date"
        );
        assert_eq!(issues[0].severity, Severity::Medium);
    }

    #[test]
    fn test_heuristic_template_placeholders_and_lorem() {
        let set = RedFlagRuleSet::from_yaml(
            r#"
scope: "General Corporate Docs"
rules:
  incomplete_template:
    kind: heuristic
    indicators_any:
      - "Template fields left blank"
  lorem_ipsum:
    kind: heuristic
    indicators_any:
      - "Lorem ipsum filler text"
"#,
        )
        .unwrap();
        let docs = vec![
            doc("form.docx", "Name of applicant: ______"),
            doc("resolution.docx", "This resolution of [[COMPANY_NAME]] resolves that"),
            doc("draft.docx", "LOREM IPSUM dolor sit amet."),
        ];
        let issues = evaluate_rule_sets(&[set], &docs, "General Review", "any");
        assert_eq!(issues.len(), 3);
        assert_eq!(issues[0].rule, "incomplete_template");
        assert_eq!(issues[0].document, "form.docx");
        assert_eq!(issues[0].issue, "Template placeholders found");
        assert_eq!(issues[0].severity, Severity::Low);
        assert_eq!(issues[1].document, "resolution.docx");
        assert_eq!(issues[1].issue, "Template placeholders found");
        assert_eq!(issues[2].rule, "lorem_ipsum");
        assert_eq!(issues[2].document, "draft.docx");
        assert_eq!(issues[2].issue, "Lorem ipsum text found");
    }

    #[test]
    fn test_scope_gates_rule_set_by_process() {
        let set = RedFlagRuleSet::from_yaml(
            r#"
scope: "Incorporation"
rules:
  anything:
    kind: heuristic
    indicators_any:
      - "Lorem ipsum"
"#,
        )
        .unwrap();
        let docs = vec![doc("d.docx", "lorem ipsum everywhere")];

        let off_scope = evaluate_rule_sets(&[set.clone()], &docs, "Annual Filings Review", "any");
        assert!(off_scope.is_empty());

        // Scope matches as a case-insensitive substring of the process
        let on_scope = evaluate_rule_sets(&[set], &docs, "company incorporation", "any");
        assert_eq!(on_scope.len(), 1);
    }

    #[test]
    fn test_applies_to_docs_limits_rule_to_named_files() {
        let set = RedFlagRuleSet::from_yaml(
            r#"
scope: "General Corporate Docs"
rules:
  lorem_ipsum:
    kind: heuristic
    indicators_any:
      - "Lorem ipsum"
    applies_to_docs:
      - "draft.docx"
"#,
        )
        .unwrap();
        let docs = vec![
            doc("final.docx", "lorem ipsum"),
            doc("draft.docx", "lorem ipsum"),
        ];
        let issues = evaluate_rule_sets(&[set], &docs, "General Review", "any");
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].document, "draft.docx");
    }

    #[test]
    fn test_trigger_if_gates_on_entity_type() {
        let set = RedFlagRuleSet::from_yaml(
            r#"
scope: "Incorporation"
rules:
  share_capital_in_guarantee:
    kind: semantic_check
    forbidden_phrases:
      - "share capital"
    trigger_if:
      - "entity_type == 'Private Company Limited by Guarantee (Non-Financial)'"
"#,
        )
        .unwrap();
        let docs = vec![doc("articles.docx", "share capital of AED 100")];

        let shares = evaluate_rule_sets(
            &[set.clone()],
            &docs,
            "Company Incorporation",
            "Private Company Limited by Shares (Non-Financial)",
        );
        assert!(shares.is_empty());

        let guarantee = evaluate_rule_sets(
            &[set],
            &docs,
            "Company Incorporation",
            "Private Company Limited by Guarantee (Non-Financial)",
        );
        assert_eq!(guarantee.len(), 1);
    }

    #[test]
    fn test_applies_if_gates_on_process() {
        let set = RedFlagRuleSet::from_yaml(
            r#"
scope: "General Corporate Docs"
rules:
  incorporation_only:
    kind: heuristic
    indicators_any:
      - "Lorem ipsum"
    applies_if: "process == 'Company Incorporation'"
"#,
        )
        .unwrap();
        let docs = vec![doc("d.docx", "lorem ipsum")];

        let review = evaluate_rule_sets(&[set.clone()], &docs, "General Review", "any");
        assert!(review.is_empty());

        let incorporation = evaluate_rule_sets(&[set], &docs, "Company Incorporation", "any");
        assert_eq!(incorporation.len(), 1);
    }

    #[test]
    fn test_invalid_pattern_skipped_without_issue() {
        let set = RedFlagRuleSet::from_yaml(
            r#"
scope: "General Corporate Docs"
rules:
  broken:
    kind: pattern_presence
    patterns_any:
      - "([unclosed"
"#,
        )
        .unwrap();
        let docs = vec![doc("d.docx", "([unclosed text")];
        let issues = evaluate_rule_sets(&[set], &docs, "General Review", "any");
        assert!(issues.is_empty());
    }

    #[test]
    fn test_rules_evaluate_in_name_order() {
        let set = RedFlagRuleSet::from_yaml(
            r#"
scope: "General Corporate Docs"
rules:
  z_lorem:
    kind: heuristic
    indicators_any:
      - "Lorem ipsum"
  a_lorem:
    kind: heuristic
    indicators_any:
      - "Lorem ipsum"
"#,
        )
        .unwrap();
        let docs = vec![doc("d.docx", "lorem ipsum")];
        let issues = evaluate_rule_sets(&[set], &docs, "General Review", "any");
        let order: Vec<&str> = issues.iter().map(|i| i.rule.as_str()).collect();
        assert_eq!(order, vec!["a_lorem", "z_lorem"]);
    }
}
