//! Rule-based document analysis.
//!
//! Deterministic statistics, content-type and compliance findings. No model
//! call is involved and generation never fails.

use docent_extractors::FileKind;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::types::{AnalysisKind, AnalysisResult, Document, Severity};

static SSN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b\d{3}-\d{2}-\d{4}\b").expect("valid regex"));
static CARD_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b\d{4}[- ]?\d{4}[- ]?\d{4}[- ]?\d{4}\b").expect("valid regex")
});
static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}\b").expect("valid regex")
});
static ACTION_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(TODO|FIXME)\b").expect("valid regex"));

/// Basic counts over extracted text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextStatistics {
    pub words: usize,
    pub characters: usize,
    pub lines: usize,
}

impl TextStatistics {
    pub fn of(text: &str) -> Self {
        Self {
            words: text.split_whitespace().count(),
            characters: text.chars().count(),
            lines: text.lines().count(),
        }
    }
}

/// Which PII-like patterns occur in a text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SensitiveDataScan {
    pub ssn: bool,
    pub credit_card: bool,
    pub email: bool,
}

impl SensitiveDataScan {
    pub fn of(text: &str) -> Self {
        Self {
            ssn: SSN_RE.is_match(text),
            credit_card: CARD_RE.is_match(text),
            email: EMAIL_RE.is_match(text),
        }
    }

    pub fn any(&self) -> bool {
        self.ssn || self.credit_card || self.email
    }

    fn labels(&self) -> Vec<&'static str> {
        let mut labels = Vec::new();
        if self.ssn {
            labels.push("social security numbers");
        }
        if self.credit_card {
            labels.push("credit card numbers");
        }
        if self.email {
            labels.push("email addresses");
        }
        labels
    }
}

/// Generates the fixed set of rule-based findings for a document.
#[derive(Debug, Clone, Copy, Default)]
pub struct RuleBasedAnalyzer;

impl RuleBasedAnalyzer {
    pub fn new() -> Self {
        Self
    }

    /// Analyze the document's extracted content.
    pub fn analyze(&self, document: &Document) -> Vec<AnalysisResult> {
        let text = document.content_or_empty();
        let mut results = vec![statistics(document, text)];

        let kind = FileKind::detect(&document.name, Some(&document.mime_type));
        match kind {
            FileKind::Json => results.push(json_insight(document, text)),
            FileKind::Csv => results.push(csv_insight(document, text)),
            FileKind::Image => results.push(placeholder_insight(document)),
            _ if document.is_placeholder_content() => results.push(placeholder_insight(document)),
            FileKind::Text | FileKind::Xml | FileKind::Unknown => {
                results.push(content_insight(document, text));
                if let Some(opportunity) = action_items(document, text) {
                    results.push(opportunity);
                }
            }
            // Text recovered from PDF or Word files; no action-item scan.
            FileKind::Pdf | FileKind::Word => {
                results.push(content_insight(document, text));
            }
        }

        results.push(compliance(document, text));
        results
    }
}

fn statistics(document: &Document, text: &str) -> AnalysisResult {
    let stats = TextStatistics::of(text);
    AnalysisResult::new(
        &document.id,
        AnalysisKind::Insight,
        "Document Statistics",
        format!(
            "{} words, {} characters, {} lines",
            stats.words, stats.characters, stats.lines
        ),
        100,
    )
}

fn json_insight(document: &Document, text: &str) -> AnalysisResult {
    let description = match serde_json::from_str::<serde_json::Value>(text) {
        Ok(serde_json::Value::Object(map)) => {
            format!("Valid JSON object with {} top-level keys", map.len())
        }
        Ok(serde_json::Value::Array(items)) => {
            format!("Valid JSON array with {} items", items.len())
        }
        Ok(_) => "Valid JSON scalar value".to_string(),
        Err(e) => format!("Content is not valid JSON: {}", e),
    };
    AnalysisResult::new(&document.id, AnalysisKind::Insight, "JSON Structure", description, 95)
}

fn csv_insight(document: &Document, text: &str) -> AnalysisResult {
    let mut lines = text.lines().filter(|l| !l.trim().is_empty());
    let columns = lines.next().map(|h| h.split(',').count()).unwrap_or(0);
    let rows = lines.count();
    AnalysisResult::new(
        &document.id,
        AnalysisKind::Insight,
        "CSV Structure",
        format!("{} columns and {} data rows", columns, rows),
        95,
    )
}

fn content_insight(document: &Document, text: &str) -> AnalysisResult {
    let paragraphs = text
        .split("\n\n")
        .filter(|p| !p.trim().is_empty())
        .count();
    let description = if text.trim().is_empty() {
        "No text content was extracted".to_string()
    } else {
        format!("Text content with {}", plural(paragraphs, "paragraph"))
    };
    AnalysisResult::new(&document.id, AnalysisKind::Insight, "Content Analysis", description, 95)
}

fn placeholder_insight(document: &Document) -> AnalysisResult {
    AnalysisResult::new(
        &document.id,
        AnalysisKind::Insight,
        "Content Analysis",
        "No text could be extracted; only placeholder content was analyzed",
        95,
    )
}

fn plural(count: usize, noun: &str) -> String {
    if count == 1 {
        format!("1 {}", noun)
    } else {
        format!("{} {}s", count, noun)
    }
}

fn action_items(document: &Document, text: &str) -> Option<AnalysisResult> {
    let count = ACTION_RE.find_iter(text).count();
    (count > 0).then(|| {
        AnalysisResult::new(
            &document.id,
            AnalysisKind::Opportunity,
            "Action Items Found",
            format!("{} found", plural(count, "TODO/FIXME marker")),
            90,
        )
        .with_severity(Severity::Medium)
    })
}

fn compliance(document: &Document, text: &str) -> AnalysisResult {
    let scan = SensitiveDataScan::of(text);
    if scan.any() {
        AnalysisResult::new(
            &document.id,
            AnalysisKind::Compliance,
            "Sensitive Data Detected",
            format!("Possible {} found", scan.labels().join(" and ")),
            85,
        )
        .with_severity(Severity::High)
    } else {
        AnalysisResult::new(
            &document.id,
            AnalysisKind::Compliance,
            "No Sensitive Data Detected",
            "No SSN, credit card or email patterns found",
            80,
        )
        .with_severity(Severity::Low)
    }
}
