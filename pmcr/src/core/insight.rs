//! Heuristic insight extraction over text artifacts.
//!
//! Pure and deterministic: no backend call, no failure path, identical input
//! yields an identical [`InsightRecord`]. The keyword lists, band weights and
//! recommendation strings are frozen behavioral contracts; they are counted
//! heuristics, not tunables.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Cap on the extracted technical-term list.
const MAX_TECHNICAL_TERMS: usize = 10;
/// Minimum character length (exclusive) for a technical-term candidate.
const TERM_MIN_CHARS: usize = 8;

const REC_EXPAND: &str = "Consider expanding the documentation with more detail";
const REC_TROUBLESHOOTING: &str = "Add troubleshooting section for better user support";
const REC_HEADINGS: &str = "Add section headings to improve document structure";
const REC_WORD_COUNT: &str = "Increase word count for more comprehensive coverage";
const REC_NONE: &str = "No improvements needed - documentation meets quality thresholds";

static INSIGHT_KEYWORDS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(feature|technology|ai|smart|advanced|innovative|revolutionary)\b")
        .expect("insight keyword regex")
});

static NUMBERED_LIST: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^\s*\d+\.\s").expect("numbered list regex"));

/// Derived, read-only analysis of a text artifact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InsightRecord {
    pub char_count: usize,
    pub word_count: usize,
    pub line_count: usize,
    /// Occurrences of structural markup markers (emphasis, headings,
    /// section rules, numbered-list items).
    pub pattern_count: usize,
    /// Whole-word, case-insensitive matches of the capability keyword list.
    pub insight_count: usize,
    /// Capitalized tokens longer than eight characters, deduplicated,
    /// first-seen order, capped at ten.
    pub technical_terms: Vec<String>,
    /// Additive quality score, clamped to [0, 100].
    pub quality_score: u32,
    pub recommendations: Vec<String>,
}

/// Analyze `text` into an [`InsightRecord`].
pub fn analyze(text: &str) -> InsightRecord {
    let char_count = text.chars().count();
    let word_count = text.split_whitespace().count();
    let line_count = text.lines().count();

    InsightRecord {
        char_count,
        word_count,
        line_count,
        pattern_count: pattern_count(text),
        insight_count: INSIGHT_KEYWORDS.find_iter(text).count(),
        technical_terms: technical_terms(text),
        quality_score: quality_score(text, char_count),
        recommendations: recommendations(text, char_count, word_count),
    }
}

fn pattern_count(text: &str) -> usize {
    let emphasis = text.matches("**").count();
    let headings = heading_count(text);
    let rules = text
        .lines()
        .filter(|line| line.trim_start().starts_with("---"))
        .count();
    let numbered = NUMBERED_LIST.find_iter(text).count();
    emphasis + headings + rules + numbered
}

fn heading_count(text: &str) -> usize {
    text.lines()
        .filter(|line| line.trim_start().starts_with('#'))
        .count()
}

fn technical_terms(text: &str) -> Vec<String> {
    let mut terms: Vec<String> = Vec::new();
    for token in text.split_whitespace() {
        if terms.len() == MAX_TECHNICAL_TERMS {
            break;
        }
        let trimmed = token.trim_matches(|c: char| !c.is_alphanumeric());
        if trimmed.chars().count() <= TERM_MIN_CHARS {
            continue;
        }
        let starts_upper = trimmed.chars().next().is_some_and(char::is_uppercase);
        if starts_upper && !terms.iter().any(|seen| seen == trimmed) {
            terms.push(trimmed.to_string());
        }
    }
    terms
}

/// Four weighted bands, each capped at 25, total clamped to 100.
fn quality_score(text: &str, char_count: usize) -> u32 {
    let length_band = ((char_count / 40) as u32).min(25);

    let mut structure_band = 0u32;
    if heading_count(text) > 0 {
        structure_band += 10;
    }
    if text.contains("**") {
        structure_band += 10;
    }
    if text.lines().any(|line| line.trim_start().starts_with("---")) {
        structure_band += 5;
    }
    let structure_band = structure_band.min(25);

    let mut content_band = 0u32;
    if text.contains("Feature") {
        content_band += 10;
    }
    if text.contains("Description") {
        content_band += 10;
    }
    if text.contains("Solution") {
        content_band += 5;
    }
    let content_band = content_band.min(25);

    let mut completeness_band = 0u32;
    if text.contains("Product") {
        completeness_band += 10;
    }
    if text.contains("Troubleshooting") {
        completeness_band += 10;
    }
    if text.contains("Installation") {
        completeness_band += 5;
    }
    let completeness_band = completeness_band.min(25);

    (length_band + structure_band + content_band + completeness_band).min(100)
}

fn recommendations(text: &str, char_count: usize, word_count: usize) -> Vec<String> {
    let mut out = Vec::new();
    if char_count < 500 {
        out.push(REC_EXPAND.to_string());
    }
    if !text.contains("Troubleshooting") {
        out.push(REC_TROUBLESHOOTING.to_string());
    }
    if heading_count(text) == 0 {
        out.push(REC_HEADINGS.to_string());
    }
    if word_count < 100 {
        out.push(REC_WORD_COUNT.to_string());
    }
    if out.is_empty() {
        out.push(REC_NONE.to_string());
    }
    out
}
