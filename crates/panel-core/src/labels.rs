//! Label normalization.
//!
//! Free-text labels carry full-width spaces, no-break spaces and full-width
//! parentheses depending on the source. [`clean_label`] removes that noise;
//! [`LabelNormalizer`] then maps cleaned labels to canonical identifiers with
//! an ordered rule table. Section helpers locate labeled blocks of rows.

use std::ops::Range;

use panel_model::{LabelConfig, LabelRule};

/// Removes spacing noise and normalizes parentheses.
///
/// Strips ASCII spaces, tabs, no-break spaces (U+00A0) and ideographic spaces
/// (U+3000) anywhere in the label, and maps `（` / `）` to `(` / `)`.
pub fn clean_label(raw: &str) -> String {
    raw.chars()
        .filter(|ch| !matches!(ch, ' ' | '\t' | '\u{00A0}' | '\u{3000}' | '\u{feff}'))
        .map(|ch| match ch {
            '（' => '(',
            '）' => ')',
            other => other,
        })
        .collect()
}

/// A compiled label rule; patterns are stored cleaned.
#[derive(Debug, Clone, PartialEq, Eq)]
enum CompiledRule {
    Exact { from: String, to: String },
    Suffix { from: String, to: String },
    Contains { keyword: String, canonical: String },
}

impl CompiledRule {
    fn compile(rule: &LabelRule) -> Self {
        match rule {
            LabelRule::Exact { from, to } => CompiledRule::Exact {
                from: clean_label(from),
                to: to.clone(),
            },
            LabelRule::Suffix { from, to } => CompiledRule::Suffix {
                from: clean_label(from),
                to: to.clone(),
            },
            LabelRule::Contains { keyword, canonical } => CompiledRule::Contains {
                keyword: clean_label(keyword),
                canonical: canonical.clone(),
            },
        }
    }

    fn apply(&self, cleaned: &str) -> Option<String> {
        match self {
            CompiledRule::Exact { from, to } => (cleaned == from).then(|| to.clone()),
            CompiledRule::Suffix { from, to } => {
                if from.is_empty() {
                    return None;
                }
                cleaned
                    .strip_suffix(from.as_str())
                    .map(|stem| format!("{stem}{to}"))
            }
            CompiledRule::Contains { keyword, canonical } => {
                (!keyword.is_empty() && cleaned.contains(keyword.as_str()))
                    .then(|| canonical.clone())
            }
        }
    }
}

/// Ordered label rule table. The first matching rule wins.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LabelNormalizer {
    rules: Vec<CompiledRule>,
}

impl LabelNormalizer {
    pub fn new(rules: &[LabelRule]) -> Self {
        Self {
            rules: rules.iter().map(CompiledRule::compile).collect(),
        }
    }

    pub fn from_config(labels: &LabelConfig) -> Self {
        Self::new(&labels.rules)
    }

    /// Canonical form of `raw`, or `None` when no rule matches.
    pub fn lookup(&self, raw: &str) -> Option<String> {
        let cleaned = clean_label(raw);
        self.rules.iter().find_map(|rule| rule.apply(&cleaned))
    }

    /// Canonical form of `raw`, falling back to the cleaned label.
    pub fn normalize(&self, raw: &str) -> String {
        let cleaned = clean_label(raw);
        self.rules
            .iter()
            .find_map(|rule| rule.apply(&cleaned))
            .unwrap_or(cleaned)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

/// Index of the first label equal to `label` after cleaning, at or after `from`.
pub fn position_of<S: AsRef<str>>(labels: &[S], label: &str, from: usize) -> Option<usize> {
    let wanted = clean_label(label);
    labels
        .iter()
        .enumerate()
        .skip(from)
        .find(|(_, candidate)| clean_label(candidate.as_ref()) == wanted)
        .map(|(idx, _)| idx)
}

/// Row range `[start, end)` of a labeled section.
///
/// Returns `None` when the start label is absent. When `end` is `None` or not
/// found after the start row, the range runs to the end of the table.
pub fn section_range<S: AsRef<str>>(
    labels: &[S],
    start: &str,
    end: Option<&str>,
) -> Option<Range<usize>> {
    let first = position_of(labels, start, 0)?;
    let last = end
        .and_then(|end| position_of(labels, end, first + 1))
        .unwrap_or(labels.len());
    Some(first..last)
}

/// First row within `range` whose cleaned label contains `keyword`.
pub fn find_row<S: AsRef<str>>(labels: &[S], range: Range<usize>, keyword: &str) -> Option<usize> {
    let keyword = clean_label(keyword);
    if keyword.is_empty() {
        return None;
    }
    let end = range.end.min(labels.len());
    (range.start..end).find(|&idx| clean_label(labels[idx].as_ref()).contains(keyword.as_str()))
}
