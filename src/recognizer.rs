//! @ai:module:intent Turn raw tool output into normalized diagnostics using the pattern catalog
//! @ai:module:layer application
//! @ai:module:public_api Recognizer, FullTextRecognizer, LineRecognizer, GroupState, RecognitionMode, select_recognizer
//! @ai:module:depends_on catalog, diagnostic, severity, ansi, config, error
//! @ai:module:stateless true
//!
//! Two strategies share one interface. Full-text mode scans the whole document
//! once with every rule joined into a single alternation and tracks open file
//! and severity groups. Line mode tries each line against the rules one by one
//! and has no group tracking; it is the fallback when the combined pattern
//! cannot be built.

use crate::ansi::{prepare, split_lines, strip_ansi};
use crate::catalog::{compile_rule, Catalog, Field};
use crate::config::EngineConfig;
use crate::diagnostic::{parse_position, Diagnostic};
use crate::error::{Error, Result};
use crate::severity::{normalize_severity, parse_confidence};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// @ai:intent Which recognition strategy to use
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum RecognitionMode {
    /// Full text when available, otherwise line by line.
    #[default]
    Auto,
    FullText,
    Line,
}

/// @ai:intent Capability shared by both strategies: text in, diagnostics out
pub trait Recognizer: Send + Sync {
    /// @ai:intent Recognize every diagnostic in a document, in document order
    fn recognize(&self, text: &str) -> Vec<Diagnostic>;

    /// @ai:intent The strategy this recognizer implements
    fn mode(&self) -> RecognitionMode;
}

/// @ai:intent Raw field values captured by one match
#[derive(Debug, Clone, Default)]
struct MatchFields<'t> {
    values: [Option<&'t str>; Field::COUNT],
}

impl<'t> MatchFields<'t> {
    fn get(&self, field: Field) -> Option<&'t str> {
        self.values[field.index()]
    }

    fn set(&mut self, field: Field, value: &'t str) {
        self.values[field.index()] = Some(value);
    }

    fn is_empty(&self) -> bool {
        self.values.iter().all(Option::is_none)
    }
}

/// @ai:intent File name and severity inherited from open groups during one pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupState {
    pub file_group: Option<String>,
    pub severity_group: Option<String>,
}

impl GroupState {
    /// @ai:intent Apply group start/end markers carried by a match
    /// @ai:post true when the match was a group instruction and must not be emitted
    /// @ai:effects state:write
    fn apply(&mut self, fields: &MatchFields<'_>) -> bool {
        let mut consumed = false;

        if let Some(file_group) = fields.get(Field::FileGroup) {
            self.file_group = Some(file_group.to_string());
            consumed = true;
        }
        if fields.get(Field::FileEndgroup).is_some() {
            self.file_group = None;
            consumed = true;
        }
        if let Some(severity_group) = fields.get(Field::SeverityGroup) {
            self.severity_group = Some(severity_group.to_lowercase());
            consumed = true;
        }
        if fields.get(Field::SeverityEndgroup).is_some() {
            self.severity_group = None;
            consumed = true;
        }

        consumed
    }
}

/// @ai:intent Resolve a match into a diagnostic, or None when it must be discarded
/// @ai:pre fields carry no group markers (already consumed by GroupState::apply)
/// @ai:post the diagnostic has a non-empty file name and a normalized severity
/// @ai:effects pure
fn build_diagnostic(
    catalog: &Catalog,
    fields: &MatchFields<'_>,
    groups: Option<&GroupState>,
) -> Option<Diagnostic> {
    let file_name = fields
        .get(Field::FileName)
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .or_else(|| groups.and_then(|g| g.file_group.clone()))?;

    if catalog.is_excluded_file(&file_name) {
        return None;
    }

    let message = match (fields.get(Field::Message), fields.get(Field::Dataset)) {
        (Some(message), Some(dataset)) => Some(format!("{message}{dataset}")),
        (None, Some(dataset)) => Some(dataset.to_string()),
        (message, None) => message.map(str::to_string),
    };

    if message
        .as_deref()
        .is_some_and(|m| catalog.is_excluded_message(m))
    {
        return None;
    }

    let confidence = fields.get(Field::Confidence).and_then(parse_confidence);
    let token = fields
        .get(Field::Severity)
        .or_else(|| groups.and_then(|g| g.severity_group.as_deref()));

    Some(Diagnostic {
        file_name,
        line: fields.get(Field::Line).and_then(parse_position),
        column: fields.get(Field::Column).and_then(parse_position),
        severity: normalize_severity(token, confidence),
        message,
        source: None,
    })
}

/// @ai:intent Capture group indices of one rule inside the combined pattern
#[derive(Debug, Clone)]
struct RuleSlots {
    rule: String,
    marker: usize,
    fields: Vec<(Field, usize)>,
}

/// @ai:intent Single-pass recognizer over the whole document with group tracking
#[derive(Debug, Clone)]
pub struct FullTextRecognizer {
    catalog: Arc<Catalog>,
    combined: Regex,
    slots: Vec<RuleSlots>,
}

fn rule_group(index: usize) -> String {
    format!("r{index}")
}

fn field_group(index: usize, field: Field) -> String {
    format!("r{index}_{}", field.name())
}

const GROUP_OPENERS: [&str; 2] = ["(?P<", "(?<"];

/// @ai:intent Prefix every named group of a pattern, in both `(?P<name>` and `(?<name>` syntax
/// @ai:post escaped parentheses and text inside character classes are left untouched
/// @ai:example ("^(?<file_name>\\S+)", "r3") -> "^(?<r3_file_name>\\S+)"
/// @ai:effects pure
fn prefix_group_names(source: &str, prefix: &str) -> String {
    let mut renamed = String::with_capacity(source.len() + 8 * prefix.len());
    let mut class_depth = 0usize;
    let mut rest = source;

    while let Some(c) = rest.chars().next() {
        if c == '\\' {
            let len: usize = rest.chars().take(2).map(char::len_utf8).sum();
            renamed.push_str(&rest[..len]);
            rest = &rest[len..];
            continue;
        }

        if class_depth == 0 {
            if let Some(opener) = GROUP_OPENERS.into_iter().find(|o| rest.starts_with(o)) {
                renamed.push_str(opener);
                renamed.push_str(prefix);
                renamed.push('_');
                rest = &rest[opener.len()..];
                continue;
            }
        }

        renamed.push(c);
        rest = &rest[c.len_utf8()..];

        match c {
            '[' => {
                class_depth += 1;
                // A `]` right after the opening bracket (or `[^`) is a literal.
                if let Some(r) = rest.strip_prefix('^') {
                    renamed.push('^');
                    rest = r;
                }
                if let Some(r) = rest.strip_prefix(']') {
                    renamed.push(']');
                    rest = r;
                }
            }
            ']' if class_depth > 0 => class_depth -= 1,
            _ => {}
        }
    }

    renamed
}

/// @ai:intent Join all rules into one alternation with rule-prefixed group names
/// @ai:post alternatives keep catalog order, so the earliest rule wins at a given position
/// @ai:effects pure
fn combined_source(catalog: &Catalog) -> String {
    catalog
        .rules()
        .iter()
        .enumerate()
        .map(|(index, rule)| {
            let group = rule_group(index);
            let renamed = prefix_group_names(rule.source(), &group);
            format!("(?P<{group}>{renamed})")
        })
        .collect::<Vec<_>>()
        .join("|")
}

impl FullTextRecognizer {
    /// @ai:intent Build the combined pattern for a catalog
    /// @ai:post Err(FullTextUnavailable) when the combined pattern cannot be compiled
    /// @ai:effects pure
    pub fn new(catalog: Arc<Catalog>, config: &EngineConfig) -> Result<Self> {
        if catalog.rules().is_empty() {
            return Err(Error::FullTextUnavailable("catalog has no rules".to_string()));
        }

        let source = combined_source(&catalog);
        let combined = compile_rule(&source, Some(config.combined_size_limit))
            .map_err(|e| Error::FullTextUnavailable(e.to_string()))?;

        let index_of = |name: &str| {
            combined
                .capture_names()
                .position(|group| group == Some(name))
        };

        let slots = catalog
            .rules()
            .iter()
            .enumerate()
            .map(|(index, rule)| {
                let marker = index_of(&rule_group(index)).ok_or_else(|| {
                    Error::FullTextUnavailable(format!("no group for rule `{}`", rule.name()))
                })?;
                let fields = rule
                    .fields()
                    .iter()
                    .filter_map(|field| index_of(&field_group(index, *field)).map(|i| (*field, i)))
                    .collect();

                Ok(RuleSlots {
                    rule: rule.name().to_string(),
                    marker,
                    fields,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        tracing::debug!(
            "Built combined pattern for {} rules ({} bytes)",
            slots.len(),
            source.len()
        );

        Ok(Self {
            catalog,
            combined,
            slots,
        })
    }
}

impl Recognizer for FullTextRecognizer {
    /// @ai:intent Scan the document once, updating group state in match order
    /// @ai:post deterministic: same input, same ordered output
    /// @ai:effects pure
    fn recognize(&self, text: &str) -> Vec<Diagnostic> {
        let text = prepare(text);
        let mut groups = GroupState::default();
        let mut diagnostics = Vec::new();

        for captures in self.combined.captures_iter(&text) {
            let Some(slots) = self
                .slots
                .iter()
                .find(|slots| captures.get(slots.marker).is_some())
            else {
                continue;
            };

            let mut fields = MatchFields::default();
            for (field, index) in &slots.fields {
                if let Some(value) = captures.get(*index) {
                    fields.set(*field, value.as_str());
                }
            }

            if fields.is_empty() {
                continue;
            }

            if groups.apply(&fields) {
                tracing::trace!(rule = %slots.rule, ?groups, "group state changed");
                continue;
            }

            match build_diagnostic(&self.catalog, &fields, Some(&groups)) {
                Some(diagnostic) => diagnostics.push(diagnostic),
                None => tracing::trace!(rule = %slots.rule, "match discarded"),
            }
        }

        tracing::debug!("Full-text pass produced {} diagnostics", diagnostics.len());
        diagnostics
    }

    fn mode(&self) -> RecognitionMode {
        RecognitionMode::FullText
    }
}

/// @ai:intent Per-line recognizer: first matching rule wins, no group tracking
#[derive(Debug, Clone)]
pub struct LineRecognizer {
    catalog: Arc<Catalog>,
}

impl LineRecognizer {
    pub fn new(catalog: Arc<Catalog>) -> Self {
        Self { catalog }
    }

    /// @ai:intent Recognize a single line
    /// @ai:post None when no rule yields diagnostic fields or no file name is present
    /// @ai:example ("src/app.c:42:5: error: missing semicolon") -> Some(..)
    /// @ai:example ("Build succeeded in 3.2s") -> None
    /// @ai:effects pure
    pub fn recognize_line(&self, line: &str) -> Option<Diagnostic> {
        let line = strip_ansi(line);

        for rule in self.catalog.rules() {
            let Some(captures) = rule.regex().captures(&line) else {
                continue;
            };
            // Rules are matched from the start of the line only.
            if captures.get(0).map(|m| m.start()) != Some(0) {
                continue;
            }

            let mut fields = MatchFields::default();
            for field in rule.fields().iter().filter(|f| !f.is_group_marker()) {
                if let Some(value) = captures.name(field.name()) {
                    fields.set(*field, value.as_str());
                }
            }

            // Group-only matches are inert in line mode.
            if fields.is_empty() {
                continue;
            }

            return build_diagnostic(&self.catalog, &fields, None);
        }

        None
    }

    /// @ai:intent Recognize a sequence of pre-split lines, skipping lines that match nothing
    /// @ai:effects pure
    pub fn recognize_lines<'a, I>(&self, lines: I) -> Vec<Diagnostic>
    where
        I: IntoIterator<Item = &'a str>,
    {
        lines
            .into_iter()
            .filter_map(|line| self.recognize_line(line))
            .collect()
    }
}

impl Recognizer for LineRecognizer {
    fn recognize(&self, text: &str) -> Vec<Diagnostic> {
        let text = strip_ansi(text);
        let diagnostics = self.recognize_lines(split_lines(&text));
        tracing::debug!("Line pass produced {} diagnostics", diagnostics.len());
        diagnostics
    }

    fn mode(&self) -> RecognitionMode {
        RecognitionMode::Line
    }
}

/// @ai:intent Pick the recognition strategy once, at startup
/// @ai:pre catalog is already validated
/// @ai:post Auto never fails: it degrades to line mode when full text is unavailable
/// @ai:effects pure
pub fn select_recognizer(
    catalog: Arc<Catalog>,
    config: &EngineConfig,
) -> Result<Box<dyn Recognizer>> {
    match config.mode {
        RecognitionMode::Line => Ok(Box::new(LineRecognizer::new(catalog))),
        RecognitionMode::FullText => Ok(Box::new(FullTextRecognizer::new(catalog, config)?)),
        RecognitionMode::Auto => match FullTextRecognizer::new(Arc::clone(&catalog), config) {
            Ok(recognizer) => Ok(Box::new(recognizer)),
            Err(e) => {
                tracing::warn!("{}; falling back to line mode", e);
                Ok(Box::new(LineRecognizer::new(catalog)))
            }
        },
    }
}
