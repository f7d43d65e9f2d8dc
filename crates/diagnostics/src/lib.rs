//! Diagnostics for the toolfence pipeline.
//!
//! Provides [`Diagnostic`], [`Severity`], [`Stage`], [`Span`], and
//! [`LineIndex`] types used
//! to record skipped or corrected tool-call blocks. Diagnostics are a
//! side channel: producing one never interrupts processing of the blocks
//! that follow. Diagnostic codes are defined in the [`codes`] module.

#![warn(missing_docs)]

/// Diagnostic ID constants.
pub mod codes;

use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::collections::BTreeMap;

/// Maps byte offsets in a reply to 0-indexed `(line, column)` pairs.
///
/// Built once per document in O(n); lookups binary-search the line table.
/// Columns are byte offsets within the line.
#[derive(Debug, Clone)]
pub struct LineIndex {
    /// Byte offset at which each line begins; the first entry is always 0.
    starts: Vec<usize>,
}

impl LineIndex {
    /// Index the line breaks of `text`.
    pub fn new(text: &str) -> Self {
        let starts = std::iter::once(0)
            .chain(text.match_indices('\n').map(|(i, _)| i + 1))
            .collect();
        Self { starts }
    }

    /// Line and column of `offset`. Offsets past the end land on the last line.
    pub fn line_col(&self, offset: usize) -> (usize, usize) {
        let line = self
            .starts
            .partition_point(|&start| start <= offset)
            .saturating_sub(1);
        (line, offset - self.starts[line])
    }

    /// Number of lines; an empty document has one.
    pub fn line_count(&self) -> usize {
        self.starts.len()
    }
}

/// Severity level for a diagnostic message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[non_exhaustive]
pub enum Severity {
    /// The block was dropped; no command was emitted for it.
    Error,
    /// The block was emitted, but its data was silently reshaped.
    Warn,
    /// Informational note about a benign correction.
    Info,
}

/// The pipeline stage that produced a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    /// Block scanning (fence detection).
    Scan,
    /// Encoding normalization (double-encoding reversal).
    Decode,
    /// Structural repair of string values.
    Repair,
    /// Deserialization of the repaired payload.
    Parse,
    /// Action folding and value coercion.
    Normalize,
    /// Required-field validation.
    Validate,
    /// Path sanitization.
    Sanitize,
}

impl Stage {
    /// Lowercase stage name, as serialized.
    pub fn as_str(self) -> &'static str {
        match self {
            Stage::Scan => "scan",
            Stage::Decode => "decode",
            Stage::Repair => "repair",
            Stage::Parse => "parse",
            Stage::Normalize => "normalize",
            Stage::Validate => "validate",
            Stage::Sanitize => "sanitize",
        }
    }
}

/// Byte span in the source document.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Span {
    /// Byte offset of the first character (0-based).
    pub start: usize,
    /// Byte offset one past the last character.
    pub end: usize,
}

impl Span {
    /// Create a span covering `[start, end)`.
    ///
    /// Panics if `end < start`.
    pub fn new(start: usize, end: usize) -> Self {
        assert!(end >= start, "Span end ({end}) < start ({start})");
        Self { start, end }
    }

    /// Create a zero-width span at the given position.
    pub fn empty(pos: usize) -> Self {
        Self {
            start: pos,
            end: pos,
        }
    }

    /// Length of the span in bytes.
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    /// Whether the span covers no bytes.
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// A non-fatal record of a skipped or altered block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// Unique diagnostic code (e.g., `"TF2002"`).
    pub id: Cow<'static, str>,
    /// Severity level.
    pub severity: Severity,
    /// Stage that produced the diagnostic.
    pub stage: Stage,
    /// Human-readable diagnostic message.
    pub message: String,
    /// Byte span of the block this diagnostic relates to.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub span: Option<Span>,
    /// Leading excerpt of the offending text.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub snippet: Option<String>,
    /// Machine-readable context for tooling. Keys and values are free-form
    /// strings; `BTreeMap` keeps serialized key order deterministic.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<BTreeMap<String, String>>,
}

impl Diagnostic {
    /// Create a diagnostic with the given fields.
    pub fn new(
        id: impl Into<Cow<'static, str>>,
        severity: Severity,
        stage: Stage,
        message: impl Into<String>,
        span: Option<Span>,
    ) -> Self {
        Self {
            id: id.into(),
            severity,
            stage,
            message: message.into(),
            span,
            snippet: None,
            context: None,
        }
    }

    /// Shorthand for an `Error` diagnostic.
    pub fn error(
        id: impl Into<Cow<'static, str>>,
        stage: Stage,
        message: impl Into<String>,
        span: Option<Span>,
    ) -> Self {
        Self::new(id, Severity::Error, stage, message, span)
    }

    /// Shorthand for a `Warn` diagnostic.
    pub fn warn(
        id: impl Into<Cow<'static, str>>,
        stage: Stage,
        message: impl Into<String>,
        span: Option<Span>,
    ) -> Self {
        Self::new(id, Severity::Warn, stage, message, span)
    }

    /// Shorthand for an `Info` diagnostic.
    pub fn info(
        id: impl Into<Cow<'static, str>>,
        stage: Stage,
        message: impl Into<String>,
        span: Option<Span>,
    ) -> Self {
        Self::new(id, Severity::Info, stage, message, span)
    }

    /// Attach an excerpt of the offending text (builder pattern).
    pub fn with_snippet(mut self, snippet: impl Into<String>) -> Self {
        self.snippet = Some(snippet.into());
        self
    }

    /// Attach machine-readable context metadata (builder pattern).
    ///
    /// Keys are short descriptors like `"kind"`, `"field"`, `"from"`, `"to"`.
    pub fn with_context(mut self, ctx: BTreeMap<String, String>) -> Self {
        self.context = Some(ctx);
        self
    }

    /// Look up a context value by key.
    pub fn context_value(&self, key: &str) -> Option<&str> {
        self.context
            .as_ref()
            .and_then(|ctx| ctx.get(key))
            .map(String::as_str)
    }

    /// Returns the human-readable explanation for this diagnostic's code, if available.
    pub fn explain(&self) -> Option<&'static str> {
        explain(&self.id)
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warn => write!(f, "warn"),
            Severity::Info => write!(f, "info"),
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}[{}] ({}): {}",
            self.severity, self.id, self.stage, self.message
        )
    }
}

/// Returns the human-readable explanation for a diagnostic code, if known.
pub fn explain(id: &str) -> Option<&'static str> {
    match id {
        codes::UNTERMINATED_BLOCK => Some(
            "An opening ```tool_call marker was found with no closing fence before the end \
             of the reply or the next opening marker. The region is not treated as a block \
             and is removed from the display text.",
        ),
        codes::DOUBLE_ENCODING_REVERSED => Some(
            "The block interior contained escape sequences such as \\n and \\\" but no \
             structural quotes, so it was treated as double-encoded and unescaped once.",
        ),
        codes::DOCUMENT_UNWRAPPED => Some(
            "The entire reply was a JSON string literal. It was decoded before scanning; \
             spans refer to the decoded text.",
        ),
        codes::LINE_BREAKS_ESCAPED => Some(
            "Literal line breaks appeared inside quoted string values, which is invalid in \
             JSON. They were replaced with their two-character escapes.",
        ),
        codes::EMPTY_BLOCK => Some(
            "The tool_call block contained only whitespace. No command was emitted.",
        ),
        codes::PARSE_FAILURE => Some(
            "The repaired payload could not be deserialized as JSON. The block was dropped \
             and processing continued with the next block.",
        ),
        codes::NOT_AN_OBJECT => Some(
            "The payload deserialized to an array, string, number, boolean, or null. A \
             command payload must be a single JSON object.",
        ),
        codes::MISSING_ACTION => Some(
            "The payload had no usable `action` field. It must be present and be a \
             non-empty string. The block was dropped.",
        ),
        codes::MISSING_REQUIRED_FIELD => Some(
            "The active profile requires a field for this action and the payload did not \
             provide it. The block was dropped rather than emitted with a placeholder.",
        ),
        codes::ACTION_FOLDED => Some(
            "The action name is a known synonym and was replaced with its canonical name.",
        ),
        codes::VALUE_COERCED => Some(
            "A field held an object or array where a string was expected. The value was \
             serialized back to JSON text and substituted in place.",
        ),
        codes::NULL_FIELD_DROPPED => Some(
            "A field held `null`. Command fields are always strings, so the field was \
             removed.",
        ),
        codes::PATH_REWRITTEN => Some(
            "A path field held an absolute path. It was rewritten to a project-relative \
             path so it never points outside the workspace.",
        ),
        _ => None,
    }
}

/// Returns the severity a diagnostic code is normally reported with.
pub fn default_severity(id: &str) -> Option<Severity> {
    match id {
        codes::EMPTY_BLOCK
        | codes::PARSE_FAILURE
        | codes::NOT_AN_OBJECT
        | codes::MISSING_ACTION
        | codes::MISSING_REQUIRED_FIELD => Some(Severity::Error),
        codes::VALUE_COERCED | codes::PATH_REWRITTEN => Some(Severity::Warn),
        codes::UNTERMINATED_BLOCK
        | codes::DOUBLE_ENCODING_REVERSED
        | codes::DOCUMENT_UNWRAPPED
        | codes::LINE_BREAKS_ESCAPED
        | codes::ACTION_FOLDED
        | codes::NULL_FIELD_DROPPED => Some(Severity::Info),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_index_maps_offsets() {
        let idx = LineIndex::new("ab\ncd\n");
        assert_eq!(idx.line_count(), 3);
        assert_eq!(idx.line_col(0), (0, 0));
        assert_eq!(idx.line_col(2), (0, 2));
        assert_eq!(idx.line_col(3), (1, 0));
        assert_eq!(idx.line_col(4), (1, 1));
        assert_eq!(idx.line_col(6), (2, 0));
        assert_eq!(idx.line_col(50), (2, 44));
    }

    #[test]
    fn line_index_empty_input() {
        let idx = LineIndex::new("");
        assert_eq!(idx.line_count(), 1);
        assert_eq!(idx.line_col(0), (0, 0));
    }

    // ── Span ────────────────────────────────────────────────────────────

    #[test]
    fn span_new_valid() {
        let s = Span::new(5, 10);
        assert_eq!(s.start, 5);
        assert_eq!(s.end, 10);
        assert_eq!(s.len(), 5);
    }

    #[test]
    fn span_empty() {
        let s = Span::empty(7);
        assert!(s.is_empty());
        assert_eq!(s.start, 7);
    }

    #[test]
    #[should_panic(expected = "Span end (3) < start (5)")]
    fn span_new_inverted_panics() {
        Span::new(5, 3);
    }

    // ── Display ─────────────────────────────────────────────────────────

    #[test]
    fn severity_and_stage_display() {
        assert_eq!(Severity::Error.to_string(), "error");
        assert_eq!(Severity::Warn.to_string(), "warn");
        assert_eq!(Severity::Info.to_string(), "info");
        assert_eq!(Stage::Sanitize.to_string(), "sanitize");
    }

    #[test]
    fn diagnostic_display() {
        let d = Diagnostic::error(codes::PARSE_FAILURE, Stage::Parse, "bad json", None);
        assert_eq!(d.to_string(), "error[TF2002] (parse): bad json");
    }

    // ── Constructors and builders ───────────────────────────────────────

    #[test]
    fn diagnostic_constructors_set_severity() {
        let e = Diagnostic::error(codes::MISSING_ACTION, Stage::Validate, "m", None);
        let w = Diagnostic::warn(codes::VALUE_COERCED, Stage::Normalize, "m", None);
        let i = Diagnostic::info("CUSTOM", Stage::Scan, "m", Some(Span::new(0, 3)));
        assert_eq!(e.severity, Severity::Error);
        assert_eq!(w.severity, Severity::Warn);
        assert_eq!(i.severity, Severity::Info);
        assert_eq!(i.id, "CUSTOM");
        assert_eq!(i.span, Some(Span::new(0, 3)));
    }

    #[test]
    fn diagnostic_with_snippet_and_context() {
        let d = Diagnostic::warn(codes::PATH_REWRITTEN, Stage::Sanitize, "rewritten", None)
            .with_snippet("/abs/path")
            .with_context(BTreeMap::from([
                ("field".into(), "path".into()),
                ("to".into(), "path".into()),
            ]));
        assert_eq!(d.snippet.as_deref(), Some("/abs/path"));
        assert_eq!(d.context_value("field"), Some("path"));
        assert_eq!(d.context_value("missing"), None);
    }

    // ── explain / default_severity ──────────────────────────────────────

    #[test]
    fn all_codes_have_explanations_and_severities() {
        for code in codes::ALL {
            assert!(explain(code).is_some(), "code {code} has no explain() entry");
            assert!(
                default_severity(code).is_some(),
                "code {code} has no default severity"
            );
        }
    }

    #[test]
    fn codes_are_unique() {
        let mut seen = std::collections::HashSet::new();
        for code in codes::ALL {
            assert!(seen.insert(*code), "duplicate code {code}");
        }
    }

    #[test]
    fn explain_unknown_code() {
        let d = Diagnostic::error("UNKNOWN_CODE", Stage::Parse, "test", None);
        assert!(d.explain().is_none());
    }

    // ── Serde ───────────────────────────────────────────────────────────

    #[test]
    fn diagnostic_serde_roundtrip() {
        let d = Diagnostic::error(codes::PARSE_FAILURE, Stage::Parse, "x", Some(Span::new(1, 9)))
            .with_snippet("{oops");
        let json = serde_json::to_string(&d).unwrap();
        let d2: Diagnostic = serde_json::from_str(&json).unwrap();
        assert_eq!(d, d2);
    }

    #[test]
    fn diagnostic_serde_omits_absent_parts() {
        let d = Diagnostic::info(codes::ACTION_FOLDED, Stage::Normalize, "folded", None);
        let json = serde_json::to_string(&d).unwrap();
        assert!(!json.contains("span"), "None span should be omitted: {json}");
        assert!(!json.contains("snippet"), "None snippet should be omitted: {json}");
        assert!(!json.contains("context"), "None context should be omitted: {json}");
        assert!(json.contains(r#""stage":"normalize""#), "{json}");
        assert!(json.contains(r#""severity":"info""#), "{json}");
    }
}
