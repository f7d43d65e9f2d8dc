//! End-to-end extraction: raw reply in, commands plus display text out.

use crate::clean::clean;
use crate::command::{Command, parse_command};
use crate::decode::{normalize_encoding, unwrap_document};
use crate::diag::{Diagnostic, Severity, Stage, codes, ctx, snippet};
use crate::repair::escape_line_breaks;
use crate::sanitize::sanitize_command;
use crate::scan::{BlockSpan, scan};
use serde::Serialize;
use std::borrow::Cow;
use std::sync::LazyLock;
use toolfence_profile::Profile;

/// Output of one pipeline run.
#[derive(Debug, Clone, Serialize)]
pub struct PipelineResult {
    /// Validated commands in block order.
    pub commands: Vec<Command>,
    /// The reply with every block removed, blank runs collapsed, and trimmed.
    pub cleaned_text: String,
    /// Everything that was dropped or corrected, ordered by position.
    pub diagnostics: Vec<Diagnostic>,
    /// The decoded reply when the whole input arrived string-encoded.
    /// Diagnostic spans index this text instead of the raw input.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub decoded_document: Option<String>,
}

impl PipelineResult {
    /// Whether any block was dropped.
    pub fn has_errors(&self) -> bool {
        self.diagnostics
            .iter()
            .any(|d| d.severity == Severity::Error)
    }

    /// The text diagnostic spans refer to.
    pub fn source<'a>(&'a self, input: &'a str) -> &'a str {
        self.decoded_document.as_deref().unwrap_or(input)
    }
}

static DEFAULT_PROFILE: LazyLock<Profile> = LazyLock::new(Profile::default);

// ─── Public API ─────────────────────────────────────────────────────────────

/// Run the pipeline with the default profile.
pub fn extract_str(input: &str) -> PipelineResult {
    extract_with_profile(input, None)
}

/// Run the pipeline with an optional profile; `None` uses the defaults.
///
/// Never fails: every problem is reported through
/// [`PipelineResult::diagnostics`].
pub fn extract_with_profile(input: &str, profile: Option<&Profile>) -> PipelineResult {
    let profile = profile.unwrap_or(&*DEFAULT_PROFILE);
    let mut diagnostics = Vec::new();

    let decoded_document = unwrap_document(input);
    if let Some(decoded) = &decoded_document {
        diagnostics.push(
            Diagnostic::info(
                codes::DOCUMENT_UNWRAPPED,
                Stage::Decode,
                "reply was string-encoded and has been decoded",
                None,
            )
            .with_context(ctx!(
                "from_bytes" => input.len().to_string(),
                "to_bytes" => decoded.len().to_string(),
            )),
        );
    }
    let text = decoded_document.as_deref().unwrap_or(input);

    let scanned = scan(text);

    for region in &scanned.dangling {
        diagnostics.push(
            Diagnostic::info(
                codes::UNTERMINATED_BLOCK,
                Stage::Scan,
                "tool_call marker has no closing fence; region removed from display text",
                Some(*region),
            )
            .with_snippet(snippet(&text[region.start..region.end], profile.snippet_chars)),
        );
    }

    let commands = scanned
        .blocks
        .iter()
        .filter_map(|block| process_block(block, profile, &mut diagnostics))
        .collect();

    let cleaned_text = clean(text, &scanned);

    diagnostics.sort_by_key(|d| d.span.map_or(0, |s| s.start));

    PipelineResult {
        commands,
        cleaned_text,
        diagnostics,
        decoded_document,
    }
}

// ─── Per-block stages ───────────────────────────────────────────────────────

fn process_block(
    block: &BlockSpan<'_>,
    profile: &Profile,
    issues: &mut Vec<Diagnostic>,
) -> Option<Command> {
    let span = block.span;

    let payload: Cow<'_, str> = match normalize_encoding(block.content) {
        Some(decoded) => {
            issues.push(Diagnostic::info(
                codes::DOUBLE_ENCODING_REVERSED,
                Stage::Decode,
                "block interior was double-encoded; escapes reversed",
                Some(span),
            ));
            Cow::Owned(decoded)
        }
        None => Cow::Borrowed(block.content),
    };

    let repaired = escape_line_breaks(&payload);
    if repaired.escaped > 0 {
        issues.push(
            Diagnostic::info(
                codes::LINE_BREAKS_ESCAPED,
                Stage::Repair,
                format!(
                    "escaped {} literal line break(s) inside string values",
                    repaired.escaped
                ),
                Some(span),
            )
            .with_context(ctx!("count" => repaired.escaped.to_string())),
        );
    }

    let mut command = parse_command(&repaired.text, span, profile, issues)?;
    sanitize_command(&mut command, span, profile, issues);
    Some(command)
}
