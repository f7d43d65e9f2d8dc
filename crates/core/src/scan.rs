//! Block scanner: locates fenced `tool_call` blocks in raw model output.
//!
//! A block opens with three backticks followed by the language tag
//! `tool_call` (matched case-insensitively) and closes at the *nearest*
//! following backtick fence. Scanning is a single left-to-right pass over
//! the input; every fence search resumes where the previous one stopped,
//! so the work is linear in the input length.

use crate::diag::Span;

/// Three-backtick fence token shared by opening markers and closing fences.
pub const FENCE: &str = "```";

/// Language tag that turns a fence into a tool-call opening marker.
pub const LANGUAGE_TAG: &str = "tool_call";

/// Byte length of a complete opening marker (fence + tag).
pub const MARKER_LEN: usize = FENCE.len() + LANGUAGE_TAG.len();

/// A located candidate command block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockSpan<'a> {
    /// Full extent of the block, opening marker through closing fence.
    pub span: Span,
    /// Extent of the trimmed interior within the input.
    pub content_span: Span,
    /// The trimmed interior text; empty for an empty block.
    pub content: &'a str,
}

/// Output of [`scan`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanResult<'a> {
    /// Terminated blocks in order of appearance.
    pub blocks: Vec<BlockSpan<'a>>,
    /// Regions that start at an opening marker with no closing fence. Each
    /// runs to the next opening marker, or to the end of input.
    pub dangling: Vec<Span>,
}

impl ScanResult<'_> {
    /// Every region the text cleaner must remove, ordered by position.
    pub fn removal_spans(&self) -> Vec<Span> {
        let mut spans: Vec<Span> = self
            .blocks
            .iter()
            .map(|b| b.span)
            .chain(self.dangling.iter().copied())
            .collect();
        spans.sort_by_key(|s| s.start);
        spans
    }
}

/// Whether an opening marker starts at byte offset `pos`.
pub fn is_marker_at(input: &str, pos: usize) -> bool {
    let b = input.as_bytes();
    pos + MARKER_LEN <= b.len()
        && &b[pos..pos + FENCE.len()] == FENCE.as_bytes()
        && b[pos + FENCE.len()..pos + MARKER_LEN].eq_ignore_ascii_case(LANGUAGE_TAG.as_bytes())
}

/// Find the first opening marker at or after byte offset `from`.
///
/// `from` must lie on a char boundary.
pub fn find_marker(input: &str, from: usize) -> Option<usize> {
    let mut at = from;
    while at < input.len() {
        let pos = at + input[at..].find(FENCE)?;
        if is_marker_at(input, pos) {
            return Some(pos);
        }
        // Backticks are ASCII, so pos + 1 stays on a char boundary.
        at = pos + 1;
    }
    None
}

/// Scan `input` for tool-call blocks.
pub fn scan(input: &str) -> ScanResult<'_> {
    let mut result = ScanResult::default();
    let mut pos = 0usize;

    while let Some(open) = find_marker(input, pos) {
        let body_start = open + MARKER_LEN;
        let Some(rel) = input[body_start..].find(FENCE) else {
            result.dangling.push(Span::new(open, input.len()));
            break;
        };
        let close = body_start + rel;

        if is_marker_at(input, close) {
            // The nearest fence opens another block: this one was cut off.
            result.dangling.push(Span::new(open, close));
            pos = close;
            continue;
        }

        let end = close + FENCE.len();
        let (cs, ce) = trim_interior(input, body_start, close);
        result.blocks.push(BlockSpan {
            span: Span::new(open, end),
            content_span: Span::new(cs, ce),
            content: &input[cs..ce],
        });
        pos = end;
    }

    result
}

/// Escaped line-break sequences tolerated around a block interior when the
/// reply arrived JSON-string-encoded.
const ESCAPED_BREAKS: &[&str] = &["\\r\\n", "\\n", "\\r", "\\t"];

/// Shrink `[start, end)` past surrounding whitespace and escaped line breaks.
fn trim_interior(input: &str, mut start: usize, mut end: usize) -> (usize, usize) {
    loop {
        let inner = &input[start..end];
        let trimmed = inner.trim_start();
        start += inner.len() - trimmed.len();
        match ESCAPED_BREAKS.iter().find(|seq| trimmed.starts_with(**seq)) {
            Some(seq) => start += seq.len(),
            None => break,
        }
    }
    loop {
        let inner = &input[start..end];
        let trimmed = inner.trim_end();
        end = start + trimmed.len();
        match ESCAPED_BREAKS.iter().find(|seq| trimmed.ends_with(**seq)) {
            Some(seq) => end -= seq.len(),
            None => break,
        }
    }
    (start, end)
}
