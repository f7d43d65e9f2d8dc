//! Text cleaner: produces the user-facing display text.

use crate::diag::Span;
use crate::scan::{ScanResult, find_marker, scan};

/// Remove every block and dangling region found by `scanned` from `input`,
/// collapse blank-line runs, and trim.
///
/// Removal repeats until no opening marker survives, since deleting one
/// region can join text on either side into a new marker. Each round is a
/// full rescan, so crafted input nesting spliced markers costs O(n²); every
/// round that continues shortens the text, which bounds the loop.
pub fn clean(input: &str, scanned: &ScanResult<'_>) -> String {
    let mut text = remove_spans(input, &scanned.removal_spans());
    while find_marker(&text, 0).is_some() {
        let rescanned = scan(&text);
        let next = remove_spans(&text, &rescanned.removal_spans());
        if next.len() == text.len() {
            break;
        }
        text = next;
    }
    collapse_blank_lines(&text).trim().to_string()
}

/// Scan and clean `input` in one step.
pub fn clean_text(input: &str) -> String {
    clean(input, &scan(input))
}

/// Copy `input` skipping the given ordered, non-overlapping spans.
fn remove_spans(input: &str, spans: &[Span]) -> String {
    let mut out = String::with_capacity(input.len());
    let mut pos = 0usize;
    for span in spans {
        if span.start < pos {
            continue;
        }
        out.push_str(&input[pos..span.start]);
        pos = span.end;
    }
    out.push_str(&input[pos..]);
    out
}

/// Collapse every run of three or more line breaks (`\n` or `\r\n`, with
/// only spaces or tabs between them) down to exactly `\n\n`.
pub fn collapse_blank_lines(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while !rest.is_empty() {
        let (breaks, consumed) = line_break_run(rest);
        if breaks >= 3 {
            out.push_str("\n\n");
            rest = &rest[consumed..];
            continue;
        }
        if breaks > 0 {
            out.push_str(&rest[..consumed]);
            rest = &rest[consumed..];
            continue;
        }
        // Copy leading blanks plus the word after them in one step.
        let blanks = rest.len() - rest.trim_start_matches([' ', '\t']).len();
        let word = rest[blanks..]
            .find(['\n', '\r', ' ', '\t'])
            .unwrap_or(rest.len() - blanks);
        let next = (blanks + word).max(rest.chars().next().map_or(0, char::len_utf8));
        out.push_str(&rest[..next]);
        rest = &rest[next..];
    }
    out
}

/// Count the line breaks in the blank run at the start of `text`.
///
/// Returns `(breaks, bytes)` where `bytes` covers the run through its last
/// line break; trailing spaces after that break are not consumed. Returns
/// `(0, 0)` when `text` does not start a run.
fn line_break_run(text: &str) -> (usize, usize) {
    let b = text.as_bytes();
    let mut i = 0usize;
    let mut breaks = 0usize;
    let mut consumed = 0usize;
    while i < b.len() {
        match b[i] {
            b' ' | b'\t' => i += 1,
            b'\n' => {
                i += 1;
                breaks += 1;
                consumed = i;
            }
            b'\r' if b.get(i + 1) == Some(&b'\n') => {
                i += 2;
                breaks += 1;
                consumed = i;
            }
            _ => break,
        }
    }
    (breaks, consumed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn removes_blocks_and_collapses() {
        let input = "Sure.\n\n```tool_call\n{\"action\":\"x\"}\n```\n\nDone.";
        assert_eq!(clean_text(input), "Sure.\n\nDone.");
    }

    #[test]
    fn no_blocks_is_trimmed_original() {
        assert_eq!(clean_text("  hello\nworld \n"), "hello\nworld");
    }

    #[test]
    fn collapse_keeps_double_breaks() {
        assert_eq!(collapse_blank_lines("a\n\nb"), "a\n\nb");
        assert_eq!(collapse_blank_lines("a\n\n\n\nb"), "a\n\nb");
        assert_eq!(collapse_blank_lines("a\n  \n\t\n b"), "a\n\n b");
        assert_eq!(collapse_blank_lines("a\r\n\r\n\r\nb"), "a\n\nb");
    }

    #[test]
    fn collapse_leaves_spaces_inside_lines() {
        assert_eq!(collapse_blank_lines("a  b\tc"), "a  b\tc");
        assert_eq!(collapse_blank_lines("é  ✓\n"), "é  ✓\n");
    }

    #[test]
    fn dangling_marker_is_removed() {
        let input = "Working on it.\n\n```tool_call\n{\"action\": \"create_fi";
        assert_eq!(clean_text(input), "Working on it.");
    }

    #[test]
    fn removal_that_forms_a_new_marker_is_repeated() {
        // Removing the block joins the backticks around it into a marker.
        let input = "a `````tool_call\n{}\n````tool_call b";
        assert_eq!(clean_text(input), "a");
    }

    #[test]
    fn cleaning_is_idempotent() {
        let inputs = [
            "x\n\n\n```tool_call\n{}\n```\n\n\ny",
            "```tool_call\n{\"a\":1}\n``` tail ```tool_call",
            "  \n\n ",
            "```TOOL_CALL``````tool_call\n```",
        ];
        for input in inputs {
            let once = clean_text(input);
            assert_eq!(clean_text(&once), once, "{input:?}");
        }
    }

    #[test]
    fn failed_blocks_are_still_removed() {
        let input = "Here:\n```tool_call\n{not json\n```\nend";
        assert_eq!(clean_text(input), "Here:\n\nend");
    }
}
