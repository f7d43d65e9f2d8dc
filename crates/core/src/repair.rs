//! Structural repairer: escapes literal line breaks inside string values.
//!
//! Models often emit multi-line file content as a JSON string with real line
//! breaks in it, which no JSON parser accepts. This is a regional transform,
//! not a parser: it walks quoted regions (honouring backslash escapes) and
//! rewrites control characters inside them. Braces are never balanced and
//! overall shape is never checked; that is left to the parse attempt.

use std::borrow::Cow;

/// Result of [`escape_line_breaks`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Repaired<'a> {
    /// The repaired text; borrowed when nothing needed changing.
    pub text: Cow<'a, str>,
    /// Number of characters that were escaped.
    pub escaped: usize,
}

/// Replace literal `\n`, `\r`, and `\t` inside quoted regions with their
/// two-character escapes. Text outside quotes is copied verbatim, and an
/// unterminated final string is repaired up to the end of input.
pub fn escape_line_breaks(text: &str) -> Repaired<'_> {
    if !text.contains(['\n', '\r', '\t']) {
        return Repaired {
            text: Cow::Borrowed(text),
            escaped: 0,
        };
    }

    let mut out = String::with_capacity(text.len() + 16);
    let mut escaped = 0usize;
    let mut in_str = false;
    let mut chars = text.chars();

    while let Some(c) = chars.next() {
        if !in_str {
            if c == '"' {
                in_str = true;
            }
            out.push(c);
            continue;
        }

        match c {
            '\\' => {
                // Keep the escape pair verbatim so an escaped quote never
                // closes the region.
                out.push(c);
                if let Some(next) = chars.next() {
                    out.push(next);
                }
            }
            '"' => {
                in_str = false;
                out.push(c);
            }
            '\n' => {
                out.push_str("\\n");
                escaped += 1;
            }
            '\r' => {
                out.push_str("\\r");
                escaped += 1;
            }
            '\t' => {
                out.push_str("\\t");
                escaped += 1;
            }
            _ => out.push(c),
        }
    }

    if escaped == 0 {
        return Repaired {
            text: Cow::Borrowed(text),
            escaped: 0,
        };
    }
    Repaired {
        text: Cow::Owned(out),
        escaped,
    }
}
