//! Encoding normalizer: detects and reverses double-encoding.
//!
//! A reply that was itself JSON-string-encoded before reaching the pipeline
//! carries its structure as escape sequences: `\n` instead of line breaks,
//! `\"` instead of quotes. This stage is best-effort and never fails; when
//! the evidence is ambiguous the text is left untouched.

use crate::scan::find_marker;

/// Whether `text` contains a `"` that is not preceded by an odd run of
/// backslashes.
pub fn has_unescaped_quote(text: &str) -> bool {
    let mut backslashes = 0usize;
    for b in text.bytes() {
        if b == b'\\' {
            backslashes += 1;
            continue;
        }
        if b == b'"' && backslashes % 2 == 0 {
            return true;
        }
        backslashes = 0;
    }
    false
}

/// Whether a block interior looks double-encoded: it contains the
/// two-character sequence backslash + `n` and no structural quote.
pub fn is_double_encoded(text: &str) -> bool {
    text.contains("\\n") && !has_unescaped_quote(text)
}

/// Reverse one level of string escaping in a single left-to-right pass.
///
/// Recognises `\n`, `\r`, `\t`, `\"`, `\\`, and `\/`. Any other escape, and
/// a trailing lone backslash, is copied through verbatim. Because each
/// backslash is consumed together with the character it escapes, output
/// produced by one replacement is never re-read as input to another.
pub fn unescape_once(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('t') => out.push('\t'),
            Some('"') => out.push('"'),
            Some('\\') => out.push('\\'),
            Some('/') => out.push('/'),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    out
}

/// Normalize a block interior. Returns the unescaped text when the interior
/// is double-encoded, `None` when it should be used as-is.
pub fn normalize_encoding(text: &str) -> Option<String> {
    is_double_encoded(text).then(|| unescape_once(text))
}

/// Decode a whole reply that arrived double-encoded.
///
/// Two shapes are recognised:
/// - the trimmed reply is a complete JSON string literal whose decoded
///   text contains an opening marker (it is decoded with a real JSON
///   parser, so malformed literals are left alone);
/// - the reply has no real line breaks, contains an opening marker and
///   escaped line breaks, and has no structural quotes.
///
/// Returns `None` when the reply should be scanned as-is.
pub fn unwrap_document(input: &str) -> Option<String> {
    let trimmed = input.trim();
    if trimmed.len() >= 2
        && trimmed.starts_with('"')
        && trimmed.ends_with('"')
        && let Ok(decoded) = serde_json::from_str::<String>(trimmed)
        && find_marker(&decoded, 0).is_some()
    {
        return Some(decoded);
    }
    let single_line = !input.contains('\n');
    if single_line && find_marker(input, 0).is_some() && is_double_encoded(input) {
        return Some(unescape_once(input));
    }
    None
}
