//! Re-exports from the diagnostics crate plus small construction helpers.

pub use toolfence_diagnostics::{Diagnostic, Severity, Span, Stage, codes};

/// Shorthand for building a `BTreeMap<String, String>` context from key-value pairs.
macro_rules! ctx {
    ($($k:expr => $v:expr),+ $(,)?) => {
        std::collections::BTreeMap::from([$(($k.into(), $v.into())),+])
    };
}

pub(crate) use ctx;

/// The first `max_chars` characters of `text`, with an ellipsis when cut.
pub fn snippet(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}…", &text[..cut]),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snippet_keeps_short_text() {
        assert_eq!(snippet("abc", 10), "abc");
        assert_eq!(snippet("abc", 3), "abc");
    }

    #[test]
    fn snippet_cuts_on_char_boundary() {
        assert_eq!(snippet("ééééé", 2), "éé…");
    }
}
