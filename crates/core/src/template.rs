//! `{{identifier}}` placeholder handling for templated commands.
//!
//! Identifiers match `[A-Za-z_][A-Za-z0-9_]*`; spaces just inside the braces
//! are tolerated (`{{ code }}`). Anything else between double braces is left
//! as literal text.
//!
//! Library surface only: the extraction pipeline never substitutes
//! placeholders. Callers that keep templated commands (for example a
//! `{{code}}` body filled in after extraction) use these helpers directly.

use std::collections::{BTreeMap, BTreeSet};
use std::ops::Range;
use thiserror::Error;

/// Errors from [`require`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TemplateError {
    /// A mandatory placeholder does not occur in the template.
    #[error("template is missing required placeholder '{{{{{0}}}}}'")]
    MissingPlaceholder(String),
}

fn is_ident(s: &str) -> bool {
    let mut chars = s.chars();
    chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Every placeholder occurrence as (byte range of the whole `{{..}}`, identifier).
fn occurrences(template: &str) -> Vec<(Range<usize>, &str)> {
    let mut out = Vec::new();
    let mut pos = 0usize;
    while let Some(rel) = template[pos..].find("{{") {
        let open = pos + rel;
        let inner_start = open + 2;
        let Some(close_rel) = template[inner_start..].find("}}") else {
            break;
        };
        let close = inner_start + close_rel;
        let ident = template[inner_start..close].trim_matches(' ');
        if is_ident(ident) {
            out.push((open..close + 2, ident));
            pos = close + 2;
        } else {
            // Not a placeholder; a later `{{` may still start one.
            pos = open + 1;
        }
    }
    out
}

/// Distinct placeholder identifiers used by `template`.
pub fn placeholders(template: &str) -> BTreeSet<String> {
    occurrences(template)
        .into_iter()
        .map(|(_, ident)| ident.to_string())
        .collect()
}

/// Substitute known placeholders; unknown ones are kept verbatim.
pub fn render(template: &str, values: &BTreeMap<String, String>) -> String {
    let mut out = String::with_capacity(template.len());
    let mut pos = 0usize;
    for (range, ident) in occurrences(template) {
        let Some(value) = values.get(ident) else {
            continue;
        };
        out.push_str(&template[pos..range.start]);
        out.push_str(value);
        pos = range.end;
    }
    out.push_str(&template[pos..]);
    out
}

/// Check that every identifier in `required` appears in `template`.
pub fn require(template: &str, required: &[&str]) -> Result<(), TemplateError> {
    let present = placeholders(template);
    match required.iter().find(|r| !present.contains(**r)) {
        Some(missing) => Err(TemplateError::MissingPlaceholder((*missing).to_string())),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lists_distinct_identifiers() {
        let set = placeholders("Explain {{code}} in {{ language }}; again {{code}}");
        assert_eq!(
            set.into_iter().collect::<Vec<_>>(),
            vec!["code".to_string(), "language".to_string()]
        );
    }

    #[test]
    fn ignores_non_identifiers() {
        assert!(placeholders("{{}} {{1abc}} {{a-b}} {single}").is_empty());
    }

    #[test]
    fn nested_opening_braces_still_match() {
        assert_eq!(
            placeholders("{{{{code}}").into_iter().collect::<Vec<_>>(),
            vec!["code".to_string()]
        );
    }

    #[test]
    fn render_substitutes_known_and_keeps_unknown() {
        let values = BTreeMap::from([("code".to_string(), "fn main() {}".to_string())]);
        let out = render("Review:\n{{code}}\nfor {{ lang }}", &values);
        assert_eq!(out, "Review:\nfn main() {}\nfor {{ lang }}");
    }

    #[test]
    fn render_does_not_rescan_substituted_text() {
        let values = BTreeMap::from([
            ("a".to_string(), "{{b}}".to_string()),
            ("b".to_string(), "x".to_string()),
        ]);
        assert_eq!(render("{{a}}", &values), "{{b}}");
    }

    #[test]
    fn require_reports_first_missing() {
        assert_eq!(require("use {{code}}", &["code"]), Ok(()));
        let err = require("no placeholders", &["code"]).unwrap_err();
        assert_eq!(err, TemplateError::MissingPlaceholder("code".into()));
        assert_eq!(
            err.to_string(),
            "template is missing required placeholder '{{code}}'"
        );
    }
}
