//! Path sanitizer: rewrites absolute paths into project-relative ones.
//!
//! Applied to every field the profile declares as a path. Relative values
//! pass through untouched; absolute ones are cut down by a fallback chain
//! (project marker, home directory, trailing segments, bare filename) so
//! that an executor never writes outside the project tree.

use crate::command::Command;
use crate::diag::{Diagnostic, Span, Stage, codes, ctx, snippet};
use std::borrow::Cow;
use toolfence_profile::Profile;

fn is_separator(c: char) -> bool {
    c == '/' || c == '\\'
}

/// Length of a leading `X:` drive prefix, if any.
fn drive_prefix_len(path: &str) -> Option<usize> {
    let b = path.as_bytes();
    (b.len() >= 2 && b[0].is_ascii_alphabetic() && b[1] == b':').then_some(2)
}

/// Whether `path` escapes the project: after leading whitespace, a drive
/// prefix (`C:\x`, `C:`, and drive-relative `C:x` alike) or a leading
/// separator.
pub fn is_absolute(path: &str) -> bool {
    let path = path.trim_start();
    drive_prefix_len(path).is_some() || path.starts_with(is_separator)
}

/// Strip surrounding whitespace and any drive prefixes from one segment.
fn bare_segment(mut segment: &str) -> &str {
    loop {
        segment = segment.trim_start();
        match drive_prefix_len(segment) {
            Some(n) => segment = &segment[n..],
            None => return segment.trim_end(),
        }
    }
}

/// Split an absolute path into meaningful segments.
///
/// No returned segment is empty, `.`, `..`, or starts with a drive prefix.
fn segments(path: &str) -> Vec<&str> {
    path.split(is_separator)
        .map(bare_segment)
        .filter(|s| !s.is_empty() && *s != "." && *s != "..")
        .collect()
}

/// Sanitize a single path value. Returns the input borrowed when it is
/// already relative.
pub fn sanitize_path<'a>(path: &'a str, profile: &Profile) -> Cow<'a, str> {
    if !is_absolute(path) {
        return Cow::Borrowed(path);
    }
    let segs = segments(path.trim_start());

    if let Some(i) = segs.iter().position(|s| profile.is_project_marker(s))
        && i + 1 < segs.len()
    {
        return Cow::Owned(segs[i + 1..].join("/"));
    }

    // <home root>/<user>/<project>/...
    if segs.len() >= 4 && profile.is_home_root(segs[0]) {
        return Cow::Owned(segs[3..].join("/"));
    }

    let keep = profile.fallback_segments;
    if keep > 0 && segs.len() >= keep {
        return Cow::Owned(segs[segs.len() - keep..].join("/"));
    }

    Cow::Owned(segs.last().map(|s| (*s).to_string()).unwrap_or_default())
}

/// Rewrite every absolute path field of `command` in place.
pub fn sanitize_command(
    command: &mut Command,
    span: Span,
    profile: &Profile,
    issues: &mut Vec<Diagnostic>,
) {
    for (name, value) in command.fields.iter_mut() {
        if !profile.is_path_field(name) {
            continue;
        }
        let Cow::Owned(rewritten) = sanitize_path(value, profile) else {
            continue;
        };
        if rewritten == *value {
            continue;
        }
        issues.push(
            Diagnostic::warn(
                codes::PATH_REWRITTEN,
                Stage::Sanitize,
                format!("absolute path in '{name}' rewritten to '{rewritten}'"),
                Some(span),
            )
            .with_snippet(snippet(value, profile.snippet_chars))
            .with_context(ctx!(
                "kind" => "path-rewritten",
                "field" => name.clone(),
                "action" => command.action.clone(),
                "from" => value.clone(),
                "to" => rewritten.clone(),
            )),
        );
        *value = rewritten;
    }
}
