//! Extraction profiles for the toolfence pipeline.
//!
//! A [`Profile`] carries the domain-specific vocabulary the pipeline relies
//! on: which directory names mark a project root, which fields hold paths or
//! textual payloads, and which action names are synonyms of one another.
//! None of it is hard-coded in the core; [`Profile::default`] supplies the
//! vocabulary observed in deployed assistants.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

/// Errors that can occur when loading or validating a profile.
#[derive(Debug, Error)]
pub enum ProfileError {
    /// JSON deserialization failed.
    #[error("invalid profile JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    /// A field value is out of its valid range.
    #[error("invalid {field}: {reason}")]
    InvalidField {
        /// The name of the field that failed validation.
        field: String,
        /// A human-readable explanation of why the field value is invalid.
        reason: String,
    },
}

/// Vocabulary and thresholds used by the extraction pipeline.
///
/// Every field is optional in JSON; absent fields take the value from
/// [`Profile::default`]. Lists replace the default wholesale rather than
/// extending it.
///
/// # Example
/// ```
/// let profile = toolfence_profile::load_profile_from_str(
///     r#"{ "id": "monorepo", "project_markers": ["packages"] }"#,
/// )
/// .unwrap();
/// assert_eq!(profile.project_markers, vec!["packages".to_string()]);
/// assert_eq!(profile.fallback_segments, 3);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Profile {
    /// Profile identifier (e.g., `"default"`).
    pub id: String,
    /// Profile schema version for forward compatibility.
    pub schema_version: String,
    /// Substrings that identify a project/workspace/source root directory.
    /// Compared against lowercased path segments.
    pub project_markers: Vec<String>,
    /// Directory names that contain per-user home directories
    /// (`/home/<user>`, `/Users/<user>`).
    pub home_roots: Vec<String>,
    /// Number of trailing segments kept when no better cut is found.
    pub fallback_segments: usize,
    /// Fields whose values denote filesystem paths.
    pub path_fields: Vec<String>,
    /// Fields whose values are textual payloads (file content, diffs,
    /// commands). Nested values in these fields are pretty-printed.
    pub textual_fields: Vec<String>,
    /// Synonym → canonical action name.
    pub action_synonyms: BTreeMap<String, String>,
    /// Canonical action name → fields that must be present.
    pub required_fields: BTreeMap<String, Vec<String>>,
    /// Maximum number of characters kept in a diagnostic snippet.
    pub snippet_chars: usize,
}

const DEFAULT_PROJECT_MARKERS: &[&str] = &[
    "project",
    "workspace",
    "app",
    "myapp",
    "code",
    "src",
    "client",
    "server",
    "frontend",
    "backend",
];

const DEFAULT_HOME_ROOTS: &[&str] = &["home", "Users"];

const DEFAULT_PATH_FIELDS: &[&str] = &[
    "path",
    "file_path",
    "filepath",
    "target_path",
    "source_path",
    "destination",
    "destination_path",
    "old_path",
    "new_path",
    "directory",
    "dir",
    "cwd",
];

const DEFAULT_TEXTUAL_FIELDS: &[&str] = &[
    "content",
    "old_string",
    "new_string",
    "diff",
    "search",
    "replace",
    "todos",
    "command",
    "text",
    "query",
    "arguments",
    "prompt",
];

const DEFAULT_SYNONYMS: &[(&str, &str)] = &[
    ("run_command", "run_terminal_command"),
    ("run_terminal", "run_terminal_command"),
    ("execute_command", "run_terminal_command"),
    ("exec_command", "run_terminal_command"),
    ("run_shell", "run_terminal_command"),
    ("shell_command", "run_terminal_command"),
    ("modify_file", "edit_file"),
    ("update_file", "edit_file"),
    ("write_file", "create_file"),
];

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| (*s).to_string()).collect()
}

impl Default for Profile {
    fn default() -> Self {
        Self {
            id: "default".into(),
            schema_version: "1.0.0".into(),
            project_markers: strings(DEFAULT_PROJECT_MARKERS),
            home_roots: strings(DEFAULT_HOME_ROOTS),
            fallback_segments: 3,
            path_fields: strings(DEFAULT_PATH_FIELDS),
            textual_fields: strings(DEFAULT_TEXTUAL_FIELDS),
            action_synonyms: DEFAULT_SYNONYMS
                .iter()
                .map(|(from, to)| ((*from).to_string(), (*to).to_string()))
                .collect(),
            required_fields: BTreeMap::new(),
            snippet_chars: 200,
        }
    }
}

impl Profile {
    /// Whether `field` denotes a filesystem path.
    pub fn is_path_field(&self, field: &str) -> bool {
        self.path_fields.iter().any(|f| f == field)
    }

    /// Whether `field` carries a textual payload.
    pub fn is_textual_field(&self, field: &str) -> bool {
        self.textual_fields.iter().any(|f| f == field)
    }

    /// Whether `name` is one of the canonical action names synonyms fold onto.
    pub fn is_canonical_action(&self, name: &str) -> bool {
        self.action_synonyms.values().any(|to| to == name)
    }

    /// Fields that must be present for `action`; empty when none are configured.
    pub fn required_for(&self, action: &str) -> &[String] {
        self.required_fields
            .get(action)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Whether the lowercased `segment` contains any project marker.
    pub fn is_project_marker(&self, segment: &str) -> bool {
        let lower = segment.to_lowercase();
        self.project_markers
            .iter()
            .any(|marker| lower.contains(&marker.to_lowercase()))
    }

    /// Whether `segment` names a directory of per-user homes.
    pub fn is_home_root(&self, segment: &str) -> bool {
        self.home_roots
            .iter()
            .any(|root| root.eq_ignore_ascii_case(segment))
    }
}

/// Load and validate a [`Profile`] from a JSON string.
///
/// Performs structural validation after deserialization:
/// - `id` and `schema_version` must be non-empty
/// - `fallback_segments` and `snippet_chars` must be > 0
/// - `project_markers` entries must be non-empty (an empty marker would
///   match every segment)
/// - `action_synonyms` keys and targets must be non-empty
pub fn load_profile_from_str(s: &str) -> Result<Profile, ProfileError> {
    let profile: Profile = serde_json::from_str(s)?;
    validate_profile(&profile)?;
    Ok(profile)
}

/// Validate an already-constructed [`Profile`].
pub fn validate_profile(profile: &Profile) -> Result<(), ProfileError> {
    if profile.id.trim().is_empty() {
        return Err(invalid("id", "must not be empty"));
    }
    if profile.schema_version.trim().is_empty() {
        return Err(invalid("schema_version", "must not be empty"));
    }
    if profile.fallback_segments == 0 {
        return Err(invalid("fallback_segments", "must be > 0"));
    }
    if profile.snippet_chars == 0 {
        return Err(invalid("snippet_chars", "must be > 0"));
    }
    if let Some(i) = profile
        .project_markers
        .iter()
        .position(|m| m.trim().is_empty())
    {
        return Err(invalid(
            &format!("project_markers[{i}]"),
            "must not be empty",
        ));
    }
    for (from, to) in &profile.action_synonyms {
        if from.trim().is_empty() {
            return Err(invalid("action_synonyms", "synonym must not be empty"));
        }
        if to.trim().is_empty() {
            return Err(invalid(
                &format!("action_synonyms.{from}"),
                "canonical action must not be empty",
            ));
        }
    }
    Ok(())
}

fn invalid(field: &str, reason: &str) -> ProfileError {
    ProfileError::InvalidField {
        field: field.into(),
        reason: reason.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_profile_is_valid() {
        let p = Profile::default();
        validate_profile(&p).unwrap();
        assert_eq!(p.fallback_segments, 3);
        assert_eq!(p.snippet_chars, 200);
        assert!(p.is_path_field("path"));
        assert!(p.is_textual_field("content"));
        assert!(p.is_textual_field("old_string"));
        assert!(!p.is_textual_field("path"));
    }

    #[test]
    fn default_synonyms_fold_run_command_variants() {
        let p = Profile::default();
        for name in ["run_command", "run_terminal", "execute_command"] {
            assert_eq!(
                p.action_synonyms.get(name).map(String::as_str),
                Some("run_terminal_command")
            );
        }
        assert!(p.is_canonical_action("run_terminal_command"));
        assert!(!p.is_canonical_action("run_command"));
    }

    #[test]
    fn load_empty_object_uses_defaults() {
        let p = load_profile_from_str("{}").unwrap();
        assert_eq!(p, Profile::default());
    }

    #[test]
    fn load_partial_profile_overrides_only_given_fields() {
        let json = r#"{
            "id": "custom",
            "project_markers": ["repo"],
            "fallback_segments": 2,
            "required_fields": { "create_file": ["path", "content"] }
        }"#;
        let p = load_profile_from_str(json).unwrap();
        assert_eq!(p.id, "custom");
        assert_eq!(p.project_markers, vec!["repo".to_string()]);
        assert_eq!(p.fallback_segments, 2);
        assert_eq!(p.required_for("create_file"), ["path", "content"]);
        assert!(p.required_for("edit_file").is_empty());
        assert_eq!(p.path_fields, Profile::default().path_fields);
    }

    #[test]
    fn marker_matching_is_case_insensitive_substring() {
        let p = Profile::default();
        assert!(p.is_project_marker("MyProject"));
        assert!(p.is_project_marker("workspace"));
        assert!(!p.is_project_marker("randomdir"));
        assert!(p.is_home_root("users"));
        assert!(p.is_home_root("home"));
        assert!(!p.is_home_root("opt"));
    }

    #[test]
    fn zero_fallback_segments_rejected() {
        let err = load_profile_from_str(r#"{ "fallback_segments": 0 }"#).unwrap_err();
        assert!(
            err.to_string().contains("fallback_segments"),
            "error should mention fallback_segments: {err}"
        );
    }

    #[test]
    fn zero_snippet_chars_rejected() {
        let err = load_profile_from_str(r#"{ "snippet_chars": 0 }"#).unwrap_err();
        assert!(err.to_string().contains("snippet_chars"), "{err}");
    }

    #[test]
    fn empty_marker_rejected() {
        let err = load_profile_from_str(r#"{ "project_markers": ["src", " "] }"#).unwrap_err();
        assert!(err.to_string().contains("project_markers[1]"), "{err}");
    }

    #[test]
    fn empty_synonym_target_rejected() {
        let err = load_profile_from_str(r#"{ "action_synonyms": { "run": "" } }"#).unwrap_err();
        assert!(err.to_string().contains("action_synonyms.run"), "{err}");
    }

    #[test]
    fn empty_id_rejected() {
        let err = load_profile_from_str(r#"{ "id": "  " }"#).unwrap_err();
        assert!(matches!(err, ProfileError::InvalidField { ref field, .. } if field == "id"));
    }

    #[test]
    fn malformed_json_is_invalid_json_error() {
        let err = load_profile_from_str("{ not json").unwrap_err();
        assert!(matches!(err, ProfileError::InvalidJson(_)));
    }
}
