//! toolfence core library.
//!
//! Turns a language model's free-form reply into validated tool calls and a
//! display-ready text. The main entry points are [`extract_str`] and
//! [`extract_with_profile`]; [`clean_text`] produces the display text alone.
//!
//! The pipeline is a pure function of its input. It never returns an error:
//! dropped and corrected blocks are reported as [`Diagnostic`]s.

#![warn(missing_docs)]

/// Text cleaner for the user-facing display text.
pub mod clean;
/// Command parser and normalizer.
pub mod command;
/// Encoding normalizer for double-encoded replies.
pub mod decode;
/// Diagnostic re-exports and helpers.
pub mod diag;
/// End-to-end pipeline.
pub mod pipeline;
/// Structural repairer for literal line breaks in strings.
pub mod repair;
/// Path sanitizer.
pub mod sanitize;
/// Block scanner.
pub mod scan;
/// `{{placeholder}}` substitution for templated commands.
pub mod template;

// ── Convenience re-exports ──────────────────────────────────────────────────

// Pipeline
pub use pipeline::{PipelineResult, extract_str, extract_with_profile};

// Commands
pub use command::{Command, fold_action};

// Stages usable on their own
pub use clean::clean_text;
pub use sanitize::{is_absolute, sanitize_path};
pub use scan::scan;
pub use template::TemplateError;

// Diagnostics (re-exported from the diagnostics crate)
pub use diag::{Diagnostic, Severity, Span, Stage, codes};

// Configuration (re-exported from the profile crate)
pub use toolfence_profile::{Profile, ProfileError, load_profile_from_str};
