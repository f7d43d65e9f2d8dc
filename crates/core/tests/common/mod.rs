//! Shared test helpers for `toolfence_core` integration tests.

#![allow(unreachable_pub)]

use toolfence_core::{Command, PipelineResult};
use toolfence_diagnostics::{Diagnostic, Severity};
use toolfence_profile::Profile;

// ─── Reply builders ─────────────────────────────────────────────────────────

/// Wrap `payload` in a standard fenced block.
#[allow(dead_code)]
pub fn block(payload: &str) -> String {
    format!("```tool_call\n{payload}\n```")
}

/// Join prose and blocks the way a model reply interleaves them.
#[allow(dead_code)]
pub fn reply(parts: &[&str]) -> String {
    parts.join("\n\n")
}

// ─── Result helpers ──────────────────────────────────────────────────────────

/// Actions of the emitted commands, in order.
#[allow(dead_code)]
pub fn actions(result: &PipelineResult) -> Vec<&str> {
    result.commands.iter().map(|c| c.action.as_str()).collect()
}

/// Diagnostic codes in result order.
#[allow(dead_code)]
pub fn diag_codes(result: &PipelineResult) -> Vec<String> {
    result.diagnostics.iter().map(|d| d.id.to_string()).collect()
}

/// Find first diagnostic with the given code.
#[allow(dead_code)]
pub fn find_diag<'a>(issues: &'a [Diagnostic], code: &str) -> &'a Diagnostic {
    issues
        .iter()
        .find(|d| &*d.id == code)
        .unwrap_or_else(|| panic!("expected diagnostic {code}, got {issues:#?}"))
}

/// The only command of `result`.
#[allow(dead_code)]
pub fn single_command(result: &PipelineResult) -> &Command {
    assert_eq!(
        result.commands.len(),
        1,
        "expected one command, got {:#?}",
        result.commands
    );
    &result.commands[0]
}

// ─── Severity helpers ────────────────────────────────────────────────────────

#[allow(dead_code)]
pub fn count_severity(result: &PipelineResult, severity: Severity) -> usize {
    result
        .diagnostics
        .iter()
        .filter(|d| d.severity == severity)
        .count()
}

// ─── Profile fixture helpers ─────────────────────────────────────────────────

#[allow(dead_code)]
pub fn profile_from_json(json: &str) -> Profile {
    toolfence_profile::load_profile_from_str(json).expect("invalid profile JSON in test fixture")
}
