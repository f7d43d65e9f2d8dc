mod render;

use std::fs;
use std::io::{self, Read};
use std::process;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use toolfence_core::{Command, PipelineResult, extract_with_profile};
use toolfence_diagnostics::{self as diag, Diagnostic, Severity};
use toolfence_profile::{Profile, load_profile_from_str};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

use crate::render::{Format, print_summary, render_diagnostics_pretty};

// ── CLI definition ──────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(
    name = "toolfence",
    version,
    about = "Extract, repair, and sanitize tool-call blocks from language-model replies"
)]
struct Cli {
    /// Output mode: "pretty" for coloured terminal output, "json" for
    /// machine-readable JSON. Defaults to "pretty" when stdout is a TTY,
    /// "json" otherwise.
    #[arg(long, global = true, value_parser = ["pretty", "json"])]
    output: Option<String>,

    /// Profile JSON overriding the default markers, synonyms, and field roles.
    #[arg(long, global = true)]
    profile: Option<String>,

    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(Subcommand, Debug)]
enum Cmd {
    /// Extract commands, cleaned text, and diagnostics from a reply.
    Extract {
        /// Reply file, or `-` for stdin.
        file: String,
    },

    /// Print the reply with every tool-call block removed.
    Clean {
        /// Reply file, or `-` for stdin.
        file: String,
    },

    /// Report diagnostics only; exit 1 if any block was dropped.
    Check {
        /// Reply file, or `-` for stdin.
        file: String,
    },

    /// Explain a diagnostic ID (e.g. TF2002).
    Explain { id: String },
}

// ── Main ────────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    init_tracing();

    let cli = Cli::parse();
    let format = Format::resolve_or_detect(cli.output.as_deref());
    let profile = load_profile(cli.profile.as_deref())?;

    match cli.cmd {
        Cmd::Extract { file } => cmd_extract(&file, profile.as_ref(), format)?,
        Cmd::Clean { file } => cmd_clean(&file, profile.as_ref(), format)?,
        Cmd::Check { file } => cmd_check(&file, profile.as_ref(), format)?,
        Cmd::Explain { id } => cmd_explain(&id, format)?,
    }

    Ok(())
}

/// Operator logging to stderr, filtered by `RUST_LOG` (default `warn`).
fn init_tracing() {
    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::WARN.into())
        .from_env_lossy();
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

// ── Commands ────────────────────────────────────────────────────────────

fn cmd_extract(file: &str, profile: Option<&Profile>, format: Format) -> Result<()> {
    let input = read_input(file)?;
    let res = run(&input, profile);

    match format {
        Format::Json => {
            println!("{}", serde_json::to_string_pretty(&res)?);
        }
        Format::Pretty => {
            // Commands and cleaned text to stdout, diagnostics to stderr.
            for (i, cmd) in res.commands.iter().enumerate() {
                print_command(i + 1, cmd);
            }
            if !res.cleaned_text.is_empty() {
                if !res.commands.is_empty() {
                    println!();
                }
                println!("{}", res.cleaned_text);
            }
            report_pretty(&input, file, &res);
        }
    }

    Ok(())
}

fn cmd_clean(file: &str, profile: Option<&Profile>, format: Format) -> Result<()> {
    let input = read_input(file)?;
    let res = run(&input, profile);

    match format {
        Format::Json => {
            let out = serde_json::json!({ "cleaned_text": res.cleaned_text });
            println!("{}", serde_json::to_string_pretty(&out)?);
        }
        Format::Pretty => println!("{}", res.cleaned_text),
    }

    Ok(())
}

fn cmd_check(file: &str, profile: Option<&Profile>, format: Format) -> Result<()> {
    let input = read_input(file)?;
    let res = run(&input, profile);
    let ok = !res.has_errors();

    match format {
        Format::Json => {
            let out = serde_json::json!({
                "ok": ok,
                "commands": res.commands.len(),
                "diagnostics": res.diagnostics,
            });
            println!("{}", serde_json::to_string_pretty(&out)?);
        }
        Format::Pretty => {
            report_pretty(&input, file, &res);
            if ok {
                eprintln!("check ok: {} command(s)", res.commands.len());
            }
        }
    }

    exit_on_errors(&res.diagnostics);
    Ok(())
}

fn cmd_explain(id: &str, format: Format) -> Result<()> {
    let text = diag::explain(id);
    match format {
        Format::Json => {
            let out = serde_json::json!({
                "id": id,
                "severity": diag::default_severity(id),
                "explanation": text,
            });
            println!("{}", serde_json::to_string_pretty(&out)?);
        }
        Format::Pretty => {
            // Explanation is the expected output, so it goes to stdout.
            if let Some(text) = text {
                use ariadne::Fmt;
                println!("{}: {}", id.fg(ariadne::Color::Cyan), text);
            } else {
                println!("{id}: (no explanation available)");
            }
        }
    }
    Ok(())
}

// ── Helpers ─────────────────────────────────────────────────────────────

fn run(input: &str, profile: Option<&Profile>) -> PipelineResult {
    let res = extract_with_profile(input, profile);
    tracing::info!(
        input_bytes = input.len(),
        commands = res.commands.len(),
        diagnostics = res.diagnostics.len(),
        decoded = res.decoded_document.is_some(),
        "extraction finished"
    );
    for d in &res.diagnostics {
        tracing::debug!(id = %d.id, stage = %d.stage, "{}", d.message);
    }
    res
}

fn report_pretty(input: &str, file: &str, res: &PipelineResult) {
    let name = display_name(file);
    render_diagnostics_pretty(res.source(input), name, &res.diagnostics);
    print_summary(&res.diagnostics);
}

fn print_command(index: usize, cmd: &Command) {
    println!("{index}. {} ({})", cmd.action, cmd.description);
    for (name, value) in &cmd.fields {
        let mut lines = value.lines();
        let first = lines.next().unwrap_or_default();
        println!("   {name}: {first}");
        for line in lines {
            println!("   {:width$}  {line}", "", width = name.len());
        }
    }
}

/// Read the reply from a file, or from stdin when `file` is `-`.
fn read_input(file: &str) -> Result<String> {
    if file == "-" {
        let mut buf = String::new();
        io::stdin()
            .read_to_string(&mut buf)
            .context("failed to read reply from stdin")?;
        return Ok(buf);
    }
    fs::read_to_string(file).with_context(|| format!("failed to read reply file '{file}'"))
}

fn display_name(file: &str) -> &str {
    if file == "-" { "<stdin>" } else { file }
}

fn load_profile(path: Option<&str>) -> Result<Option<Profile>> {
    let Some(path) = path else {
        return Ok(None);
    };
    let text =
        fs::read_to_string(path).with_context(|| format!("failed to read profile '{path}'"))?;
    let profile =
        load_profile_from_str(&text).with_context(|| format!("invalid profile '{path}'"))?;
    tracing::debug!(profile = %profile.id, path, "loaded profile");
    Ok(Some(profile))
}

/// Exit with code 1 if any diagnostic is an error.
/// Warnings and info do not cause a non-zero exit.
fn exit_on_errors(diagnostics: &[Diagnostic]) {
    if diagnostics
        .iter()
        .any(|d| matches!(d.severity, Severity::Error))
    {
        process::exit(1);
    }
}
