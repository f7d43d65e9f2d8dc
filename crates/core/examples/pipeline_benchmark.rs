//! Lightweight extraction benchmark harness for local baselines.
//!
//! Run from repository root:
//! `cargo run -p toolfence_core --example pipeline_benchmark --release`

use std::time::Instant;

use toolfence_core::{clean_text, extract_str, scan};

/// A reply shaped like real model output: prose around several blocks,
/// one with literal newlines in its content and one with an absolute path.
fn mixed_reply(blocks: usize) -> String {
    let mut out = String::from("Sure, here is the plan.\n\n");
    for i in 0..blocks {
        out.push_str(&format!(
            "Step {i}:\n\n```tool_call\n{{\"action\":\"create_file\",\"path\":\"/home/dev/project/src/mod_{i}.rs\",\"content\":\"fn f{i}() {{\n    todo!()\n}}\"}}\n```\n\n\n"
        ));
    }
    out.push_str("Let me know if anything fails.");
    out
}

/// The same reply after being JSON-string-encoded once more.
fn double_encoded_reply(blocks: usize) -> String {
    serde_json::to_string(&mixed_reply(blocks)).unwrap_or_default()
}

fn per_iter_ms(elapsed: std::time::Duration, iterations: usize) -> f64 {
    elapsed.as_secs_f64() * 1000.0 / iterations as f64
}

fn run_benchmark(label: &str, input: &str, iterations: usize) {
    let scan_start = Instant::now();
    for _ in 0..iterations {
        let _ = scan(input);
    }
    let scan_elapsed = scan_start.elapsed();

    let extract_start = Instant::now();
    for _ in 0..iterations {
        let _ = extract_str(input);
    }
    let extract_elapsed = extract_start.elapsed();

    let clean_start = Instant::now();
    for _ in 0..iterations {
        let _ = clean_text(input);
    }
    let clean_elapsed = clean_start.elapsed();

    let once = extract_str(input);

    println!("Benchmark: {label}");
    println!("  input_bytes: {}", input.len());
    println!(
        "  commands: {}, diagnostics: {}",
        once.commands.len(),
        once.diagnostics.len()
    );
    println!(
        "  scan:     total={:?}, per_iter={:.3} ms",
        scan_elapsed,
        per_iter_ms(scan_elapsed, iterations)
    );
    println!(
        "  extract:  total={:?}, per_iter={:.3} ms",
        extract_elapsed,
        per_iter_ms(extract_elapsed, iterations)
    );
    println!(
        "  clean:    total={:?}, per_iter={:.3} ms",
        clean_elapsed,
        per_iter_ms(clean_elapsed, iterations)
    );
}

fn main() {
    let iterations = std::env::var("TOOLFENCE_BENCH_ITERS")
        .ok()
        .and_then(|v| v.parse::<usize>().ok())
        .filter(|v| *v > 0)
        .unwrap_or(500);

    run_benchmark("small_reply", &mixed_reply(3), iterations);
    run_benchmark("large_reply", &mixed_reply(200), iterations);
    run_benchmark("double_encoded", &double_encoded_reply(50), iterations);
}
