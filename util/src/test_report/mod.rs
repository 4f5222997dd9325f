//! Test report aggregation for the developer dashboard.
//!
//! Runs the configured test command, locates the JSON report inside its
//! (possibly noisy) output, and reduces it to a pass/fail summary, per-suite
//! breakdowns with sanitized failure traces, and aggregate coverage
//! percentages. Everything here is per-invocation; nothing is persisted and
//! concurrent runs are not coordinated.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeSet;
use std::process::Stdio;
use thiserror::Error;
use tokio::process::Command;

/// Fixed user-facing message for unrecoverable report parses. The raw parse
/// error is never surfaced to the dashboard.
pub const PARSE_FAILURE_MESSAGE: &str = "Failed to parse test results. Please try again.";

/// No JSON object could be located in the captured runner output.
#[derive(Debug, PartialEq, Eq, Error)]
#[error("no JSON report found in test runner output")]
pub struct ReportParseError;

/// Explicit inputs for a test run. Passed in by the caller so the aggregator
/// never reads process-global state such as the current working directory.
#[derive(Debug, Clone)]
pub struct TestRunOptions {
    /// Shell command that emits a JSON report on stdout.
    pub command: String,
    /// Working directory for the child process, also stripped from suite paths.
    pub cwd: String,
    /// Ceiling on captured output, in bytes. Text beyond it is discarded.
    pub output_limit: usize,
}

/// Overall counts from the runner, present only when the report carried a
/// nonzero total.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunSummary {
    pub total_tests: u64,
    pub passed_tests: u64,
    pub failed_tests: u64,
    pub pending_tests: u64,
    pub success: bool,
}

/// A single assertion result with its failure traces already sanitized.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestOutcome {
    pub title: String,
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure_messages: Option<Vec<String>>,
}

/// One test file's aggregated result, in report order.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuiteSummary {
    pub name: String,
    pub status: String,
    pub tests: Vec<TestOutcome>,
    pub duration: f64,
}

/// Aggregate coverage percentages, each formatted to two decimals or `"0"`
/// when that axis had nothing to measure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoverageSummary {
    pub lines: String,
    pub statements: String,
    pub functions: String,
    pub branches: String,
}

/// The aggregator's response body. `success` means the aggregation pipeline
/// completed; failing tests are data, not errors.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestRunReport {
    pub success: bool,
    pub summary: Option<RunSummary>,
    pub test_suites: Vec<SuiteSummary>,
    pub coverage: Option<CoverageSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Shape of the runner's JSON report. Unknown fields are ignored and missing
/// counts default to zero so older runner versions still parse.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawReport {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    num_total_tests: u64,
    #[serde(default)]
    num_passed_tests: u64,
    #[serde(default)]
    num_failed_tests: u64,
    #[serde(default)]
    num_pending_tests: u64,
    #[serde(default)]
    test_results: Vec<RawSuite>,
    coverage_map: Option<Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawSuite {
    #[serde(default)]
    name: String,
    #[serde(default)]
    status: String,
    #[serde(default)]
    assertion_results: Vec<RawAssertion>,
    perf_stats: Option<RawPerfStats>,
}

#[derive(Debug, Deserialize)]
struct RawPerfStats {
    #[serde(default)]
    runtime: f64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawAssertion {
    #[serde(default)]
    title: String,
    #[serde(default)]
    status: String,
    failure_messages: Option<Vec<String>>,
}

/// Decoded report plus how the JSON was located in the captured output.
struct ParsedReport {
    summary: Option<RunSummary>,
    test_suites: Vec<SuiteSummary>,
    coverage: Option<CoverageSummary>,
    /// The object came from the fallback scanner, not a clean parse of the
    /// whole output.
    recovered: bool,
}

pub struct ReportAggregator;

impl ReportAggregator {
    /// Launches the configured test command and reduces its report.
    ///
    /// Blocks until the child exits; there is no timeout beyond the output
    /// ceiling. Every failure path resolves to a well-formed report, so the
    /// caller can always serialize the result with a 200 status.
    pub async fn run_and_aggregate(options: &TestRunOptions) -> TestRunReport {
        let result = Command::new("sh")
            .arg("-c")
            .arg(&options.command)
            .current_dir(&options.cwd)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await;

        let (captured, run_error) = match result {
            Ok(output) => {
                let mut text = String::from_utf8_lossy(&output.stdout).into_owned();
                truncate_output(&mut text, options.output_limit);
                let run_error = if output.status.success() {
                    None
                } else {
                    Some(format!("test command failed: {}", output.status))
                };
                (text, run_error)
            }
            Err(e) => (
                String::new(),
                Some(format!("failed to launch test command: {}", e)),
            ),
        };

        Self::aggregate(&captured, run_error, &options.cwd)
    }

    /// Reduces captured runner output to a report. `run_error` carries the
    /// launch/exit failure, if any; it only decides the outcome when the
    /// output did not parse cleanly.
    pub fn aggregate(captured: &str, run_error: Option<String>, cwd: &str) -> TestRunReport {
        match Self::parse_report(captured, cwd) {
            Ok(parsed) => {
                if let Some(err) = run_error {
                    // The runner exits nonzero whenever a test fails while
                    // still printing the complete report. Only when the report
                    // had to be dug out of noisy output does the exit status
                    // downgrade the result.
                    if parsed.recovered {
                        tracing::warn!("test command failed, returning partial report: {err}");
                        return TestRunReport {
                            success: false,
                            summary: parsed.summary,
                            test_suites: parsed.test_suites,
                            coverage: None,
                            error: Some(err),
                        };
                    }
                    tracing::debug!("test command exited nonzero but its report parsed cleanly: {err}");
                }
                TestRunReport {
                    success: true,
                    summary: parsed.summary,
                    test_suites: parsed.test_suites,
                    coverage: parsed.coverage,
                    error: None,
                }
            }
            Err(_) => {
                let error = match run_error {
                    Some(err) => err,
                    None => PARSE_FAILURE_MESSAGE.to_string(),
                };
                tracing::warn!("unable to recover a test report: {error}");
                TestRunReport {
                    success: false,
                    summary: None,
                    test_suites: Vec::new(),
                    coverage: None,
                    error: Some(error),
                }
            }
        }
    }

    fn parse_report(captured: &str, cwd: &str) -> Result<ParsedReport, ReportParseError> {
        let (value, recovered) = locate_report_json(captured)?;
        let raw: RawReport = serde_json::from_value(value).map_err(|_| ReportParseError)?;

        // The runner reports zero totals when it ran nothing useful; treat
        // that the same as a missing summary block.
        let summary = (raw.num_total_tests != 0).then(|| RunSummary {
            total_tests: raw.num_total_tests,
            passed_tests: raw.num_passed_tests,
            failed_tests: raw.num_failed_tests,
            pending_tests: raw.num_pending_tests,
            success: raw.success,
        });

        let test_suites = raw
            .test_results
            .into_iter()
            .map(|suite| SuiteSummary {
                name: suite
                    .name
                    .strip_prefix(cwd)
                    .unwrap_or(&suite.name)
                    .to_string(),
                status: suite.status,
                tests: suite
                    .assertion_results
                    .into_iter()
                    .map(|test| TestOutcome {
                        title: test.title,
                        status: test.status,
                        failure_messages: test.failure_messages.map(|messages| {
                            messages
                                .iter()
                                .map(|m| sanitize_failure_message(m))
                                .collect()
                        }),
                    })
                    .collect(),
                duration: suite.perf_stats.map(|p| p.runtime).unwrap_or(0.0),
            })
            .collect();

        let coverage = raw.coverage_map.as_ref().and_then(aggregate_coverage);

        Ok(ParsedReport {
            summary,
            test_suites,
            coverage,
            recovered,
        })
    }
}

/// Strips framework-internal stack frames from a failure trace, keeping only
/// the assertion message and its immediate call site.
///
/// Lines that are blank after trimming, anonymous/async frame markers, and
/// frames inside the dependency directory are dropped; at most the first
/// three surviving lines are kept, in their original order.
pub fn sanitize_failure_message(message: &str) -> String {
    message
        .lines()
        .filter(|line| {
            !line.contains("at Object.")
                && !line.contains("at async")
                && !line.contains("node_modules")
                && !line.trim().is_empty()
        })
        .take(3)
        .collect::<Vec<_>>()
        .join("\n")
}

/// Locates a JSON object inside noisy runner output.
///
/// Tries a direct parse first. On failure it walks candidate `{` positions
/// left to right, finds each one's balanced closing brace (string- and
/// escape-aware), and returns the first slice that parses to an object. This
/// tolerates banner text containing braces and multiple embedded objects,
/// which a first-`{`-to-last-`}` match does not.
pub fn extract_report_json(text: &str) -> Result<Value, ReportParseError> {
    locate_report_json(text).map(|(value, _)| value)
}

/// As [`extract_report_json`], but also reports whether the fallback scanner
/// was needed (`true`) or the whole text parsed as the object (`false`).
fn locate_report_json(text: &str) -> Result<(Value, bool), ReportParseError> {
    if let Ok(value) = serde_json::from_str::<Value>(text) {
        if value.is_object() {
            return Ok((value, false));
        }
    }

    let bytes = text.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'{' {
            if let Some(end) = balanced_end(text, i) {
                if let Ok(value) = serde_json::from_str::<Value>(&text[i..=end]) {
                    if value.is_object() {
                        return Ok((value, true));
                    }
                }
            }
        }
        i += 1;
    }

    Err(ReportParseError)
}

/// Byte index of the `}` closing the `{` at `start`, or `None` if the text
/// ends while still inside the object.
fn balanced_end(text: &str, start: usize) -> Option<usize> {
    let mut depth: usize = 0;
    let mut in_string = false;
    let mut escaped = false;

    for (idx, ch) in text[start..].char_indices() {
        if in_string {
            if escaped {
                escaped = false;
            } else if ch == '\\' {
                escaped = true;
            } else if ch == '"' {
                in_string = false;
            }
            continue;
        }
        match ch {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(start + idx);
                }
            }
            _ => {}
        }
    }
    None
}

/// Reduces a per-file coverage map to four aggregate percentages.
///
/// Handled permissively: a file missing `s`, `b`, `f` or `statementMap`
/// simply contributes zero to that axis. An empty map is treated as no
/// coverage data at all.
pub fn aggregate_coverage(coverage_map: &Value) -> Option<CoverageSummary> {
    let files = coverage_map.as_object()?;
    if files.is_empty() {
        return None;
    }

    let mut total_statements: u64 = 0;
    let mut covered_statements: u64 = 0;
    let mut total_branches: u64 = 0;
    let mut covered_branches: u64 = 0;
    let mut total_functions: u64 = 0;
    let mut covered_functions: u64 = 0;
    let mut total_lines: u64 = 0;
    let mut covered_lines: u64 = 0;

    for file_coverage in files.values() {
        let Some(file_coverage) = file_coverage.as_object() else {
            continue;
        };

        let statements = file_coverage.get("s").and_then(Value::as_object);

        if let Some(s) = statements {
            total_statements += s.len() as u64;
            covered_statements += s.values().filter(|v| is_hit(v)).count() as u64;
        }

        if let Some(b) = file_coverage.get("b").and_then(Value::as_object) {
            for group in b.values() {
                if let Some(branches) = group.as_array() {
                    total_branches += branches.len() as u64;
                    covered_branches += branches.iter().filter(|v| is_hit(v)).count() as u64;
                }
            }
        }

        if let Some(f) = file_coverage.get("f").and_then(Value::as_object) {
            total_functions += f.len() as u64;
            covered_functions += f.values().filter(|v| is_hit(v)).count() as u64;
        }

        if let Some(statement_map) = file_coverage.get("statementMap").and_then(Value::as_object) {
            // Several statements can share a source line; lines are counted
            // once per file, by distinct line number.
            let mut lines: BTreeSet<u64> = BTreeSet::new();
            for location in statement_map.values() {
                if let Some(line) = location.pointer("/start/line").and_then(Value::as_u64) {
                    lines.insert(line);
                }
            }
            total_lines += lines.len() as u64;

            let mut executed_lines: BTreeSet<u64> = BTreeSet::new();
            if let Some(s) = statements {
                for (index, count) in s {
                    if is_hit(count) {
                        if let Some(line) = statement_map
                            .get(index)
                            .and_then(|loc| loc.pointer("/start/line"))
                            .and_then(Value::as_u64)
                        {
                            executed_lines.insert(line);
                        }
                    }
                }
            }
            covered_lines += executed_lines.len() as u64;
        }
    }

    Some(CoverageSummary {
        lines: format_percent(covered_lines, total_lines),
        statements: format_percent(covered_statements, total_statements),
        functions: format_percent(covered_functions, total_functions),
        branches: format_percent(covered_branches, total_branches),
    })
}

fn is_hit(count: &Value) -> bool {
    count.as_f64().unwrap_or(0.0) > 0.0
}

fn format_percent(covered: u64, total: u64) -> String {
    if total > 0 {
        format!("{:.2}", (covered as f64 / total as f64) * 100.0)
    } else {
        "0".to_string()
    }
}

fn truncate_output(text: &mut String, limit: usize) {
    if text.len() > limit {
        let mut cut = limit;
        while !text.is_char_boundary(cut) {
            cut -= 1;
        }
        text.truncate(cut);
    }
}
