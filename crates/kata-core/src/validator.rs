//! Verdict classification for sandbox output.
//!
//! Compares captured stdout against expected test-case output and classifies
//! each case as PASS, FAIL, ERROR, or TIMEOUT. The matching policy is
//! configurable: exact string matching after normalizing trailing whitespace
//! and line endings, or relative-tolerance numeric comparison when both sides
//! parse as floating point.

use serde::{Deserialize, Serialize};

use crate::core_types::{ExecutionResult, TestCase, Verdict};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum MatchPolicy {
    Exact,
    Numeric { relative_tolerance: f64 },
}

impl Default for MatchPolicy {
    fn default() -> Self {
        MatchPolicy::Exact
    }
}

/// Verdict for one test case, always paired with a human-readable
/// explanation. No non-PASS outcome is reported without one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaseVerdict {
    pub verdict: Verdict,
    pub detail: String,
}

/// Aggregated verdict for one submission: PASS only if every case passed;
/// otherwise the first non-PASS case's detail is the representative failure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmissionVerdict {
    pub overall: Verdict,
    pub cases: Vec<CaseVerdict>,
    pub representative_failure: Option<String>,
}

/// Strip CR from line endings and trailing whitespace per line, and trailing
/// blank lines from the whole text.
fn normalize(text: &str) -> String {
    text.replace("\r\n", "\n")
        .lines()
        .map(str::trim_end)
        .collect::<Vec<_>>()
        .join("\n")
        .trim_end()
        .to_string()
}

fn numbers_match(expected: &str, actual: &str, relative_tolerance: f64) -> Option<bool> {
    let e: f64 = expected.trim().parse().ok()?;
    let a: f64 = actual.trim().parse().ok()?;
    let scale = e.abs().max(a.abs()).max(1.0);
    Some((e - a).abs() <= relative_tolerance * scale)
}

/// Whether `expected` and `actual` agree under the policy. Numeric tolerance
/// applies only when both sides parse as f64; otherwise it falls back to
/// exact comparison.
pub fn values_match(expected: &str, actual: &str, policy: MatchPolicy) -> bool {
    let expected = normalize(expected);
    let actual = normalize(actual);
    if let MatchPolicy::Numeric { relative_tolerance } = policy {
        if let Some(ok) = numbers_match(&expected, &actual, relative_tolerance) {
            return ok;
        }
    }
    expected == actual
}

/// Whether the expected text appears in stdout: as the whole output, as one
/// line, or (multi-line expectations) as a contiguous run of lines.
fn stdout_contains(stdout: &str, expected: &str, policy: MatchPolicy) -> bool {
    if values_match(expected, stdout, policy) {
        return true;
    }
    let expected_norm = normalize(expected);
    if expected_norm.contains('\n') {
        return normalize(stdout).contains(&expected_norm);
    }
    normalize(stdout)
        .lines()
        .any(|line| values_match(&expected_norm, line, policy))
}

pub fn judge_case(result: &ExecutionResult, case: &TestCase, policy: MatchPolicy) -> CaseVerdict {
    if result.timed_out {
        return CaseVerdict {
            verdict: Verdict::Timeout,
            detail: format!(
                "execution exceeded its time budget after {} ms; partial output: {:?}",
                result.wall_time_ms,
                preview(&result.stdout)
            ),
        };
    }

    let matched = stdout_contains(&result.stdout, &case.expected_output, policy);

    if matched && result.exit_code == 0 {
        return CaseVerdict {
            verdict: Verdict::Pass,
            detail: format!("expected {:?} found in output", case.expected_output),
        };
    }

    // Program-level failure: non-zero exit, or stderr noise with nothing
    // matching in stdout. Distinct from FAIL, where the program ran cleanly
    // but printed the wrong value.
    if result.exit_code != 0 || (!result.stderr.is_empty() && !matched) {
        return CaseVerdict {
            verdict: Verdict::Error,
            detail: format!(
                "program error (exit code {}): {}",
                result.exit_code,
                preview(if result.stderr.is_empty() {
                    &result.stdout
                } else {
                    &result.stderr
                })
            ),
        };
    }

    CaseVerdict {
        verdict: Verdict::Fail,
        detail: format!(
            "expected {:?}, got {:?}",
            case.expected_output,
            preview(&result.stdout)
        ),
    }
}

pub fn judge(
    result: &ExecutionResult,
    cases: &[TestCase],
    policy: MatchPolicy,
) -> SubmissionVerdict {
    let case_verdicts: Vec<CaseVerdict> = cases
        .iter()
        .map(|case| judge_case(result, case, policy))
        .collect();

    let overall = case_verdicts
        .iter()
        .find(|cv| cv.verdict != Verdict::Pass)
        .map(|cv| cv.verdict)
        .unwrap_or(Verdict::Pass);

    let representative_failure = case_verdicts
        .iter()
        .find(|cv| cv.verdict != Verdict::Pass)
        .map(|cv| cv.detail.clone());

    SubmissionVerdict {
        overall,
        cases: case_verdicts,
        representative_failure,
    }
}

fn preview(text: &str) -> String {
    const MAX: usize = 400;
    if text.len() <= MAX {
        text.to_string()
    } else {
        let mut end = MAX;
        while end > 0 && !text.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}... ({} bytes total)", &text[..end], text.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(exit_code: i64, stdout: &str, stderr: &str) -> ExecutionResult {
        ExecutionResult {
            exit_code,
            stdout: stdout.to_string(),
            stderr: stderr.to_string(),
            wall_time_ms: 12,
            timed_out: false,
            truncated: false,
        }
    }

    fn case(expected: &str) -> TestCase {
        TestCase {
            input: String::new(),
            expected_output: expected.to_string(),
            description: String::new(),
        }
    }

    #[test]
    fn test_trailing_newline_difference_passes() {
        let cv = judge_case(&result(0, "4\n", ""), &case("4"), MatchPolicy::Exact);
        assert_eq!(cv.verdict, Verdict::Pass);
    }

    #[test]
    fn test_crlf_and_trailing_spaces_normalized() {
        let cv = judge_case(
            &result(0, "hello  \r\nworld\r\n", ""),
            &case("hello\nworld"),
            MatchPolicy::Exact,
        );
        assert_eq!(cv.verdict, Verdict::Pass);
    }

    #[test]
    fn test_expected_line_embedded_in_larger_output() {
        let cv = judge_case(
            &result(0, "Test case 1:\n42\ndone\n", ""),
            &case("42"),
            MatchPolicy::Exact,
        );
        assert_eq!(cv.verdict, Verdict::Pass);
    }

    #[test]
    fn test_numeric_tolerance_pass_and_fail() {
        let loose = MatchPolicy::Numeric {
            relative_tolerance: 1e-3,
        };
        let tight = MatchPolicy::Numeric {
            relative_tolerance: 1e-6,
        };
        let r = result(0, "3.14160\n", "");
        assert_eq!(judge_case(&r, &case("3.14159"), loose).verdict, Verdict::Pass);
        assert_eq!(judge_case(&r, &case("3.14159"), tight).verdict, Verdict::Fail);
    }

    #[test]
    fn test_numeric_policy_falls_back_to_exact_for_text() {
        let policy = MatchPolicy::Numeric {
            relative_tolerance: 1e-3,
        };
        let cv = judge_case(&result(0, "hello\n", ""), &case("hello"), policy);
        assert_eq!(cv.verdict, Verdict::Pass);
    }

    #[test]
    fn test_wrong_value_is_fail_not_error() {
        let cv = judge_case(&result(0, "5\n", ""), &case("4"), MatchPolicy::Exact);
        assert_eq!(cv.verdict, Verdict::Fail);
        assert!(cv.detail.contains("expected"));
    }

    #[test]
    fn test_nonzero_exit_is_error() {
        let cv = judge_case(
            &result(1, "", "Traceback (most recent call last): ValueError"),
            &case("4"),
            MatchPolicy::Exact,
        );
        assert_eq!(cv.verdict, Verdict::Error);
        assert!(cv.detail.contains("exit code 1"));
    }

    #[test]
    fn test_stderr_noise_with_matching_stdout_still_passes() {
        let cv = judge_case(
            &result(0, "4\n", "DeprecationWarning: something\n"),
            &case("4"),
            MatchPolicy::Exact,
        );
        assert_eq!(cv.verdict, Verdict::Pass);
    }

    #[test]
    fn test_timeout_verdict() {
        let r = ExecutionResult {
            exit_code: -1,
            stdout: "partial".to_string(),
            stderr: String::new(),
            wall_time_ms: 2000,
            timed_out: true,
            truncated: false,
        };
        let cv = judge_case(&r, &case("4"), MatchPolicy::Exact);
        assert_eq!(cv.verdict, Verdict::Timeout);
    }

    #[test]
    fn test_aggregate_surfaces_first_failure() {
        let r = result(0, "4\n", "");
        let cases = vec![case("4"), case("5"), case("6")];
        let verdict = judge(&r, &cases, MatchPolicy::Exact);
        assert_eq!(verdict.overall, Verdict::Fail);
        assert_eq!(verdict.cases.len(), 3);
        let detail = verdict.representative_failure.unwrap();
        assert!(detail.contains("\"5\""));
    }

    #[test]
    fn test_aggregate_all_pass() {
        let r = result(0, "4\n7\n", "");
        let cases = vec![case("4"), case("7")];
        let verdict = judge(&r, &cases, MatchPolicy::Exact);
        assert_eq!(verdict.overall, Verdict::Pass);
        assert!(verdict.representative_failure.is_none());
    }
}
