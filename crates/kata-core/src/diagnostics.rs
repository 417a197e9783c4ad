//! Error analysis for failed sandbox runs.
//!
//! Classifies the error type out of captured stderr, pulls the failing line
//! number from the traceback when present, and attaches an explanation and a
//! suggested fix. The result is folded into the execution report so the
//! solver sees actionable feedback, not just a raw traceback.

use std::sync::OnceLock;

use regex::Regex;

#[derive(Debug, Clone, PartialEq)]
pub struct ErrorAnalysis {
    pub error_type: String,
    pub line_number: Option<u32>,
    pub explanation: &'static str,
    pub suggested_fix: &'static str,
}

struct KnownError {
    name: &'static str,
    explanation: &'static str,
    suggested_fix: &'static str,
}

static KNOWN_ERRORS: &[KnownError] = &[
    KnownError {
        name: "IndentationError",
        explanation: "inconsistent indentation; Python requires uniform levels",
        suggested_fix: "use exactly 4 spaces per indentation level, no tabs",
    },
    KnownError {
        name: "SyntaxError",
        explanation: "the code violates the language's syntax rules",
        suggested_fix: "check for missing colons and unmatched parentheses or brackets",
    },
    KnownError {
        name: "ValueError",
        explanation: "a function received a value outside its accepted range",
        suggested_fix: "validate input values before processing them",
    },
    KnownError {
        name: "IndexError",
        explanation: "an index outside the sequence bounds was accessed",
        suggested_fix: "check bounds before indexing; watch for off-by-one errors",
    },
    KnownError {
        name: "TypeError",
        explanation: "an operation was applied to an inappropriate data type",
        suggested_fix: "verify argument types; guard against None values",
    },
    KnownError {
        name: "KeyError",
        explanation: "a dictionary key does not exist",
        suggested_fix: "use .get() or check key existence before access",
    },
    KnownError {
        name: "RecursionError",
        explanation: "maximum recursion depth exceeded",
        suggested_fix: "add a correct base case or rewrite iteratively",
    },
    KnownError {
        name: "NameError",
        explanation: "a name was used before being defined",
        suggested_fix: "define the variable or function before its first use",
    },
    KnownError {
        name: "ZeroDivisionError",
        explanation: "a division or modulo by zero",
        suggested_fix: "guard divisors against zero before dividing",
    },
    KnownError {
        name: "MemoryError",
        explanation: "the program exhausted the sandbox memory limit",
        suggested_fix: "reduce the working-set size or stream instead of materializing",
    },
];

fn error_type_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\b([A-Z][A-Za-z]*(?:Error|Exception))\b").unwrap())
}

fn line_number_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)\bline\s+(\d+)").unwrap())
}

/// Classify stderr from a failed run. Returns `None` when the text carries
/// nothing that looks like an error name; the raw stderr is still relayed
/// either way.
pub fn analyze_stderr(stderr: &str) -> Option<ErrorAnalysis> {
    // Tracebacks name the raising error last.
    let error_type = error_type_re()
        .captures_iter(stderr)
        .last()?
        .get(1)?
        .as_str()
        .to_string();

    let line_number = line_number_re()
        .captures_iter(stderr)
        .last()
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok());

    let known = KNOWN_ERRORS.iter().find(|k| k.name == error_type);
    Some(ErrorAnalysis {
        error_type,
        line_number,
        explanation: known.map_or("an unexpected runtime error occurred", |k| k.explanation),
        suggested_fix: known.map_or("review the logic around the failing line", |k| {
            k.suggested_fix
        }),
    })
}

/// One-line rendering for the execution report.
pub fn render_analysis(analysis: &ErrorAnalysis) -> String {
    let location = analysis
        .line_number
        .map(|n| format!(" at line {}", n))
        .unwrap_or_default();
    format!(
        "error analysis: {}{} - {}; suggested fix: {}",
        analysis.error_type, location, analysis.explanation, analysis.suggested_fix
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    const TRACEBACK: &str = "Traceback (most recent call last):\n  File \"/app/script.py\", line 7, in <module>\n    result = values[10]\nIndexError: list index out of range\n";

    #[test]
    fn test_known_error_classified_with_line() {
        let analysis = analyze_stderr(TRACEBACK).unwrap();
        assert_eq!(analysis.error_type, "IndexError");
        assert_eq!(analysis.line_number, Some(7));
        assert!(analysis.suggested_fix.contains("bounds"));
    }

    #[test]
    fn test_last_error_name_wins() {
        // Chained tracebacks report the raising error last.
        let stderr = "KeyError: 'x'\n\nDuring handling of the above exception:\n\
                      File \"s.py\", line 12\nValueError: bad input\n";
        let analysis = analyze_stderr(stderr).unwrap();
        assert_eq!(analysis.error_type, "ValueError");
        assert_eq!(analysis.line_number, Some(12));
    }

    #[test]
    fn test_unknown_error_gets_generic_guidance() {
        let analysis = analyze_stderr("FrobnicationError: widget failure").unwrap();
        assert_eq!(analysis.error_type, "FrobnicationError");
        assert!(analysis.line_number.is_none());
        assert_eq!(analysis.explanation, "an unexpected runtime error occurred");
    }

    #[test]
    fn test_plain_warnings_yield_no_analysis() {
        assert!(analyze_stderr("DeprecationWarning: old API\n").is_none());
        assert!(analyze_stderr("").is_none());
    }

    #[test]
    fn test_render_mentions_type_line_and_fix() {
        let analysis = analyze_stderr(TRACEBACK).unwrap();
        let line = render_analysis(&analysis);
        assert!(line.contains("IndexError"));
        assert!(line.contains("line 7"));
        assert!(line.contains("suggested fix"));
    }
}
