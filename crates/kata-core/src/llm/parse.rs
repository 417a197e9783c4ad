//! Extraction of structure from generated text.
//!
//! The solver's turns are free-form markdown. Two things are pulled out of
//! them: fenced code blocks to hand to the sandbox, and test-case
//! expectations ("Test case 1: ... expected: 4") to hand to the validator.
//! Both extractors are forgiving; when nothing parses the loop falls back to
//! relaying raw output.

use std::sync::OnceLock;

use regex::Regex;

use crate::core_types::TestCase;

#[derive(Debug, Clone, PartialEq)]
pub struct CodeBlock {
    pub language: Option<String>,
    pub code: String,
}

fn code_fence_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?s)```([a-zA-Z0-9+#_-]*)[ \t]*\r?\n(.*?)```").unwrap())
}

fn expectation_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?im)^(.*test\s*case\s*\d+.*?(?:expected(?:\s+output)?\s*[:=]|->|=>|\u{2192})\s*)(.+?)\s*$")
            .unwrap()
    })
}

/// All fenced code blocks in order of appearance.
pub fn extract_code_blocks(text: &str) -> Vec<CodeBlock> {
    code_fence_re()
        .captures_iter(text)
        .map(|caps| {
            let tag = caps.get(1).map(|m| m.as_str().trim()).unwrap_or("");
            CodeBlock {
                language: if tag.is_empty() {
                    None
                } else {
                    Some(tag.to_lowercase())
                },
                code: caps.get(2).map(|m| m.as_str()).unwrap_or("").to_string(),
            }
        })
        .collect()
}

/// The last code block in the turn, which by the solver's own rules is the
/// one meant for execution.
pub fn last_code_block(text: &str) -> Option<CodeBlock> {
    extract_code_blocks(text).into_iter().last()
}

/// Test-case expectations the solver stated in prose, outside code fences.
/// Lines shaped like `Test case 1: input=[1,2,3], expected: 6`.
pub fn extract_test_cases(text: &str) -> Vec<TestCase> {
    let without_code = code_fence_re().replace_all(text, "");
    expectation_re()
        .captures_iter(&without_code)
        .map(|caps| {
            let line = caps.get(0).map(|m| m.as_str().trim()).unwrap_or("");
            let expected = caps.get(2).map(|m| m.as_str().trim()).unwrap_or("");
            TestCase {
                input: String::new(),
                expected_output: expected.trim_matches('`').to_string(),
                description: line.to_string(),
            }
        })
        .filter(|case| !case.expected_output.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extracts_single_python_block() {
        let text = "Here is the solution:\n```python\nprint(2+2)\n```\nDone.";
        let blocks = extract_code_blocks(text);
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].language.as_deref(), Some("python"));
        assert_eq!(blocks[0].code, "print(2+2)\n");
    }

    #[test]
    fn test_last_block_wins() {
        let text = "```python\nbroken()\n```\nFixed version:\n```python\nprint('ok')\n```";
        let block = last_code_block(text).unwrap();
        assert_eq!(block.code, "print('ok')\n");
    }

    #[test]
    fn test_untagged_fence() {
        let blocks = extract_code_blocks("```\nls -la\n```");
        assert_eq!(blocks.len(), 1);
        assert!(blocks[0].language.is_none());
    }

    #[test]
    fn test_no_blocks() {
        assert!(extract_code_blocks("just prose, no code").is_empty());
        assert!(last_code_block("just prose").is_none());
    }

    #[test]
    fn test_expectations_from_prose() {
        let text = "I will verify with:\n\
                    Test case 1: input=[1,2,3], expected: 6\n\
                    Test case 2: input=[] -> 0\n\
                    Test case 3: input=[5], expected output: 5\n";
        let cases = extract_test_cases(text);
        assert_eq!(cases.len(), 3);
        assert_eq!(cases[0].expected_output, "6");
        assert_eq!(cases[1].expected_output, "0");
        assert_eq!(cases[2].expected_output, "5");
    }

    #[test]
    fn test_expectations_ignore_code_fences() {
        let text = "```python\n# Test case 1: expected: 99\nprint(6)\n```\n\
                    Test case 1: expected: 6\n";
        let cases = extract_test_cases(text);
        assert_eq!(cases.len(), 1);
        assert_eq!(cases[0].expected_output, "6");
    }
}
