//! Core type definitions shared across the solver team
//!
//! This module defines the data structures that flow between the conversation
//! loop, the LLM boundary, the sandbox, and the validator. Chat messages follow
//! the OpenAI role/content shape; everything produced by the sandbox is a plain
//! value that is read-only after creation and discarded once reported.

use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub enum Role {
    System,
    User,
    Assistant,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Message {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Message {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Message {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// One turn of the solver/executor exchange, tagged by speaker.
///
/// The loop dispatches on this variant with a plain `match`; there is no
/// handler registry or runtime type lookup. The transcript is an append-only
/// `Vec<TurnMessage>` owned by the loop and handed to the caller by value.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum TurnMessage {
    Solver(String),
    Executor(String),
}

impl TurnMessage {
    pub fn speaker(&self) -> &'static str {
        match self {
            TurnMessage::Solver(_) => "ProblemSolverExpert",
            TurnMessage::Executor(_) => "CodeExecutor",
        }
    }

    pub fn content(&self) -> &str {
        match self {
            TurnMessage::Solver(text) | TurnMessage::Executor(text) => text,
        }
    }
}

/// Token accounting as reported by the LLM provider, when available.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Usage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct LlmResponse {
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub finish_reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usage: Option<Usage>,
}

/// A single test case as stated (or printed) by the solver.
///
/// Test cases are supplied by the upstream generator; nothing in this crate
/// derives them. `expected_output` is compared against captured stdout by the
/// validator.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TestCase {
    #[serde(default)]
    pub input: String,
    pub expected_output: String,
    #[serde(default)]
    pub description: String,
}

/// One request to run generated source in the sandbox. Consumed once.
#[derive(Debug, Clone)]
pub struct ExecutionRequest {
    pub source: String,
    pub language: String,
    pub time_budget_seconds: u64,
}

/// What came back from one sandboxed run. Read-only after creation.
#[derive(Debug, Clone)]
pub struct ExecutionResult {
    pub exit_code: i64,
    pub stdout: String,
    pub stderr: String,
    pub wall_time_ms: u64,
    pub timed_out: bool,
    /// Set when captured output exceeded the configured byte ceiling.
    pub truncated: bool,
}

/// Classification of one test-case execution outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Verdict {
    Pass,
    Fail,
    Error,
    Timeout,
}

impl std::fmt::Display for Verdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Verdict::Pass => "PASS",
            Verdict::Fail => "FAIL",
            Verdict::Error => "ERROR",
            Verdict::Timeout => "TIMEOUT",
        };
        write!(f, "{}", label)
    }
}
