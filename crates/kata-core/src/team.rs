//! Two-participant round-robin conversation loop.
//!
//! Alternates strictly between a solver turn (LLM) and an executor turn
//! (sandbox + validator), starting with the solver. The loop is a dumb relay:
//! execution failures, wrong answers, and timeouts are folded into the next
//! solver turn as ordinary conversation content, and the loop ends only on
//! the sentinel keyword, the turn ceiling, a user abort, or an unusable
//! execution environment.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::analyzer;
use crate::config::KataConfig;
use crate::diagnostics;
use crate::core_types::{ExecutionRequest, ExecutionResult, Message, TestCase, TurnMessage};
use crate::errors::{KataError, SandboxError};
use crate::languages;
use crate::llm::{parse, Llm};
use crate::sandbox::Sandbox;
use crate::validator::{self, SubmissionVerdict};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// The solver emitted the sentinel keyword (or an extra termination
    /// phrase).
    Sentinel,
    /// The turn counter reached the configured ceiling.
    TurnCeiling,
    /// The caller's abort signal fired.
    Aborted,
}

/// Everything a finished submission reports back: the full transcript by
/// value, how it ended, and the last verdict the executor computed.
#[derive(Debug)]
pub struct SessionReport {
    pub transcript: Vec<TurnMessage>,
    pub turns_taken: usize,
    pub stop_reason: StopReason,
    pub last_verdict: Option<SubmissionVerdict>,
}

enum TurnState {
    Solver,
    Executor,
}

pub struct SolverTeam {
    llm: Arc<dyn Llm>,
    sandbox: Arc<dyn Sandbox>,
    config: KataConfig,
}

impl SolverTeam {
    pub fn new(llm: Arc<dyn Llm>, sandbox: Arc<dyn Sandbox>, config: KataConfig) -> Self {
        Self {
            llm,
            sandbox,
            config,
        }
    }

    /// Run one submission to completion. Independent submissions are just
    /// independent calls; nothing is shared between them.
    pub async fn run(
        &self,
        problem: &str,
        cancel: CancellationToken,
    ) -> Result<SessionReport, KataError> {
        let language = self.config.solver.default_language.clone();
        let analysis = analyzer::analyze(problem);
        let guidance = analyzer::render_guidance(&analysis, &language);

        let mut messages = vec![
            Message::system(self.system_prompt(&language)),
            Message::user(format!("{}\n\nPROBLEM:\n{}", guidance, problem)),
        ];
        let mut transcript: Vec<TurnMessage> = Vec::new();
        let mut last_verdict: Option<SubmissionVerdict> = None;
        let mut last_solver_text = String::new();
        let mut state = TurnState::Solver;
        let mut stop_reason = StopReason::TurnCeiling;

        let ceiling = self.config.solver.turn_ceiling;
        let mut turns_taken = 0;

        while turns_taken < ceiling {
            if cancel.is_cancelled() {
                stop_reason = StopReason::Aborted;
                break;
            }

            match state {
                TurnState::Solver => {
                    let response = tokio::select! {
                        r = self.llm.generate(messages.clone()) => r?,
                        _ = cancel.cancelled() => {
                            stop_reason = StopReason::Aborted;
                            break;
                        }
                    };
                    turns_taken += 1;
                    let text = response.content;
                    log::info!("solver turn {}/{} ({} chars)", turns_taken, ceiling, text.len());
                    messages.push(Message::assistant(text.clone()));
                    transcript.push(TurnMessage::Solver(text.clone()));
                    if self.is_terminal(&text) {
                        stop_reason = StopReason::Sentinel;
                        break;
                    }
                    last_solver_text = text;
                    state = TurnState::Executor;
                }
                TurnState::Executor => {
                    let report = match self
                        .executor_turn(&last_solver_text, &language, &cancel)
                        .await
                    {
                        Ok((text, verdict)) => {
                            if verdict.is_some() {
                                last_verdict = verdict;
                            }
                            text
                        }
                        Err(KataError::Aborted) => {
                            stop_reason = StopReason::Aborted;
                            break;
                        }
                        Err(e) => return Err(e),
                    };
                    turns_taken += 1;
                    log::info!("executor turn {}/{}", turns_taken, ceiling);
                    messages.push(Message::user(report.clone()));
                    transcript.push(TurnMessage::Executor(report));
                    state = TurnState::Solver;
                }
            }
        }

        Ok(SessionReport {
            transcript,
            turns_taken,
            stop_reason,
            last_verdict,
        })
    }

    /// One executor turn: extract the last code block, run it, judge it, and
    /// render the outcome as conversation text. Only an unusable environment
    /// propagates as an error; everything else becomes relay content.
    async fn executor_turn(
        &self,
        solver_text: &str,
        default_language: &str,
        cancel: &CancellationToken,
    ) -> Result<(String, Option<SubmissionVerdict>), KataError> {
        let block = match parse::last_code_block(solver_text) {
            Some(block) => block,
            None => {
                return Ok((
                    "No runnable code block found in your last message. Provide \
                     exactly one fenced code block with the full program, \
                     including test cases that print their outputs."
                        .to_string(),
                    None,
                ))
            }
        };

        // The fence tag wins when it names a registered language; otherwise
        // the submission's configured language applies.
        let language = block
            .language
            .as_deref()
            .and_then(|tag| languages::profile(tag))
            .map(|p| p.name.to_string())
            .unwrap_or_else(|| default_language.to_string());

        let request = ExecutionRequest {
            source: block.code,
            language,
            time_budget_seconds: self.config.sandbox.time_budget_seconds,
        };

        let result = match self.sandbox.execute(&request, cancel).await {
            Ok(result) => result,
            Err(SandboxError::Cancelled) => return Err(KataError::Aborted),
            Err(e) => return Err(e.into()),
        };

        let cases = parse::extract_test_cases(solver_text);
        let verdict = if cases.is_empty() {
            None
        } else {
            Some(validator::judge(
                &result,
                &cases,
                self.config.solver.match_policy,
            ))
        };

        let report = render_execution_report(&result, &cases, verdict.as_ref());
        Ok((report, verdict))
    }

    fn is_terminal(&self, text: &str) -> bool {
        if text.contains(&self.config.solver.sentinel_keyword) {
            return true;
        }
        self.config
            .solver
            .termination_phrases
            .iter()
            .any(|phrase| text.contains(phrase.as_str()))
    }

    fn system_prompt(&self, language: &str) -> String {
        format!(
            "You are a problem solver agent that is an expert in solving data \
             structures and algorithms problems.\n\
             Rules:\n\
             1. First explain your approach, then provide the complete program \
             in a single fenced {language} code block.\n\
             2. Include at least 3 test cases in the program and print the \
             output of each.\n\
             3. Before the code block, list each test as a line of the form \
             'Test case N: input=..., expected: ...'.\n\
             4. A code executor will run your block and report the results; if \
             it reports an error or a wrong answer, reply with a corrected \
             code block.\n\
             5. Once the execution report shows every test passing, explain \
             the results and say \"{sentinel}\" to end the session.",
            language = language,
            sentinel = self.config.solver.sentinel_keyword,
        )
    }
}

fn render_execution_report(
    result: &ExecutionResult,
    cases: &[TestCase],
    verdict: Option<&SubmissionVerdict>,
) -> String {
    let mut report = String::from("EXECUTION REPORT\n");
    if result.timed_out {
        report.push_str(&format!(
            "status: TIMED OUT after {} ms; the process was terminated\n",
            result.wall_time_ms
        ));
    } else {
        report.push_str(&format!(
            "status: exit code {} in {} ms\n",
            result.exit_code, result.wall_time_ms
        ));
    }
    if result.truncated {
        report.push_str("note: captured output exceeded the byte ceiling and was truncated\n");
    }

    if let Some(verdict) = verdict {
        report.push_str(&format!("overall verdict: {}\n", verdict.overall));
        for (case, cv) in cases.iter().zip(verdict.cases.iter()) {
            let name = if case.description.is_empty() {
                "test case"
            } else {
                case.description.as_str()
            };
            report.push_str(&format!("  [{}] {} - {}\n", cv.verdict, name, cv.detail));
        }
    }

    report.push_str("--- stdout ---\n");
    report.push_str(&result.stdout);
    if !result.stdout.ends_with('\n') {
        report.push('\n');
    }
    if !result.stderr.is_empty() {
        report.push_str("--- stderr ---\n");
        report.push_str(&result.stderr);
        if !result.stderr.ends_with('\n') {
            report.push('\n');
        }
        if result.exit_code != 0 {
            if let Some(analysis) = diagnostics::analyze_stderr(&result.stderr) {
                report.push_str(&diagnostics::render_analysis(&analysis));
                report.push('\n');
            }
        }
    }
    report
}
