//! Orchestration core for the kata DSA solver team.
//!
//! Wires a hosted LLM, a containerized code-execution sandbox, and a
//! two-participant round-robin conversation loop so a submitted
//! data-structures-and-algorithms problem comes back with a generated,
//! executed, and judged solution. There is no algorithmic core of its own:
//! solving is delegated to the language model and testing to the sandbox.
//!
//! # Architecture Overview
//!
//! - **Conversation loop**: strict solver/executor alternation with a
//!   sentinel keyword and a turn ceiling
//! - **LLM boundary**: provider-agnostic text-in/text-out trait with an
//!   OpenAI-compatible client
//! - **Sandbox**: Docker-backed isolated execution with time, memory, and
//!   output bounds and guaranteed cleanup
//! - **Validator**: PASS/FAIL/ERROR/TIMEOUT classification with exact or
//!   numeric-tolerance matching
//! - **Language registry**: static per-language images, extensions, and run
//!   commands
//! - **Configuration**: one YAML-loaded struct, immutable after startup

pub mod analyzer;
pub mod config;
pub mod core_types;
pub mod diagnostics;
pub mod errors;
pub mod languages;
pub mod llm;
pub mod sandbox;
pub mod team;
pub mod validator;

pub use config::{ConfigLoader, KataConfig};
pub use core_types::{ExecutionRequest, ExecutionResult, TestCase, TurnMessage, Verdict};
pub use errors::{KataError, SandboxError};
pub use llm::Llm;
pub use sandbox::{DockerSandbox, Sandbox};
pub use team::{SessionReport, SolverTeam, StopReason};
pub use validator::MatchPolicy;
