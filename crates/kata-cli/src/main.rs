use anyhow::{bail, Context, Result};
use clap::Parser;
use kata_core::config::{Complexity, ConfigLoader, KataConfig};
use kata_core::llm::providers::openai;
use kata_core::{DockerSandbox, SolverTeam, StopReason, TurnMessage};
use log::LevelFilter;
use std::path::PathBuf;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

#[derive(Parser, Debug)]
#[clap(
    name = "kata",
    version = "0.1.0",
    about = "Solve a DSA problem with an LLM solver and a sandboxed code executor"
)]
struct Cli {
    /// Problem statement. Omit when using --file.
    problem: Option<String>,

    #[clap(long, short, help = "Read the problem statement from a file")]
    file: Option<PathBuf>,

    #[clap(long, short, default_value = "kata.yaml", help = "Configuration file (YAML)")]
    config: String,

    #[clap(long, short, help = "Target language (Python, JavaScript, C++, Java, R)")]
    language: Option<String>,

    #[clap(long, help = "Problem complexity preset: easy, medium, hard, expert")]
    complexity: Option<String>,

    #[clap(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level_filter = cli.log_level.parse().unwrap_or(LevelFilter::Info);
    env_logger::Builder::new()
        .filter_level(log_level_filter)
        .init();

    let problem = match (&cli.problem, &cli.file) {
        (Some(text), None) => text.clone(),
        (None, Some(path)) => tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("failed to read problem file {}", path.display()))?,
        (Some(_), Some(_)) => bail!("pass either a problem statement or --file, not both"),
        (None, None) => bail!("no problem given; pass a statement or --file"),
    };

    let mut config = if std::path::Path::new(&cli.config).exists() {
        kata_core::config::load_config(&cli.config).await?
    } else {
        KataConfig::default()
    };

    if let Some(language) = &cli.language {
        config.solver.default_language = language.clone();
    }
    if let Some(complexity) = &cli.complexity {
        let preset = Complexity::parse(complexity)
            .with_context(|| format!("unknown complexity '{}'", complexity))?;
        config.apply_complexity(preset);
    }
    config.validate().map_err(|e| anyhow::anyhow!(e))?;

    let llm = openai::create_client(&config.llm).map_err(|e| anyhow::anyhow!(e))?;
    let sandbox =
        Arc::new(DockerSandbox::connect(config.sandbox.clone()).map_err(|e| anyhow::anyhow!(e))?);

    let cancel = CancellationToken::new();
    let abort_handle = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            log::warn!("interrupt received, aborting submission");
            abort_handle.cancel();
        }
    });

    log::info!(
        "starting session: language={}, turn ceiling={}, time budget={}s",
        config.solver.default_language,
        config.solver.turn_ceiling,
        config.sandbox.time_budget_seconds
    );

    let team = SolverTeam::new(llm, sandbox, config);
    let report = team.run(&problem, cancel).await?;

    for turn in &report.transcript {
        println!("──── {} ────", turn.speaker());
        println!("{}\n", turn.content());
    }

    match report.stop_reason {
        StopReason::Sentinel => println!("session finished after {} turns", report.turns_taken),
        StopReason::TurnCeiling => println!(
            "turn ceiling of {} reached without a terminal answer",
            report.turns_taken
        ),
        StopReason::Aborted => println!("session aborted by user"),
    }
    if let Some(verdict) = &report.last_verdict {
        println!("last execution verdict: {}", verdict.overall);
        if let Some(detail) = &verdict.representative_failure {
            println!("  {}", detail);
        }
    }

    // Keep the transcript readable above; the raw last solver turn is what
    // callers typically pipe elsewhere.
    if let Some(TurnMessage::Solver(text)) = report
        .transcript
        .iter()
        .rev()
        .find(|t| matches!(t, TurnMessage::Solver(_)))
    {
        log::debug!("final solver turn: {} chars", text.len());
    }

    Ok(())
}
