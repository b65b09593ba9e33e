// SPDX-FileCopyrightText: 2026 Valet Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `valet shell` command implementation.
//!
//! Launches an interactive REPL with colored prompt and readline
//! history. Every line runs through the orchestrator pipeline; rule
//! proposals surface inline with a y/N confirmation.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use colored::Colorize;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use tracing::info;
use valet_agent::{Orchestrator, sink_from_config};
use valet_config::ValetConfig;
use valet_core::{
    Command, CommandChannel, EmbeddingAdapter, HealthStatus, LlmAdapter, Notifier, ValetError,
};
use valet_llama::{LlamaEmbedder, LlamaLlm};
use valet_memory::{Consolidator, MemoryService};
use valet_storage::Database;
use valet_talent::{TalentSet, builtin::register_builtins, load_manifest_dir};

/// Prints out-of-band messages (rule proposals) straight to the terminal.
struct StdoutNotifier;

#[async_trait]
impl Notifier for StdoutNotifier {
    async fn notify(&self, message: &str) {
        println!("{}", message.cyan());
    }
}

/// Runs the `valet shell` interactive REPL.
///
/// Wires storage, the llama.cpp adapters, memory, and the talent set
/// into an [`Orchestrator`], then reads commands line by line until
/// `/quit`, Ctrl+C, or Ctrl+D.
pub async fn run_shell(config: ValetConfig) -> Result<(), ValetError> {
    let config = Arc::new(config);

    // Open storage.
    let db = Database::open_with_timeout(
        &config.storage.database_path,
        config.storage.busy_timeout_ms,
    )
    .await?;

    // Model server adapters.
    let llm: Arc<dyn LlmAdapter> = Arc::new(LlamaLlm::new(&config.llm)?);
    let embedder: Arc<dyn EmbeddingAdapter> = Arc::new(LlamaEmbedder::new(&config.llm)?);

    // Probe the model server once at startup. An unreachable server is
    // not fatal: commands still run, talents answer with their canned
    // failure text until it comes back.
    match llm.health_check().await {
        Ok(HealthStatus::Healthy) => {}
        Ok(HealthStatus::Degraded(reason)) | Ok(HealthStatus::Unhealthy(reason)) => {
            println!(
                "{}",
                format!("warning: model server degraded: {reason}").dimmed()
            );
        }
        Err(e) => {
            println!(
                "{}",
                format!("warning: model server unreachable: {e}").dimmed()
            );
        }
    }

    // Memory system: retrieval service plus the overflow consolidator.
    let memory = Arc::new(MemoryService::new(
        db.clone(),
        embedder.clone(),
        config.memory.clone(),
    ));
    let consolidator = Arc::new(Consolidator::new(
        memory.store(),
        llm.clone(),
        embedder.clone(),
        config.memory.clone(),
    ));

    // Talent set: built-ins plus any manifest talents.
    let mut talents = TalentSet::new(&config.talents);
    register_builtins(&mut talents)?;
    if let Some(dir) = &config.talents.manifest_dir {
        let loaded = load_manifest_dir(Path::new(dir))?;
        let count = loaded.len();
        for talent in loaded {
            talents.register(Arc::new(talent))?;
        }
        info!(count, dir = %dir, "manifest talents registered");
    }
    info!("talent set initialized with {} talents", talents.len());

    let notifier: Arc<dyn Notifier> = Arc::new(StdoutNotifier);
    let training = sink_from_config(&config.training);

    let orchestrator = Orchestrator::new(
        config.clone(),
        db,
        llm,
        memory,
        consolidator,
        talents,
        notifier,
        training,
    )?;

    // Set up readline editor.
    let mut rl = DefaultEditor::new()
        .map_err(|e| ValetError::Internal(format!("failed to initialize readline: {e}")))?;

    // Print welcome message.
    println!("{}", "valet shell".bold().green());
    println!("Type {} to exit.\n", "/quit".yellow());

    // REPL loop.
    let prompt = format!("{}> ", "valet".green());
    let mut turns: u64 = 0;
    loop {
        match rl.readline(&prompt) {
            Ok(line) => {
                let trimmed = line.trim();
                if trimmed == "/quit" || trimmed == "/exit" {
                    break;
                }
                if trimmed.is_empty() {
                    continue;
                }

                let _ = rl.add_history_entry(&line);
                turns += 1;

                if let Err(e) = handle_shell_line(&orchestrator, &mut rl, trimmed).await {
                    eprintln!("{}: {e}", "error".red());
                }
            }
            Err(ReadlineError::Interrupted) => {
                // Ctrl+C
                break;
            }
            Err(ReadlineError::Eof) => {
                // Ctrl+D
                break;
            }
            Err(e) => {
                eprintln!("{}: {e}", "error".red());
                break;
            }
        }
    }

    // Let any in-flight consolidation land before exit.
    orchestrator.shutdown().await;

    if turns > 0 {
        println!("{}", format!("session turns: {turns}").dimmed());
    }
    println!("{}", "goodbye".dimmed());
    Ok(())
}

/// Handles a single shell line: runs the pipeline, prints the response,
/// and walks the user through any rule proposal.
async fn handle_shell_line(
    orchestrator: &Orchestrator,
    rl: &mut DefaultEditor,
    input: &str,
) -> Result<(), ValetError> {
    let outcome = orchestrator
        .handle(Command::new(input, CommandChannel::Text))
        .await?;

    if let Some(original) = &outcome.corrected_from {
        eprintln!("{}", format!("(corrected from: {original})").dimmed());
    }

    if outcome.success {
        println!("{}", outcome.response);
    } else {
        println!("{}", outcome.response.yellow());
    }

    if let Some(proposal) = &outcome.proposal {
        // The proposal text itself was already printed by the notifier;
        // here we only collect the decision.
        let answer = rl.readline("accept? [y/N] ").unwrap_or_default();
        if is_affirmative(&answer) {
            match orchestrator.accept_proposal(proposal).await {
                Ok(rule_id) => {
                    println!("{}", format!("rule #{rule_id} saved").green());
                }
                Err(e) => {
                    eprintln!("{}: {e}", "error".red());
                }
            }
        } else {
            println!("{}", "okay, I'll keep asking".dimmed());
        }
    }

    Ok(())
}

/// Returns true when an answer to a y/N prompt is affirmative.
fn is_affirmative(answer: &str) -> bool {
    matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
}
