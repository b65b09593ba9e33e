// SPDX-FileCopyrightText: 2026 Valet Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `valet status` command implementation.
//!
//! Probes the llama.cpp model server and the local database to show
//! what the assistant can reach right now. Falls back gracefully when
//! the model server is offline.

use std::io::IsTerminal;

use serde::Serialize;
use valet_config::ValetConfig;
use valet_core::{HealthStatus, ServiceAdapter, ValetError};
use valet_llama::{LlamaEmbedder, LlamaLlm};
use valet_memory::LtmStore;
use valet_storage::Database;
use valet_storage::queries::{rules, turns};

/// One probed component for `--json` mode.
#[derive(Debug, Serialize)]
pub struct ComponentStatus {
    pub name: String,
    pub healthy: bool,
    pub detail: Option<String>,
}

/// Database counters for `--json` mode.
#[derive(Debug, Serialize)]
pub struct StorageStatus {
    pub database_path: String,
    pub reachable: bool,
    pub turns: Option<i64>,
    pub memories: Option<i64>,
    pub rules: Option<i64>,
}

/// Structured status output for `--json` mode.
#[derive(Debug, Serialize)]
pub struct StatusReport {
    pub llm: ComponentStatus,
    pub embeddings: ComponentStatus,
    pub storage: StorageStatus,
}

/// Flattens a health check result into a (healthy, detail) pair.
fn flatten_health(result: Result<HealthStatus, ValetError>) -> (bool, Option<String>) {
    match result {
        Ok(HealthStatus::Healthy) => (true, None),
        Ok(HealthStatus::Degraded(reason)) => (false, Some(format!("degraded: {reason}"))),
        Ok(HealthStatus::Unhealthy(reason)) => (false, Some(reason)),
        Err(e) => (false, Some(e.to_string())),
    }
}

/// Runs a health check and turns the result into a component row.
async fn probe(adapter: &dyn ServiceAdapter) -> ComponentStatus {
    let (healthy, detail) = flatten_health(adapter.health_check().await);
    ComponentStatus {
        name: adapter.name().to_string(),
        healthy,
        detail,
    }
}

/// Opens the database and gathers row counters.
async fn probe_storage(config: &ValetConfig) -> StorageStatus {
    let path = config.storage.database_path.clone();
    match Database::open_with_timeout(
        &config.storage.database_path,
        config.storage.busy_timeout_ms,
    )
    .await
    {
        Ok(db) => {
            let turn_count = turns::count_turns(&db).await.ok();
            let memory_count = LtmStore::new(db.connection().clone()).count().await.ok();
            let rule_count = rules::list_rules(&db).await.map(|r| r.len() as i64).ok();
            StorageStatus {
                database_path: path,
                reachable: true,
                turns: turn_count,
                memories: memory_count,
                rules: rule_count,
            }
        }
        Err(_) => StorageStatus {
            database_path: path,
            reachable: false,
            turns: None,
            memories: None,
            rules: None,
        },
    }
}

/// Run the `valet status` command.
///
/// Probes the model server (generation and embeddings) and the database,
/// then displays one line per component. If `--json` is passed, outputs
/// structured JSON for scripting. If `--plain` is passed or stdout is
/// not a TTY, disables colors.
pub async fn run_status(config: &ValetConfig, json: bool, plain: bool) -> Result<(), ValetError> {
    let llm = LlamaLlm::new(&config.llm)?;
    let embedder = LlamaEmbedder::new(&config.llm)?;

    let report = StatusReport {
        llm: probe(&llm).await,
        embeddings: probe(&embedder).await,
        storage: probe_storage(config).await,
    };

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&report).unwrap_or_else(|_| "{}".to_string())
        );
        return Ok(());
    }

    let use_color = !plain && std::io::stdout().is_terminal();
    print_report(&report, &config.llm.base_url, use_color);
    Ok(())
}

/// Print one component row with optional colors.
fn print_component(label: &str, component: &ComponentStatus, use_color: bool) {
    let detail = component
        .detail
        .as_deref()
        .map(|d| format!(" ({d})"))
        .unwrap_or_default();

    if use_color {
        use colored::Colorize;
        if component.healthy {
            println!(
                "    {label}{} {}{detail}",
                "✓".green(),
                component.name.green()
            );
        } else {
            println!("    {label}{} {}{detail}", "✗".red(), component.name.red());
        }
    } else if component.healthy {
        println!("    {label}[OK] {}{detail}", component.name);
    } else {
        println!("    {label}[FAIL] {}{detail}", component.name);
    }
}

/// Print the component table with optional colors.
fn print_report(report: &StatusReport, base_url: &str, use_color: bool) {
    println!();
    println!("  valet status");
    println!("  {}", "-".repeat(35));

    print_component("Model:    ", &report.llm, use_color);
    print_component("Vectors:  ", &report.embeddings, use_color);

    if report.storage.reachable {
        let counters = format!(
            "{} turns, {} memories, {} rules",
            report.storage.turns.unwrap_or(0),
            report.storage.memories.unwrap_or(0),
            report.storage.rules.unwrap_or(0)
        );
        if use_color {
            use colored::Colorize;
            println!("    Storage:  {} {counters}", "✓".green());
        } else {
            println!("    Storage:  [OK] {counters}");
        }
    } else if use_color {
        use colored::Colorize;
        println!(
            "    Storage:  {} {}",
            "✗".red(),
            report.storage.database_path.red()
        );
    } else {
        println!("    Storage:  [FAIL] {}", report.storage.database_path);
    }

    if !report.llm.healthy {
        println!();
        println!("    Endpoint: {base_url}");
        println!("  Start the model server with: llama-server --embedding -m <model.gguf>");
    }
    println!();
}
