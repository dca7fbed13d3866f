//! Agent CLI commands: run a stored agent, list its runs.

use anyhow::Result;
use comfy_table::{Cell, Color, ContentArrangement, Table, presets};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tokio_util::sync::CancellationToken;

use agenthub_types::agent::{AgentRun, RunStatus, UserIdentity};
use agenthub_types::id::AgentId;

use crate::state::AppState;

fn parse_agent_id(raw: &str) -> Result<AgentId> {
    raw.parse::<AgentId>()
        .map_err(|e| anyhow::anyhow!("invalid agent id '{raw}': {e}"))
}

fn caller(state: &AppState, user: Option<String>) -> UserIdentity {
    user.filter(|u| !u.trim().is_empty())
        .map(UserIdentity::new)
        .unwrap_or_else(|| UserIdentity::new(state.config.anonymous_identity.clone()))
}

/// Run a stored agent once and print its output.
///
/// Ctrl+C cancels the in-flight execution.
///
/// ```bash
/// agenthub run 0190c7d2-... "Summarize today's weather in Paris"
/// ```
pub async fn run_agent(
    state: &AppState,
    agent_id: &str,
    input: &str,
    user: Option<String>,
    json: bool,
) -> Result<()> {
    let id = parse_agent_id(agent_id)?;
    let identity = caller(state, user);

    let cancel = CancellationToken::new();
    let ctrl_c_cancel = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            ctrl_c_cancel.cancel();
        }
    });

    let spinner = ProgressBar::new_spinner();
    if let Ok(spinner_style) = ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}") {
        spinner.set_style(spinner_style);
    }
    spinner.set_message("Running agent...");
    spinner.enable_steady_tick(std::time::Duration::from_millis(80));

    let result = state
        .agent_service
        .run_agent(&id, input, &identity, &cancel)
        .await;
    spinner.finish_and_clear();
    let result = result?;

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }

    println!();
    println!("  {} {}", style("▸").cyan().bold(), style(&result.title).bold());
    println!();
    for line in result.output.lines() {
        println!("  {line}");
    }
    println!();
    Ok(())
}

/// Print the most recent runs of an agent, newest first.
pub async fn list_runs(
    state: &AppState,
    agent_id: &str,
    limit: i64,
    user: Option<String>,
    json: bool,
) -> Result<()> {
    let id = parse_agent_id(agent_id)?;
    let identity = caller(state, user);
    let runs = state.agent_service.list_runs(&id, &identity, limit).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&runs)?);
        return Ok(());
    }

    if runs.is_empty() {
        println!();
        println!("  {}", style("No runs yet.").dim());
        println!();
        return Ok(());
    }

    println!("{}", runs_table(&runs));
    Ok(())
}

fn runs_table(runs: &[AgentRun]) -> Table {
    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);

    table.set_header(vec![
        Cell::new("When").fg(Color::White),
        Cell::new("User").fg(Color::White),
        Cell::new("Status").fg(Color::White),
        Cell::new("Input").fg(Color::White),
        Cell::new("Result").fg(Color::White),
    ]);

    for run in runs {
        let status_cell = match run.status {
            RunStatus::Completed => Cell::new("● completed").fg(Color::Green),
            RunStatus::Failed => Cell::new("✗ failed").fg(Color::Red),
        };
        let result = match run.status {
            RunStatus::Completed => run.output.as_deref().unwrap_or_default(),
            RunStatus::Failed => run.error.as_deref().unwrap_or_default(),
        };

        table.add_row(vec![
            Cell::new(run.created_at.format("%Y-%m-%d %H:%M:%S")),
            Cell::new(run.user_id.as_str()),
            status_cell,
            Cell::new(truncate(&run.input, 40)),
            Cell::new(truncate(result, 60)),
        ]);
    }
    table
}

/// Shorten to at most `max` characters, marking the cut with "...".
fn truncate(text: &str, max: usize) -> String {
    let single_line = text.replace('\n', " ");
    if single_line.chars().count() <= max {
        return single_line;
    }
    let kept: String = single_line.chars().take(max.saturating_sub(3)).collect();
    format!("{kept}...")
}
