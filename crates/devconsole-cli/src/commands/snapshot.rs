//! Snapshot command - Fetch the server's current panel state once

use crate::context::ClientContext;
use crate::output::Formatter;
use anyhow::{anyhow, Context, Result};
use clap::Args;
use devconsole_console::{JsonFilter, PanelStore, SnapshotClient};
use serde_json::Value;
use std::io::Write;

#[derive(Args, Debug, Clone, Default)]
pub struct SnapshotArgs {
    /// Print a single panel instead of the whole snapshot
    #[arg(long, short)]
    pub panel: Option<String>,

    /// Keep only keys containing this text
    #[arg(long, short)]
    pub search: Option<String>,
}

/// Run snapshot command
pub async fn run(
    ctx: &ClientContext,
    args: SnapshotArgs,
    formatter: &Formatter,
    out: &mut impl Write,
) -> Result<()> {
    let section = &ctx.config.console;
    let client = SnapshotClient::from_section(section).context("Invalid console base URL")?;
    let snapshot = client
        .fetch_snapshot()
        .await
        .with_context(|| format!("Failed to fetch snapshot from {}", section.base_url))?;

    // Go through the store so capacities and retained panels apply
    let mut store = PanelStore::from_section(section);
    store.apply_snapshot(snapshot);

    let value = match &args.panel {
        Some(panel) => store
            .panel_json(panel)
            .ok_or_else(|| anyhow!("Panel '{}' is not in the snapshot", panel))?,
        None => serde_json::to_value(store.to_snapshot()).context("Failed to encode snapshot")?,
    };

    let filter = JsonFilter {
        search: args.search.unwrap_or_default(),
    };
    let shown = filter.apply(&value).unwrap_or(Value::Null);
    writeln!(out, "{}", formatter.json(&shown)).context("Failed to write snapshot")?;
    Ok(())
}
