//! Clear command - Empty one panel (or all) on the server

use crate::context::ClientContext;
use anyhow::{Context, Result};
use clap::Args;
use devconsole_console::SnapshotClient;
use std::io::Write;

#[derive(Args, Debug, Clone, Default)]
pub struct ClearArgs {
    /// Panel to clear; every panel when omitted
    pub panel: Option<String>,
}

/// Run clear command
pub async fn run(ctx: &ClientContext, args: ClearArgs, out: &mut impl Write) -> Result<()> {
    let section = &ctx.config.console;
    let client = SnapshotClient::from_section(section).context("Invalid console base URL")?;
    client
        .clear(args.panel.as_deref())
        .await
        .with_context(|| format!("Failed to clear on {}", section.base_url))?;

    let written = match &args.panel {
        Some(panel) => writeln!(out, "Cleared panel '{}'", panel),
        None => writeln!(out, "Cleared all panels"),
    };
    written.context("Failed to write output")?;
    Ok(())
}
