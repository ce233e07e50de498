//! Config command - Show the effective configuration

use crate::context::ClientContext;
use anyhow::{Context, Result};
use clap::Args;
use std::io::Write;

#[derive(Args, Debug, Clone, Default)]
pub struct ConfigArgs {
    /// Only print where the configuration was loaded from
    #[arg(long)]
    pub path: bool,
}

/// Run config command
pub fn run(ctx: &ClientContext, args: ConfigArgs, out: &mut impl Write) -> Result<()> {
    let origin = if ctx.config_path.exists() {
        format!("{} ({})", ctx.config_path.display(), ctx.config_source)
    } else {
        format!(
            "{} ({}, not found: defaults in use)",
            ctx.config_path.display(),
            ctx.config_source
        )
    };

    if args.path {
        writeln!(out, "{}", origin).context("Failed to write output")?;
        return Ok(());
    }

    let rendered =
        toml::to_string_pretty(ctx.config.as_ref()).context("Failed to encode configuration")?;
    writeln!(out, "# {}", origin).context("Failed to write output")?;
    write!(out, "{}", rendered).context("Failed to write output")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_prints_effective_config() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("devconsole.toml");
        std::fs::write(&path, "[console]\nslow_query_ms = 42\n").unwrap();
        let ctx = ClientContext::load(Some(&path), None).unwrap();

        let mut out = Vec::new();
        run(&ctx, ConfigArgs::default(), &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();

        assert!(text.starts_with("# "));
        assert!(text.contains("slow_query_ms = 42"));
        assert!(text.contains("[stream]"));
        let reparsed = devconsole_config::load_config_from_str(
            &text.lines().skip(1).collect::<Vec<_>>().join("\n"),
        )
        .unwrap();
        assert_eq!(&reparsed, ctx.config.as_ref());
    }

    #[test]
    fn test_path_only() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("devconsole.toml");
        std::fs::write(&path, "").unwrap();
        let ctx = ClientContext::load(Some(&path), None).unwrap();

        let mut out = Vec::new();
        run(&ctx, ConfigArgs { path: true }, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("--config CLI arg"));
        assert!(!text.contains("not found"));
    }
}
