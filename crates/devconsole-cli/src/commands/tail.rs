//! Tail command - Stream one panel and print what changes

use crate::context::ClientContext;
use crate::output::{status_line, Formatter};
use anyhow::{bail, Context, Result};
use clap::Args;
use devconsole_console::{
    ConsoleController, JsonFilter, LogFilter, PanelStore, RequestFilter, RouteFilter, SqlFilter,
    TracingNotifier,
};
use devconsole_core::{ConnectionStatus, PanelKind, RingBuffer, RouteEntry};
use devconsole_logging::{debug, info};
use serde_json::Value;
use std::io::Write;
use std::sync::Arc;

#[derive(Args, Debug, Clone)]
pub struct TailArgs {
    /// Panel to follow (requests, sql, logs, routes, template, session,
    /// config, custom, or a configured extra panel)
    #[arg(long, short, default_value = "requests")]
    pub panel: String,

    /// Request/route method
    #[arg(long)]
    pub method: Option<String>,

    /// Request status: exact ("404") or class ("5xx")
    #[arg(long)]
    pub status: Option<String>,

    /// Case-insensitive text search (keys for JSON panels)
    #[arg(long, short)]
    pub search: Option<String>,

    /// Log level
    #[arg(long)]
    pub level: Option<String>,

    /// Only slow SQL statements
    #[arg(long)]
    pub slow: bool,

    /// Only failed SQL statements
    #[arg(long)]
    pub errors: bool,

    /// Print a status line whenever the connection status changes
    #[arg(long)]
    pub show_status: bool,
}

/// Filters for every panel, built from the command line
#[derive(Debug, Clone, Default)]
pub struct TailFilters {
    pub request: RequestFilter,
    pub sql: SqlFilter,
    pub log: LogFilter,
    pub route: RouteFilter,
    pub json: JsonFilter,
}

impl TailFilters {
    pub fn from_args(args: &TailArgs, slow_query_ms: u64) -> Self {
        let search = args.search.clone().unwrap_or_default();
        Self {
            request: RequestFilter {
                method: args.method.clone(),
                status: args.status.clone(),
                search: search.clone(),
            },
            sql: SqlFilter {
                search: search.clone(),
                slow_only: args.slow,
                errors_only: args.errors,
                slow_threshold_ms: slow_query_ms,
            },
            log: LogFilter {
                level: args.level.clone(),
                search: search.clone(),
                ..LogFilter::default()
            },
            route: RouteFilter {
                method: args.method.clone(),
                search: search.clone(),
            },
            json: JsonFilter { search },
        }
    }
}

/// What has already been printed
#[derive(Debug, Default)]
pub struct TailCursor {
    requests: u64,
    sql: u64,
    logs: u64,
    custom_logs: u64,
    routes: Option<Vec<RouteEntry>>,
    json: Option<Value>,
}

/// Rows of `panel` added or changed since the cursor last looked
pub fn render_new(
    store: &PanelStore,
    panel: &str,
    filters: &TailFilters,
    cursor: &mut TailCursor,
    formatter: &Formatter,
) -> Vec<String> {
    match panel.parse::<PanelKind>() {
        Ok(PanelKind::Requests) => fresh(store.requests(), &mut cursor.requests)
            .filter(|e| filters.request.matches(e))
            .map(|e| formatter.request(e))
            .collect(),
        Ok(PanelKind::Sql) => fresh(store.sql(), &mut cursor.sql)
            .filter(|e| filters.sql.matches(e))
            .map(|e| formatter.sql(e))
            .collect(),
        Ok(PanelKind::Logs) => fresh(store.logs(), &mut cursor.logs)
            .filter(|e| filters.log.matches(e))
            .map(|e| formatter.log(e))
            .collect(),
        Ok(PanelKind::Routes) => {
            if cursor.routes.as_deref() == Some(store.routes()) {
                return Vec::new();
            }
            cursor.routes = Some(store.routes().to_vec());
            filters
                .route
                .apply(store.routes())
                .into_iter()
                .map(|e| formatter.route(e))
                .collect()
        }
        Ok(PanelKind::Custom) => {
            let mut lines: Vec<String> = fresh(store.custom_logs(), &mut cursor.custom_logs)
                .map(|e| formatter.custom_log(e))
                .collect();
            lines.extend(changed_json(store.custom(), filters, cursor, formatter));
            lines
        }
        Ok(PanelKind::Template | PanelKind::Session | PanelKind::Config) | Err(_) => {
            let value = store.panel_json(panel).unwrap_or(Value::Null);
            changed_json(&value, filters, cursor, formatter)
                .into_iter()
                .collect()
        }
    }
}

fn fresh<'a, T>(buffer: &'a RingBuffer<T>, seen: &mut u64) -> impl Iterator<Item = &'a T> {
    let total = buffer.total_pushed();
    let new = total.saturating_sub(*seen).min(buffer.len() as u64) as usize;
    *seen = total;
    buffer.iter().skip(buffer.len() - new)
}

fn changed_json(
    value: &Value,
    filters: &TailFilters,
    cursor: &mut TailCursor,
    formatter: &Formatter,
) -> Option<String> {
    if cursor.json.as_ref() == Some(value) {
        return None;
    }
    cursor.json = Some(value.clone());
    if value.is_null() {
        return None;
    }
    filters.json.apply(value).map(|v| formatter.json(&v))
}

/// Run tail command
pub async fn run(ctx: &ClientContext, args: TailArgs, formatter: &Formatter) -> Result<()> {
    let section = &ctx.config.console;
    if args.panel.parse::<PanelKind>().is_err() && !section.has_panel(&args.panel) {
        bail!(
            "Unknown panel '{}'. Add it to console.panels to follow a custom event type.",
            args.panel
        );
    }

    let controller = ConsoleController::from_config(&ctx.config, Arc::new(TracingNotifier))
        .with_context(|| format!("Failed to start console for {}", section.base_url))?;
    info!(base_url = %section.base_url, panel = %args.panel, "Tailing panel");

    let filters = TailFilters::from_args(&args, section.slow_query_ms);
    let mut cursor = TailCursor::default();
    let mut render = controller.render_watch();
    let mut last_status = ConnectionStatus::Disconnected;
    let mut stdout = std::io::stdout();

    loop {
        tokio::select! {
            changed = render.changed() => {
                if changed.is_err() {
                    debug!("Console session ended");
                    break;
                }
                let (lines, status_text) = controller.read(|store| {
                    let lines = render_new(store, &args.panel, &filters, &mut cursor, formatter);
                    let status = controller.status();
                    let text = (status != last_status)
                        .then(|| status_line(status, store.stats(), store.is_paused()));
                    (lines, text.map(|t| (status, t)))
                });

                if let Some((status, text)) = status_text {
                    last_status = status;
                    if args.show_status {
                        eprintln!("{}", text);
                    }
                }
                for line in lines {
                    writeln!(stdout, "{}", line).context("Failed to write to stdout")?;
                }
                stdout.flush().context("Failed to flush stdout")?;
            }
            _ = tokio::signal::ctrl_c() => {
                info!("Interrupted, closing stream");
                controller.close().context("Console already stopped")?;
                break;
            }
        }
    }

    Ok(())
}
