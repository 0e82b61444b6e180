//! adsync batch runner.
//!
//! Processes each configured ad account in order: fetch yesterday's (or a
//! historical range of) insights, append them to the warehouse, collapse
//! duplicate facts, then bring the spreadsheet mirror up to date.
//!
//! # Usage
//!
//! ```bash
//! # Daily run (yesterday's data)
//! adsync --config /etc/adsync/adsync.toml
//!
//! # Historical backfill
//! adsync --config adsync.toml --start 20250101 --end 20251221
//!
//! # Warehouse only, no sheet writes
//! adsync --skip-mirror
//! ```
//!
//! Accounts are processed strictly one at a time; schedule runs so that two
//! invocations never overlap on the same tables.

use adsync_ingest::{
    run_account, Config, FetchMode, MetaInsights, SheetsMirror, Warehouse,
};
use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Meta ads → warehouse → sheet mirror sync.
#[derive(Parser, Debug)]
#[command(name = "adsync")]
#[command(about = "Ingest Meta ad insights and sync the sheet mirror")]
#[command(version)]
struct Args {
    /// Path to the TOML configuration file
    #[arg(long, short, default_value = "adsync.toml")]
    config: PathBuf,

    /// Backfill range start, YYYYMMDD (requires --end)
    #[arg(long, requires = "end")]
    start: Option<String>,

    /// Backfill range end, YYYYMMDD, inclusive (requires --start)
    #[arg(long, requires = "start")]
    end: Option<String>,

    /// Run the warehouse stages only; skip all mirror writes
    #[arg(long)]
    skip_mirror: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env()
                .add_directive("info".parse().expect("static directive"))
                .add_directive("adsync_ingest=debug".parse().expect("static directive")),
        )
        .init();

    let args = Args::parse();

    let config = Config::load(&args.config)
        .with_context(|| format!("failed to load config from {}", args.config.display()))?;

    let mode = match (&args.start, &args.end) {
        (Some(start), Some(end)) => FetchMode::Range {
            start: parse_compact_date(start)?,
            end: parse_compact_date(end)?,
        },
        _ => FetchMode::Yesterday,
    };

    tracing::info!(?mode, accounts = config.accounts.len(), "adsync run starting");

    let warehouse = Warehouse::new(&config.clickhouse);
    let mirror = SheetsMirror::new(&config.sheets);

    for account in &config.accounts {
        tracing::info!(account = %account.name, table = %account.table, "account run starting");

        if let Err(e) = warehouse.ensure_table(&account.table).await {
            tracing::error!(
                account = %account.name,
                table = %account.table,
                error = %e,
                "could not ensure fact table, skipping account"
            );
            continue;
        }

        let source = MetaInsights::new(&config.meta, config.token_for(account));
        let summary =
            run_account(&source, &warehouse, &mirror, account, mode, args.skip_mirror).await;

        tracing::info!(
            account = %account.name,
            fetched = summary.fetched,
            appended = summary.appended,
            dropped = summary.dropped,
            duplicates_removed = summary.duplicates_removed,
            mirror_appended = summary.mirror_rows_appended,
            mirror_deduped = summary.mirror_duplicates_removed,
            "account run finished"
        );
    }

    tracing::info!("all accounts processed");
    Ok(())
}

fn parse_compact_date(value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value, "%Y%m%d")
        .with_context(|| format!("invalid date '{value}', expected YYYYMMDD"))
}
