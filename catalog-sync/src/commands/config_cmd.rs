//! `config show`.

use super::Context;
use anyhow::Result;
use catalog_sync_common::config::ConfigRow;
use clap::Subcommand;
use colored::Colorize;
use serde_json::json;

#[derive(Subcommand, Debug, Clone)]
pub enum ConfigAction {
    /// Print the resolved configuration and where each value came from
    Show,
}

pub fn run(ctx: &Context, action: &ConfigAction) -> Result<()> {
    match action {
        ConfigAction::Show => show(ctx),
    }
}

fn show(ctx: &Context) -> Result<()> {
    let rows = ctx.config.rows();
    if ctx.format.is_json() {
        ctx.format.print(&json!({
            "configFile": ctx.config.config_file,
            "values": rows,
        }))?;
        return Ok(());
    }

    match &ctx.config.config_file {
        Some(path) => println!("{} {}", "Config file:".bold(), path.display()),
        None => println!("{} (none)", "Config file:".bold()),
    }
    let width = rows.iter().map(|row| row.key.len()).max().unwrap_or(0);
    for row in &rows {
        println!("  {:width$}  {}  {}", row.key, row.value, describe_source(row).dimmed());
    }
    Ok(())
}

fn describe_source(row: &ConfigRow) -> String {
    match &row.env_var {
        Some(var) => format!("({}: {var})", row.source),
        None => format!("({})", row.source),
    }
}
