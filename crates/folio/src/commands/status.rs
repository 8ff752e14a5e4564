//! Status command - configuration report and server health check.

use anyhow::Result;
use clap::Args;
use console::{Style, style};
use serde::Serialize;

use super::Context;
use crate::bootstrap;
use crate::client::Client;

/// Arguments for the status command.
#[derive(Args, Debug)]
pub struct StatusArgs {
    /// Skip the server health check
    #[arg(long)]
    pub offline: bool,
}

/// Status report for JSON output.
#[derive(Debug, Serialize)]
struct StatusOutput {
    running: bool,
    version: Option<String>,
    tools_count: Option<usize>,
    server_url: String,
    model: String,
    backend_url: String,
    bind: String,
    missing_credentials: Vec<&'static str>,
}

/// Run the status command.
pub async fn run(args: StatusArgs, ctx: &Context) -> Result<()> {
    let config = bootstrap::load_config(ctx.config_path.as_deref())?;

    let health = if args.offline {
        None
    } else {
        match Client::new(&ctx.server_url)?.health().await {
            Ok(health) => Some(health),
            Err(e) => {
                tracing::debug!(error = %e, "Health check failed");
                None
            }
        }
    };

    let output = StatusOutput {
        running: health.is_some(),
        version: health.as_ref().map(|h| h.version.clone()),
        tools_count: health.as_ref().map(|h| h.tools_count),
        server_url: ctx.server_url.clone(),
        model: config.llm.model.clone(),
        backend_url: config.backend.base_url.clone(),
        bind: config.server.bind.clone(),
        missing_credentials: config.missing_credentials(),
    };

    if ctx.json_output {
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    let green = Style::new().green();
    let red = Style::new().red();
    let yellow = Style::new().yellow();
    let dim = Style::new().dim();

    println!();
    println!("{}", style("Folio Status").bold());
    println!("{}", dim.apply_to("─".repeat(40)));
    println!();
    println!("  {} {}", dim.apply_to("Model:"), output.model);
    println!("  {} {}", dim.apply_to("Backend:"), output.backend_url);
    println!("  {} {}", dim.apply_to("Bind:"), output.bind);
    if output.missing_credentials.is_empty() {
        println!("  {} {}", dim.apply_to("Credentials:"), green.apply_to("✓ all set"));
    } else {
        for name in &output.missing_credentials {
            println!(
                "  {} {}",
                dim.apply_to("Credentials:"),
                yellow.apply_to(format!("✗ {} not set", name))
            );
        }
    }
    println!();

    if !args.offline {
        match (&health, output.version.as_deref()) {
            (Some(health), Some(version)) => {
                println!("  {} {}", dim.apply_to("Server:"), green.apply_to("● running"));
                println!("  {} {}", dim.apply_to("Version:"), version);
                println!("  {} {}", dim.apply_to("Tools:"), health.tools_count);
            }
            _ => {
                println!("  {} {}", dim.apply_to("Server:"), red.apply_to("● not running"));
                println!("  {}", dim.apply_to("Start the server with: folio start"));
            }
        }
        println!("  {} {}", dim.apply_to("URL:"), ctx.server_url);
        println!();
    }

    Ok(())
}
