//! Start command - launches the Folio server.

use anyhow::Result;
use clap::Args;
use console::{Style, style};

use folio_config::ENV_NOTION_TOKEN;
use folio_server::{Server, ServerConfig};

use super::Context;
use crate::bootstrap;

/// Arguments for the start command.
///
/// CLI arguments override config file values.
#[derive(Args, Debug)]
pub struct StartArgs {
    /// Address to bind to (overrides config and FOLIO_BIND)
    #[arg(short, long)]
    pub bind: Option<String>,
}

/// Run the start command.
pub async fn run(args: StartArgs, ctx: &Context) -> Result<()> {
    let mut config = bootstrap::load_config(ctx.config_path.as_deref())?;
    if let Some(bind) = args.bind {
        config.server.bind = bind;
    }

    if config.missing_credentials().contains(&ENV_NOTION_TOKEN) {
        eprintln!(
            "warning: {} is not set; only the per-user Notion tools will work",
            ENV_NOTION_TOKEN
        );
    }

    let agent = bootstrap::build_agent(&config)?;
    let server_config = ServerConfig::from_section(&config.server)?;

    let dim = Style::new().dim();
    println!();
    println!("{}", style("Folio Server").bold().cyan());
    println!("{}", dim.apply_to("─".repeat(40)));
    println!("  {} {}", dim.apply_to("Listening:"), server_config.bind_address);
    println!("  {} {}", dim.apply_to("Model:"), config.llm.model);
    println!("  {} {}", dim.apply_to("Tools:"), agent.tools().len());
    println!("  {} {}", dim.apply_to("Backend:"), config.backend.base_url);
    println!();

    Server::new(agent, server_config).run().await?;
    Ok(())
}
