//! Ask command - one-shot question through a running server.

use anyhow::Result;
use clap::Args;
use console::Style;

use super::Context;
use crate::client::{ChatRequest, Client};

/// Arguments for the ask command.
#[derive(Args, Debug)]
pub struct AskArgs {
    /// The question or prompt to send
    #[arg(required = true)]
    pub prompt: String,

    /// User id to act as
    #[arg(short, long)]
    pub user_id: Option<String>,

    /// Session cookie string forwarded to the user-scoped tools
    #[arg(long)]
    pub cookies: Option<String>,
}

/// Run the ask command.
pub async fn run(args: AskArgs, ctx: &Context) -> Result<()> {
    let client = Client::new(&ctx.server_url)?;

    if ctx.verbose {
        let dim = Style::new().dim();
        println!("{}", dim.apply_to(format!("Sending to: {}", ctx.server_url)));
        if let Some(ref user_id) = args.user_id {
            println!("{}", dim.apply_to(format!("User: {}", user_id)));
        }
        println!();
    }

    let request = ChatRequest {
        message: &args.prompt,
        user_id: args.user_id.as_deref(),
        cookies: args.cookies.as_deref(),
    };

    match client.chat(&request).await {
        Ok(response) => {
            if ctx.json_output {
                println!("{}", serde_json::to_string_pretty(&response)?);
            } else {
                println!("{}", response.response);
            }
            Ok(())
        }
        Err(e) => {
            let red = Style::new().red();
            eprintln!("{} {}", red.apply_to("Error:"), e);
            Err(e)
        }
    }
}
