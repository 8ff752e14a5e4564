//! Chat command - interactive REPL mode.

use anyhow::Result;
use clap::Args;

use folio_agent::CallerContext;

use super::Context;
use super::repl::Repl;
use crate::bootstrap;

/// Arguments for the chat command.
#[derive(Args, Debug)]
pub struct ChatArgs {
    /// User id to act as
    #[arg(short, long)]
    pub user_id: Option<String>,

    /// Session cookie string forwarded to the user-scoped tools
    #[arg(long)]
    pub cookies: Option<String>,
}

impl ChatArgs {
    fn caller(&self) -> CallerContext {
        let caller = match self.user_id.as_deref() {
            Some(id) => CallerContext::user(id),
            None => CallerContext::anonymous(),
        };
        match self.cookies.as_deref() {
            Some(cookies) => caller.with_cookies(cookies),
            None => caller,
        }
    }
}

/// Run the chat command (REPL).
pub async fn run(args: ChatArgs, ctx: &Context) -> Result<()> {
    let config = bootstrap::load_config(ctx.config_path.as_deref())?;
    let agent = bootstrap::build_agent(&config)?;

    let mut repl = Repl::new(agent, args.caller(), ctx.verbose)?;
    repl.run().await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_caller_from_args() {
        let args = ChatArgs {
            user_id: Some("u-1".to_string()),
            cookies: Some("access_token=t".to_string()),
        };
        let caller = args.caller();
        assert_eq!(caller.user_id(), Some("u-1"));
        assert_eq!(caller.cookies(), Some("access_token=t"));

        let anonymous = ChatArgs {
            user_id: None,
            cookies: None,
        };
        assert_eq!(anonymous.caller(), CallerContext::anonymous());
    }
}
