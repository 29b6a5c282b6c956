use crate::cli::{
    actions::{Action, server::Args},
    commands::{ARG_PORT, notion, supabase},
};
use anyhow::{Context, Result};

/// # Errors
/// Returns an error if required arguments are missing, blank or malformed.
pub fn handler(matches: &clap::ArgMatches) -> Result<Action> {
    let port = matches.get_one::<u16>(ARG_PORT).copied().unwrap_or(8080);

    let content = notion::parse(matches).context("invalid Notion configuration")?;
    let auth = supabase::parse(matches).context("invalid Supabase configuration")?;

    Ok(Action::Server(Args {
        port,
        content,
        auth,
    }))
}
