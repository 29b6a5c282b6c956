use crate::content::{ContentConfig, DEFAULT_NOTION_API_URL, DEFAULT_TIMEOUT_SECONDS};
use anyhow::{Context, Result, bail};
use clap::{Arg, ArgAction, ArgMatches, Command};
use secrecy::SecretString;
use std::time::Duration;
use url::Url;

pub const ARG_TOKEN: &str = "notion-token";
pub const ARG_DATABASE_ID: &str = "notion-database-id";
pub const ARG_API_URL: &str = "notion-api-url";
pub const ARG_TIMEOUT: &str = "notion-timeout";
pub const ARG_NO_SORT: &str = "no-sort";

#[must_use]
pub fn with_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_TOKEN)
                .long(ARG_TOKEN)
                .help("Notion integration token")
                .env("SHOWCASE_NOTION_TOKEN")
                .hide_env_values(true)
                .required(true),
        )
        .arg(
            Arg::new(ARG_DATABASE_ID)
                .long(ARG_DATABASE_ID)
                .help("Notion database holding the landing page cards")
                .env("SHOWCASE_NOTION_DATABASE_ID")
                .required(true),
        )
        .arg(
            Arg::new(ARG_API_URL)
                .long(ARG_API_URL)
                .help("Notion API base URL")
                .env("SHOWCASE_NOTION_API_URL")
                .default_value(DEFAULT_NOTION_API_URL),
        )
        .arg(
            Arg::new(ARG_TIMEOUT)
                .long(ARG_TIMEOUT)
                .help("Notion request timeout in seconds")
                .env("SHOWCASE_NOTION_TIMEOUT")
                .default_value("10")
                .value_parser(clap::value_parser!(u64).range(1..)),
        )
        .arg(
            Arg::new(ARG_NO_SORT)
                .long(ARG_NO_SORT)
                .help("Return cards in database order instead of ascending by title")
                .env("SHOWCASE_NO_SORT")
                .action(ArgAction::SetTrue),
        )
}

/// Resolve and validate the content store settings.
///
/// # Errors
/// Returns an error if the token or database id is missing or blank, or the API URL is invalid.
pub fn parse(matches: &ArgMatches) -> Result<ContentConfig> {
    let token = required(matches, ARG_TOKEN)?;
    let database_id = required(matches, ARG_DATABASE_ID)?;

    let api_url = matches
        .get_one::<String>(ARG_API_URL)
        .cloned()
        .unwrap_or_else(|| DEFAULT_NOTION_API_URL.to_string());
    let parsed = Url::parse(&api_url).context("invalid SHOWCASE_NOTION_API_URL")?;
    if !matches!(parsed.scheme(), "http" | "https") {
        bail!("invalid SHOWCASE_NOTION_API_URL: unsupported scheme {}", parsed.scheme());
    }

    let timeout = matches
        .get_one::<u64>(ARG_TIMEOUT)
        .copied()
        .unwrap_or(DEFAULT_TIMEOUT_SECONDS);

    Ok(ContentConfig {
        token: SecretString::from(token),
        database_id,
        api_url,
        timeout: Duration::from_secs(timeout),
        sort_by_title: !matches.get_flag(ARG_NO_SORT),
    })
}

pub(super) fn required(matches: &ArgMatches, name: &str) -> Result<String> {
    let value = matches
        .get_one::<String>(name)
        .map(|value| value.trim().to_string())
        .with_context(|| format!("missing required argument: --{name}"))?;

    if value.is_empty() {
        bail!("required argument --{name} is empty");
    }

    Ok(value)
}
