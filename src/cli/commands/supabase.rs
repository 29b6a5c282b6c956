use crate::auth::{AuthConfig, LEGACY_SESSION_COOKIE, project_session_cookie};
use anyhow::{Context, Result, bail};
use clap::{Arg, ArgMatches, Command};
use secrecy::SecretString;
use url::Url;

use super::notion::required;

pub const ARG_URL: &str = "supabase-url";
pub const ARG_ANON_KEY: &str = "supabase-anon-key";
pub const ARG_SESSION_COOKIE: &str = "session-cookie";

#[must_use]
pub fn with_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_URL)
                .long(ARG_URL)
                .help("Supabase project URL, example: https://<project>.supabase.co")
                .env("SHOWCASE_SUPABASE_URL")
                .required(true),
        )
        .arg(
            Arg::new(ARG_ANON_KEY)
                .long(ARG_ANON_KEY)
                .help("Supabase anon (public) API key")
                .env("SHOWCASE_SUPABASE_ANON_KEY")
                .hide_env_values(true)
                .required(true),
        )
        .arg(
            Arg::new(ARG_SESSION_COOKIE)
                .long(ARG_SESSION_COOKIE)
                .help("Cookie carrying the Supabase session (default: sb-<project ref>-auth-token)")
                .env("SHOWCASE_SESSION_COOKIE"),
        )
}

/// Resolve and validate the auth provider settings.
///
/// # Errors
/// Returns an error if the URL or key is missing, blank or malformed.
pub fn parse(matches: &ArgMatches) -> Result<AuthConfig> {
    let url = required(matches, ARG_URL)?;
    let parsed = Url::parse(&url).context("invalid SHOWCASE_SUPABASE_URL")?;
    if !matches!(parsed.scheme(), "http" | "https") {
        bail!("invalid SHOWCASE_SUPABASE_URL: unsupported scheme {}", parsed.scheme());
    }

    let anon_key = required(matches, ARG_ANON_KEY)?;

    let session_cookie = matches
        .get_one::<String>(ARG_SESSION_COOKIE)
        .cloned()
        .unwrap_or_else(|| {
            parsed
                .host_str()
                .map_or_else(|| LEGACY_SESSION_COOKIE.to_string(), project_session_cookie)
        });
    if session_cookie.is_empty()
        || !session_cookie
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
    {
        bail!("invalid SHOWCASE_SESSION_COOKIE: {session_cookie:?}");
    }

    Ok(AuthConfig {
        url,
        anon_key: SecretString::from(anon_key),
        session_cookie,
    })
}
