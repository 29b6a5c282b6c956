use crate::{
    api,
    auth::{AuthConfig, AuthState, SupabaseAuth},
    cli::telemetry,
    content::{ContentAdapter, ContentConfig, notion::NotionClient},
};
use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::info;

#[derive(Debug)]
pub struct Args {
    pub port: u16,
    pub content: ContentConfig,
    pub auth: AuthConfig,
}

/// Execute the server action.
/// # Errors
/// Returns an error if the HTTP clients cannot be built or the server fails to start.
pub async fn execute(args: Args) -> Result<()> {
    log_startup_args(&args);

    let notion = NotionClient::new(&args.content).context("could not build Notion client")?;
    let adapter = Arc::new(ContentAdapter::new(Arc::new(notion), args.content));

    let supabase = SupabaseAuth::new(&args.auth).context("could not build Supabase client")?;
    let auth = Arc::new(AuthState::new(Arc::new(supabase), args.auth.session_cookie));

    let result = api::new(args.port, adapter, auth).await;

    telemetry::shutdown_tracer();

    result
}

fn log_startup_args(args: &Args) {
    let entries = [
        ("listen", format!("tcp:{}", args.port)),
        ("notion_api_url", args.content.api_url.clone()),
        ("notion_database_id", args.content.database_id.clone()),
        ("notion_token_set", "true".to_string()),
        (
            "notion_timeout",
            format!("{}s", args.content.timeout.as_secs()),
        ),
        ("sort_by_title", args.content.sort_by_title.to_string()),
        ("supabase_url", args.auth.url.clone()),
        ("supabase_anon_key_set", "true".to_string()),
        ("session_cookie", args.auth.session_cookie.clone()),
    ];
    log_entries("Startup configuration", &entries);
}

fn log_entries(title: &str, entries: &[(&str, String)]) {
    let max_key_len = entries.iter().map(|(key, _)| key.len()).max().unwrap_or(0);
    let mut message = format!("{}\n\n{title}:", banner());
    for (key, value) in entries {
        let padding = " ".repeat(max_key_len.saturating_sub(key.len()));
        let _ =
            std::fmt::Write::write_fmt(&mut message, format_args!("\n  {key}:{padding} {value}"));
    }
    info!("{message}");
}

fn banner() -> String {
    let short_hash = short_commit(crate::GIT_COMMIT_HASH);
    BANNER.replace(
        "{VERSION}",
        &format!(" - {} - {}", env!("CARGO_PKG_VERSION"), short_hash),
    )
}

fn short_commit(hash: &str) -> String {
    let trimmed = hash.trim();
    trimmed.chars().take(7).collect()
}

const BANNER: &str = r"
  +-------+ +-------+ +-------+
  |       | |       | |       |
  +-------+ +-------+ +-------+
  S H O W C A S E {VERSION}";
