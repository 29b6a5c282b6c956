//! # Showcase (Landing Site Backend)
//!
//! `showcase` serves the data behind a marketing landing page: a carousel of
//! **cards** pulled from a Notion database, plus two passthrough endpoints that
//! forward session lookups and sign-outs to Supabase Auth.
//!
//! ## Content Cards
//!
//! Notion returns each database row as a bag of typed properties (`title`,
//! `rich_text`, `url`, `files`, ...). The [`content`] adapter flattens those into
//! a stable [`content::Card`] and never fails its caller:
//!
//! 1. **Field:** a missing or mistyped property falls back to a default value.
//! 2. **Record:** a row that cannot be decoded becomes a visible error card.
//! 3. **Batch:** a failed query yields an empty list.
//!
//! Each tier has its own outcome type so it can be asserted on directly.
//!
//! ## Authentication
//!
//! Session state lives entirely in Supabase. The [`auth`] module only extracts
//! the caller's access token and forwards it; no credentials are stored here.

pub mod api;
pub mod auth;
pub mod cli;
pub mod content;

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};

pub const APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"),);
