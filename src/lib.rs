//! # wpreader
//!
//! A terminal reader for WordPress blogs, backed by the public REST API.
//!
//! ## Architecture
//!
//! ```text
//! Fetcher → Normalizer → PostFeed → UI / CLI
//! ```
//!
//! - [`fetcher`]: pulls raw post pages from `/wp-json/wp/v2/posts`
//! - [`normalizer`]: turns raw posts into display-ready records
//! - [`feed`]: paginated list state with load, refresh and retry
//! - [`tui`]: terminal user interface built with ratatui
//!
//! ## Quick Start
//!
//! ```bash
//! # Print the first page of posts
//! wpreader list
//!
//! # Read a single post
//! wpreader show my-post-slug
//!
//! # Browse another site
//! wpreader --site https://example.com/ tui
//! ```

/// Application context and error handling.
///
/// The [`AppContext`](app::AppContext) struct wires together the site
/// settings, the post source and the normalizer.
pub mod app;

/// Command-line interface using clap.
pub mod cli;

/// Configuration loaded from `~/.config/wpreader/config.toml`.
///
/// - `[site]`: blog base URL, page size, request timeout
/// - `[colors]`: named or hex colors
/// - `[keybindings]`: key lists per action
pub mod config;

/// Core domain models.
///
/// - [`RawPost`](domain::RawPost): a post as the REST API returns it
/// - [`DisplayPost`](domain::DisplayPost): a post ready to show
/// - [`PaginationState`](domain::PaginationState): the list snapshot
pub mod domain;

pub mod feed;

/// Post sources.
///
/// - [`PostSource`](fetcher::PostSource): async trait for fetching a page
/// - [`WordPressClient`](fetcher::WordPressClient): reqwest-based implementation
pub mod fetcher;

pub mod normalizer;

/// Terminal user interface.
///
/// A post list with an inline footer row (loading, retry, load more) and a
/// scrollable detail view. Keybindings: j/k navigate, Enter opens, n loads
/// more, R refreshes, r retries, / searches, o opens in browser, q quits.
pub mod tui;
