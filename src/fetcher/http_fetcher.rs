use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use url::Url;

use crate::app::{Result, WpError};
use crate::config::SiteConfig;
use crate::domain::RawPost;
use crate::fetcher::{PostSource, MAX_PER_PAGE};

const POSTS_PATH: &str = "wp-json/wp/v2/posts";

/// Code WordPress sends (with a 400) for a page past the last one.
const PAST_LAST_PAGE: &str = "rest_post_invalid_page_number";

pub struct WordPressClient {
    client: Client,
    base_url: Url,
}

#[derive(Deserialize)]
struct WpErrorBody {
    code: String,
}

impl WordPressClient {
    pub fn new(site: &SiteConfig) -> Result<Self> {
        let base_url = parse_base_url(&site.base_url)?;

        let mut builder = Client::builder()
            .gzip(true)
            .brotli(true)
            .user_agent(concat!("wpreader/", env!("CARGO_PKG_VERSION")));
        if let Some(secs) = site.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let client = builder.build()?;

        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// `<base>/wp-json/wp/v2/posts?per_page=<n>&page=<p>`
    pub fn posts_url(&self, page: u32, per_page: u32) -> Url {
        // `base_url` always ends with '/', so joining a relative path cannot fail.
        let mut url = self
            .base_url
            .join(POSTS_PATH)
            .unwrap_or_else(|_| self.base_url.clone());
        url.query_pairs_mut()
            .append_pair("per_page", &per_page.to_string())
            .append_pair("page", &page.to_string());
        url
    }
}

#[async_trait]
impl PostSource for WordPressClient {
    async fn fetch_page(&self, page: u32, per_page: u32) -> Result<Vec<RawPost>> {
        if page == 0 {
            return Err(WpError::InvalidRequest("page must be at least 1".into()));
        }
        if per_page == 0 || per_page > MAX_PER_PAGE {
            return Err(WpError::InvalidRequest(format!(
                "per_page must be between 1 and {MAX_PER_PAGE}, got {per_page}"
            )));
        }

        let url = self.posts_url(page, per_page);
        tracing::debug!("GET {}", url);

        let response = self.client.get(url).send().await?;
        let status = response.status();
        let body = response.bytes().await?;

        if status == StatusCode::BAD_REQUEST && is_past_last_page(&body) {
            tracing::debug!("Page {} is past the last page", page);
            return Ok(Vec::new());
        }

        if !status.is_success() {
            let body = String::from_utf8_lossy(&body);
            tracing::warn!("Posts request for page {} failed with {}", page, status);
            return Err(WpError::Status {
                status: status.as_u16(),
                body: body.chars().take(200).collect(),
            });
        }

        let posts: Vec<RawPost> = serde_json::from_slice(&body)?;
        Ok(posts)
    }
}

fn parse_base_url(raw: &str) -> Result<Url> {
    let trimmed = raw.trim();
    let with_slash = if trimmed.ends_with('/') {
        trimmed.to_string()
    } else {
        format!("{trimmed}/")
    };
    let url = Url::parse(&with_slash)?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(WpError::Config(format!(
            "Unsupported URL scheme '{other}' in {raw}"
        ))),
    }
}

fn is_past_last_page(body: &[u8]) -> bool {
    serde_json::from_slice::<WpErrorBody>(body)
        .map(|e| e.code == PAST_LAST_PAGE)
        .unwrap_or(false)
}
