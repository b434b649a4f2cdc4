//! Which WordPress site to read and how to page through it.

use serde::Deserialize;

use crate::fetcher::{DEFAULT_PER_PAGE, MAX_PER_PAGE};

pub const DEFAULT_BASE_URL: &str = "https://savebucks.us/";

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct SiteConfig {
    pub base_url: String,
    pub per_page: u32,
    /// Request timeout. `None` keeps the HTTP client's default.
    pub timeout_secs: Option<u64>,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            per_page: DEFAULT_PER_PAGE,
            timeout_secs: None,
        }
    }
}

impl SiteConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.per_page == 0 || self.per_page > MAX_PER_PAGE {
            return Err(format!(
                "site.per_page must be between 1 and {}, got {}",
                MAX_PER_PAGE, self.per_page
            ));
        }
        url::Url::parse(self.base_url.trim())
            .map_err(|e| format!("site.base_url '{}' is invalid: {}", self.base_url, e))?;
        if self.timeout_secs == Some(0) {
            return Err("site.timeout_secs must be greater than 0".to_string());
        }
        Ok(())
    }
}
