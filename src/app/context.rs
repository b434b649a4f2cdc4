use std::sync::Arc;

use crate::app::error::{Result, WpError};
use crate::config::SiteConfig;
use crate::feed::PostFeed;
use crate::fetcher::{PostSource, WordPressClient};
use crate::normalizer::Normalizer;

pub struct AppContext {
    pub site: SiteConfig,
    pub source: Arc<dyn PostSource + Send + Sync>,
    pub normalizer: Normalizer,
}

impl AppContext {
    pub fn new(site: SiteConfig) -> Result<Self> {
        site.validate().map_err(WpError::Config)?;
        let source: Arc<dyn PostSource + Send + Sync> = Arc::new(WordPressClient::new(&site)?);
        Ok(Self::with_source(site, source))
    }

    /// Build a context around any post source.
    pub fn with_source(site: SiteConfig, source: Arc<dyn PostSource + Send + Sync>) -> Self {
        Self {
            site,
            source,
            normalizer: Normalizer::new(),
        }
    }

    /// A fresh pagination container starting at page 1.
    pub fn feed(&self) -> PostFeed {
        PostFeed::new(
            self.source.clone(),
            self.normalizer.clone(),
            self.site.per_page,
        )
    }
}
