pub mod http_fetcher;

use async_trait::async_trait;

use crate::app::Result;
use crate::domain::RawPost;

pub use http_fetcher::WordPressClient;

/// WordPress caps `per_page` at 100.
pub const MAX_PER_PAGE: u32 = 100;
pub const DEFAULT_PER_PAGE: u32 = 20;

/// One page of posts per call. `page` starts at 1.
#[async_trait]
pub trait PostSource {
    async fn fetch_page(&self, page: u32, per_page: u32) -> Result<Vec<RawPost>>;
}
