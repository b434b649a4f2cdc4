pub mod post;
pub mod state;

pub use post::{post_url, DisplayPost, FeaturedMedia, Links, RawPost, Rendered};
pub use state::{FeedStatus, PaginationState};
