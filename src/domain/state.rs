use serde::Serialize;

use crate::domain::DisplayPost;

/// Which condition currently drives the list view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedStatus {
    Idle,
    Loading,
    Error,
    IdleWithData,
}

/// Snapshot of the paginated post list.
///
/// `page` is the next page to request. `has_more_posts` turns false once a
/// page comes back empty; callers use it to stop asking for more.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PaginationState {
    pub posts: Vec<DisplayPost>,
    pub is_loading: bool,
    pub error: Option<String>,
    pub page: u32,
    pub has_more_posts: bool,
    pub selected_post: Option<DisplayPost>,
}

impl Default for PaginationState {
    fn default() -> Self {
        Self {
            posts: Vec::new(),
            is_loading: false,
            error: None,
            page: 1,
            has_more_posts: true,
            selected_post: None,
        }
    }
}

impl PaginationState {
    pub fn status(&self) -> FeedStatus {
        if self.is_loading {
            FeedStatus::Loading
        } else if self.error.is_some() {
            FeedStatus::Error
        } else if self.posts.is_empty() {
            FeedStatus::Idle
        } else {
            FeedStatus::IdleWithData
        }
    }

    /// Error with nothing to show behind it: the full-screen error case.
    pub fn is_blocking_error(&self) -> bool {
        self.error.is_some() && self.posts.is_empty()
    }
}
