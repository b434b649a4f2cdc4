//! Paginated post list shared between the loader and its observers.
//!
//! [`PostFeed`] owns a [`watch`] channel of [`PaginationState`]. Every change
//! replaces the whole snapshot under the channel's lock, so observers never
//! see a half-applied update.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::sync::watch;

use crate::domain::{DisplayPost, PaginationState};
use crate::fetcher::PostSource;
use crate::normalizer::Normalizer;

#[derive(Clone)]
pub struct PostFeed {
    inner: Arc<Inner>,
}

struct Inner {
    source: Arc<dyn PostSource + Send + Sync>,
    normalizer: Normalizer,
    per_page: u32,
    state: watch::Sender<PaginationState>,
    /// Bumped by `refresh`; a load started under an older epoch is stale.
    epoch: AtomicU64,
}

impl PostFeed {
    pub fn new(
        source: Arc<dyn PostSource + Send + Sync>,
        normalizer: Normalizer,
        per_page: u32,
    ) -> Self {
        let (state, _) = watch::channel(PaginationState::default());
        Self {
            inner: Arc::new(Inner {
                source,
                normalizer,
                per_page,
                state,
                epoch: AtomicU64::new(0),
            }),
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<PaginationState> {
        self.inner.state.subscribe()
    }

    pub fn snapshot(&self) -> PaginationState {
        self.inner.state.borrow().clone()
    }

    pub fn per_page(&self) -> u32 {
        self.inner.per_page
    }

    /// Request the next page. Does nothing while a load is in flight.
    pub async fn load_next(&self) {
        while let Some((page, epoch)) = self.begin_load() {
            let result = self
                .inner
                .source
                .fetch_page(page, self.inner.per_page)
                .await
                .map(|raw| self.inner.normalizer.normalize(raw));

            if self.finish_load(page, epoch, result) {
                return;
            }
            // A refresh landed while this page was in flight; go again from page 1.
            tracing::debug!("Discarded stale response for page {}", page);
        }
    }

    /// Start over from page 1.
    pub async fn refresh(&self) {
        self.restart();
        self.load_next().await;
    }

    /// Clear the error and ask for the same page again.
    pub async fn retry(&self) {
        self.update(|state| PaginationState {
            error: None,
            ..state.clone()
        });
        self.load_next().await;
    }

    pub fn select(&self, post: DisplayPost) {
        self.update(|state| PaginationState {
            selected_post: Some(post),
            ..state.clone()
        });
    }

    pub fn clear(&self) {
        self.update(|state| PaginationState {
            selected_post: None,
            ..state.clone()
        });
    }

    fn update(&self, f: impl FnOnce(&PaginationState) -> PaginationState) {
        self.inner.state.send_modify(|state| *state = f(state));
    }

    /// Flip the loading flag if nobody holds it. Returns the page to fetch.
    fn begin_load(&self) -> Option<(u32, u64)> {
        let mut claimed = None;
        self.inner.state.send_if_modified(|state| {
            if state.is_loading {
                return false;
            }
            let epoch = self.inner.epoch.load(Ordering::SeqCst);
            claimed = Some((state.page, epoch));
            *state = PaginationState {
                is_loading: true,
                ..state.clone()
            };
            true
        });
        claimed
    }

    /// Reset to page 1 and invalidate any load in flight. The epoch only
    /// changes under the channel lock, so a claim is either made before the
    /// reset (and is stale) or after it (and fetches page 1).
    fn restart(&self) {
        self.inner.state.send_modify(|state| {
            self.inner.epoch.fetch_add(1, Ordering::SeqCst);
            *state = PaginationState {
                page: 1,
                posts: Vec::new(),
                ..state.clone()
            };
        });
    }

    /// Apply a finished load. Returns false when the response was stale and
    /// has been dropped.
    fn finish_load(
        &self,
        page: u32,
        epoch: u64,
        result: crate::app::Result<Vec<DisplayPost>>,
    ) -> bool {
        let outcome = result.as_ref().map(Vec::len).map_err(ToString::to_string);
        let mut applied = false;

        self.inner.state.send_modify(|state| {
            if self.inner.epoch.load(Ordering::SeqCst) != epoch {
                *state = PaginationState {
                    is_loading: false,
                    ..state.clone()
                };
                return;
            }
            applied = true;

            *state = match result {
                Ok(posts) => {
                    let has_more_posts = !posts.is_empty();
                    let posts = if page == 1 {
                        posts
                    } else {
                        let mut all = state.posts.clone();
                        all.extend(posts);
                        all
                    };
                    PaginationState {
                        posts,
                        is_loading: false,
                        error: None,
                        page: page + 1,
                        has_more_posts,
                        ..state.clone()
                    }
                }
                Err(e) => PaginationState {
                    is_loading: false,
                    error: Some(e.to_string()),
                    ..state.clone()
                },
            };
        });

        if applied {
            match outcome {
                Ok(count) => tracing::info!("Loaded {} posts from page {}", count, page),
                Err(e) => tracing::warn!("Failed to load page {}: {}", page, e),
            }
        }
        applied
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::sync::Mutex;

    use async_trait::async_trait;
    use tokio::sync::Notify;

    use super::*;
    use crate::app::{Result, WpError};
    use crate::domain::{FeedStatus, Links, RawPost, Rendered};

    fn raw(id: u64) -> RawPost {
        RawPost {
            id,
            date: "2024-03-01T10:15:00".into(),
            title: Rendered {
                rendered: format!("Post {id}"),
            },
            excerpt: Rendered {
                rendered: format!("<p>Excerpt {id}</p>"),
            },
            content: Rendered::default(),
            slug: format!("post-{id}"),
            links: Links::default(),
            featured_media: 0,
        }
    }

    fn page_of(ids: std::ops::RangeInclusive<u64>) -> Result<Vec<RawPost>> {
        Ok(ids.map(raw).collect())
    }

    /// Replays scripted responses and records which pages were requested.
    #[derive(Default)]
    struct ScriptedSource {
        responses: Mutex<VecDeque<Result<Vec<RawPost>>>>,
        requested: Mutex<Vec<u32>>,
        gate: Option<Arc<Notify>>,
    }

    impl ScriptedSource {
        fn new(responses: Vec<Result<Vec<RawPost>>>) -> Self {
            Self {
                responses: Mutex::new(responses.into()),
                ..Default::default()
            }
        }

        fn gated(responses: Vec<Result<Vec<RawPost>>>, gate: Arc<Notify>) -> Self {
            Self {
                gate: Some(gate),
                ..Self::new(responses)
            }
        }

        fn requested(&self) -> Vec<u32> {
            self.requested.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl PostSource for ScriptedSource {
        async fn fetch_page(&self, page: u32, _per_page: u32) -> Result<Vec<RawPost>> {
            self.requested.lock().unwrap().push(page);
            if let Some(gate) = &self.gate {
                gate.notified().await;
            }
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Ok(Vec::new()))
        }
    }

    fn feed(source: Arc<ScriptedSource>) -> PostFeed {
        PostFeed::new(source, Normalizer::new(), 3)
    }

    fn ids(state: &PaginationState) -> Vec<u64> {
        state.posts.iter().map(|p| p.id).collect()
    }

    #[tokio::test]
    async fn test_load_next_appends_and_advances_page() {
        let source = Arc::new(ScriptedSource::new(vec![page_of(1..=3), page_of(4..=5)]));
        let feed = feed(source.clone());

        feed.load_next().await;
        let first = feed.snapshot();
        assert_eq!(ids(&first), vec![1, 2, 3]);
        assert_eq!(first.page, 2);
        assert!(first.has_more_posts);
        assert!(!first.is_loading);
        assert_eq!(first.posts[0].excerpt, "Excerpt 1");

        feed.load_next().await;
        let second = feed.snapshot();
        assert_eq!(second.posts.len(), first.posts.len() + 2);
        assert_eq!(ids(&second), vec![1, 2, 3, 4, 5]);
        assert_eq!(second.page, 3);
        assert_eq!(source.requested(), vec![1, 2]);
    }

    #[tokio::test]
    async fn test_empty_page_ends_the_list() {
        let source = Arc::new(ScriptedSource::new(vec![page_of(1..=3), Ok(Vec::new())]));
        let feed = feed(source);

        feed.load_next().await;
        feed.load_next().await;
        let state = feed.snapshot();
        assert_eq!(ids(&state), vec![1, 2, 3]);
        assert!(!state.has_more_posts);
        assert_eq!(state.status(), FeedStatus::IdleWithData);
    }

    #[tokio::test]
    async fn test_load_next_is_not_refused_after_exhaustion() {
        let source = Arc::new(ScriptedSource::new(vec![Ok(Vec::new()), page_of(1..=1)]));
        let feed = feed(source.clone());

        feed.load_next().await;
        assert!(!feed.snapshot().has_more_posts);

        feed.load_next().await;
        assert_eq!(source.requested(), vec![1, 2]);
        assert!(feed.snapshot().has_more_posts);
    }

    #[tokio::test]
    async fn test_refresh_matches_fresh_load() {
        let source = Arc::new(ScriptedSource::new(vec![
            page_of(1..=3),
            page_of(4..=6),
            page_of(7..=9),
        ]));
        let feed = feed(source.clone());
        feed.load_next().await;
        feed.load_next().await;

        feed.refresh().await;

        let fresh = Arc::new(ScriptedSource::new(vec![page_of(7..=9)]));
        let reference = super::PostFeed::new(fresh, Normalizer::new(), 3);
        reference.load_next().await;

        assert_eq!(feed.snapshot(), reference.snapshot());
        assert_eq!(source.requested(), vec![1, 2, 1]);
    }

    #[tokio::test]
    async fn test_failure_keeps_list_and_retry_repeats_page() {
        let source = Arc::new(ScriptedSource::new(vec![
            Err(WpError::Other("connection reset".into())),
            page_of(1..=2),
        ]));
        let feed = feed(source.clone());

        feed.load_next().await;
        let failed = feed.snapshot();
        assert_eq!(failed.error.as_deref(), Some("connection reset"));
        assert!(failed.posts.is_empty());
        assert_eq!(failed.page, 1);
        assert!(failed.is_blocking_error());

        feed.retry().await;
        let recovered = feed.snapshot();
        assert!(recovered.error.is_none());
        assert_eq!(ids(&recovered), vec![1, 2]);
        assert_eq!(source.requested(), vec![1, 1]);
    }

    #[tokio::test]
    async fn test_failure_on_later_page_keeps_earlier_posts() {
        let source = Arc::new(ScriptedSource::new(vec![
            page_of(1..=3),
            Err(WpError::Status {
                status: 500,
                body: "oops".into(),
            }),
        ]));
        let feed = feed(source);

        feed.load_next().await;
        feed.load_next().await;
        let state = feed.snapshot();
        assert_eq!(ids(&state), vec![1, 2, 3]);
        assert_eq!(state.page, 2);
        assert_eq!(state.error.as_deref(), Some("Server returned 500: oops"));
        assert!(!state.is_blocking_error());
    }

    #[tokio::test]
    async fn test_load_next_while_loading_is_a_no_op() {
        let gate = Arc::new(Notify::new());
        let source = Arc::new(ScriptedSource::gated(vec![page_of(1..=3)], gate.clone()));
        let feed = feed(source.clone());

        let mut rx = feed.subscribe();
        let background = tokio::spawn({
            let feed = feed.clone();
            async move { feed.load_next().await }
        });
        rx.wait_for(|state| state.is_loading).await.unwrap();

        let before = feed.snapshot();
        feed.load_next().await;
        assert_eq!(feed.snapshot(), before);

        gate.notify_one();
        background.await.unwrap();

        assert_eq!(source.requested(), vec![1]);
        assert_eq!(ids(&feed.snapshot()), vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_refresh_during_load_discards_late_response() {
        let gate = Arc::new(Notify::new());
        let source = Arc::new(ScriptedSource::gated(
            vec![page_of(1..=3), page_of(4..=6), page_of(7..=9)],
            gate.clone(),
        ));
        let feed = feed(source.clone());

        gate.notify_one();
        feed.load_next().await;
        let mut rx = feed.subscribe();
        let second_page = tokio::spawn({
            let feed = feed.clone();
            async move { feed.load_next().await }
        });
        rx.wait_for(|state| state.is_loading).await.unwrap();

        // The in-flight load owns the flag, so this only resets the list.
        feed.refresh().await;
        assert!(feed.snapshot().posts.is_empty());

        // Release the stale page 2, then leave a permit for the page 1 re-request.
        gate.notify_one();
        gate.notify_one();
        second_page.await.unwrap();

        let state = feed.snapshot();
        assert_eq!(source.requested(), vec![1, 2, 1]);
        assert_eq!(ids(&state), vec![7, 8, 9]);
        assert_eq!(state.page, 2);
        assert!(!state.is_loading);
    }

    #[tokio::test]
    async fn test_claim_after_restart_always_fetches_page_one() {
        let source = Arc::new(ScriptedSource::new(vec![page_of(1..=3)]));
        let feed = feed(source);
        feed.load_next().await;

        // Page 2 is claimed, then the list restarts before its response lands.
        let (page, epoch) = feed.begin_load().unwrap();
        assert_eq!(page, 2);
        feed.restart();
        assert_eq!(feed.begin_load(), None);

        let late = feed.inner.normalizer.normalize(vec![raw(4), raw(5)]);
        assert!(!feed.finish_load(page, epoch, Ok(late)));

        let state = feed.snapshot();
        assert!(state.posts.is_empty());
        assert_eq!(state.page, 1);
        assert!(!state.is_loading);

        let (page, fresh_epoch) = feed.begin_load().unwrap();
        assert_eq!(page, 1);
        assert_ne!(fresh_epoch, epoch);

        let first = feed.inner.normalizer.normalize(vec![raw(1)]);
        assert!(feed.finish_load(page, fresh_epoch, Ok(first)));
        assert_eq!(ids(&feed.snapshot()), vec![1]);
        assert_eq!(feed.snapshot().page, 2);
    }

    #[tokio::test]
    async fn test_select_and_clear() {
        let source = Arc::new(ScriptedSource::new(vec![page_of(1..=2)]));
        let feed = feed(source.clone());
        feed.load_next().await;

        let post = feed.snapshot().posts[1].clone();
        feed.select(post.clone());
        assert_eq!(feed.snapshot().selected_post, Some(post));

        feed.clear();
        assert_eq!(feed.snapshot().selected_post, None);
        assert_eq!(source.requested(), vec![1]);
    }

    #[tokio::test]
    async fn test_observers_see_loading_then_result() {
        let gate = Arc::new(Notify::new());
        let source = Arc::new(ScriptedSource::gated(vec![page_of(1..=1)], gate.clone()));
        let feed = feed(source);
        let mut rx = feed.subscribe();

        let task = tokio::spawn({
            let feed = feed.clone();
            async move { feed.load_next().await }
        });
        let loading = rx.wait_for(|s| s.is_loading).await.unwrap().clone();
        assert_eq!(loading.status(), FeedStatus::Loading);

        gate.notify_one();
        task.await.unwrap();
        let done = rx.borrow_and_update().clone();
        assert_eq!(done.status(), FeedStatus::IdleWithData);
    }
}
