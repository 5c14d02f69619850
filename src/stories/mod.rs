//! Incrementally loaded story listing.
//!
//! [`InfiniteStories`] starts from a server-provided first page and appends
//! further pages on demand. A fetch is split into [`InfiniteStories::begin_load`]
//! and [`InfiniteStories::finish_load`] so that the loading flag and the mount
//! generation are checked on both sides of the await point; the
//! [`InfiniteStories::load_more`] helper composes the two.

pub mod render;

use log::{debug, warn};
use std::collections::HashSet;

use crate::api::{PaginationProps, StoriesPage, StoriesRequest, Story, StoryFilter, StorySource};
use crate::error::Result;

/// Handed out by `begin_load`; must be returned to `finish_load`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadTicket {
    pub request: StoriesRequest,
    generation: u64,
}

#[derive(Debug)]
pub struct InfiniteStories {
    stories: Vec<Story>,
    seen: HashSet<String>,
    pagination: PaginationProps,
    filter: StoryFilter,
    is_loading: bool,
    exhausted: bool,
    last_error: Option<String>,
    mounted: bool,
    generation: u64,
}

impl InfiniteStories {
    pub fn new(initial: StoriesPage, filter: StoryFilter) -> Self {
        let mut list = Self {
            stories: Vec::with_capacity(initial.stories.len()),
            seen: HashSet::new(),
            pagination: initial.pagination,
            filter,
            is_loading: false,
            exhausted: false,
            last_error: None,
            mounted: true,
            generation: 0,
        };
        list.append(initial.stories);
        list
    }

    pub fn stories(&self) -> &[Story] {
        &self.stories
    }

    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    pub fn pagination(&self) -> PaginationProps {
        self.pagination
    }

    /// Message of the most recent failed fetch, cleared by the next success.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn can_load_more(&self) -> bool {
        self.mounted && !self.exhausted && self.stories.len() < self.pagination.items_total
    }

    /// Marks the loading state and returns the next page request, or `None`
    /// when a fetch is already in flight or there is nothing left to load.
    pub fn begin_load(&mut self) -> Option<LoadTicket> {
        if self.is_loading || !self.can_load_more() {
            return None;
        }
        self.is_loading = true;
        Some(LoadTicket {
            request: StoriesRequest {
                offset: self.stories.len(),
                limit: self.pagination.page_size.max(1),
                filter: self.filter.clone(),
            },
            generation: self.generation,
        })
    }

    /// Applies the outcome of a fetch started with `begin_load`. Tickets from
    /// before an `unmount` are dropped without touching state.
    pub fn finish_load(&mut self, ticket: LoadTicket, result: Result<StoriesPage>) {
        if !self.mounted || ticket.generation != self.generation {
            debug!("dropping stale page at offset {}", ticket.request.offset);
            return;
        }
        self.is_loading = false;
        match result {
            Ok(page) => {
                self.last_error = None;
                if page.stories.is_empty() {
                    self.exhausted = true;
                }
                self.pagination.items_total = page.pagination.items_total;
                self.pagination.current_page = page.pagination.current_page;
                self.append(page.stories);
            }
            Err(err) => {
                warn!(
                    "failed to load stories at offset {}: {}",
                    ticket.request.offset, err
                );
                self.last_error = Some(err.to_string());
            }
        }
    }

    /// Fetches and appends the next page. No-op while a fetch is in flight.
    pub async fn load_more(&mut self, source: &dyn StorySource) {
        let Some(ticket) = self.begin_load() else {
            return;
        };
        let result = source.fetch_stories(&ticket.request).await;
        self.finish_load(ticket, result);
    }

    /// Discards the listing; any outstanding ticket becomes stale.
    pub fn unmount(&mut self) {
        self.mounted = false;
        self.generation += 1;
        self.is_loading = false;
        self.stories.clear();
        self.seen.clear();
    }

    fn append(&mut self, stories: Vec<Story>) {
        for story in stories {
            if self.seen.insert(story.uuid.clone()) {
                self.stories.push(story);
            } else {
                debug!("skipping repeated story {}", story.uuid);
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::api::model::StoryLinks;
    use crate::error::AppError;
    use async_trait::async_trait;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    pub(crate) fn story(n: usize) -> Story {
        Story {
            id: n as u64,
            uuid: format!("story-{n}"),
            title: format!("Story {n}"),
            subtitle: String::new(),
            slug: format!("story-{n}"),
            published_at: None,
            categories: Vec::new(),
            links: StoryLinks::default(),
            attachments: Vec::new(),
        }
    }

    pub(crate) fn page(range: std::ops::Range<usize>, total: usize, page_size: usize) -> StoriesPage {
        StoriesPage {
            pagination: PaginationProps {
                items_total: total,
                current_page: range.start / page_size + 1,
                page_size,
            },
            stories: range.map(story).collect(),
        }
    }

    /// Serves `total` numbered stories; can be switched to fail.
    struct FakeSource {
        total: usize,
        calls: AtomicUsize,
        fail: AtomicBool,
        requests: Mutex<Vec<StoriesRequest>>,
    }

    impl FakeSource {
        fn new(total: usize) -> Self {
            Self {
                total,
                calls: AtomicUsize::new(0),
                fail: AtomicBool::new(false),
                requests: Mutex::new(Vec::new()),
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl StorySource for FakeSource {
        async fn fetch_stories(&self, request: &StoriesRequest) -> Result<StoriesPage> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.requests.lock().unwrap().push(request.clone());
            if self.fail.load(Ordering::SeqCst) {
                return Err(AppError::api(503, "unavailable"));
            }
            let end = (request.offset + request.limit).min(self.total);
            Ok(page(request.offset..end, self.total, request.limit))
        }
    }

    fn ids(list: &InfiniteStories) -> Vec<String> {
        list.stories().iter().map(|s| s.uuid.clone()).collect()
    }

    #[tokio::test]
    async fn test_loads_pages_until_total() {
        let source = FakeSource::new(25);
        let mut list = InfiniteStories::new(page(0..10, 25, 10), StoryFilter::default());
        assert!(list.can_load_more());

        list.load_more(&source).await;
        assert_eq!(list.stories().len(), 20);
        assert!(list.can_load_more());
        assert!(!list.is_loading());

        list.load_more(&source).await;
        assert_eq!(list.stories().len(), 25);
        assert!(!list.can_load_more());
        assert_eq!(list.pagination().current_page, 3);

        // nothing left: no further request
        list.load_more(&source).await;
        assert_eq!(source.calls(), 2);
    }

    #[tokio::test]
    async fn test_sequence_is_concatenation_of_pages() {
        let source = FakeSource::new(8);
        let mut list = InfiniteStories::new(page(0..4, 8, 4), StoryFilter::default());
        list.load_more(&source).await;
        let expected: Vec<String> = (0..8).map(|n| format!("story-{n}")).collect();
        assert_eq!(ids(&list), expected);
    }

    #[tokio::test]
    async fn test_load_while_loading_is_noop() {
        let source = FakeSource::new(25);
        let mut list = InfiniteStories::new(page(0..10, 25, 10), StoryFilter::default());

        let ticket = list.begin_load().unwrap();
        assert!(list.is_loading());
        let before = ids(&list);

        list.load_more(&source).await;
        assert!(list.begin_load().is_none());
        assert_eq!(source.calls(), 0);
        assert_eq!(ids(&list), before);
        assert!(list.is_loading());

        let result = source.fetch_stories(&ticket.request).await;
        list.finish_load(ticket, result);
        assert_eq!(list.stories().len(), 20);
        assert!(!list.is_loading());
    }

    #[tokio::test]
    async fn test_failed_fetch_keeps_state() {
        let source = FakeSource::new(25);
        source.fail.store(true, Ordering::SeqCst);
        let mut list = InfiniteStories::new(page(0..10, 25, 10), StoryFilter::default());
        let before = ids(&list);

        list.load_more(&source).await;
        assert_eq!(ids(&list), before);
        assert!(!list.is_loading());
        assert!(list.can_load_more());
        assert!(list.last_error().is_some());

        source.fail.store(false, Ordering::SeqCst);
        list.load_more(&source).await;
        assert_eq!(list.stories().len(), 20);
        assert!(list.last_error().is_none());
    }

    #[tokio::test]
    async fn test_request_carries_category() {
        let source = FakeSource::new(25);
        let filter = StoryFilter {
            category: Some(42),
            query: None,
        };
        let mut list = InfiniteStories::new(page(0..10, 25, 10), filter);
        list.load_more(&source).await;

        let requests = source.requests.lock().unwrap();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].filter.category, Some(42));
        assert_eq!(requests[0].offset, 10);
        assert_eq!(requests[0].limit, 10);
    }

    #[tokio::test]
    async fn test_stale_ticket_after_unmount_is_ignored() {
        let source = FakeSource::new(25);
        let mut list = InfiniteStories::new(page(0..10, 25, 10), StoryFilter::default());
        let ticket = list.begin_load().unwrap();
        list.unmount();

        let result = source.fetch_stories(&ticket.request).await;
        list.finish_load(ticket, result);
        assert!(list.stories().is_empty());
        assert!(!list.can_load_more());
        assert!(list.begin_load().is_none());
    }

    #[test]
    fn test_empty_page_stops_loading() {
        let mut list = InfiniteStories::new(page(0..10, 25, 10), StoryFilter::default());
        let ticket = list.begin_load().unwrap();
        list.finish_load(ticket, Ok(page(10..10, 25, 10)));
        assert!(!list.can_load_more());
    }

    #[test]
    fn test_repeated_stories_are_skipped() {
        let mut list = InfiniteStories::new(page(0..10, 25, 10), StoryFilter::default());
        let ticket = list.begin_load().unwrap();
        list.finish_load(ticket, Ok(page(8..18, 25, 10)));
        assert_eq!(list.stories().len(), 18);
        assert_eq!(list.stories()[10].uuid, "story-10");
    }
}
