//! Content API: data model, the paginated story source seam, and the HTTP client.

mod client;
pub mod model;

use async_trait::async_trait;

use crate::error::Result;

pub use client::ContentApi;
pub use model::{
    Category, CategoryId, CategoryTranslation, CompanyInformation, Newsroom, NewsroomLanguage,
    PaginationProps, StoredFile, StoriesPage, Story, StoryAttachment,
};

/// Optional scoping applied to every page of a listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoryFilter {
    pub category: Option<CategoryId>,
    pub query: Option<String>,
}

/// One page request against a [`StorySource`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoriesRequest {
    /// Number of stories already loaded.
    pub offset: usize,
    pub limit: usize,
    pub filter: StoryFilter,
}

/// Paginated provider of stories.
#[async_trait]
pub trait StorySource: Send + Sync {
    async fn fetch_stories(&self, request: &StoriesRequest) -> Result<StoriesPage>;
}
