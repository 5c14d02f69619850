use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use time::OffsetDateTime;

pub type CategoryId = u64;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Story {
    pub id: u64,
    pub uuid: String,
    pub title: String,
    #[serde(default)]
    pub subtitle: String,
    #[serde(default)]
    pub slug: String,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub published_at: Option<OffsetDateTime>,
    #[serde(default)]
    pub categories: Vec<CategoryRef>,
    #[serde(default)]
    pub links: StoryLinks,
    #[serde(default)]
    pub attachments: Vec<StoryAttachment>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CategoryRef {
    pub id: CategoryId,
    pub display_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct StoryLinks {
    pub newsroom_view: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StoryAttachment {
    #[serde(default)]
    pub description: String,
    pub file: StoredFile,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StoredFile {
    pub uuid: String,
    pub filename: String,
    pub size: u64,
    #[serde(default)]
    pub mime_type: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct CategoryTranslation {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub slug: String,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Category {
    pub id: CategoryId,
    pub display_name: String,
    #[serde(default)]
    pub display_description: Option<String>,
    #[serde(default)]
    pub stories_number: u32,
    /// Keyed by underscore locale code (`en`, `nl_BE`).
    #[serde(default)]
    pub i18n: HashMap<String, CategoryTranslation>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Newsroom {
    pub uuid: String,
    pub display_name: String,
    pub url: String,
    #[serde(default)]
    pub newsroom_logo: Option<StoredFile>,
    #[serde(default)]
    pub public_galleries_number: u32,
}

/// A language the newsroom publishes in.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewsroomLanguage {
    /// Underscore locale code, e.g. `nl_BE`.
    pub code: String,
    #[serde(default)]
    pub is_default: bool,
    #[serde(default)]
    pub public_stories_count: u32,
    #[serde(default)]
    pub locale: LanguageLocale,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct LanguageLocale {
    #[serde(default)]
    pub native_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct CompanyInformation {
    #[serde(default)]
    pub name: String,
}

/// Page boundary of a paginated story listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaginationProps {
    pub items_total: usize,
    /// 1-based.
    pub current_page: usize,
    pub page_size: usize,
}

impl PaginationProps {
    pub fn page_count(&self) -> usize {
        if self.page_size == 0 {
            return 0;
        }
        self.items_total.div_ceil(self.page_size)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct StoriesPage {
    pub stories: Vec<Story>,
    pub pagination: PaginationProps,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_story_deserializes_with_missing_optionals() {
        let story: Story = serde_json::from_str(
            r#"{"id": 7, "uuid": "abc", "title": "Launch", "published_at": "2024-03-01T09:30:00Z"}"#,
        )
        .unwrap();
        assert_eq!(story.uuid, "abc");
        assert!(story.categories.is_empty());
        assert!(story.links.newsroom_view.is_none());
        assert_eq!(story.published_at.map(|d| d.year()), Some(2024));
    }

    #[test]
    fn test_category_i18n() {
        let category: Category = serde_json::from_str(
            r#"{"id": 1, "display_name": "Press", "stories_number": 3,
                "i18n": {"en": {"name": "Press", "slug": "press"}}}"#,
        )
        .unwrap();
        assert_eq!(category.i18n["en"].slug, "press");
    }

    #[test]
    fn test_page_count_rounds_up() {
        let p = PaginationProps {
            items_total: 25,
            current_page: 1,
            page_size: 10,
        };
        assert_eq!(p.page_count(), 3);
    }
}
