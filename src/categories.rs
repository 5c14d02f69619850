//! Category navigation: which categories are shown, how they are named, and
//! where they link to.

use url::Url;

use crate::api::{Category, CategoryTranslation};
use crate::locale::Locale;

/// With fewer than this many categories each one is also listed inline.
const INLINE_LIMIT: usize = 4;

/// Categories worth navigating to in `locale`: non-empty and translated.
pub fn visible_categories<'a>(categories: &'a [Category], locale: &Locale) -> Vec<&'a Category> {
    categories
        .iter()
        .filter(|c| c.stories_number > 0 && has_translation(c, locale))
        .collect()
}

pub fn has_translation(category: &Category, locale: &Locale) -> bool {
    category
        .i18n
        .get(locale.code())
        .is_some_and(|t| !t.name.trim().is_empty())
}

/// Name, slug and description for `locale`, falling back to the first
/// translated locale and then to the display name.
pub fn localized(category: &Category, locale: &Locale) -> CategoryTranslation {
    if let Some(t) = category.i18n.get(locale.code()).filter(|t| !t.name.is_empty()) {
        return t.clone();
    }
    let mut codes: Vec<&String> = category.i18n.keys().collect();
    codes.sort();
    codes
        .into_iter()
        .filter_map(|code| category.i18n.get(code))
        .find(|t| !t.name.is_empty())
        .cloned()
        .unwrap_or_else(|| CategoryTranslation {
            name: category.display_name.clone(),
            slug: category.id.to_string(),
            description: category.display_description.clone(),
        })
}

/// Site-relative path of the category page.
pub fn category_path(category: &Category, locale: &Locale, default_locale: &Locale) -> String {
    let slug = localized(category, locale).slug;
    match locale.link_slug(default_locale) {
        Some(prefix) => format!("/{prefix}/category/{slug}"),
        None => format!("/category/{slug}"),
    }
}

pub fn category_url(
    newsroom_url: &str,
    category: &Category,
    locale: &Locale,
    default_locale: &Locale,
) -> Result<Url, url::ParseError> {
    Url::parse(newsroom_url)?.join(&category_path(category, locale, default_locale))
}

/// How the header lays out category navigation.
#[derive(Debug, PartialEq)]
pub struct CategoryNavigation<'a> {
    /// Listed directly in the navigation next to the dropdown.
    pub inline: Vec<&'a Category>,
    /// Dropdown contents; empty means the dropdown is not shown.
    pub dropdown: Vec<&'a Category>,
}

impl<'a> CategoryNavigation<'a> {
    pub fn layout(categories: &'a [Category], locale: &Locale) -> Self {
        let visible = visible_categories(categories, locale);
        let inline = if visible.len() < INLINE_LIMIT {
            visible.clone()
        } else {
            Vec::new()
        };
        Self {
            inline,
            dropdown: visible,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.dropdown.is_empty()
    }
}
