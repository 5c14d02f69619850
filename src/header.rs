//! Header state: newsroom title, search and menu toggles, navigation items.

use console::style;

use crate::api::{Category, CompanyInformation, Newsroom, NewsroomLanguage};
use crate::categories::{CategoryNavigation, localized};
use crate::languages;
use crate::locale::Locale;
use crate::util::sanitize::sanitize_for_terminal;

pub const MENU_KEY: char = 'm';
pub const SEARCH_KEY: char = 's';

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Icon {
    Menu,
    Search,
    Close,
}

impl Icon {
    fn glyph(self) -> &'static str {
        match self {
            Icon::Menu => "≡",
            Icon::Search => "⌕",
            Icon::Close => "×",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toggle {
    pub key: char,
    pub label: &'static str,
    pub icon: Icon,
    pub expanded: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum NavItem<'a> {
    MediaGallery { galleries: u32 },
    Category(&'a Category),
    CategoriesDropdown(Vec<&'a Category>),
    /// Switcher over the newsroom's languages; only present with more than one.
    Languages(Vec<&'a NewsroomLanguage>),
}

#[derive(Debug, Default)]
pub struct Header {
    search_enabled: bool,
    menu_open: bool,
    search_shown: bool,
}

impl Header {
    pub fn new(search_enabled: bool) -> Self {
        Self {
            search_enabled,
            ..Self::default()
        }
    }

    pub fn is_menu_open(&self) -> bool {
        self.menu_open
    }

    pub fn is_search_shown(&self) -> bool {
        self.search_shown
    }

    /// The story list underneath cannot be navigated while the menu is open.
    pub fn scroll_locked(&self) -> bool {
        self.is_menu_open()
    }

    /// Ignored while the search widget covers the menu toggle.
    pub fn toggle_menu(&mut self) {
        if !self.search_shown {
            self.menu_open = !self.menu_open;
        }
    }

    pub fn close_menu(&mut self) {
        self.menu_open = false;
    }

    /// Ignored when search is disabled or the menu covers the search toggle.
    pub fn toggle_search(&mut self) {
        if self.search_enabled && !self.menu_open {
            self.search_shown = !self.search_shown;
        }
    }

    pub fn close_search(&mut self) {
        self.search_shown = false;
    }

    pub fn search_toggle(&self) -> Option<Toggle> {
        if !self.search_enabled || self.menu_open {
            return None;
        }
        Some(Toggle {
            key: SEARCH_KEY,
            label: "Search",
            icon: if self.search_shown { Icon::Close } else { Icon::Search },
            expanded: self.search_shown,
        })
    }

    pub fn menu_toggle(&self) -> Option<Toggle> {
        if self.search_shown {
            return None;
        }
        Some(Toggle {
            key: MENU_KEY,
            label: "Menu",
            icon: if self.menu_open { Icon::Close } else { Icon::Menu },
            expanded: self.menu_open,
        })
    }

    /// Hotkeys currently reachable from the header.
    pub fn hotkeys(&self) -> Vec<char> {
        self.search_toggle()
            .into_iter()
            .chain(self.menu_toggle())
            .map(|t| t.key)
            .collect()
    }

    pub fn render(&self, newsroom: &Newsroom, company: &CompanyInformation) -> String {
        let mut line = String::new();
        if newsroom.newsroom_logo.is_some() {
            line.push_str("▣ ");
        }
        line.push_str(&style(newsroom_name(newsroom, company)).bold().to_string());
        for toggle in self.search_toggle().into_iter().chain(self.menu_toggle()) {
            let label = if toggle.expanded {
                style(toggle.label).underlined().to_string()
            } else {
                toggle.label.to_string()
            };
            line.push_str(&format!("   [{}] {} {}", toggle.key, toggle.icon.glyph(), label));
        }
        line
    }
}

/// Company name when set, otherwise the newsroom's display name.
pub fn newsroom_name(newsroom: &Newsroom, company: &CompanyInformation) -> String {
    let name = if company.name.trim().is_empty() {
        &newsroom.display_name
    } else {
        &company.name
    };
    sanitize_for_terminal(name)
}

pub fn navigation<'a>(
    newsroom: &Newsroom,
    categories: &'a [Category],
    langs: &'a [NewsroomLanguage],
    locale: &Locale,
) -> Vec<NavItem<'a>> {
    let mut items = Vec::new();
    if newsroom.public_galleries_number > 0 {
        items.push(NavItem::MediaGallery {
            galleries: newsroom.public_galleries_number,
        });
    }
    let nav = CategoryNavigation::layout(categories, locale);
    if !nav.is_empty() {
        items.extend(nav.inline.into_iter().map(NavItem::Category));
        items.push(NavItem::CategoriesDropdown(nav.dropdown));
    }
    if languages::has_choice(langs) {
        items.push(NavItem::Languages(languages::visible_languages(langs)));
    }
    items
}

pub fn nav_label(item: &NavItem<'_>, locale: &Locale) -> String {
    match item {
        NavItem::MediaGallery { galleries } => format!("Media gallery ({galleries})"),
        NavItem::Category(c) => sanitize_for_terminal(&localized(c, locale).name),
        NavItem::CategoriesDropdown(cats) => format!("Categories ▾ ({})", cats.len()),
        NavItem::Languages(langs) => {
            let current = langs
                .iter()
                .find(|l| &languages::locale_of(l) == locale)
                .map(|l| languages::display_name(l))
                .unwrap_or_else(|| locale.code().to_string());
            format!("Language: {current} ▾")
        }
    }
}
