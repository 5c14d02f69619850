//! Screen flow: the home listing, category and search listings, story details
//! and the header navigation, driven as a stack of screens.

use anyhow::{Context, Result, anyhow};
use console::{Term, style};
use dialoguer::{Confirm, Input};
use log::{debug, info, warn};
use url::Url;

use crate::api::{
    Category, CategoryId, CompanyInformation, ContentApi, Newsroom, NewsroomLanguage,
    StoriesRequest, Story, StoryFilter, StorySource,
};
use crate::attachment::AttachmentView;
use crate::categories::{self, localized};
use crate::config::RuntimeConfig;
use crate::header::{self, Header, MENU_KEY, NavItem, SEARCH_KEY};
use crate::history::SeenStories;
use crate::languages;
use crate::locale::Locale;
use crate::open_url::open_url;
use crate::stories::InfiniteStories;
use crate::stories::render::{ListAction, ListEntry, ListOptions, render_list};
use crate::tracking::TrackingPolicy;
use crate::ui::{Menu, MenuChoice, MenuEntry};
use crate::util::sanitize::sanitize_for_terminal;

struct Listing {
    title: String,
    stories: InfiniteStories,
    opts: ListOptions,
}

enum Screen {
    Listing(Listing),
    Story(Box<Story>),
    CategoryDropdown,
    LanguageDropdown,
}

enum Step {
    Stay,
    Push(Screen),
    Pop,
    /// Leave every screen and start over from the given one.
    Reset(Screen),
    Quit,
}

#[derive(Debug, Clone, Copy)]
enum NavTarget {
    MediaGallery,
    Category(CategoryId),
    Categories,
    Languages,
}

impl From<&NavItem<'_>> for NavTarget {
    fn from(item: &NavItem<'_>) -> Self {
        match item {
            NavItem::MediaGallery { .. } => Self::MediaGallery,
            NavItem::Category(c) => Self::Category(c.id),
            NavItem::CategoriesDropdown(_) => Self::Categories,
            NavItem::Languages(_) => Self::Languages,
        }
    }
}

enum StoryAction {
    Open(String),
    Category(u64),
}

struct App<'a> {
    cfg: &'a RuntimeConfig,
    api: ContentApi,
    newsroom: Newsroom,
    company: CompanyInformation,
    categories: Vec<Category>,
    languages: Vec<NewsroomLanguage>,
    header: Header,
    history: SeenStories,
    persist_history: bool,
    /// Shown once on the next screen, then cleared.
    notice: Option<String>,
}

pub async fn run(cfg: &RuntimeConfig, start_category: Option<&str>) -> Result<()> {
    let api = ContentApi::new(cfg).context("failed to set up the content API client")?;
    let first_request = StoriesRequest {
        offset: 0,
        limit: cfg.page_size,
        filter: StoryFilter::default(),
    };

    let (newsroom, company, categories, langs, first_page) = futures_util::join!(
        api.newsroom(),
        api.company_information(),
        api.categories(),
        api.languages(),
        api.fetch_stories(&first_request),
    );
    let newsroom = newsroom.context("failed to load newsroom")?;
    let first_page = first_page.context("failed to load stories")?;
    let company = company.unwrap_or_else(|err| {
        warn!("company information unavailable: {}", err);
        CompanyInformation::default()
    });
    let categories = categories.unwrap_or_else(|err| {
        warn!("categories unavailable: {}", err);
        Vec::new()
    });
    let langs = langs.unwrap_or_else(|err| {
        warn!("languages unavailable: {}", err);
        Vec::new()
    });
    info!(
        "loaded newsroom {} ({}) with {} categories",
        newsroom.uuid,
        cfg.locale,
        categories.len()
    );

    let policy = match api.fetch_page(&newsroom.url).await {
        Ok(html) => TrackingPolicy::from_html(&html),
        Err(err) => {
            debug!("tracking policy lookup failed: {}", err);
            TrackingPolicy::default()
        }
    };
    let consent = match cfg.tracking_consent {
        Some(answer) => Some(answer),
        None if policy.requires_consent() => Some(
            Confirm::new()
                .with_prompt("Remember which stories you have read on this device?")
                .default(false)
                .interact()?,
        ),
        None => None,
    };
    let persist_history = policy.allows_tracking(consent);
    let history = if persist_history {
        SeenStories::load()
    } else {
        SeenStories::default()
    };

    let mut app = App {
        cfg,
        api,
        newsroom,
        company,
        categories,
        languages: langs,
        header: Header::new(cfg.search_enabled),
        history,
        persist_history,
        notice: None,
    };

    let home = Listing {
        title: "Latest stories".into(),
        stories: InfiniteStories::new(first_page, StoryFilter::default()),
        opts: ListOptions {
            is_category_list: false,
        },
    };
    let mut stack = vec![Screen::Listing(home)];
    if let Some(slug) = start_category {
        let opened = match app.find_category(slug) {
            Some(id) => app.open_category(id).await,
            None => Err(anyhow!("no category with slug {slug}")),
        };
        if let Step::Push(screen) = app.push_or_report(opened) {
            stack.push(screen);
        }
    }

    app.drive(stack).await?;

    if app.persist_history {
        if let Err(e) = app.history.save() {
            eprintln!("Failed to save history: {}", e);
        }
    }
    Ok(())
}

impl App<'_> {
    async fn drive(&mut self, mut stack: Vec<Screen>) -> Result<()> {
        while let Some(screen) = stack.last_mut() {
            let step = match screen {
                Screen::Listing(listing) => self.listing_step(listing).await?,
                Screen::Story(story) => self.story_step(story)?,
                Screen::CategoryDropdown => self.dropdown_step().await?,
                Screen::LanguageDropdown => self.language_step().await?,
            };
            match step {
                Step::Stay => {}
                Step::Push(next) => stack.push(next),
                Step::Pop => {
                    if let Some(screen) = stack.pop() {
                        self.leave(screen);
                    }
                }
                Step::Reset(first) => {
                    while let Some(screen) = stack.pop() {
                        self.leave(screen);
                    }
                    stack.push(first);
                }
                Step::Quit => {
                    while let Some(screen) = stack.pop() {
                        self.leave(screen);
                    }
                }
            }
        }
        Ok(())
    }

    fn leave(&mut self, screen: Screen) {
        if let Screen::Listing(mut listing) = screen {
            for story in listing.stories.stories() {
                self.history.mark_as_seen(&story.uuid);
            }
            listing.stories.unmount();
        }
    }

    fn header_text(&self) -> String {
        let line = self.header.render(&self.newsroom, &self.company);
        match self.cfg.header.as_deref() {
            Some(banner) => format!("{}\n{}", banner, line),
            None => line,
        }
    }

    async fn listing_step(&mut self, listing: &mut Listing) -> Result<Step> {
        if self.header.scroll_locked() {
            return self.navigation_step().await;
        }

        let notice = self.notice.take();
        let rows = render_list(&listing.stories, &listing.opts, |s| {
            !self.history.is_seen(&s.uuid)
        });
        let entries = menu_entries(&rows);
        let hotkeys = self.header.hotkeys();
        let header = self.header_text();
        let pagination = listing.stories.pagination();
        let prompt = format!(
            "{} ({} of {}, page {} of {})",
            listing.title,
            listing.stories.stories().len(),
            pagination.items_total,
            pagination.current_page,
            pagination.page_count().max(1)
        );
        let choice = Menu {
            header: Some(&header),
            notice: notice.as_deref(),
            prompt: &prompt,
            entries: &entries,
            hotkeys: &hotkeys,
            default: None,
        }
        .show()?;

        match choice {
            MenuChoice::Back => Ok(Step::Pop),
            MenuChoice::Quit => Ok(Step::Quit),
            MenuChoice::Index(i) => match rows.get(i).map(|r| r.action) {
                Some(ListAction::Story(idx)) => Ok(listing
                    .stories
                    .stories()
                    .get(idx)
                    .map(|s| Step::Push(Screen::Story(Box::new(s.clone()))))
                    .unwrap_or(Step::Stay)),
                Some(ListAction::LoadMore) => {
                    self.load_more(listing).await;
                    Ok(Step::Stay)
                }
                _ => Ok(Step::Stay),
            },
            MenuChoice::Key(MENU_KEY) => {
                self.header.toggle_menu();
                Ok(Step::Stay)
            }
            MenuChoice::Key(SEARCH_KEY) => self.search_step().await,
            MenuChoice::Key(_) => Ok(Step::Stay),
        }
    }

    /// Keeps the listing on screen with a loading line while the next page is fetched.
    async fn load_more(&self, listing: &mut Listing) {
        if listing.stories.is_loading() || !listing.stories.can_load_more() {
            return;
        }
        let _ = Term::stdout().clear_screen();
        println!("{}", self.header_text());
        println!("{}", listing.title);
        println!("  {}", style("Loading...").dim());
        listing.stories.load_more(&self.api).await;
    }

    async fn search_step(&mut self) -> Result<Step> {
        self.header.toggle_search();
        if !self.header.is_search_shown() {
            return Ok(Step::Stay);
        }
        let query: String = Input::new()
            .with_prompt("Search stories")
            .allow_empty(true)
            .interact_text()?;
        self.header.close_search();
        let query = query.trim();
        if query.is_empty() {
            return Ok(Step::Stay);
        }
        let filter = StoryFilter {
            category: None,
            query: Some(query.to_string()),
        };
        let title = format!("Search results for \"{}\"", sanitize_for_terminal(query));
        let opened = self.open_listing(title, filter, false).await;
        Ok(self.push_or_report(opened))
    }

    async fn navigation_step(&mut self) -> Result<Step> {
        let notice = self.notice.take();
        let header = self.header_text();
        let locale = self.api.locale();
        let items = header::navigation(&self.newsroom, &self.categories, &self.languages, locale);
        let targets: Vec<NavTarget> = items.iter().map(NavTarget::from).collect();
        let mut entries: Vec<MenuEntry> = items
            .iter()
            .map(|item| MenuEntry::item(header::nav_label(item, locale)))
            .collect();
        if entries.is_empty() {
            entries.push(MenuEntry::disabled("(nothing to navigate to)"));
        }
        let choice = Menu {
            header: Some(&header),
            notice: notice.as_deref(),
            prompt: "Menu",
            entries: &entries,
            hotkeys: &[MENU_KEY],
            default: None,
        }
        .show()?;

        let target = match choice {
            MenuChoice::Quit => return Ok(Step::Quit),
            MenuChoice::Back | MenuChoice::Key(_) => {
                self.header.close_menu();
                return Ok(Step::Stay);
            }
            MenuChoice::Index(i) => targets.get(i).copied(),
        };
        let step = match target {
            Some(NavTarget::MediaGallery) => {
                match self.site_url("media") {
                    Ok(url) => self.open(url.as_str()),
                    Err(err) => self.report(anyhow!(err).context("bad newsroom url")),
                }
                Step::Stay
            }
            Some(NavTarget::Category(id)) => {
                self.header.close_menu();
                let opened = self.open_category(id).await;
                self.push_or_report(opened)
            }
            Some(NavTarget::Categories) => {
                self.header.close_menu();
                Step::Push(Screen::CategoryDropdown)
            }
            Some(NavTarget::Languages) => {
                self.header.close_menu();
                Step::Push(Screen::LanguageDropdown)
            }
            None => Step::Stay,
        };
        Ok(step)
    }

    async fn dropdown_step(&mut self) -> Result<Step> {
        let notice = self.notice.take();
        let header = self.header_text();
        let locale = self.api.locale();
        let visible = categories::visible_categories(&self.categories, locale);
        let ids: Vec<CategoryId> = visible.iter().map(|c| c.id).collect();
        let entries: Vec<MenuEntry> = visible
            .iter()
            .map(|c| {
                let t = localized(c, locale);
                let mut label = sanitize_for_terminal(&t.name);
                if let Some(desc) = t.description.as_deref().filter(|d| !d.trim().is_empty()) {
                    label.push_str(&format!(" {}", style(sanitize_for_terminal(desc)).dim()));
                }
                MenuEntry::item(label)
            })
            .collect();
        let choice = Menu {
            header: Some(&header),
            notice: notice.as_deref(),
            prompt: "Categories",
            entries: &entries,
            hotkeys: &[],
            default: None,
        }
        .show()?;
        match choice {
            MenuChoice::Quit => Ok(Step::Quit),
            MenuChoice::Index(i) => match ids.get(i).copied() {
                Some(id) => {
                    let opened = self.open_category(id).await;
                    Ok(self.push_or_report(opened))
                }
                None => Ok(Step::Stay),
            },
            _ => Ok(Step::Pop),
        }
    }

    async fn language_step(&mut self) -> Result<Step> {
        let notice = self.notice.take();
        let header = self.header_text();
        let current = self.api.locale().clone();
        let offered: Vec<(Locale, String)> = languages::visible_languages(&self.languages)
            .into_iter()
            .map(|l| (languages::locale_of(l), languages::display_name(l)))
            .collect();
        let entries: Vec<MenuEntry> = offered
            .iter()
            .map(|(locale, name)| {
                if *locale == current {
                    MenuEntry::item(format!("{name} {}", style("(current)").dim()))
                } else {
                    MenuEntry::item(name.clone())
                }
            })
            .collect();
        let prompt = format!(
            "Language: {}",
            languages::current_name(&self.languages, &current)
        );
        let choice = Menu {
            header: Some(&header),
            notice: notice.as_deref(),
            prompt: &prompt,
            entries: &entries,
            hotkeys: &[],
            default: offered.iter().position(|(l, _)| *l == current),
        }
        .show()?;
        match choice {
            MenuChoice::Quit => Ok(Step::Quit),
            MenuChoice::Index(i) => match offered.into_iter().nth(i) {
                Some((locale, _)) if locale != current => Ok(self.switch_locale(locale).await),
                Some(_) => Ok(Step::Pop),
                None => Ok(Step::Stay),
            },
            _ => Ok(Step::Pop),
        }
    }

    /// Reloads the home listing in `locale`. The previous locale stays in
    /// effect when the first page cannot be fetched.
    async fn switch_locale(&mut self, locale: Locale) -> Step {
        let previous = self.api.locale().clone();
        self.api.set_locale(locale.clone());
        match self.home_listing().await {
            Ok(home) => {
                info!("switched locale from {} to {}", previous, locale);
                match self.api.company_information().await {
                    Ok(company) => self.company = company,
                    Err(err) => warn!("company information unavailable: {}", err),
                }
                Step::Reset(home)
            }
            Err(err) => {
                self.api.set_locale(previous);
                self.report(err);
                Step::Stay
            }
        }
    }

    fn story_step(&mut self, story: &Story) -> Result<Step> {
        self.history.mark_as_seen(&story.uuid);
        let notice = self.notice.take();

        let mut entries = Vec::new();
        let mut actions = Vec::new();
        if let Some(url) = self.story_url(story) {
            entries.push(MenuEntry::section("Open in browser"));
            actions.push(StoryAction::Open(url));
        }
        for (i, attachment) in story.attachments.iter().enumerate() {
            match AttachmentView::new(attachment, &self.cfg.cdn_base_url) {
                Ok(view) => {
                    let label = sanitize_for_terminal(&view.label());
                    entries.push(if i == 0 {
                        MenuEntry::section(label)
                    } else {
                        MenuEntry::item(label)
                    });
                    actions.push(StoryAction::Open(view.download_url));
                }
                Err(err) => warn!("skipping attachment {}: {}", attachment.file.uuid, err),
            }
        }
        for (i, category) in story.categories.iter().enumerate() {
            let label = format!("Category: {}", sanitize_for_terminal(&category.display_name));
            entries.push(if i == 0 {
                MenuEntry::section(label)
            } else {
                MenuEntry::item(label)
            });
            actions.push(StoryAction::Category(category.id));
        }

        let mut prompt = style(sanitize_for_terminal(&story.title)).bold().to_string();
        if !story.subtitle.trim().is_empty() {
            prompt.push('\n');
            prompt.push_str(&sanitize_for_terminal(&story.subtitle));
        }
        let header = self.header_text();
        let choice = Menu {
            header: Some(&header),
            notice: notice.as_deref(),
            prompt: &prompt,
            entries: &entries,
            hotkeys: &[],
            default: None,
        }
        .show()?;

        match choice {
            MenuChoice::Quit => Ok(Step::Quit),
            MenuChoice::Index(i) => {
                match actions.get(i) {
                    Some(StoryAction::Open(url)) => self.open(url),
                    Some(StoryAction::Category(id)) => self.open_category_link(*id),
                    None => {}
                }
                Ok(Step::Stay)
            }
            _ => Ok(Step::Pop),
        }
    }

    /// Fetches the first page of a filtered listing.
    async fn open_listing(
        &self,
        title: String,
        filter: StoryFilter,
        is_category_list: bool,
    ) -> Result<Screen> {
        let request = StoriesRequest {
            offset: 0,
            limit: self.cfg.page_size,
            filter: filter.clone(),
        };
        let page = self
            .api
            .fetch_stories(&request)
            .await
            .with_context(|| format!("could not open {title}"))?;
        Ok(Screen::Listing(Listing {
            title,
            stories: InfiniteStories::new(page, filter),
            opts: ListOptions { is_category_list },
        }))
    }

    async fn home_listing(&self) -> Result<Screen> {
        self.open_listing("Latest stories".into(), StoryFilter::default(), false)
            .await
    }

    async fn open_category(&self, id: CategoryId) -> Result<Screen> {
        let category = self
            .categories
            .iter()
            .find(|c| c.id == id)
            .with_context(|| format!("no category with id {id}"))?;
        let title = sanitize_for_terminal(&localized(category, self.api.locale()).name);
        let filter = StoryFilter {
            category: Some(id),
            query: None,
        };
        self.open_listing(title, filter, true).await
    }

    /// Pushes an opened screen, or keeps the current one and reports why not.
    fn push_or_report(&mut self, opened: Result<Screen>) -> Step {
        match opened {
            Ok(screen) => Step::Push(screen),
            Err(err) => {
                self.report(err);
                Step::Stay
            }
        }
    }

    fn report(&mut self, err: anyhow::Error) {
        warn!("{:#}", err);
        self.notice = Some(sanitize_for_terminal(&format!("{:#}", err)));
    }

    fn open_category_link(&mut self, id: CategoryId) {
        let Some(category) = self.categories.iter().find(|c| c.id == id) else {
            return;
        };
        let url = categories::category_url(
            &self.newsroom.url,
            category,
            self.api.locale(),
            &self.cfg.default_locale,
        );
        match url {
            Ok(url) => self.open(url.as_str()),
            Err(err) => self.report(anyhow!(err).context("bad category url")),
        }
    }

    fn find_category(&self, slug: &str) -> Option<u64> {
        self.categories
            .iter()
            .find(|c| localized(c, self.api.locale()).slug == slug)
            .map(|c| c.id)
    }

    fn story_url(&self, story: &Story) -> Option<String> {
        if let Some(url) = story.links.newsroom_view.as_ref() {
            return Some(url.clone());
        }
        if story.slug.is_empty() {
            return None;
        }
        self.site_url(&story.slug).ok().map(String::from)
    }

    /// `path` on the newsroom site, under the link locale prefix.
    fn site_url(&self, path: &str) -> Result<Url, url::ParseError> {
        let relative = match self.api.locale().link_slug(&self.cfg.default_locale) {
            Some(prefix) => format!("/{prefix}/{path}"),
            None => format!("/{path}"),
        };
        Url::parse(&self.newsroom.url)?.join(&relative)
    }

    fn open(&mut self, url: &str) {
        if let Err(err) = open_url(url, self.cfg.open_command.as_deref()) {
            self.report(err);
        }
    }
}

fn menu_entries(rows: &[ListEntry]) -> Vec<MenuEntry> {
    rows.iter()
        .map(|row| {
            if !row.selectable() {
                MenuEntry::disabled(row.label.clone())
            } else if row.action == ListAction::LoadMore {
                MenuEntry::section(row.label.clone())
            } else {
                MenuEntry::item(row.label.clone())
            }
        })
        .collect()
}
