use console::style;
use time::macros::format_description;

use super::InfiniteStories;
use crate::api::Story;
use crate::util::sanitize::sanitize_for_terminal;

/// What selecting a rendered row does.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListAction {
    Story(usize),
    LoadMore,
    None,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListEntry {
    pub label: String,
    pub action: ListAction,
}

impl ListEntry {
    pub fn selectable(&self) -> bool {
        self.action != ListAction::None
    }
}

pub struct ListOptions {
    /// The listing is already scoped to one category; cards omit category names.
    pub is_category_list: bool,
}

/// One row per story, then the load-more control when more pages exist.
pub fn render_list(
    list: &InfiniteStories,
    opts: &ListOptions,
    is_new: impl Fn(&Story) -> bool,
) -> Vec<ListEntry> {
    let mut entries: Vec<ListEntry> = list
        .stories()
        .iter()
        .enumerate()
        .map(|(idx, story)| ListEntry {
            label: story_card(story, opts, is_new(story)),
            action: ListAction::Story(idx),
        })
        .collect();

    if entries.is_empty() {
        entries.push(ListEntry {
            label: "(no stories yet)".into(),
            action: ListAction::None,
        });
    }

    if let Some(control) = load_more_control(list) {
        entries.push(control);
    }
    entries
}

pub fn story_card(story: &Story, opts: &ListOptions, is_new: bool) -> String {
    let mut label = String::new();
    if is_new {
        label.push_str(&format!("{} ", style("[NEW]").green().bold()));
    }
    let date = story
        .published_at
        .and_then(|d| d.format(format_description!("[year]-[month]-[day]")).ok());
    if let Some(date) = date {
        label.push_str(&format!("{} ", style(date).dim()));
    }
    label.push_str(&sanitize_for_terminal(&story.title));
    if !opts.is_category_list && !story.categories.is_empty() {
        let names: Vec<String> = story
            .categories
            .iter()
            .map(|c| sanitize_for_terminal(&c.display_name))
            .collect();
        label.push_str(&format!(" {}", style(format!("[{}]", names.join(", "))).cyan()));
    }
    label
}

fn load_more_control(list: &InfiniteStories) -> Option<ListEntry> {
    if !list.can_load_more() {
        return None;
    }
    let entry = if list.is_loading() {
        ListEntry {
            label: style("Loading...").dim().to_string(),
            action: ListAction::None,
        }
    } else if list.last_error().is_some() {
        ListEntry {
            label: format!("{} (loading failed)", style("Retry loading more").yellow()),
            action: ListAction::LoadMore,
        }
    } else {
        ListEntry {
            label: style("Load more").bold().to_string(),
            action: ListAction::LoadMore,
        }
    };
    Some(entry)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::StoryFilter;
    use crate::api::model::CategoryRef;
    use crate::error::AppError;
    use crate::stories::tests::{page, story};

    fn plain(s: &str) -> String {
        console::strip_ansi_codes(s).into_owned()
    }

    fn opts() -> ListOptions {
        ListOptions {
            is_category_list: false,
        }
    }

    #[test]
    fn test_renders_stories_then_load_more() {
        let list = InfiniteStories::new(page(0..3, 10, 3), StoryFilter::default());
        let entries = render_list(&list, &opts(), |_| false);
        assert_eq!(entries.len(), 4);
        assert_eq!(entries[0].action, ListAction::Story(0));
        assert_eq!(plain(&entries[2].label), "Story 2");
        assert_eq!(entries[3].action, ListAction::LoadMore);
        assert_eq!(plain(&entries[3].label), "Load more");
    }

    #[test]
    fn test_no_control_when_everything_loaded() {
        let list = InfiniteStories::new(page(0..3, 3, 3), StoryFilter::default());
        let entries = render_list(&list, &opts(), |_| false);
        assert!(entries.iter().all(|e| e.action != ListAction::LoadMore));
    }

    #[test]
    fn test_control_disabled_while_loading() {
        let mut list = InfiniteStories::new(page(0..3, 10, 3), StoryFilter::default());
        let _ticket = list.begin_load().unwrap();
        let entries = render_list(&list, &opts(), |_| false);
        let last = entries.last().unwrap();
        assert_eq!(plain(&last.label), "Loading...");
        assert!(!last.selectable());
    }

    #[test]
    fn test_retry_after_failure() {
        let mut list = InfiniteStories::new(page(0..3, 10, 3), StoryFilter::default());
        let ticket = list.begin_load().unwrap();
        list.finish_load(ticket, Err(AppError::api(500, "boom")));
        let last = render_list(&list, &opts(), |_| false).pop().unwrap();
        assert_eq!(last.action, ListAction::LoadMore);
        assert!(plain(&last.label).starts_with("Retry loading more"));
    }

    #[test]
    fn test_empty_listing() {
        let list = InfiniteStories::new(page(0..0, 0, 3), StoryFilter::default());
        let entries = render_list(&list, &opts(), |_| false);
        assert_eq!(entries.len(), 1);
        assert!(!entries[0].selectable());
    }

    #[test]
    fn test_card_categories_hidden_in_category_list() {
        let mut s = story(1);
        s.categories.push(CategoryRef {
            id: 4,
            display_name: "Awards".into(),
        });
        let full = plain(&story_card(&s, &opts(), true));
        assert_eq!(full, "[NEW] Story 1 [Awards]");

        let scoped = ListOptions {
            is_category_list: true,
        };
        assert_eq!(plain(&story_card(&s, &scoped, false)), "Story 1");
    }
}
