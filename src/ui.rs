use anyhow::Result;
use console::{Key, Term, style};
use dialoguer::Input;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuChoice {
    Back,
    Quit,
    Index(usize),
    /// One of the menu's extra hotkeys.
    Key(char),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuEntry {
    pub label: String,
    pub selectable: bool,
    /// Tab jumps between section starts.
    pub section: bool,
}

impl MenuEntry {
    pub fn item(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            selectable: true,
            section: false,
        }
    }

    pub fn disabled(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            selectable: false,
            section: false,
        }
    }

    pub fn section(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            selectable: true,
            section: true,
        }
    }
}

/// A numbered terminal menu. The first key pressed picks the input mode:
/// arrows enter cursor navigation, anything else starts typed input.
pub struct Menu<'a> {
    pub header: Option<&'a str>,
    /// One-off status line shown under the header, e.g. a failed action.
    pub notice: Option<&'a str>,
    pub prompt: &'a str,
    pub entries: &'a [MenuEntry],
    pub hotkeys: &'a [char],
    pub default: Option<usize>,
}

impl Menu<'_> {
    pub fn show(&self) -> Result<MenuChoice> {
        let term = Term::stdout();
        let mut invalid: Option<&str> = None;
        loop {
            let _ = term.clear_screen();
            self.print_heading();
            for (i, entry) in self.entries.iter().enumerate() {
                println!("{}", self.row(i, entry, false));
            }
            println!("{}", self.help_line());
            if let Some(n) = invalid.take() {
                println!("{}", style(n).red());
            }

            let choice = match term.read_key()? {
                Key::ArrowUp | Key::ArrowDown | Key::Home | Key::End | Key::PageUp
                | Key::PageDown => return self.arrow_select(&term),
                Key::Enter => self.default.map(MenuChoice::Index),
                Key::Char(c) if c.is_ascii_digit() => {
                    let typed: String = Input::new()
                        .with_prompt("Selection")
                        .with_initial_text(c.to_string())
                        .allow_empty(true)
                        .interact_text()?;
                    parse_selection(&typed, self.entries, self.hotkeys, self.default)
                }
                Key::Char(c) => parse_selection(&c.to_string(), self.entries, self.hotkeys, None),
                Key::Escape => Some(MenuChoice::Back),
                _ => None,
            };
            match choice {
                Some(choice) => return Ok(choice),
                None => invalid = Some("Not a valid selection."),
            }
        }
    }

    fn print_heading(&self) {
        for line in self.heading() {
            println!("{}", line);
        }
    }

    fn heading(&self) -> Vec<String> {
        let mut lines = Vec::with_capacity(3);
        if let Some(h) = self.header {
            lines.push(h.to_string());
        }
        if let Some(n) = self.notice {
            lines.push(style(format!("! {n}")).yellow().to_string());
        }
        lines.push(self.prompt.to_string());
        lines
    }

    fn row(&self, i: usize, entry: &MenuEntry, cursor: bool) -> String {
        let marker = if cursor { ">" } else { " " };
        if entry.selectable {
            format!("{} {}: {}", marker, i + 1, entry.label)
        } else {
            format!("{}    {}", marker, style(&entry.label).dim())
        }
    }

    fn help_line(&self) -> String {
        let mut help = String::from("Type a number + Enter, or use arrow keys + Enter. 'b' = back, 'q' = quit.");
        if self.entries.iter().any(|e| e.section) {
            help.push_str(" Tab = next section.");
        }
        for key in self.hotkeys {
            help.push_str(&format!(" '{}'", key));
        }
        help
    }

    fn arrow_select(&self, term: &Term) -> Result<MenuChoice> {
        let items = self.entries;
        let last = items.len().saturating_sub(1);
        let mut sel = self
            .default
            .or_else(|| items.iter().position(|e| e.selectable))
            .unwrap_or(0)
            .min(last);
        let mut top: usize = 0;
        loop {
            term.clear_screen()?;
            self.print_heading();

            let (rows, _cols) = term.size();
            let reserved: usize =
                2 + usize::from(self.header.is_some()) + usize::from(self.notice.is_some());
            let max_visible = (rows as usize)
                .saturating_sub(reserved)
                .max(3)
                .min(items.len());

            // keep selection in viewport
            if sel < top {
                top = sel;
            }
            if sel >= top + max_visible {
                top = sel + 1 - max_visible;
            }
            let end = (top + max_visible).min(items.len());
            for (i, entry) in items.iter().enumerate().take(end).skip(top) {
                println!("{}", self.row(i, entry, i == sel));
            }
            println!("{}", self.help_line());

            let step = max_visible.saturating_sub(1).max(1);
            match term.read_key()? {
                Key::ArrowUp => sel = step_to_selectable(items, sel, -1),
                Key::ArrowDown => sel = step_to_selectable(items, sel, 1),
                Key::Home => sel = 0,
                Key::End => sel = last,
                Key::PageUp => sel = sel.saturating_sub(step),
                Key::PageDown => sel = (sel + step).min(last),
                Key::Tab => {
                    if let Some(next) = next_section(items, sel) {
                        sel = next;
                    }
                }
                Key::Enter => {
                    if items.get(sel).is_some_and(|e| e.selectable) {
                        return Ok(MenuChoice::Index(sel));
                    }
                }
                Key::Char(c) => {
                    if let Some(choice) = parse_selection(&c.to_string(), items, self.hotkeys, None) {
                        return Ok(choice);
                    }
                }
                Key::Escape => return Ok(MenuChoice::Back),
                _ => {}
            }
        }
    }
}

/// Interprets typed input. `None` means the input selects nothing.
pub fn parse_selection(
    input: &str,
    entries: &[MenuEntry],
    hotkeys: &[char],
    default: Option<usize>,
) -> Option<MenuChoice> {
    let s = input.trim();
    if s.is_empty() {
        return default.map(MenuChoice::Index);
    }
    if s.eq_ignore_ascii_case("q") {
        return Some(MenuChoice::Quit);
    }
    if s.eq_ignore_ascii_case("b") {
        return Some(MenuChoice::Back);
    }
    let mut chars = s.chars();
    if let (Some(c), None) = (chars.next(), chars.next()) {
        let c = c.to_ascii_lowercase();
        if hotkeys.contains(&c) {
            return Some(MenuChoice::Key(c));
        }
    }
    let idx: usize = s.parse().ok()?;
    let entry = entries.get(idx.checked_sub(1)?)?;
    entry.selectable.then_some(MenuChoice::Index(idx - 1))
}

fn step_to_selectable(items: &[MenuEntry], from: usize, dir: isize) -> usize {
    let mut i = from;
    loop {
        let Some(next) = i.checked_add_signed(dir).filter(|n| *n < items.len()) else {
            return from;
        };
        if items[next].selectable {
            return next;
        }
        i = next;
    }
}

/// First section start after `sel`, wrapping to the first section.
fn next_section(items: &[MenuEntry], sel: usize) -> Option<usize> {
    let mut sections = items.iter().enumerate().filter(|(_, e)| e.section).map(|(i, _)| i);
    let first = sections.next()?;
    Some(
        std::iter::once(first)
            .chain(sections)
            .find(|&i| i > sel)
            .unwrap_or(first),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entries() -> Vec<MenuEntry> {
        vec![
            MenuEntry::section("Stories"),
            MenuEntry::item("one"),
            MenuEntry::disabled("Loading..."),
            MenuEntry::section("Categories"),
            MenuEntry::item("two"),
        ]
    }

    #[test]
    fn test_parse_selection() {
        let e = entries();
        assert_eq!(parse_selection("2", &e, &[], None), Some(MenuChoice::Index(1)));
        assert_eq!(parse_selection(" Q ", &e, &[], None), Some(MenuChoice::Quit));
        assert_eq!(parse_selection("b", &e, &[], None), Some(MenuChoice::Back));
        assert_eq!(parse_selection("", &e, &[], Some(4)), Some(MenuChoice::Index(4)));
        assert_eq!(parse_selection("", &e, &[], None), None);
        assert_eq!(parse_selection("0", &e, &[], None), None);
        assert_eq!(parse_selection("9", &e, &[], None), None);
        assert_eq!(parse_selection("x", &e, &[], None), None);
    }

    #[test]
    fn test_disabled_entry_not_selectable() {
        assert_eq!(parse_selection("3", &entries(), &[], None), None);
    }

    #[test]
    fn test_hotkeys() {
        let e = entries();
        assert_eq!(parse_selection("M", &e, &['m', 's'], None), Some(MenuChoice::Key('m')));
        assert_eq!(parse_selection("s", &e, &['m'], None), None);
    }

    #[test]
    fn test_arrow_skips_disabled() {
        let e = entries();
        assert_eq!(step_to_selectable(&e, 1, 1), 3);
        assert_eq!(step_to_selectable(&e, 3, -1), 1);
        assert_eq!(step_to_selectable(&e, 4, 1), 4);
        assert_eq!(step_to_selectable(&e, 0, -1), 0);
    }

    #[test]
    fn test_notice_sits_between_header_and_prompt() {
        let e = entries();
        let menu = Menu {
            header: Some("Acme"),
            notice: Some("could not open Awards"),
            prompt: "Latest stories",
            entries: &e,
            hotkeys: &[],
            default: None,
        };
        let lines: Vec<String> = menu
            .heading()
            .iter()
            .map(|l| console::strip_ansi_codes(l).into_owned())
            .collect();
        assert_eq!(lines, vec!["Acme", "! could not open Awards", "Latest stories"]);

        let quiet = Menu { notice: None, ..menu };
        assert_eq!(quiet.heading().len(), 2);
    }

    #[test]
    fn test_next_section_wraps() {
        let e = entries();
        assert_eq!(next_section(&e, 0), Some(3));
        assert_eq!(next_section(&e, 3), Some(0));
        assert_eq!(next_section(&[MenuEntry::item("x")], 0), None);
    }
}
