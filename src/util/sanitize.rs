use regex::Regex;
use std::sync::LazyLock;

/// Longest label we put on one terminal row.
pub const MAX_LABEL_CHARS: usize = 200;

// CSI (ESC[ ... cmd) and OSC (ESC] ... BEL/ST) sequences
static ANSI: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(r"\x1B\[[0-9;?]*[ -/]*[@-~]|\x1B\][^\x07\x1B]*(?:\x07|\x1B\\)").ok()
});

/// Strips escape sequences and control characters from API-provided text,
/// collapses whitespace and truncates to [`MAX_LABEL_CHARS`].
pub fn sanitize_for_terminal(s: &str) -> String {
    sanitize_with_limit(s, MAX_LABEL_CHARS)
}

pub fn sanitize_with_limit(s: &str, max_chars: usize) -> String {
    let no_ansi = match ANSI.as_ref() {
        Some(re) => re.replace_all(s, ""),
        None => s.into(),
    };
    let spaced: String = no_ansi
        .chars()
        .map(|ch| if ch.is_whitespace() { ' ' } else { ch })
        .filter(|ch| !ch.is_control())
        .collect();
    spaced
        .split(' ')
        .filter(|w| !w.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
        .chars()
        .take(max_chars)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strips_escape_sequences() {
        assert_eq!(sanitize_for_terminal("\x1b[31mRed\x1b[0m alert"), "Red alert");
        assert_eq!(
            sanitize_for_terminal("\x1b]8;;https://evil.test\x07link\x1b]8;;\x07"),
            "link"
        );
    }

    #[test]
    fn test_collapses_whitespace_and_controls() {
        assert_eq!(sanitize_for_terminal("  a\n\tb\x07c  "), "a bc");
    }

    #[test]
    fn test_truncates() {
        assert_eq!(sanitize_with_limit("abcdef", 3), "abc");
    }
}
