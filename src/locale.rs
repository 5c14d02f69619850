use std::fmt;

/// A content locale such as `en` or `nl_BE`, normalized to the underscore form
/// the API keys translations by.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Locale {
    code: String,
}

impl Locale {
    pub fn new(code: &str) -> Self {
        let code = code.trim().replace('-', "_");
        let code = match code.split_once('_') {
            Some((lang, region)) => format!(
                "{}_{}",
                lang.to_ascii_lowercase(),
                region.to_ascii_uppercase()
            ),
            None => code.to_ascii_lowercase(),
        };
        Self { code }
    }

    /// Underscore code, e.g. `nl_BE`.
    pub fn code(&self) -> &str {
        &self.code
    }

    /// Lowercase hyphenated form used in URLs, e.g. `nl-be`.
    pub fn slug(&self) -> String {
        self.code.replace('_', "-").to_ascii_lowercase()
    }

    /// Path prefix for links. The default locale has none.
    pub fn link_slug(&self, default: &Locale) -> Option<String> {
        if self == default {
            None
        } else {
            Some(self.slug())
        }
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalizes_code() {
        assert_eq!(Locale::new("nl-be").code(), "nl_BE");
        assert_eq!(Locale::new(" EN ").code(), "en");
    }

    #[test]
    fn test_link_slug_omitted_for_default() {
        let en = Locale::new("en");
        let nl = Locale::new("nl_BE");
        assert_eq!(en.link_slug(&en), None);
        assert_eq!(nl.link_slug(&en).as_deref(), Some("nl-be"));
    }
}
