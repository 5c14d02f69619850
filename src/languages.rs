//! Language switching: which of the newsroom's languages are offered.

use crate::api::NewsroomLanguage;
use crate::locale::Locale;
use crate::util::sanitize::sanitize_for_terminal;

/// Languages a reader can switch to: the default one and any with public stories.
pub fn visible_languages(languages: &[NewsroomLanguage]) -> Vec<&NewsroomLanguage> {
    languages
        .iter()
        .filter(|l| l.is_default || l.public_stories_count > 0)
        .collect()
}

/// Whether the switcher is worth showing at all.
pub fn has_choice(languages: &[NewsroomLanguage]) -> bool {
    visible_languages(languages).len() > 1
}

pub fn locale_of(language: &NewsroomLanguage) -> Locale {
    Locale::new(&language.code)
}

/// Native name, falling back to the locale code.
pub fn display_name(language: &NewsroomLanguage) -> String {
    let name = language.locale.native_name.trim();
    if name.is_empty() {
        locale_of(language).code().to_string()
    } else {
        sanitize_for_terminal(name)
    }
}

/// Display name of `locale` among `languages`, or its code when unlisted.
pub fn current_name(languages: &[NewsroomLanguage], locale: &Locale) -> String {
    languages
        .iter()
        .find(|l| &locale_of(l) == locale)
        .map(display_name)
        .unwrap_or_else(|| locale.code().to_string())
}
