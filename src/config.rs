use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::AppError;
use crate::locale::Locale;

pub const DEFAULT_PAGE_SIZE: usize = 12;
const DEFAULT_API_BASE_URL: &str = "https://api.prezly.com";
const DEFAULT_CDN_BASE_URL: &str = "https://cdn.uc.assets.prezly.com";

/// On-disk configuration. Every field is optional so a partial file works.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    pub api_base_url: Option<String>,
    pub access_token: Option<String>,
    pub newsroom: Option<String>,
    pub locale: Option<String>,
    pub default_locale: Option<String>,
    pub page_size: Option<usize>,
    pub search_enabled: bool,
    pub cdn_base_url: Option<String>,
    pub tracking_consent: Option<bool>,
    pub open_command: Option<String>,
    pub header: Option<String>,
}

#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub api_base_url: String,
    pub access_token: Option<String>,
    pub newsroom: String,
    pub locale: Locale,
    pub default_locale: Locale,
    pub page_size: usize,
    pub search_enabled: bool,
    pub cdn_base_url: String,
    pub tracking_consent: Option<bool>,
    pub open_command: Option<String>,
    pub header: Option<String>,
}

/// Command-line values that take precedence over the file.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub config_path: Option<PathBuf>,
    pub locale: Option<String>,
}

pub fn load(overrides: Overrides) -> Result<RuntimeConfig> {
    let parsed = match overrides.config_path.as_ref() {
        Some(path) => read_config(path)?,
        None => match default_config_path() {
            Some(path) if path.is_file() => read_config(&path)?,
            _ => AppConfig::default(),
        },
    };
    let mut runtime = resolve(parsed)?;
    if let Some(code) = overrides.locale {
        runtime.locale = Locale::new(&code);
    }
    Ok(runtime)
}

fn read_config(path: &Path) -> Result<AppConfig> {
    let txt = fs::read_to_string(path)
        .with_context(|| format!("failed to read config: {}", path.display()))?;
    let parsed: AppConfig = toml::from_str(&txt)
        .with_context(|| format!("failed to parse toml: {}", path.display()))?;
    Ok(parsed)
}

fn resolve(cfg: AppConfig) -> crate::error::Result<RuntimeConfig> {
    let newsroom = cfg
        .newsroom
        .filter(|n| !n.trim().is_empty())
        .ok_or_else(|| AppError::config("`newsroom` is not set"))?;
    let page_size = cfg.page_size.unwrap_or(DEFAULT_PAGE_SIZE);
    if page_size == 0 {
        return Err(AppError::config("`page_size` must be at least 1"));
    }
    let default_locale = Locale::new(cfg.default_locale.as_deref().unwrap_or("en"));
    let locale = cfg
        .locale
        .as_deref()
        .map(Locale::new)
        .unwrap_or_else(|| default_locale.clone());

    Ok(RuntimeConfig {
        api_base_url: cfg
            .api_base_url
            .unwrap_or_else(|| DEFAULT_API_BASE_URL.into()),
        access_token: cfg.access_token,
        newsroom,
        locale,
        default_locale,
        page_size,
        search_enabled: cfg.search_enabled,
        cdn_base_url: cfg
            .cdn_base_url
            .unwrap_or_else(|| DEFAULT_CDN_BASE_URL.into()),
        tracking_consent: cfg.tracking_consent,
        open_command: cfg.open_command,
        header: cfg.header,
    })
}

pub fn config_dir() -> Option<PathBuf> {
    if let Ok(xdg) = env::var("XDG_CONFIG_HOME") {
        let mut p = PathBuf::from(xdg);
        p.push("newsroom-cli");
        return Some(p);
    }
    if let Ok(home) = env::var("HOME") {
        let mut p = PathBuf::from(home);
        p.push(".config");
        p.push("newsroom-cli");
        return Some(p);
    }
    None
}

fn default_config_path() -> Option<PathBuf> {
    config_dir().map(|p| p.join("config.toml"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_resolve_applies_defaults() {
        let cfg: AppConfig = toml::from_str(r#"newsroom = "acme""#).unwrap();
        let rt = resolve(cfg).unwrap();
        assert_eq!(rt.newsroom, "acme");
        assert_eq!(rt.page_size, DEFAULT_PAGE_SIZE);
        assert_eq!(rt.api_base_url, DEFAULT_API_BASE_URL);
        assert_eq!(rt.locale, rt.default_locale);
        assert!(!rt.search_enabled);
    }

    #[test]
    fn test_resolve_requires_newsroom() {
        let err = resolve(AppConfig::default()).unwrap_err();
        assert!(matches!(err, AppError::Config(_)));
    }

    #[test]
    fn test_resolve_rejects_zero_page_size() {
        let cfg: AppConfig = toml::from_str("newsroom = \"acme\"\npage_size = 0").unwrap();
        assert!(resolve(cfg).is_err());
    }

    #[test]
    fn test_load_with_locale_override() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "newsroom = \"acme\"\nlocale = \"en\"\nsearch_enabled = true\npage_size = 6"
        )
        .unwrap();

        let rt = load(Overrides {
            config_path: Some(file.path().to_path_buf()),
            locale: Some("nl_BE".into()),
        })
        .unwrap();
        assert_eq!(rt.locale.code(), "nl_BE");
        assert_eq!(rt.default_locale.code(), "en");
        assert_eq!(rt.page_size, 6);
        assert!(rt.search_enabled);
    }
}
