use async_trait::async_trait;
use futures_util::StreamExt;
use log::debug;
use reqwest::{Client, RequestBuilder};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::time::Duration;
use url::Url;

use super::model::{
    Category, CompanyInformation, Newsroom, NewsroomLanguage, PaginationProps, StoriesPage, Story,
};
use super::{StoriesRequest, StorySource};
use crate::config::RuntimeConfig;
use crate::error::{AppError, Result};
use crate::locale::Locale;

// 2 MB cap on HTML pages
const MAX_PAGE_BYTES: usize = 2 * 1024 * 1024;

#[derive(Deserialize)]
struct NewsroomEnvelope {
    newsroom: Newsroom,
}

#[derive(Deserialize)]
struct CompanyEnvelope {
    company_information: CompanyInformation,
}

#[derive(Deserialize)]
struct CategoriesEnvelope {
    categories: Vec<Category>,
}

#[derive(Deserialize)]
struct LanguagesEnvelope {
    languages: Vec<NewsroomLanguage>,
}

#[derive(Deserialize)]
struct StoriesEnvelope {
    stories: Vec<Story>,
    pagination: ApiPagination,
}

#[derive(Deserialize)]
struct ApiPagination {
    matched_records_number: usize,
}

/// JSON-over-HTTP client for a single newsroom.
pub struct ContentApi {
    client: Client,
    base: Url,
    newsroom: String,
    locale: Locale,
    access_token: Option<String>,
}

impl ContentApi {
    pub fn new(cfg: &RuntimeConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("newsroom-cli/", env!("CARGO_PKG_VERSION")))
            .gzip(true)
            .connect_timeout(Duration::from_secs(5))
            .timeout(Duration::from_secs(20))
            .build()?;
        Ok(Self {
            client,
            base: Url::parse(&cfg.api_base_url)?,
            newsroom: cfg.newsroom.clone(),
            locale: cfg.locale.clone(),
            access_token: cfg.access_token.clone(),
        })
    }

    pub fn locale(&self) -> &Locale {
        &self.locale
    }

    /// Locale sent with every subsequent request.
    pub fn set_locale(&mut self, locale: Locale) {
        debug!("switching content locale to {}", locale);
        self.locale = locale;
    }

    pub async fn newsroom(&self) -> Result<Newsroom> {
        let url = self.newsroom_url(&[])?;
        let env: NewsroomEnvelope = self.get_json(url).await?;
        Ok(env.newsroom)
    }

    pub async fn company_information(&self) -> Result<CompanyInformation> {
        let mut url = self.newsroom_url(&["company_information"])?;
        url.query_pairs_mut()
            .append_pair("locale", self.locale.code());
        let env: CompanyEnvelope = self.get_json(url).await?;
        Ok(env.company_information)
    }

    pub async fn categories(&self) -> Result<Vec<Category>> {
        let url = self.newsroom_url(&["categories"])?;
        let env: CategoriesEnvelope = self.get_json(url).await?;
        Ok(env.categories)
    }

    pub async fn languages(&self) -> Result<Vec<NewsroomLanguage>> {
        let url = self.newsroom_url(&["languages"])?;
        let env: LanguagesEnvelope = self.get_json(url).await?;
        Ok(env.languages)
    }

    /// Fetches a public HTML page, streaming with a size cap.
    pub async fn fetch_page(&self, page_url: &str) -> Result<String> {
        debug!("GET {}", page_url);
        let resp = self.client.get(page_url).send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(AppError::api(status.as_u16(), format!("GET {page_url}")));
        }
        let mut stream = resp.bytes_stream();
        let mut buf: Vec<u8> = Vec::new();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;
            if buf.len() + chunk.len() > MAX_PAGE_BYTES {
                // the policy meta tag lives in <head>; what we have is enough
                break;
            }
            buf.extend_from_slice(&chunk);
        }
        Ok(String::from_utf8_lossy(&buf).into_owned())
    }

    fn newsroom_url(&self, tail: &[&str]) -> Result<Url> {
        let mut url = self.base.clone();
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|_| AppError::config("api_base_url cannot be a base URL"))?;
            segments.pop_if_empty();
            segments.extend(["v2", "newsrooms", self.newsroom.as_str()]);
            segments.extend(tail);
        }
        Ok(url)
    }

    fn stories_url(&self, request: &StoriesRequest) -> Result<Url> {
        let mut url = self.newsroom_url(&["stories"])?;
        {
            let mut q = url.query_pairs_mut();
            q.append_pair("offset", &request.offset.to_string());
            q.append_pair("limit", &request.limit.to_string());
            q.append_pair("locale", self.locale.code());
            if let Some(category) = request.filter.category {
                q.append_pair("category", &category.to_string());
            }
            if let Some(query) = request.filter.query.as_deref() {
                q.append_pair("query", query);
            }
        }
        Ok(url)
    }

    fn authorize(&self, builder: RequestBuilder) -> RequestBuilder {
        match self.access_token.as_deref() {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T> {
        debug!("GET {}", url);
        let resp = self.authorize(self.client.get(url)).send().await?;
        let status = resp.status();
        let text = resp.text().await?;
        if !status.is_success() {
            return Err(AppError::api(status.as_u16(), text));
        }
        Ok(serde_json::from_str(&text)?)
    }
}

#[async_trait]
impl StorySource for ContentApi {
    async fn fetch_stories(&self, request: &StoriesRequest) -> Result<StoriesPage> {
        let url = self.stories_url(request)?;
        let env: StoriesEnvelope = self.get_json(url).await?;
        Ok(StoriesPage {
            stories: env.stories,
            pagination: PaginationProps {
                items_total: env.pagination.matched_records_number,
                current_page: request.offset / request.limit.max(1) + 1,
                page_size: request.limit,
            },
        })
    }
}
