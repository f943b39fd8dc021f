//! Wikipedia lookup backend.
//!
//! Random "Good article" via the `Special:RandomInCategory` redirect, keyword search via the
//! MediaWiki action API, article text via the REST page summary endpoint.

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{header::LOCATION, redirect, Url};
use serde::Deserialize;
use tracing::{debug, instrument};

const DEFAULT_BASE_URL: &str = "https://en.wikipedia.org";
const RANDOM_GOOD_ARTICLE_PATH: &str = "/wiki/Special:RandomInCategory/Good_articles";
const ARTICLE_PATH_PREFIX: &str = "/wiki/";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(20);
/// How many leading paragraphs of the article text are handed to the summariser.
const CONTEXT_PARAGRAPHS: usize = 3;

/// One encyclopedia article, trimmed to its opening paragraphs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Article {
    pub title: String,
    pub url: String,
    pub content: String,
}

/// Encyclopedia backend consumed by the wiki-facts handlers.
#[async_trait]
pub trait ArticleSource: Send + Sync {
    /// A random article from the Good articles category.
    async fn random_article(&self) -> Result<Article>;
    /// The most relevant article for `keyword`, or `None` when nothing matches.
    async fn search(&self, keyword: &str) -> Result<Option<Article>>;
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    query: Option<SearchQuery>,
}

#[derive(Debug, Deserialize)]
struct SearchQuery {
    #[serde(default)]
    search: Vec<SearchHit>,
}

#[derive(Debug, Deserialize)]
struct SearchHit {
    title: String,
}

#[derive(Debug, Deserialize)]
struct PageSummary {
    title: String,
    #[serde(default)]
    extract: String,
    content_urls: Option<ContentUrls>,
}

#[derive(Debug, Deserialize)]
struct ContentUrls {
    desktop: PageUrls,
}

#[derive(Debug, Deserialize)]
struct PageUrls {
    page: String,
}

/// Title segment of an article URL: everything after `/wiki/`, kept percent-encoded, with inner
/// slashes encoded so the title stays one path segment (`/wiki/AC/DC` gives `AC%2FDC`).
fn article_segment(url: &Url) -> Option<String> {
    let title = url.path().strip_prefix(ARTICLE_PATH_PREFIX)?;
    if title.is_empty() || title.starts_with("Special:") {
        return None;
    }
    Some(title.replace('/', "%2F"))
}

/// Joins the first non-empty paragraphs of `text` with single spaces.
fn leading_paragraphs(text: &str, count: usize) -> String {
    text.lines()
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .take(count)
        .collect::<Vec<_>>()
        .join(" ")
}

/// [`ArticleSource`] over the public Wikipedia HTTP APIs.
#[derive(Clone)]
pub struct WikiClient {
    http: reqwest::Client,
    /// Same settings as `http` but never follows redirects; the random-article pick is read
    /// from the `Location` header instead of downloading the landed page.
    landing: reqwest::Client,
    base_url: Url,
}

impl WikiClient {
    pub fn new() -> Result<Self> {
        Self::with_base_url(DEFAULT_BASE_URL)
    }

    /// Points the client at another MediaWiki host (or a test double).
    pub fn with_base_url(base_url: &str) -> Result<Self> {
        let base_url = Url::parse(base_url)
            .with_context(|| format!("Invalid Wikipedia base URL: {}", base_url))?;
        let http = Self::http_builder()
            .build()
            .context("Failed to build Wikipedia HTTP client")?;
        let landing = Self::http_builder()
            .redirect(redirect::Policy::none())
            .build()
            .context("Failed to build Wikipedia HTTP client")?;
        Ok(Self {
            http,
            landing,
            base_url,
        })
    }

    fn http_builder() -> reqwest::ClientBuilder {
        reqwest::Client::builder()
            .user_agent(concat!("dbot-gateway/", env!("CARGO_PKG_VERSION")))
            .timeout(REQUEST_TIMEOUT)
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        self.base_url
            .join(path)
            .with_context(|| format!("Invalid Wikipedia path: {}", path))
    }

    /// Summary endpoint for an already percent-encoded title segment.
    fn summary_url_for_segment(&self, segment: &str) -> Result<Url> {
        self.endpoint(&format!("/api/rest_v1/page/summary/{}", segment))
    }

    /// Summary endpoint for a plain title; spaces become underscores, the rest is encoded.
    fn summary_url_for_title(&self, title: &str) -> Result<Url> {
        let mut url = self.endpoint("/api/rest_v1/page/summary/")?;
        url.path_segments_mut()
            .map_err(|_| anyhow::anyhow!("Wikipedia base URL cannot carry a path"))?
            .pop_if_empty()
            .push(&title.replace(' ', "_"));
        Ok(url)
    }

    async fn fetch_summary(&self, url: Url) -> Result<Article> {
        debug!(url = %url, "Fetching article summary");
        let summary: PageSummary = self
            .http
            .get(url.clone())
            .send()
            .await?
            .error_for_status()?
            .json()
            .await
            .context("Malformed page summary")?;
        let page_url = summary
            .content_urls
            .map(|u| u.desktop.page)
            .unwrap_or_else(|| url.to_string());
        Ok(Article {
            title: summary.title,
            url: page_url,
            content: leading_paragraphs(&summary.extract, CONTEXT_PARAGRAPHS),
        })
    }

    /// Fetches an article by its exact title.
    #[instrument(skip(self))]
    pub async fn article_by_title(&self, title: &str) -> Result<Article> {
        let url = self.summary_url_for_title(title)?;
        self.fetch_summary(url).await
    }
}

#[async_trait]
impl ArticleSource for WikiClient {
    #[instrument(skip(self))]
    async fn random_article(&self) -> Result<Article> {
        let picker = self.endpoint(RANDOM_GOOD_ARTICLE_PATH)?;
        let response = self
            .landing
            .get(picker.clone())
            .send()
            .await?
            .error_for_status()?;
        if !response.status().is_redirection() {
            anyhow::bail!(
                "Random article pick answered {} instead of a redirect",
                response.status()
            );
        }
        let location = response
            .headers()
            .get(LOCATION)
            .context("Random article redirect has no Location header")?
            .to_str()
            .context("Random article Location header is not valid text")?;
        let landed = picker
            .join(location)
            .with_context(|| format!("Invalid random article location: {}", location))?;
        let segment = article_segment(&landed)
            .with_context(|| format!("Random article redirect landed on {}", landed))?;
        debug!(segment = %segment, "Random article selected");
        self.fetch_summary(self.summary_url_for_segment(&segment)?)
            .await
    }

    #[instrument(skip(self))]
    async fn search(&self, keyword: &str) -> Result<Option<Article>> {
        let response: SearchResponse = self
            .http
            .get(self.endpoint("/w/api.php")?)
            .query(&[
                ("action", "query"),
                ("format", "json"),
                ("list", "search"),
                ("srsearch", keyword),
                ("srlimit", "1"),
                ("srprop", "snippet|title"),
            ])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await
            .context("Malformed search response")?;

        let Some(hit) = response.query.and_then(|q| q.search.into_iter().next()) else {
            return Ok(None);
        };
        self.article_by_title(&hit.title).await.map(Some)
    }
}
