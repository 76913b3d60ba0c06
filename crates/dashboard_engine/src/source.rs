use std::sync::Arc;

use dashboard_core::{ListReference, MovieRecord, ProfileLocator};
use dashboard_logging::dash_debug;
use serde::Deserialize;
use serde_json::Value;
use url::Url;

use crate::decode::DecodedText;
use crate::discovery::{dedupe_references, scan_list_links};
use crate::extract::{ListerItemExtractor, RecordExtractor};
use crate::{FailureKind, FetchError, Fetcher, SourceError};

/// Public CORS proxy wrapping arbitrary pages as `{"contents": "..."}`.
pub const ALLORIGINS_ENDPOINT: &str = "https://api.allorigins.win/get";

/// Where movie lists come from. Both stages fail with a [`SourceError`];
/// callers decide how much of a run a failure is allowed to take down.
#[async_trait::async_trait]
pub trait MovieSource: Send + Sync {
    async fn discover_lists(
        &self,
        profile: &ProfileLocator,
    ) -> Result<Vec<ListReference>, SourceError>;

    async fn fetch_list(&self, list: &ListReference) -> Result<Vec<MovieRecord>, SourceError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProxyMode {
    /// Fetch pages from their own origin.
    Direct,
    /// Fetch through an AllOrigins-style proxy: `GET {endpoint}?url=<page>`.
    AllOrigins { endpoint: String },
}

impl Default for ProxyMode {
    fn default() -> Self {
        Self::AllOrigins {
            endpoint: ALLORIGINS_ENDPOINT.to_string(),
        }
    }
}

#[derive(Deserialize)]
struct ProxyEnvelope {
    contents: Option<String>,
}

/// Scrapes the profile and list pages as HTML.
pub struct ScrapeSource {
    fetcher: Arc<dyn Fetcher>,
    proxy: ProxyMode,
    extractor: Box<dyn RecordExtractor>,
}

impl ScrapeSource {
    pub fn new(fetcher: Arc<dyn Fetcher>, proxy: ProxyMode) -> Self {
        Self::with_extractor(fetcher, proxy, Box::new(ListerItemExtractor::default()))
    }

    pub fn with_extractor(
        fetcher: Arc<dyn Fetcher>,
        proxy: ProxyMode,
        extractor: Box<dyn RecordExtractor>,
    ) -> Self {
        Self {
            fetcher,
            proxy,
            extractor,
        }
    }

    async fn fetch_html(&self, page: &str) -> Result<String, SourceError> {
        match &self.proxy {
            ProxyMode::Direct => fetch_text(self.fetcher.as_ref(), page).await,
            ProxyMode::AllOrigins { endpoint } => {
                let mut request = Url::parse(endpoint).map_err(|err| {
                    SourceError::network(
                        endpoint,
                        FetchError::new(FailureKind::InvalidUrl, err.to_string()),
                    )
                })?;
                request.query_pairs_mut().append_pair("url", page);

                let body = fetch_text(self.fetcher.as_ref(), request.as_str()).await?;
                let envelope: ProxyEnvelope = serde_json::from_str(&body)
                    .map_err(|err| SourceError::parse(page, err.to_string()))?;
                envelope
                    .contents
                    .ok_or_else(|| SourceError::parse(page, "proxy response has no contents"))
            }
        }
    }
}

#[async_trait::async_trait]
impl MovieSource for ScrapeSource {
    async fn discover_lists(
        &self,
        profile: &ProfileLocator,
    ) -> Result<Vec<ListReference>, SourceError> {
        let page = profile.profile_page_url()?;
        let html = self.fetch_html(page.as_str()).await?;
        Ok(scan_list_links(&html, Some(&page)))
    }

    async fn fetch_list(&self, list: &ListReference) -> Result<Vec<MovieRecord>, SourceError> {
        let html = self.fetch_html(list.as_str()).await?;
        Ok(self.extractor.extract(&html))
    }
}

/// Talks to the JSON backend: `/api/lists/{userId}` and `/api/list/{listId}`.
pub struct ApiSource {
    fetcher: Arc<dyn Fetcher>,
    base_url: String,
}

#[derive(Deserialize)]
struct ApiRecord {
    title: Option<Value>,
    year: Option<Value>,
    genre: Option<Value>,
    rating: Option<Value>,
}

impl ApiRecord {
    fn into_record(self) -> MovieRecord {
        let title = field_text(self.title);
        let year = field_text(self.year);
        let genre = field_text(self.genre);
        let rating = field_text(self.rating);
        MovieRecord::from_optional(
            title.as_deref(),
            year.as_deref(),
            genre.as_deref(),
            rating.as_deref(),
        )
    }
}

/// Strings pass through and numbers are rendered; anything else counts as missing.
fn field_text(value: Option<Value>) -> Option<String> {
    match value? {
        Value::String(text) => Some(text),
        Value::Number(number) => Some(number.to_string()),
        _ => None,
    }
}

impl ApiSource {
    pub fn new(fetcher: Arc<dyn Fetcher>, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { fetcher, base_url }
    }

    async fn fetch_json<T: serde::de::DeserializeOwned>(&self, url: &str) -> Result<T, SourceError> {
        let body = fetch_text(self.fetcher.as_ref(), url).await?;
        serde_json::from_str(&body).map_err(|err| SourceError::parse(url, err.to_string()))
    }
}

#[async_trait::async_trait]
impl MovieSource for ApiSource {
    async fn discover_lists(
        &self,
        profile: &ProfileLocator,
    ) -> Result<Vec<ListReference>, SourceError> {
        let user_id = profile.user_id()?;
        let url = format!("{}/api/lists/{}", self.base_url, user_id);
        let lists: Vec<String> = self.fetch_json(&url).await?;
        Ok(dedupe_references(lists.into_iter().map(ListReference::new)))
    }

    async fn fetch_list(&self, list: &ListReference) -> Result<Vec<MovieRecord>, SourceError> {
        let list_id = list
            .list_id()
            .ok_or_else(|| SourceError::parse(list.as_str(), "reference names no list id"))?;
        let url = format!("{}/api/list/{}", self.base_url, list_id);
        let records: Vec<ApiRecord> = self.fetch_json(&url).await?;
        Ok(records.into_iter().map(ApiRecord::into_record).collect())
    }
}

async fn fetch_text(fetcher: &dyn Fetcher, url: &str) -> Result<String, SourceError> {
    let output = fetcher
        .fetch(url)
        .await
        .map_err(|err| SourceError::network(url, err))?;
    let decoded =
        DecodedText::from_fetch(&output).map_err(|err| SourceError::parse(url, err.to_string()))?;
    dash_debug!("Decoded {} as {}", url, decoded.encoding_label);
    Ok(decoded.text)
}
