use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::{Client, StatusCode, Url};
use serde::Deserialize;

use crate::core::lifestyle::{LookupError, WikiArticle, WikiProvider};

/// How many search hits to try before giving up on disambiguation pages.
const SEARCH_LIMIT: &str = "3";

/// English Wikipedia: full-text search, then the REST summary of the best hit.
pub struct WikipediaClient {
    client: Client,
    api_url: String,
    rest_url: String,
}

impl WikipediaClient {
    pub fn new() -> Result<Self, LookupError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            "User-Agent",
            HeaderValue::from_static("NebulaBot/1.0 (Discord bot)"),
        );
        headers.insert("Accept", HeaderValue::from_static("application/json"));

        let client = Client::builder()
            .default_headers(headers)
            .build()
            .map_err(|e| LookupError::Request(e.to_string()))?;

        Ok(Self {
            client,
            api_url: "https://en.wikipedia.org/w/api.php".to_string(),
            rest_url: "https://en.wikipedia.org/api/rest_v1/page/summary".to_string(),
        })
    }

    async fn search(&self, query: &str) -> Result<Vec<String>, LookupError> {
        let resp = self
            .client
            .get(&self.api_url)
            .query(&[
                ("action", "query"),
                ("format", "json"),
                ("list", "search"),
                ("srsearch", query),
                ("srlimit", SEARCH_LIMIT),
                ("srprop", ""),
            ])
            .send()
            .await
            .map_err(|e| LookupError::Request(e.to_string()))?;

        if !resp.status().is_success() {
            return Err(LookupError::Request(format!(
                "Wikipedia search returned {}",
                resp.status()
            )));
        }

        let results: ApiSearch = resp
            .json()
            .await
            .map_err(|e| LookupError::Malformed(e.to_string()))?;
        Ok(results.query.search.into_iter().map(|hit| hit.title).collect())
    }

    async fn summary(&self, title: &str) -> Result<Option<ApiSummary>, LookupError> {
        let mut url =
            Url::parse(&self.rest_url).map_err(|e| LookupError::Request(e.to_string()))?;
        url.path_segments_mut()
            .map_err(|_| LookupError::Request("summary URL cannot be a base".to_string()))?
            .push(&title.replace(' ', "_"));

        let resp = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| LookupError::Request(e.to_string()))?;

        if resp.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !resp.status().is_success() {
            return Err(LookupError::Request(format!(
                "Wikipedia summary returned {}",
                resp.status()
            )));
        }

        resp.json()
            .await
            .map(Some)
            .map_err(|e| LookupError::Malformed(e.to_string()))
    }
}

#[derive(Debug, Deserialize)]
struct ApiSearch {
    query: ApiQuery,
}

#[derive(Debug, Deserialize)]
struct ApiQuery {
    #[serde(default)]
    search: Vec<ApiSearchHit>,
}

#[derive(Debug, Deserialize)]
struct ApiSearchHit {
    title: String,
}

#[derive(Debug, Deserialize)]
struct ApiSummary {
    #[serde(rename = "type", default)]
    kind: String,
    title: String,
    #[serde(default)]
    extract: String,
    content_urls: Option<ApiContentUrls>,
    originalimage: Option<ApiImage>,
    thumbnail: Option<ApiImage>,
}

#[derive(Debug, Deserialize)]
struct ApiContentUrls {
    desktop: ApiPageUrl,
}

#[derive(Debug, Deserialize)]
struct ApiPageUrl {
    page: String,
}

#[derive(Debug, Deserialize)]
struct ApiImage {
    source: String,
}

impl ApiSummary {
    /// Disambiguation pages and empty stubs make poor answers.
    fn into_article(self) -> Option<WikiArticle> {
        if self.kind == "disambiguation" || self.extract.trim().is_empty() {
            return None;
        }
        let url = self.content_urls.map(|urls| urls.desktop.page).unwrap_or_else(|| {
            format!("https://en.wikipedia.org/wiki/{}", self.title.replace(' ', "_"))
        });
        Some(WikiArticle {
            title: self.title,
            summary: self.extract,
            url,
            image_url: self
                .originalimage
                .or(self.thumbnail)
                .map(|image| image.source),
        })
    }
}

#[async_trait]
impl WikiProvider for WikipediaClient {
    async fn lookup(&self, query: &str) -> Result<Option<WikiArticle>, LookupError> {
        for title in self.search(query).await? {
            match self.summary(&title).await? {
                Some(summary) => {
                    if let Some(article) = summary.into_article() {
                        return Ok(Some(article));
                    }
                    tracing::debug!(title = %title, "Skipping disambiguation page");
                }
                None => continue,
            }
        }
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary(json: &str) -> ApiSummary {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn standard_pages_become_articles() {
        let article = summary(
            r#"{
                "type": "standard",
                "title": "Rust (programming language)",
                "extract": "Rust is a general-purpose programming language.",
                "content_urls": {"desktop": {"page": "https://en.wikipedia.org/wiki/Rust_(programming_language)"}},
                "thumbnail": {"source": "https://upload.wikimedia.org/thumb.png"},
                "originalimage": {"source": "https://upload.wikimedia.org/full.png"}
            }"#,
        )
        .into_article()
        .unwrap();

        assert_eq!(article.title, "Rust (programming language)");
        assert_eq!(
            article.url,
            "https://en.wikipedia.org/wiki/Rust_(programming_language)"
        );
        assert_eq!(
            article.image_url.as_deref(),
            Some("https://upload.wikimedia.org/full.png")
        );
    }

    #[test]
    fn disambiguation_pages_are_skipped() {
        let page = summary(
            r#"{"type": "disambiguation", "title": "Mercury", "extract": "Mercury commonly refers to:"}"#,
        );
        assert!(page.into_article().is_none());
    }

    #[test]
    fn missing_links_fall_back_to_the_title() {
        let article = summary(r#"{"type": "standard", "title": "Oslo Fjord", "extract": "A fjord."}"#)
            .into_article()
            .unwrap();

        assert_eq!(article.url, "https://en.wikipedia.org/wiki/Oslo_Fjord");
        assert_eq!(article.image_url, None);
    }

    #[test]
    fn search_results_decode_titles() {
        let results: ApiSearch = serde_json::from_str(
            r#"{"batchcomplete": "", "query": {"searchinfo": {"totalhits": 2}, "search": [{"ns": 0, "title": "Rust"}, {"ns": 0, "title": "Rust (fungus)"}]}}"#,
        )
        .unwrap();
        let titles: Vec<String> = results.query.search.into_iter().map(|h| h.title).collect();
        assert_eq!(titles, ["Rust", "Rust (fungus)"]);
    }
}
