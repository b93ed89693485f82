use anyhow::{Context, Result};
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::info;

/// Which provider query backs a run. The variant also decides which
/// `source` sub-field supplies the `publication` payload field.
#[derive(Debug, Clone)]
pub enum FetchMode {
    /// Current top headlines for a country, optionally narrowed to one
    /// provider category.
    TopHeadlines {
        country: String,
        category: Option<String>,
    },
    /// All matching articles in a date window from a named source whitelist.
    Everything {
        sources: Vec<String>,
        from: String,
        to: String,
        sort_by: String,
    },
}

impl FetchMode {
    /// Resolve the fetch mode from configuration. The everything variant
    /// accepts either an explicit `from`/`to` window or a relative
    /// `days_back` window ending today.
    pub fn from_config(news: &common::NewsConfig) -> Result<Self> {
        match news.mode.as_deref().unwrap_or("top-headlines") {
            "top-headlines" => {
                let section = news.top_headlines.clone();
                Ok(FetchMode::TopHeadlines {
                    country: section
                        .as_ref()
                        .and_then(|t| t.country.clone())
                        .unwrap_or_else(|| "us".to_string()),
                    category: section
                        .and_then(|t| t.category)
                        .filter(|c| !c.is_empty()),
                })
            }
            "everything" => {
                let section = news
                    .everything
                    .clone()
                    .context("news.mode = \"everything\" requires a [news.everything] section")?;
                if section.sources.is_empty() {
                    anyhow::bail!("news.everything.sources must name at least one source");
                }
                let today = chrono::Utc::now().date_naive();
                let to = section
                    .to
                    .clone()
                    .unwrap_or_else(|| today.format("%Y-%m-%d").to_string());
                let from = section.from.clone().unwrap_or_else(|| {
                    (today - chrono::Duration::days(section.days_back.unwrap_or(1)))
                        .format("%Y-%m-%d")
                        .to_string()
                });
                Ok(FetchMode::Everything {
                    sources: section.sources,
                    from,
                    to,
                    sort_by: section.sort_by.unwrap_or_else(|| "popularity".to_string()),
                })
            }
            other => anyhow::bail!("unknown news mode: {}", other),
        }
    }

    fn endpoint(&self) -> &'static str {
        match self {
            FetchMode::TopHeadlines { .. } => "top-headlines",
            FetchMode::Everything { .. } => "everything",
        }
    }

    /// The source sub-field naming the publication differs between the two
    /// query modes: top headlines carry it in `source.name`, everything
    /// results in `source.id`.
    pub fn publication_of(&self, source: &ArticleSource) -> Option<String> {
        match self {
            FetchMode::TopHeadlines { .. } => source.name.clone(),
            FetchMode::Everything { .. } => source.id.clone(),
        }
    }
}

/// Query parameters shared by both fetch modes.
#[derive(Debug, Clone)]
pub struct QueryDefaults {
    pub language: String,
    pub page_size: u32,
    pub page: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ArticleSource {
    pub id: Option<String>,
    pub name: Option<String>,
}

/// One candidate article as returned by the provider. `publishedAt` is kept
/// verbatim; the ingestion payload passes it through untouched.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Article {
    pub title: String,
    pub author: Option<String>,
    pub description: Option<String>,
    pub published_at: Option<String>,
    pub url: String,
    pub url_to_image: Option<String>,
    pub source: ArticleSource,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct HeadlinesResponse {
    #[serde(default)]
    total_results: u64,
    articles: Vec<Article>,
}

/// Async client for the news provider API.
pub struct NewsClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl NewsClient {
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        timeout_secs: u64,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .user_agent("Goodnews/0.1.0")
            .build()
            .context("failed to build reqwest client")?;
        let base_url: String = base_url.into();
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        })
    }

    /// Fetch one page of candidate articles. No retry is applied here: any
    /// transport error, non-success status or undecodable body aborts the run.
    pub async fn fetch(&self, mode: &FetchMode, defaults: &QueryDefaults) -> Result<Vec<Article>> {
        let url = format!("{}/{}", self.base_url, mode.endpoint());

        let mut query: Vec<(&str, String)> = vec![
            ("language", defaults.language.clone()),
            ("pageSize", defaults.page_size.to_string()),
            ("page", defaults.page.to_string()),
        ];
        match mode {
            FetchMode::TopHeadlines { country, category } => {
                query.push(("country", country.clone()));
                if let Some(category) = category {
                    query.push(("category", category.clone()));
                }
            }
            FetchMode::Everything {
                sources,
                from,
                to,
                sort_by,
            } => {
                query.push(("sources", sources.join(",")));
                query.push(("from", from.clone()));
                query.push(("to", to.clone()));
                query.push(("sortBy", sort_by.clone()));
            }
        }

        let response = self
            .client
            .get(&url)
            .header("X-Api-Key", &self.api_key)
            .query(&query)
            .send()
            .await
            .with_context(|| format!("news fetch request failed: {}", url))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("news fetch failed with status {}: {}", status, body);
        }

        let parsed: HeadlinesResponse = response
            .json()
            .await
            .context("failed to decode news provider response")?;
        info!(
            "fetched {} candidate articles ({} total matching)",
            parsed.articles.len(),
            parsed.total_results
        );
        Ok(parsed.articles)
    }
}
