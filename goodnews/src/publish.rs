use anyhow::{Context, Result};
use reqwest::Client;
use serde::Serialize;
use std::collections::BTreeMap;
use std::time::Duration;
use tracing::warn;

/// Form payload for the ingestion endpoint. The field set is fixed by the
/// destination's entry schema; `None` fields are omitted from the form.
#[derive(Debug, Clone, Serialize)]
pub struct NewsPayload {
    pub title: String,
    pub author: Option<String>,
    pub description: Option<String>,
    pub date: Option<String>,
    pub url: String,
    pub image_url: Option<String>,
    pub publication: Option<String>,
    pub positivity_score: f32,
}

/// Outcome of one publish: the article title and the final HTTP status
/// observed for it. One record per article, retries are transparent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestRecord {
    pub title: String,
    pub status: u16,
}

/// Async client for the ingestion endpoint, with bounded transport-level
/// retry on transient failures.
pub struct Publisher {
    client: Client,
    endpoint: String,
    max_retries: u32,
    backoff: Duration,
}

impl Publisher {
    pub fn new(
        endpoint: impl Into<String>,
        max_retries: u32,
        backoff_ms: u64,
        timeout_secs: u64,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .user_agent("Goodnews/0.1.0")
            .build()
            .context("failed to build reqwest client")?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
            max_retries,
            backoff: Duration::from_millis(backoff_ms),
        })
    }

    /// POST one payload. Network errors, 5xx and 429 are retried with
    /// exponential backoff; whatever status the final attempt yields is
    /// returned as data, never as an error. Only a network error that
    /// survives every retry is an error.
    pub async fn publish(&self, payload: &NewsPayload) -> Result<u16> {
        let attempts = self.max_retries + 1;
        let mut last_error = None;
        let mut last_status = None;

        for attempt in 1..=attempts {
            if attempt > 1 {
                let backoff = self.backoff * 2u32.pow(attempt - 2);
                warn!(
                    "retrying publish of '{}' (attempt {}/{}) after {:?}",
                    payload.title, attempt, attempts, backoff
                );
                tokio::time::sleep(backoff).await;
            }

            match self
                .client
                .post(&self.endpoint)
                .form(payload)
                .send()
                .await
            {
                Ok(response) => {
                    let status = response.status();
                    if status.is_server_error() || status == reqwest::StatusCode::TOO_MANY_REQUESTS
                    {
                        last_status = Some(status.as_u16());
                        last_error = None;
                        continue;
                    }
                    // 2xx and permanent client errors both end the attempt
                    // chain; the caller records the status either way.
                    return Ok(status.as_u16());
                }
                Err(e) => {
                    last_error = Some(anyhow::Error::new(e).context("network error during publish"));
                    last_status = None;
                }
            }
        }

        match last_error {
            Some(e) => Err(e),
            None => last_status.context("no publish attempt recorded"),
        }
    }
}

/// Count occurrences of each distinct status code, ordered by code.
pub fn tally_status_codes(records: &[RequestRecord]) -> BTreeMap<u16, usize> {
    let mut tally = BTreeMap::new();
    for record in records {
        *tally.entry(record.status).or_insert(0) += 1;
    }
    tally
}
