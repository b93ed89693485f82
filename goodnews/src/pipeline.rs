use anyhow::Result;
use tracing::{debug, info};

use crate::fetch::{FetchMode, NewsClient, QueryDefaults};
use crate::normalize::normalize;
use crate::publish::{self, NewsPayload, Publisher, RequestRecord};
use crate::sentiment::SentimentScorer;

/// Counters and the ordered request log for one run. Discarded on exit,
/// nothing persists between runs.
#[derive(Debug, Default)]
pub struct RunReport {
    pub fetched: usize,
    pub positive: usize,
    pub records: Vec<RequestRecord>,
}

/// One forward pass over the fetched article list: normalize and score each
/// title, publish everything strictly above the threshold, record the final
/// status per published article, then log the status tally.
///
/// Fetch and scoring errors abort the run; publish statuses are data.
pub async fn run(
    news: &NewsClient,
    mode: &FetchMode,
    defaults: &QueryDefaults,
    scorer: &dyn SentimentScorer,
    publisher: &Publisher,
    threshold: f32,
) -> Result<RunReport> {
    let articles = news.fetch(mode, defaults).await?;

    let mut report = RunReport {
        fetched: articles.len(),
        ..Default::default()
    };

    for article in &articles {
        let score = scorer.score(&normalize(&article.title))?;
        debug!("scored '{}': {:.3}", article.title, score);
        if score <= threshold {
            continue;
        }

        report.positive += 1;
        let payload = NewsPayload {
            title: article.title.clone(),
            author: article.author.clone(),
            description: article.description.clone(),
            date: article.published_at.clone(),
            url: article.url.clone(),
            image_url: article.url_to_image.clone(),
            publication: mode.publication_of(&article.source),
            positivity_score: score,
        };
        let status = publisher.publish(&payload).await?;
        report.records.push(RequestRecord {
            title: article.title.clone(),
            status,
        });
    }

    info!(
        "run complete: {} fetched, {} positive",
        report.fetched, report.positive
    );
    for (status, count) in publish::tally_status_codes(&report.records) {
        info!("status {}: {}", status, count);
    }

    Ok(report)
}
