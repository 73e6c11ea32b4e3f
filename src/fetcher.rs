use std::sync::Arc;
use std::time::Duration;

use reqwest::Client;
use tokio::task::JoinSet;
use tracing::{error, info};

use crate::config::SourceConfig;
use crate::error::FeedError;
use crate::filter::TopicFilter;
use crate::normalize::{feed_parser, normalize, RawEntry};
use crate::snapshot::NewsItem;

/// Items gathered from every source in one run, plus the sources that failed.
#[derive(Debug, Default)]
pub struct Harvest {
    pub items: Vec<NewsItem>,
    pub failures: Vec<SourceFailure>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SourceFailure {
    pub source_id: String,
    pub error: String,
}

#[derive(Clone)]
pub struct Fetcher {
    client: Client,
    timeout: Duration,
}

impl Fetcher {
    pub fn new(timeout: Duration) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent("AiDigest/1.0 (RSS Aggregator)")
            .build()?;

        Ok(Self { client, timeout })
    }

    /// Download and parse one feed.
    pub async fn fetch_entries(&self, url: &str) -> Result<Vec<RawEntry>, FeedError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| self.request_error(e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FeedError::Status(status));
        }

        let bytes = response.bytes().await.map_err(|e| self.request_error(e))?;
        let parsed = feed_parser().parse(&bytes[..])?;

        Ok(parsed.entries.into_iter().map(RawEntry::from_entry).collect())
    }

    fn request_error(&self, e: reqwest::Error) -> FeedError {
        if e.is_timeout() {
            FeedError::Timeout(self.timeout)
        } else {
            FeedError::Fetch(e)
        }
    }

    /// Fetch one source and keep its first `per_source_max` relevant items.
    pub async fn fetch_source(
        &self,
        source: &SourceConfig,
        filter: &TopicFilter,
        per_source_max: usize,
    ) -> Result<Vec<NewsItem>, FeedError> {
        info!("Fetching feed: {} ({})", source.name, source.url);
        let entries = self.fetch_entries(&source.url).await?;
        Ok(harvest(&entries, &source.name, filter, per_source_max))
    }

    /// Fetch every source, at most `concurrency` at a time.
    ///
    /// Results are concatenated in the order of `sources` regardless of which
    /// fetch finished first. A failing source is logged and skipped.
    pub async fn collect(
        &self,
        sources: &[SourceConfig],
        filter: Arc<TopicFilter>,
        per_source_max: usize,
        concurrency: usize,
    ) -> Harvest {
        let mut results: Vec<Option<Result<Vec<NewsItem>, FeedError>>> =
            sources.iter().map(|_| None).collect();
        let mut pending = sources.iter().cloned().enumerate();
        let mut join_set = JoinSet::new();

        loop {
            while join_set.len() < concurrency.max(1) {
                let Some((index, source)) = pending.next() else {
                    break;
                };
                let fetcher = self.clone();
                let filter = filter.clone();
                join_set.spawn(async move {
                    let result = fetcher.fetch_source(&source, &filter, per_source_max).await;
                    (index, result)
                });
            }

            match join_set.join_next().await {
                Some(Ok((index, result))) => results[index] = Some(result),
                Some(Err(e)) => error!("Feed task aborted: {}", e),
                None => break,
            }
        }

        let mut harvest = Harvest::default();
        for (source, result) in sources.iter().zip(results) {
            match result {
                Some(Ok(items)) => {
                    info!("Kept {} items from feed '{}'", items.len(), source.name);
                    harvest.items.extend(items);
                }
                Some(Err(e)) => {
                    error!("Failed to fetch feed '{}' ({}): {}", source.name, source.id, e);
                    harvest.failures.push(SourceFailure {
                        source_id: source.id.clone(),
                        error: e.to_string(),
                    });
                }
                None => {
                    harvest.failures.push(SourceFailure {
                        source_id: source.id.clone(),
                        error: "fetch task did not complete".to_string(),
                    });
                }
            }
        }

        harvest
    }
}

/// Normalize entries in feed order, drop rejects and off-topic items, and stop at the cap.
pub fn harvest(
    entries: &[RawEntry],
    source_name: &str,
    filter: &TopicFilter,
    per_source_max: usize,
) -> Vec<NewsItem> {
    entries
        .iter()
        .filter_map(|entry| normalize(entry, source_name))
        .filter(|item| filter.is_relevant(&item.title, item.description.as_deref().unwrap_or("")))
        .take(per_source_max)
        .collect()
}
