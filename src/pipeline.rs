use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use tracing::{debug, info};

use crate::config::{Config, SourceConfig};
use crate::dedup::{dedup, stop_word_set};
use crate::error::SnapshotError;
use crate::fetcher::{Fetcher, SourceFailure};
use crate::filter::TopicFilter;
use crate::rank::rank;
use crate::slot::{merge, Slot};
use crate::snapshot::{Snapshot, SnapshotStore};

/// What one run did.
#[derive(Debug)]
pub struct RunReport {
    pub slot: Slot,
    pub candidates: usize,
    pub deduplicated: usize,
    pub written: usize,
    pub failures: Vec<SourceFailure>,
    pub snapshot: Snapshot,
}

pub struct Pipeline {
    sources: Vec<SourceConfig>,
    fetcher: Fetcher,
    filter: Arc<TopicFilter>,
    stop_words: HashSet<String>,
    store: SnapshotStore,
    tz: Tz,
    per_source_max: usize,
    max_items: usize,
    concurrency: usize,
}

impl Pipeline {
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        Ok(Self {
            sources: config.feeds.clone(),
            fetcher: Fetcher::new(Duration::from_secs(config.request_timeout_secs))?,
            filter: Arc::new(TopicFilter::new(config.keywords.as_slice())),
            stop_words: stop_word_set(config.stop_words.as_slice()),
            store: SnapshotStore::new(config.output.clone()),
            tz: config.tz()?,
            per_source_max: config.per_source_max,
            max_items: config.max_items,
            concurrency: config.concurrency,
        })
    }

    /// Replace the fetcher, e.g. to use a shorter timeout.
    pub fn with_fetcher(mut self, fetcher: Fetcher) -> Self {
        self.fetcher = fetcher;
        self
    }

    pub fn store(&self) -> &SnapshotStore {
        &self.store
    }

    /// Compute the new snapshot for a run at `now` without writing it.
    pub async fn build(&self, now: DateTime<Utc>) -> RunReport {
        let previous = self.store.load(now);

        let harvest = self
            .fetcher
            .collect(
                &self.sources,
                self.filter.clone(),
                self.per_source_max,
                self.concurrency,
            )
            .await;
        let candidates = harvest.items.len();

        let deduped = dedup(harvest.items, &self.stop_words);
        let deduplicated = deduped.len();
        debug!("{} candidates, {} after dedup", candidates, deduplicated);

        let bucket = rank(deduped, self.max_items);
        let written = bucket.len();
        let slot = Slot::at(now, self.tz);

        RunReport {
            slot,
            candidates,
            deduplicated,
            written,
            failures: harvest.failures,
            snapshot: merge(previous, bucket, slot, now),
        }
    }

    /// Build the snapshot for `now` and persist it. Only the write can fail the run.
    pub async fn run(&self, now: DateTime<Utc>) -> Result<RunReport, SnapshotError> {
        let report = self.build(now).await;
        self.store.save(&report.snapshot)?;

        info!(
            "Wrote {} with {} items to {} ({} sources failed)",
            self.store.path().display(),
            report.written,
            report.slot,
            report.failures.len()
        );
        Ok(report)
    }
}
