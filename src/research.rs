// src/research.rs
//! Research pipeline: locate sources → fetch → extract → summarize, strictly
//! in order, one candidate at a time.
//!
//! Per-source failures never fail the run. A failed fetch becomes a placeholder
//! item; an empty candidate list becomes a single "no sources" item.

use std::sync::Arc;
use std::time::Instant;

use metrics::{counter, histogram};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::extract::extract;
use crate::fetch::PageFetcher;
use crate::sources::locate;
use crate::summarize::summarize;

/// Request-schema default that callers send when they leave the field untouched.
pub const PLACEHOLDER_TOPIC: &str = "string";
pub const FALLBACK_TOPIC: &str = "general information";
pub const DEFAULT_DEPTH: i64 = 2;

pub const NO_SOURCES_LABEL: &str = "No sources found";
pub const UNREACHABLE_SOURCE_SUMMARY: &str = "Unable to retrieve content from this source. The website may be unavailable or may have blocked the request.";

/// One analysed source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultItem {
    pub topic: String,
    pub source: String,
    pub summary: String,
    /// Seconds since the Unix epoch, captured when the item was produced.
    pub timestamp: f64,
}

impl ResultItem {
    fn now(topic: &str, source: &str, summary: String) -> Self {
        Self {
            topic: topic.to_string(),
            source: source.to_string(),
            summary,
            timestamp: unix_now(),
        }
    }
}

/// True when `topic` is blank or the schema placeholder.
pub fn is_placeholder_topic(topic: &str) -> bool {
    let t = topic.trim();
    t.is_empty() || t == PLACEHOLDER_TOPIC
}

pub fn no_sources_summary(topic: &str) -> String {
    format!(
        "Unable to find relevant information for '{topic}'. Please try a different search term or check your internet connection."
    )
}

#[derive(Clone)]
pub struct ResearchAgent {
    fetcher: Arc<dyn PageFetcher>,
}

impl ResearchAgent {
    pub fn new(fetcher: Arc<dyn PageFetcher>) -> Self {
        Self { fetcher }
    }

    /// Analyse up to `depth` sources for `topic`.
    ///
    /// Returns `min(depth, candidates)` items, or exactly one fallback item when
    /// no candidate survives truncation (including any `depth <= 0`).
    pub async fn research(&self, topic: &str, depth: i64) -> Vec<ResultItem> {
        let t0 = Instant::now();
        info!(topic, depth, fetcher = self.fetcher.name(), "researching topic");

        let topic = if topic.is_empty() || topic == PLACEHOLDER_TOPIC {
            warn!("empty or placeholder topic, using '{FALLBACK_TOPIC}'");
            FALLBACK_TOPIC
        } else {
            topic
        };

        let mut candidates = locate(topic);
        candidates.truncate(usize::try_from(depth).unwrap_or(0));

        counter!("research_runs_total").increment(1);

        if candidates.is_empty() {
            info!(topic, "no sources to analyse");
            return vec![ResultItem::now(
                topic,
                NO_SOURCES_LABEL,
                no_sources_summary(topic),
            )];
        }

        let total = candidates.len();
        let mut results = Vec::with_capacity(total);
        for (i, candidate) in candidates.iter().enumerate() {
            info!(n = i + 1, total, url = %candidate.link, "analysing source");
            counter!("research_sources_total").increment(1);

            let summary = match self.fetcher.fetch(&candidate.link).await {
                Some(markup) if !markup.is_empty() => summarize(&extract(Some(&markup))),
                _ => {
                    counter!("research_source_failures_total").increment(1);
                    UNREACHABLE_SOURCE_SUMMARY.to_string()
                }
            };

            results.push(ResultItem::now(topic, candidate.label(), summary));
        }

        let ms = t0.elapsed().as_secs_f64() * 1_000.0;
        histogram!("research_duration_ms").record(ms);
        info!(topic, results = results.len(), elapsed_ms = ms as u64, "research complete");

        results
    }
}

/// Current time as fractional Unix seconds.
pub(crate) fn unix_now() -> f64 {
    chrono::Utc::now().timestamp_micros() as f64 / 1_000_000.0
}
