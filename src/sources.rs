// src/sources.rs
//! Source locator: maps a topic to an ordered list of candidate pages.
//! Known topics come from a fixed table; anything else gets four templated URLs.

use serde::{Deserialize, Serialize};
use tracing::debug;

/// A page worth fetching for a topic, before any network access.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceCandidate {
    pub link: String,
    pub title: String,
}

impl SourceCandidate {
    fn new(link: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            link: link.into(),
            title: title.into(),
        }
    }

    /// Label used in result items: the title, or the URL when the title is blank.
    pub fn label(&self) -> &str {
        if self.title.is_empty() {
            &self.link
        } else {
            &self.title
        }
    }
}

/// Predefined sources. Order matters: the first key contained in the topic wins.
const TOPIC_SOURCES: &[(&str, &[(&str, &str)])] = &[
    (
        "artificial intelligence",
        &[
            (
                "https://en.wikipedia.org/wiki/Artificial_intelligence",
                "Artificial intelligence - Wikipedia",
            ),
            (
                "https://www.ibm.com/topics/artificial-intelligence",
                "What is Artificial Intelligence (AI)? | IBM",
            ),
        ],
    ),
    (
        "car sales",
        &[
            (
                "https://www.statista.com/topics/1487/automotive-industry/",
                "Automotive Industry - Statistics & Facts | Statista",
            ),
            (
                "https://www.ibisworld.com/global/industry-trends/biggest-industries-by-revenue/manufacturing/car-automobile-manufacturing/",
                "Car Manufacturing Industry Trends & Analysis | IBIS World",
            ),
        ],
    ),
    (
        "sri lanka",
        &[
            (
                "https://en.wikipedia.org/wiki/Sri_Lanka",
                "Sri Lanka - Wikipedia",
            ),
            (
                "https://www.lmd.lk/category/sectors/",
                "Business Sectors in Sri Lanka | LMD",
            ),
        ],
    ),
];

/// Candidates for `topic`. Never empty, never touches the network.
pub fn locate(topic: &str) -> Vec<SourceCandidate> {
    let lowered = topic.to_lowercase();

    if let Some((key, sources)) = TOPIC_SOURCES
        .iter()
        .find(|(key, _)| lowered.contains(key))
    {
        debug!(key, "using predefined sources");
        return sources
            .iter()
            .map(|(link, title)| SourceCandidate::new(*link, *title))
            .collect();
    }

    debug!(topic = %lowered, "no predefined sources, using templated search URLs");
    synthetic_candidates(topic)
}

fn synthetic_candidates(topic: &str) -> Vec<SourceCandidate> {
    let wiki_slug = topic.replace(' ', "_");
    let query = topic.replace(' ', "+");

    vec![
        SourceCandidate::new(
            format!("https://en.wikipedia.org/wiki/{wiki_slug}"),
            format!("{topic} - Wikipedia"),
        ),
        SourceCandidate::new(
            format!("https://www.google.com/search?q={query}"),
            format!("Google Search: {topic}"),
        ),
        SourceCandidate::new(
            format!("https://scholar.google.com/scholar?q={query}"),
            format!("Google Scholar: {topic}"),
        ),
        SourceCandidate::new(
            format!("https://www.sciencedirect.com/search?qs={query}"),
            format!("ScienceDirect: {topic}"),
        ),
    ]
}
