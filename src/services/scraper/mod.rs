//! Multi-marketplace product search
//!
//! One query fans out to every supported marketplace at once. Each source runs
//! its own fetch and parse pipeline; results are merged in a fixed source order
//! no matter which pipeline finishes first.

use std::{collections::HashMap, fmt::Display, sync::Arc, time::Duration};

use futures::future::join_all;
use rand::Rng;
use serde::Serialize;

use crate::{error::AppResult, models::Listing};

pub mod fetcher;
pub mod parsers;

pub use fetcher::{FetchOutcome, HttpFetcher, PageFetcher};
pub use parsers::{ParseOutcome, SourceParser};

/// Placeholder replaced by the encoded query in URL templates
pub const QUERY_PLACEHOLDER: &str = "{query}";

/// Supported marketplaces, in merge order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    Amazon,
    Ebay,
    AliExpress,
    Jumia,
    Konga,
}

impl Source {
    pub const ALL: [Source; 5] = [
        Source::Amazon,
        Source::Ebay,
        Source::AliExpress,
        Source::Jumia,
        Source::Konga,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Source::Amazon => "amazon",
            Source::Ebay => "ebay",
            Source::AliExpress => "aliexpress",
            Source::Jumia => "jumia",
            Source::Konga => "konga",
        }
    }

    /// Origin used to resolve relative listing links
    pub fn base_url(&self) -> &'static str {
        match self {
            Source::Amazon => "https://www.amazon.com",
            Source::Ebay => "https://www.ebay.com",
            Source::AliExpress => "https://www.aliexpress.com",
            Source::Jumia => "https://www.jumia.com.ng",
            Source::Konga => "https://www.konga.com",
        }
    }

    pub fn default_url_template(&self) -> &'static str {
        match self {
            Source::Amazon => "https://www.amazon.com/s?k={query}",
            Source::Ebay => "https://www.ebay.com/sch/i.html?_nkw={query}",
            Source::AliExpress => "https://www.aliexpress.com/wholesale?SearchText={query}",
            Source::Jumia => "https://www.jumia.com.ng/catalog/?q={query}",
            Source::Konga => "https://www.konga.com/search?search={query}",
        }
    }
}

impl Display for Source {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// URL templates and throttle window for the aggregator
#[derive(Debug, Clone)]
pub struct ScrapeConfig {
    url_templates: HashMap<Source, String>,
    pub throttle_min: Duration,
    pub throttle_max: Duration,
}

impl Default for ScrapeConfig {
    fn default() -> Self {
        Self {
            url_templates: Source::ALL
                .iter()
                .map(|s| (*s, s.default_url_template().to_string()))
                .collect(),
            throttle_min: Duration::from_secs(1),
            throttle_max: Duration::from_secs(3),
        }
    }
}

impl ScrapeConfig {
    pub fn with_throttle(mut self, min: Duration, max: Duration) -> Self {
        self.throttle_min = min.min(max);
        self.throttle_max = max.max(min);
        self
    }

    pub fn with_template(mut self, source: Source, template: impl Into<String>) -> Self {
        self.url_templates.insert(source, template.into());
        self
    }

    /// Search URL for `source`, with an already-encoded query substituted
    pub fn search_url(&self, source: Source, encoded_query: &str) -> String {
        let template = self
            .url_templates
            .get(&source)
            .map(String::as_str)
            .unwrap_or_else(|| source.default_url_template());
        template.replace(QUERY_PLACEHOLDER, encoded_query)
    }

    fn throttle_delay(&self) -> Duration {
        if self.throttle_max <= self.throttle_min {
            return self.throttle_min;
        }
        rand::thread_rng().gen_range(self.throttle_min..=self.throttle_max)
    }
}

/// Collapses whitespace and percent-encodes a query for use in a URL
pub fn encode_query(query: &str) -> String {
    let normalized = query.split_whitespace().collect::<Vec<_>>().join(" ");
    url::form_urlencoded::byte_serialize(normalized.as_bytes()).collect()
}

/// How one source's pipeline ended
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SourceStatus {
    Ok,
    FetchFailed { reason: String },
    /// Some listings were kept before extraction stopped
    PartialParse { reason: String },
}

/// Per-source summary of one aggregation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceReport {
    pub source: Source,
    #[serde(flatten)]
    pub status: SourceStatus,
    pub listing_count: usize,
}

/// Merged listings plus how each source fared
#[derive(Debug, Clone, Default, Serialize)]
pub struct AggregateReport {
    pub listings: Vec<Listing>,
    pub sources: Vec<SourceReport>,
}

impl AggregateReport {
    pub fn failed_sources(&self) -> impl Iterator<Item = &SourceReport> {
        self.sources
            .iter()
            .filter(|r| !matches!(r.status, SourceStatus::Ok))
    }
}

/// Fans a query out to every marketplace and merges the results
#[derive(Clone)]
pub struct Aggregator {
    fetcher: Arc<dyn PageFetcher>,
    parsers: Arc<Vec<SourceParser>>,
    config: ScrapeConfig,
}

impl Aggregator {
    pub fn new(fetcher: Arc<dyn PageFetcher>, config: ScrapeConfig) -> AppResult<Self> {
        let parsers = Source::ALL
            .iter()
            .map(|s| SourceParser::for_source(*s))
            .collect::<AppResult<Vec<_>>>()?;

        Ok(Self {
            fetcher,
            parsers: Arc::new(parsers),
            config,
        })
    }

    /// All listings for `query`, in source order then page order
    pub async fn aggregate(&self, query: &str) -> Vec<Listing> {
        self.aggregate_report(query).await.listings
    }

    /// Runs every source pipeline concurrently and waits for all of them
    ///
    /// A failed source contributes no listings; the others are unaffected.
    /// The randomized sleep at the end spaces out repeated calls.
    #[tracing::instrument(skip(self))]
    pub async fn aggregate_report(&self, query: &str) -> AggregateReport {
        let encoded = encode_query(query);
        if encoded.is_empty() {
            tracing::debug!("Empty query, skipping marketplaces");
            return AggregateReport::default();
        }

        let pipelines = self
            .parsers
            .iter()
            .map(|parser| self.run_source(parser, &encoded));

        // join_all yields results positionally, matching Source::ALL
        let results = join_all(pipelines).await;

        let delay = self.config.throttle_delay();
        tokio::time::sleep(delay).await;

        let mut report = AggregateReport::default();
        for (listings, source_report) in results {
            report.listings.extend(listings);
            report.sources.push(source_report);
        }

        tracing::info!(
            total = report.listings.len(),
            failed_sources = report.failed_sources().count(),
            throttle_ms = delay.as_millis() as u64,
            "Aggregation completed"
        );

        report
    }

    async fn run_source(
        &self,
        parser: &SourceParser,
        encoded_query: &str,
    ) -> (Vec<Listing>, SourceReport) {
        let source = parser.source();
        let url = self.config.search_url(source, encoded_query);

        let (listings, status) = match self.fetcher.fetch(&url).await {
            FetchOutcome::Page(body) => {
                let outcome = parser.parse(&body);
                let status = match outcome.failure {
                    None => SourceStatus::Ok,
                    Some(reason) => SourceStatus::PartialParse { reason },
                };
                (outcome.listings, status)
            }
            FetchOutcome::Failed { reason } => (Vec::new(), SourceStatus::FetchFailed { reason }),
        };

        tracing::debug!(source = %source, count = listings.len(), "Source pipeline finished");

        let report = SourceReport {
            source,
            status,
            listing_count: listings.len(),
        };
        (listings, report)
    }
}
