use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::time::sleep;
use url::Url;

use super::{Downloader, Page};
use crate::crawl::{DownloadError, ExtractError};

/// Scripted downloader for tests and dry runs: every URL resolves to a
/// canned page, a canned failure, or an unscripted-URL error. Clones share
/// the recorded observations.
#[derive(Clone, Default)]
pub struct MockDownloader {
    pages: HashMap<String, MockOutcome>,
    delay: Option<Duration>,
    observed: Arc<Observations>,
}

#[derive(Clone)]
enum MockOutcome {
    Links(Vec<String>),
    BrokenLinks(String),
    Failure(String),
}

#[derive(Default)]
struct Observations {
    fetch_counts: Mutex<HashMap<String, usize>>,
    in_flight: Mutex<HashMap<String, usize>>,
    peak_per_host: Mutex<HashMap<String, usize>>,
}

impl MockDownloader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_page(mut self, url: &str, links: &[&str]) -> Self {
        self.pages.insert(
            url.to_string(),
            MockOutcome::Links(links.iter().map(|link| link.to_string()).collect()),
        );
        self
    }

    /// The page downloads fine but its links cannot be parsed.
    pub fn with_broken_links(mut self, url: &str, message: &str) -> Self {
        self.pages
            .insert(url.to_string(), MockOutcome::BrokenLinks(message.to_string()));
        self
    }

    pub fn with_failure(mut self, url: &str, message: &str) -> Self {
        self.pages
            .insert(url.to_string(), MockOutcome::Failure(message.to_string()));
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn fetch_count(&self, url: &str) -> usize {
        self.observed
            .fetch_counts
            .lock()
            .get(url)
            .copied()
            .unwrap_or(0)
    }

    /// Highest number of concurrently running fetches observed for `host`.
    pub fn peak_concurrency(&self, host: &str) -> usize {
        self.observed
            .peak_per_host
            .lock()
            .get(host)
            .copied()
            .unwrap_or(0)
    }

    fn enter(&self, host: &str) {
        let mut in_flight = self.observed.in_flight.lock();
        let current = in_flight.entry(host.to_string()).or_insert(0);
        *current += 1;
        let mut peaks = self.observed.peak_per_host.lock();
        let peak = peaks.entry(host.to_string()).or_insert(0);
        *peak = (*peak).max(*current);
    }

    fn leave(&self, host: &str) {
        let mut in_flight = self.observed.in_flight.lock();
        if let Some(current) = in_flight.get_mut(host) {
            *current -= 1;
        }
    }
}

fn host_of(url: &str) -> Option<String> {
    Url::parse(url).ok()?.host_str().map(str::to_owned)
}

#[async_trait]
impl Downloader for MockDownloader {
    async fn fetch(&self, url: &str) -> Result<Box<dyn Page>, DownloadError> {
        *self
            .observed
            .fetch_counts
            .lock()
            .entry(url.to_string())
            .or_insert(0) += 1;

        let host = host_of(url);
        if let Some(host) = &host {
            self.enter(host);
        }
        if let Some(delay) = self.delay {
            sleep(delay).await;
        }
        let outcome = self.pages.get(url).cloned();
        if let Some(host) = &host {
            self.leave(host);
        }

        match outcome {
            Some(MockOutcome::Links(links)) => Ok(Box::new(MockPage {
                url: url.to_string(),
                links: Ok(links),
            })),
            Some(MockOutcome::BrokenLinks(message)) => Ok(Box::new(MockPage {
                url: url.to_string(),
                links: Err(message),
            })),
            Some(MockOutcome::Failure(message)) => Err(DownloadError::Other(message)),
            None => Err(DownloadError::Other(format!("no page scripted for {url}"))),
        }
    }
}

#[derive(Debug)]
struct MockPage {
    url: String,
    links: Result<Vec<String>, String>,
}

impl Page for MockPage {
    fn url(&self) -> &str {
        &self.url
    }

    fn extract_links(&self) -> Result<Vec<String>, ExtractError> {
        match &self.links {
            Ok(links) => Ok(links.clone()),
            Err(message) => Err(ExtractError(message.clone())),
        }
    }
}
