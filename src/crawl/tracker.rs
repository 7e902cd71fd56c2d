use std::collections::{HashMap, HashSet};

use parking_lot::{Mutex, RwLock};
use serde::Serialize;

use crate::crawl::errors::CrawlError;

/// Final outcome of one crawl: every successfully fetched URL plus the
/// error recorded for each URL that could not be fetched.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CrawlResult {
    pub downloaded: HashSet<String>,
    pub errors: HashMap<String, CrawlError>,
}

/// Shared crawl state: the set of URLs ever seen plus the accumulating
/// outcome. One tracker lives for exactly one crawl.
pub struct VisitTracker {
    visited: RwLock<HashSet<String>>,
    downloaded: RwLock<HashSet<String>>,
    errors: Mutex<HashMap<String, CrawlError>>,
}

impl VisitTracker {
    pub fn new() -> Self {
        Self {
            visited: RwLock::new(HashSet::new()),
            downloaded: RwLock::new(HashSet::new()),
            errors: Mutex::new(HashMap::new()),
        }
    }

    /// Atomically marks `url` as seen. Returns true iff this caller was the
    /// first, i.e. the URL still has to be downloaded.
    pub fn try_visit(&self, url: &str) -> bool {
        self.visited.write().insert(url.to_string())
    }

    pub fn record_success(&self, url: &str) {
        self.downloaded.write().insert(url.to_string());
    }

    /// Last writer wins if the same URL is recorded twice.
    pub fn record_error(&self, url: &str, err: CrawlError) {
        self.errors.lock().insert(url.to_string(), err);
    }

    pub fn snapshot(&self) -> CrawlResult {
        CrawlResult {
            downloaded: self.downloaded.read().clone(),
            errors: self.errors.lock().clone(),
        }
    }
}

impl Default for VisitTracker {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn try_visit_is_add_if_absent() {
        let tracker = VisitTracker::new();
        assert!(tracker.try_visit("http://a.test/"));
        assert!(!tracker.try_visit("http://a.test/"));
        assert!(tracker.try_visit("http://b.test/"));
    }

    #[test]
    fn duplicate_error_records_keep_the_last_one() {
        let tracker = VisitTracker::new();
        tracker.record_error("http://a.test/", CrawlError::Download("first".into()));
        tracker.record_error("http://a.test/", CrawlError::Download("second".into()));

        let result = tracker.snapshot();
        assert_eq!(
            result.errors.get("http://a.test/"),
            Some(&CrawlError::Download("second".into()))
        );
    }

    #[test]
    fn snapshot_is_a_defensive_copy() {
        let tracker = VisitTracker::new();
        tracker.record_success("http://a.test/");

        let before = tracker.snapshot();
        tracker.record_success("http://b.test/");
        tracker.record_error("http://c.test/", CrawlError::InvalidUrl("no host".into()));

        assert_eq!(before.downloaded.len(), 1);
        assert!(before.errors.is_empty());
        let after = tracker.snapshot();
        assert_eq!(after.downloaded.len(), 2);
        assert_eq!(after.errors.len(), 1);
    }
}
