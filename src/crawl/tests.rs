use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use tokio::time::timeout;

use crate::crawl::{CrawlError, CrawlResult, Crawler, CrawlerConfig};
use crate::downloaders::MockDownloader;

fn crawler_with(downloader: &MockDownloader, config: CrawlerConfig) -> Crawler {
    Crawler::new(Arc::new(downloader.clone()), config)
}

fn urls(list: &[&str]) -> HashSet<String> {
    list.iter().map(|url| url.to_string()).collect()
}

async fn crawl(crawler: &Crawler, seed: &str, depth: usize) -> CrawlResult {
    timeout(Duration::from_secs(10), crawler.crawl(seed, depth))
        .await
        .expect("crawl stalled")
}

#[tokio::test]
async fn crawls_the_diamond_graph_once_per_url() {
    let downloader = MockDownloader::new()
        .with_page("http://a.test/", &["http://b.test/", "http://c.test/"])
        .with_page("http://b.test/", &["http://d.test/"])
        .with_page("http://c.test/", &["http://d.test/"])
        .with_page("http://d.test/", &["http://a.test/"]);
    let crawler = crawler_with(&downloader, CrawlerConfig::default());

    let result = crawl(&crawler, "http://a.test/", 3).await;

    assert_eq!(
        result.downloaded,
        urls(&["http://a.test/", "http://b.test/", "http://c.test/", "http://d.test/"])
    );
    assert!(result.errors.is_empty());
    // D is linked from both B and C, and D links back to A.
    assert_eq!(downloader.fetch_count("http://d.test/"), 1);
    assert_eq!(downloader.fetch_count("http://a.test/"), 1);
    crawler.shutdown().await;
}

#[tokio::test]
async fn depth_one_fetches_only_the_seed() {
    let downloader = MockDownloader::new()
        .with_page("http://a.test/", &["http://b.test/"])
        .with_page("http://b.test/", &[]);
    let crawler = crawler_with(&downloader, CrawlerConfig::default());

    let result = crawl(&crawler, "http://a.test/", 1).await;

    assert_eq!(result.downloaded, urls(&["http://a.test/"]));
    assert!(result.errors.is_empty());
    assert_eq!(downloader.fetch_count("http://b.test/"), 0);
    crawler.shutdown().await;
}

#[tokio::test]
async fn depth_limits_how_far_links_are_followed() {
    let downloader = MockDownloader::new()
        .with_page("http://a.test/", &["http://b.test/"])
        .with_page("http://b.test/", &["http://c.test/"])
        .with_page("http://c.test/", &["http://d.test/"]);
    let crawler = crawler_with(&downloader, CrawlerConfig::default());

    let result = crawl(&crawler, "http://a.test/", 2).await;

    assert_eq!(result.downloaded, urls(&["http://a.test/", "http://b.test/"]));
    assert_eq!(downloader.fetch_count("http://c.test/"), 0);
    crawler.shutdown().await;
}

#[tokio::test]
async fn sibling_urls_survive_a_failed_download() {
    let downloader = MockDownloader::new()
        .with_page("http://a.test/", &["http://b.test/", "http://c.test/"])
        .with_failure("http://b.test/", "connection reset")
        .with_page("http://c.test/", &[]);
    let crawler = crawler_with(&downloader, CrawlerConfig::default());

    let result = crawl(&crawler, "http://a.test/", 2).await;

    assert_eq!(result.downloaded, urls(&["http://a.test/", "http://c.test/"]));
    assert_eq!(result.errors.len(), 1);
    assert!(matches!(
        result.errors.get("http://b.test/"),
        Some(CrawlError::Download(message)) if message.contains("connection reset")
    ));
    crawler.shutdown().await;
}

#[tokio::test]
async fn malformed_links_are_recorded_and_do_not_stall_the_crawl() {
    let downloader = MockDownloader::new()
        .with_page(
            "http://a.test/",
            &["not a url", "mailto:someone@example.com", "http://b.test/"],
        )
        .with_page("http://b.test/", &[]);
    let crawler = crawler_with(&downloader, CrawlerConfig::default());

    let result = crawl(&crawler, "http://a.test/", 2).await;

    assert_eq!(result.downloaded, urls(&["http://a.test/", "http://b.test/"]));
    assert_eq!(result.errors.len(), 2);
    assert!(matches!(
        result.errors.get("not a url"),
        Some(CrawlError::InvalidUrl(_))
    ));
    assert!(matches!(
        result.errors.get("mailto:someone@example.com"),
        Some(CrawlError::InvalidUrl(_))
    ));
    crawler.shutdown().await;
}

#[tokio::test]
async fn per_host_downloads_never_exceed_the_limit() {
    let targets: Vec<String> = (0..6).map(|i| format!("http://h.test/{i}")).collect();
    let target_refs: Vec<&str> = targets.iter().map(String::as_str).collect();

    let mut downloader = MockDownloader::new()
        .with_delay(Duration::from_millis(30))
        .with_page("http://seed.test/", &target_refs);
    for target in &targets {
        downloader = downloader.with_page(target, &[]);
    }
    let config = CrawlerConfig::default()
        .with_per_host(2)
        .with_download_workers(10);
    let crawler = crawler_with(&downloader, config);

    let result = crawl(&crawler, "http://seed.test/", 2).await;

    assert_eq!(result.downloaded.len(), 7);
    assert!(result.errors.is_empty());
    let peak = downloader.peak_concurrency("h.test");
    assert!(peak >= 1 && peak <= 2, "observed peak {peak}");
    crawler.shutdown().await;
}

#[tokio::test]
async fn repeated_crawls_return_the_same_downloaded_set() {
    let downloader = MockDownloader::new()
        .with_page("http://a.test/", &["http://b.test/", "http://c.test/"])
        .with_page("http://b.test/", &[])
        .with_page("http://c.test/", &[]);
    let crawler = crawler_with(&downloader, CrawlerConfig::default());

    let first = crawl(&crawler, "http://a.test/", 2).await;
    let second = crawl(&crawler, "http://a.test/", 2).await;

    assert_eq!(first.downloaded, second.downloaded);
    assert_eq!(downloader.fetch_count("http://a.test/"), 2);
    crawler.shutdown().await;
}

#[tokio::test]
async fn extraction_failure_keeps_the_page_downloaded() {
    let downloader = MockDownloader::new()
        .with_page("http://a.test/", &["http://b.test/"])
        .with_broken_links("http://b.test/", "not html");
    let crawler = crawler_with(&downloader, CrawlerConfig::default());

    let result = crawl(&crawler, "http://a.test/", 3).await;

    assert_eq!(result.downloaded, urls(&["http://a.test/", "http://b.test/"]));
    assert!(result.errors.is_empty());
    crawler.shutdown().await;
}

#[tokio::test]
async fn a_malformed_seed_still_completes() {
    let downloader = MockDownloader::new();
    let crawler = crawler_with(&downloader, CrawlerConfig::default());

    let result = crawl(&crawler, "definitely not a url", 2).await;

    assert!(result.downloaded.is_empty());
    assert!(matches!(
        result.errors.get("definitely not a url"),
        Some(CrawlError::InvalidUrl(_))
    ));
    crawler.shutdown().await;
}

#[tokio::test]
async fn shutdown_is_idempotent() {
    let downloader = MockDownloader::new().with_page("http://a.test/", &[]);
    let crawler = crawler_with(&downloader, CrawlerConfig::default());

    crawl(&crawler, "http://a.test/", 1).await;
    crawler.shutdown().await;
    crawler.shutdown().await;
}

#[tokio::test]
async fn crawl_after_shutdown_returns_without_hanging() {
    let downloader = MockDownloader::new().with_page("http://a.test/", &[]);
    let crawler = crawler_with(&downloader, CrawlerConfig::default());
    crawler.shutdown().await;

    let result = crawl(&crawler, "http://a.test/", 2).await;

    assert!(result.downloaded.is_empty());
}
