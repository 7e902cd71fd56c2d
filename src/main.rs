use std::sync::Arc;

use anyhow::Context;
use clap::Parser;

use layercrawl::{Crawler, CrawlerConfig, HttpDownloader};

#[derive(Parser, Debug)]
#[command(
    name = "layercrawl",
    version,
    about = "Concurrent breadth-first web crawler with per-host download limits"
)]
struct Args {
    /// Seed URL to start crawling from
    url: String,

    /// Number of breadth-first levels to follow, counting the seed's own
    #[arg(short, long, default_value_t = 2)]
    depth: usize,

    /// Concurrent download slots
    #[arg(long, default_value_t = 10)]
    downloaders: usize,

    /// Concurrent link-extraction slots
    #[arg(long, default_value_t = 10)]
    extractors: usize,

    /// Concurrent downloads allowed per host
    #[arg(long, default_value_t = 5)]
    per_host: usize,

    /// Print the result as JSON instead of plain text
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::builder()
        .filter_level(log::LevelFilter::Warn)
        .filter_module("layercrawl", log::LevelFilter::Info)
        .init();

    let args = Args::parse();

    let downloader = HttpDownloader::new().context("could not build HTTP client")?;
    let config = CrawlerConfig::default()
        .with_download_workers(args.downloaders)
        .with_extract_workers(args.extractors)
        .with_per_host(args.per_host);
    let crawler = Crawler::new(Arc::new(downloader), config);

    let result = crawler.crawl(&args.url, args.depth).await;
    crawler.shutdown().await;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        println!("Downloaded pages:");
        for url in &result.downloaded {
            println!("{url}");
        }
        if !result.errors.is_empty() {
            println!("Errors:");
            for (url, err) in &result.errors {
                println!("{url}: {err}");
            }
        }
        crawler.stats().print_summary();
    }

    Ok(())
}
