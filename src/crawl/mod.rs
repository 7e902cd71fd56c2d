mod barrier;
mod config;
mod crawler;
mod errors;
mod host_gate;
mod scheduler;
mod tracker;

pub use config::CrawlerConfig;
pub use crawler::Crawler;
pub use errors::{CrawlError, DownloadError, ExtractError};
pub use host_gate::{Admission, HostGate};
pub use tracker::{CrawlResult, VisitTracker};

#[cfg(test)]
mod tests;
