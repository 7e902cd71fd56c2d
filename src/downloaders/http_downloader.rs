use async_trait::async_trait;
use log::{debug, trace};
use reqwest::{Client, ClientBuilder};
use scraper::{Html, Selector};
use url::Url;

use super::{Downloader, Page};
use crate::crawl::{DownloadError, ExtractError};

const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

#[derive(Clone)]
pub struct HttpDownloader {
    client: Client,
}

impl HttpDownloader {
    pub fn new() -> Result<Self, DownloadError> {
        let client = ClientBuilder::new()
            .user_agent(DEFAULT_USER_AGENT)
            .build()?;
        Ok(Self { client })
    }

    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Downloader for HttpDownloader {
    async fn fetch(&self, url: &str) -> Result<Box<dyn Page>, DownloadError> {
        debug!("GET {url}");
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(DownloadError::Status(status.as_u16()));
        }
        // Redirects may have moved us; links resolve against the final URL.
        let base = response.url().clone();
        let body = response.text().await?;
        trace!("{url}: {} bytes", body.len());
        Ok(Box::new(HtmlPage { base, body }))
    }
}

#[derive(Debug)]
pub struct HtmlPage {
    base: Url,
    body: String,
}

impl Page for HtmlPage {
    fn url(&self) -> &str {
        self.base.as_str()
    }

    fn extract_links(&self) -> Result<Vec<String>, ExtractError> {
        let document = Html::parse_document(&self.body);
        let selector =
            Selector::parse("a[href]").map_err(|err| ExtractError(err.to_string()))?;

        let mut links = Vec::new();
        for element in document.select(&selector) {
            let Some(href) = element.value().attr("href") else {
                continue;
            };
            if let Ok(resolved) = self.base.join(href) {
                if matches!(resolved.scheme(), "http" | "https") {
                    links.push(resolved.to_string());
                }
            }
        }
        Ok(links)
    }
}
