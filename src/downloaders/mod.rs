pub mod http_downloader;
pub mod mock_downloader;

mod downloader;
pub use downloader::{Downloader, Page};
pub use http_downloader::HttpDownloader;
pub use mock_downloader::MockDownloader;
