use async_trait::async_trait;
use tokio::fs;
use tracing::debug;

use crate::error::{DashboardError, Result};

// async fn in traits is not object safe yet, async_trait boxes the future
#[async_trait]
pub trait Fetch {
    type Error;
    async fn fetch(&self) -> Result<String, Self::Error>;
}

/// Where a CSV resource lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source<'a> {
    /// `http://` or `https://`
    Url(&'a str),
    /// `file://` URL or a plain path
    File(&'a str),
}

impl<'a> Source<'a> {
    pub fn parse(name: &'a str) -> Self {
        let lower = name.get(..8).unwrap_or(name).to_ascii_lowercase();
        if lower.starts_with("http://") || lower.starts_with("https://") {
            Source::Url(name)
        } else if lower.starts_with("file://") {
            Source::File(&name[7..])
        } else {
            Source::File(name)
        }
    }
}

/// Read a CSV resource from a file or http(s) source into memory.
pub async fn retrieve_data(source: impl AsRef<str>) -> Result<String> {
    let name = source.as_ref();
    let source = Source::parse(name);
    debug!(?source, "fetching");
    match source {
        Source::Url(url) => UrlFetcher(url).fetch().await,
        Source::File(path) => FileFetcher(path).fetch().await,
    }
}

struct UrlFetcher<'a>(pub(crate) &'a str);

#[async_trait]
impl<'a> Fetch for UrlFetcher<'a> {
    type Error = DashboardError;

    async fn fetch(&self) -> Result<String, Self::Error> {
        let unavailable = |e: reqwest::Error| DashboardError::unavailable(self.0, e);
        reqwest::get(self.0)
            .await
            .map_err(unavailable)?
            .error_for_status()
            .map_err(unavailable)?
            .text()
            .await
            .map_err(unavailable)
    }
}

struct FileFetcher<'a>(pub(crate) &'a str);

#[async_trait]
impl<'a> Fetch for FileFetcher<'a> {
    type Error = DashboardError;

    async fn fetch(&self) -> Result<String, Self::Error> {
        fs::read_to_string(self.0)
            .await
            .map_err(|e| DashboardError::unavailable(self.0, e))
    }
}
