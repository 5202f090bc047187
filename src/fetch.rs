use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

use crate::config::Settings;

#[derive(Debug, Clone)]
pub struct FetchedPage {
    pub status: u16,
    pub body: String,
}

impl FetchedPage {
    pub fn is_ok(&self) -> bool {
        self.status == 200
    }
}

// any HTTP status, including non-200, is a successful fetch
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn get(&self, url: &str) -> Result<FetchedPage>;
}

#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(settings: &Settings) -> Result<Self> {
        let user_agent = format!("cineval/{}", env!("CARGO_PKG_VERSION"));
        let mut builder = Client::builder()
            .connect_timeout(Duration::from_secs(5))
            .user_agent(user_agent);
        if let Some(secs) = settings.http_timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let client = builder.build().context("Failed to build HTTP client")?;
        Ok(Self { client })
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn get(&self, url: &str) -> Result<FetchedPage> {
        let res = self
            .client
            .get(url)
            .send()
            .await
            .with_context(|| format!("GET {} failed", url))?;
        let status = res.status().as_u16();
        // Pages are served as UTF-8 regardless of what the headers claim.
        let bytes = res.bytes().await.context("reading body failed")?;
        Ok(FetchedPage {
            status,
            body: String::from_utf8_lossy(&bytes).into_owned(),
        })
    }
}
