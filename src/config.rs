use anyhow::{Context, Result};
use std::env;
use std::net::SocketAddr;
use std::num::NonZeroUsize;

pub const DEFAULT_LISTING_BASE: &str = "https://www.the-numbers.com";
pub const DEFAULT_RATINGS_BASE: &str = "https://www.rottentomatoes.com/m/";
const DEFAULT_BIND: &str = "127.0.0.1:3146";
const MAX_WORKERS: usize = 64;

#[derive(Debug, Clone)]
pub struct Settings {
    pub bind: SocketAddr,
    pub workers: usize,
    pub http_timeout_secs: Option<u64>,
    pub listing_base: String,
    pub ratings_base: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from(([127, 0, 0, 1], 3146)),
            workers: default_workers(),
            http_timeout_secs: None,
            listing_base: DEFAULT_LISTING_BASE.to_string(),
            ratings_base: DEFAULT_RATINGS_BASE.to_string(),
        }
    }
}

impl Settings {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let bind = var("CINEVAL_BIND")
            .unwrap_or_else(|| DEFAULT_BIND.to_string())
            .parse()
            .context("CINEVAL_BIND must be a socket address like 127.0.0.1:3146")?;
        let workers = match var("CINEVAL_WORKERS") {
            Some(v) => v
                .trim()
                .parse::<usize>()
                .context("CINEVAL_WORKERS must be a positive integer")?
                .clamp(1, MAX_WORKERS),
            None => default_workers(),
        };
        let http_timeout_secs = var("CINEVAL_HTTP_TIMEOUT_SECS")
            .map(|v| v.trim().parse::<u64>())
            .transpose()
            .context("CINEVAL_HTTP_TIMEOUT_SECS must be a number of seconds")?;
        let listing_base =
            var("CINEVAL_LISTING_BASE").unwrap_or_else(|| DEFAULT_LISTING_BASE.to_string());
        let ratings_base =
            var("CINEVAL_RATINGS_BASE").unwrap_or_else(|| DEFAULT_RATINGS_BASE.to_string());

        Ok(Self {
            bind,
            workers,
            http_timeout_secs,
            listing_base: listing_base.trim_end_matches('/').to_string(),
            ratings_base: with_trailing_slash(ratings_base),
        })
    }
}

fn with_trailing_slash(mut base: String) -> String {
    if !base.ends_with('/') {
        base.push('/');
    }
    base
}

pub fn default_workers() -> usize {
    std::thread::available_parallelism()
        .map(NonZeroUsize::get)
        .unwrap_or(4)
        .min(MAX_WORKERS)
}
