use async_trait::async_trait;
use std::sync::Arc;

mod resolve;
mod slug;

pub use slug::{candidate_slugs, title_slug};

use crate::fetch::PageFetcher;
use crate::models::RatingResult;

// lookups never fail; anything that goes wrong degrades to not_found()
#[async_trait]
pub trait RatingLookup: Send + Sync {
    async fn lookup(&self, title: &str, year: &str) -> RatingResult;
}

#[derive(Clone)]
pub struct RatingResolver {
    fetcher: Arc<dyn PageFetcher>,
    base: String,
}

impl RatingResolver {
    pub fn new(fetcher: Arc<dyn PageFetcher>, base: impl Into<String>) -> Self {
        Self {
            fetcher,
            base: base.into(),
        }
    }
}

#[async_trait]
impl RatingLookup for RatingResolver {
    async fn lookup(&self, title: &str, year: &str) -> RatingResult {
        self.resolve(title, year).await
    }
}
