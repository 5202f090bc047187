use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use crate::extract::{ListingExtractor, PageExtractor};
use crate::fetch::PageFetcher;
use crate::models::{MonthFilter, ReleaseRow, SearchScope};

#[derive(Debug, Error)]
pub enum ListingError {
    #[error("invalid year input '{0}'")]
    InvalidYear(String),
    #[error("listing page answered HTTP {0}")]
    Status(u16),
    #[error("listing fetch failed: {0:#}")]
    Transport(#[from] anyhow::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct YearInput(Option<u16>);

impl YearInput {
    pub fn parse(input: &str) -> Result<Self, ListingError> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Ok(Self(None));
        }
        match trimmed.parse::<i64>() {
            Ok(year) if year > 1901 && year < 10000 => Ok(Self(Some(year as u16))),
            _ => Err(ListingError::InvalidYear(input.to_string())),
        }
    }

    #[cfg(test)]
    fn year(&self) -> Option<u16> {
        self.0
    }

    pub fn path_suffix(&self) -> String {
        self.0.map(|y| format!("/{}", y)).unwrap_or_default()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListingQuery {
    #[serde(default)]
    pub scope: SearchScope,
    #[serde(default)]
    pub month: MonthFilter,
    #[serde(default)]
    pub year: String,
}

pub fn listing_url(base: &str, scope: SearchScope, year: YearInput) -> String {
    format!(
        "{}{}{}",
        base.trim_end_matches('/'),
        scope.path(),
        year.path_suffix()
    )
}

pub async fn fetch_listing(
    fetcher: &dyn PageFetcher,
    base: &str,
    query: &ListingQuery,
) -> Result<Vec<ReleaseRow>, ListingError> {
    let year = YearInput::parse(&query.year)?;
    let url = listing_url(base, query.scope, year);
    info!("Fetching release schedule {}", url);

    let page = fetcher.get(&url).await?;
    if !page.is_ok() {
        return Err(ListingError::Status(page.status));
    }
    Ok(ListingExtractor::new(base, query.month).extract(&page.body))
}

pub async fn search(fetcher: &dyn PageFetcher, base: &str, query: &ListingQuery) -> Vec<ReleaseRow> {
    match fetch_listing(fetcher, base, query).await {
        Ok(rows) => {
            info!("Release schedule returned {} rows", rows.len());
            rows
        }
        Err(e) => {
            warn!("No results: {}", e);
            Vec::new()
        }
    }
}
