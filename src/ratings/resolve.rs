use anyhow::Result;
use tracing::{debug, warn};

use super::{candidate_slugs, RatingResolver};
use crate::extract::{PageExtractor, RatingsExtractor};
use crate::models::RatingResult;

impl RatingResolver {
    pub async fn resolve(&self, title: &str, year: &str) -> RatingResult {
        match self.try_resolve(title, year).await {
            Ok(result) => result,
            Err(e) => {
                warn!("Ratings lookup for '{}' failed: {:#}", title, e);
                RatingResult::not_found()
            }
        }
    }

    pub async fn try_resolve(&self, title: &str, year: &str) -> Result<RatingResult> {
        for slug in candidate_slugs(title, year) {
            let url = format!("{}{}", self.base, slug);
            let page = self.fetcher.get(&url).await?;
            if !page.is_ok() {
                debug!("{} -> HTTP {}", url, page.status);
                continue;
            }
            let scores = RatingsExtractor.extract(&page.body);
            debug!(
                "{} -> critics {:?}, audience {:?}",
                url, scores.critics, scores.audience
            );
            return Ok(RatingResult {
                critics: scores.critics,
                audience: scores.audience,
                resolved_link: Some(url),
            });
        }
        debug!("No ratings page found for '{}' ({})", title, year);
        Ok(RatingResult::not_found())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::testing::StaticFetcher;
    use crate::models::Rating;
    use std::sync::Arc;

    const BASE: &str = "https://www.rottentomatoes.com/m/";

    const PAGE: &str = r#"
<div class="mop-ratings-wrap__half"><span class="mop-ratings-wrap__percentage">83%</span></div>
<div class="mop-ratings-wrap__half audience-score"><span class="mop-ratings-wrap__percentage">90%</span></div>"#;

    #[tokio::test]
    async fn probes_candidates_in_order_until_all_fail() {
        let fetcher = Arc::new(StaticFetcher::default());
        let resolver = RatingResolver::new(fetcher.clone(), BASE);

        let result = resolver.resolve("Dune", "2021").await;

        assert_eq!(result, RatingResult::not_found());
        assert_eq!(
            fetcher.requested(),
            vec![
                "https://www.rottentomatoes.com/m/Dune",
                "https://www.rottentomatoes.com/m/Dune_2021",
                "https://www.rottentomatoes.com/m/Dune_2020",
            ]
        );
    }

    #[tokio::test]
    async fn stops_at_first_page_that_answers() {
        let fetcher = Arc::new(
            StaticFetcher::default().with_page("https://www.rottentomatoes.com/m/Dune_2021", PAGE),
        );
        let resolver = RatingResolver::new(fetcher.clone(), BASE);

        let result = resolver.resolve("Dune", "2021").await;

        assert_eq!(result.critics, Rating::Scored(83));
        assert_eq!(result.audience, Rating::Scored(90));
        assert_eq!(
            result.resolved_link.as_deref(),
            Some("https://www.rottentomatoes.com/m/Dune_2021")
        );
        assert_eq!(fetcher.requested().len(), 2);
    }

    #[tokio::test]
    async fn found_page_without_scores_is_not_rated_not_missing() {
        let html = r#"<div class="mop-ratings-wrap__half"></div><div class="mop-ratings-wrap__half audience-score"></div>"#;
        let fetcher = Arc::new(
            StaticFetcher::default().with_page("https://www.rottentomatoes.com/m/Dune_2020", html),
        );
        let result = RatingResolver::new(fetcher, BASE).resolve("Dune", "2021").await;
        assert_eq!(result.critics, Rating::NotRated);
        assert_eq!(result.audience, Rating::NotRated);
        assert!(result.resolved_link.is_some());
    }

    #[tokio::test]
    async fn transport_error_degrades_to_not_found() {
        let fetcher = Arc::new(
            StaticFetcher::default()
                .with_transport_error("https://www.rottentomatoes.com/m/Dune")
                .with_page("https://www.rottentomatoes.com/m/Dune_2021", PAGE),
        );
        let resolver = RatingResolver::new(fetcher, BASE);
        assert!(resolver.try_resolve("Dune", "2021").await.is_err());
        assert_eq!(resolver.resolve("Dune", "2021").await, RatingResult::not_found());
    }
}
