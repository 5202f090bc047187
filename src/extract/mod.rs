mod listing;
mod ratings;

pub use listing::ListingExtractor;
pub use ratings::{RatingsExtractor, ScrapedScores};

use scraper::ElementRef;

pub trait PageExtractor {
    type Output;

    fn extract(&self, html: &str) -> Self::Output;
}

// &nbsp; counts as whitespace, so a placeholder-only cell comes back empty
pub(crate) fn element_text(el: ElementRef<'_>) -> String {
    let raw: String = el.text().collect();
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}
