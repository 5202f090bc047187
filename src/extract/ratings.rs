use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};

use super::{element_text, PageExtractor};
use crate::models::Rating;
use crate::normalize::parse_percent;

static CRITICS_BLOCK: Lazy<Selector> = Lazy::new(|| {
    Selector::parse(".mop-ratings-wrap__half:not(.audience-score)").expect("static selector")
});
static AUDIENCE_BLOCK: Lazy<Selector> = Lazy::new(|| {
    Selector::parse(".mop-ratings-wrap__half.audience-score").expect("static selector")
});
static PERCENTAGE: Lazy<Selector> =
    Lazy::new(|| Selector::parse(".mop-ratings-wrap__percentage").expect("static selector"));
static SCORE_BOARD: Lazy<Selector> =
    Lazy::new(|| Selector::parse("score-board").expect("static selector"));

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScrapedScores {
    pub critics: Rating,
    pub audience: Rating,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct RatingsExtractor;

impl PageExtractor for RatingsExtractor {
    type Output = ScrapedScores;

    fn extract(&self, html: &str) -> ScrapedScores {
        let doc = Html::parse_document(html);
        let critics_block = doc.select(&CRITICS_BLOCK).next();
        let audience_block = doc.select(&AUDIENCE_BLOCK).next();

        if critics_block.is_none() && audience_block.is_none() {
            if let Some(board) = doc.select(&SCORE_BOARD).next() {
                return ScrapedScores {
                    critics: score_attr(board, "tomatometerscore"),
                    audience: score_attr(board, "audiencescore"),
                };
            }
        }

        ScrapedScores {
            critics: block_score(critics_block),
            audience: block_score(audience_block),
        }
    }
}

fn block_score(block: Option<ElementRef<'_>>) -> Rating {
    let Some(block) = block else {
        return Rating::NotFound;
    };
    block
        .select(&PERCENTAGE)
        .next()
        .and_then(|p| parse_percent(&element_text(p)))
        .map_or(Rating::NotRated, Rating::Scored)
}

fn score_attr(board: ElementRef<'_>, name: &str) -> Rating {
    match board.value().attr(name) {
        None => Rating::NotFound,
        Some(v) => parse_percent(v).map_or(Rating::NotRated, Rating::Scored),
    }
}
