use once_cell::sync::Lazy;
use reqwest::Url;
use scraper::{ElementRef, Html, Selector};
use std::collections::HashMap;
use tracing::debug;

use super::{element_text, PageExtractor};
use crate::models::{is_ambiguous_release, MonthFilter, ReleaseRow, RowToken};

static ROW: Lazy<Selector> = Lazy::new(|| Selector::parse("tr").expect("static selector"));
static HEADING: Lazy<Selector> = Lazy::new(|| Selector::parse("h3").expect("static selector"));
static ANCHOR: Lazy<Selector> = Lazy::new(|| Selector::parse("a[href]").expect("static selector"));

// month sections open with a row holding an h3, followed by one row per release
#[derive(Debug, Clone)]
pub struct ListingExtractor {
    base_url: String,
    months: MonthFilter,
}

impl ListingExtractor {
    pub fn new(base_url: impl Into<String>, months: MonthFilter) -> Self {
        Self {
            base_url: base_url.into(),
            months,
        }
    }

    fn month_selected(&self, header_text: &str) -> bool {
        self.months
            .months()
            .iter()
            .any(|m| header_text.contains(m))
    }

    fn section_rows(&self, header: ElementRef<'_>, out: &mut Vec<ReleaseRow>) {
        let header_text = header
            .select(&HEADING)
            .next()
            .map(element_text)
            .unwrap_or_default();
        let header_year = header_text
            .split_whitespace()
            .nth(1)
            .unwrap_or_default()
            .to_string();

        let mut date = String::new();
        let mut year = header_year.clone();

        for row in header.next_siblings().filter_map(ElementRef::wrap) {
            if row.value().name() != "tr" {
                continue;
            }
            if is_header(row) {
                break;
            }
            let cells: Vec<ElementRef<'_>> = row
                .children()
                .filter_map(ElementRef::wrap)
                .filter(|c| c.value().name() == "td")
                .collect();
            let Some(first) = cells.first() else { continue };
            if first.value().attr("colspan").is_some() || cells.len() < 2 {
                continue;
            }

            if let Some(id) = row.value().attr("id") {
                let text = element_text(*first);
                if is_ambiguous_release(&text) {
                    year = header_year.clone();
                    date = text;
                } else {
                    year = year_from_row_id(id).unwrap_or_else(|| header_year.clone());
                    date = format!("{}, {}", text, year);
                }
            }

            let title_cell = cells[1];
            let anchor = title_cell.select(&ANCHOR).next();
            let display_title = element_text(title_cell);
            let title = anchor
                .map(element_text)
                .filter(|t| !t.is_empty())
                .unwrap_or_else(|| display_title.clone());
            let detail_link = anchor
                .and_then(|a| a.value().attr("href"))
                .and_then(|href| self.resolve_link(href));
            let distributor = cells.get(2).map(|c| element_text(*c)).unwrap_or_default();
            let domestic_sales = cells.get(3).map(|c| element_text(*c)).unwrap_or_default();

            out.push(ReleaseRow {
                token: RowToken::from_parts(&title, &distributor),
                release_date: date.clone(),
                title,
                display_title,
                distributor,
                domestic_sales,
                detail_link,
                year: year.clone(),
            });
        }
    }

    fn resolve_link(&self, href: &str) -> Option<String> {
        let joined = Url::parse(&self.base_url).and_then(|base| base.join(href.trim()));
        match joined {
            Ok(url) => Some(url.to_string()),
            Err(e) => {
                debug!("Dropping unusable detail link {:?}: {}", href, e);
                None
            }
        }
    }
}

impl PageExtractor for ListingExtractor {
    type Output = Vec<ReleaseRow>;

    fn extract(&self, html: &str) -> Vec<ReleaseRow> {
        let doc = Html::parse_document(html);
        let mut rows = Vec::new();
        for header in doc.select(&ROW).filter(|r| is_header(*r)) {
            let text = header
                .select(&HEADING)
                .next()
                .map(element_text)
                .unwrap_or_default();
            if self.month_selected(&text) {
                self.section_rows(header, &mut rows);
            }
        }
        dedupe_tokens(&mut rows);
        rows
    }
}

fn is_header(row: ElementRef<'_>) -> bool {
    row.select(&HEADING).next().is_some()
}

fn year_from_row_id(id: &str) -> Option<String> {
    let prefix = id.split('-').next()?.trim();
    (prefix.len() == 4 && prefix.chars().all(|c| c.is_ascii_digit())).then(|| prefix.to_string())
}

fn dedupe_tokens(rows: &mut [ReleaseRow]) {
    let mut seen: HashMap<RowToken, usize> = HashMap::new();
    for row in rows.iter_mut() {
        let count = seen.entry(row.token.clone()).or_insert(0);
        *count += 1;
        if *count > 1 {
            row.token = row.token.with_suffix(*count);
        }
    }
}
