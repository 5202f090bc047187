use chrono::NaiveDate;
use std::cmp::Ordering;

use crate::models::{is_ambiguous_release, Column, Rating};

const DATE_FORMAT: &str = "%B %d, %Y";

pub fn date_key(date: &str) -> NaiveDate {
    if is_ambiguous_release(date) || date.split_whitespace().count() != 3 {
        return NaiveDate::MIN;
    }
    NaiveDate::parse_from_str(date.trim(), DATE_FORMAT).unwrap_or(NaiveDate::MIN)
}

pub fn sales_value(sales: &str) -> u64 {
    // trim() also drops the U+00A0 placeholder used for "nothing reported"
    let cleaned: String = sales
        .trim()
        .chars()
        .filter(|c| *c != '$' && *c != ',')
        .collect();
    if cleaned.is_empty() {
        return 0;
    }
    cleaned.parse().unwrap_or(0)
}

pub fn rating_key(rating: &Rating) -> i32 {
    match rating {
        Rating::Unresolved => -3,
        Rating::NotFound => -2,
        Rating::NotRated => -1,
        Rating::Scored(n) => i32::from(*n),
    }
}

#[cfg(test)]
fn parse_rating_text(text: &str) -> Rating {
    match text.trim() {
        "" => Rating::Unresolved,
        "N/A" => Rating::NotFound,
        "Not rated" => Rating::NotRated,
        other => parse_percent(other).map_or(Rating::NotRated, Rating::Scored),
    }
}

pub(crate) fn parse_percent(text: &str) -> Option<u8> {
    let digits = text.trim().trim_end_matches('%').trim();
    let value: u16 = digits.parse().ok()?;
    u8::try_from(value).ok().filter(|v| *v <= 100)
}

pub trait ColumnValues {
    fn text(&self, column: Column) -> String;
    fn rating(&self, column: Column) -> Rating;
}

impl<T: ColumnValues> ColumnValues for &T {
    fn text(&self, column: Column) -> String {
        (**self).text(column)
    }
    fn rating(&self, column: Column) -> Rating {
        (**self).rating(column)
    }
}

pub fn compare_by_column<T: ColumnValues>(a: &T, b: &T, column: Column) -> Ordering {
    match column {
        Column::ReleaseDate => date_key(&a.text(column)).cmp(&date_key(&b.text(column))),
        Column::DomesticSales => sales_value(&a.text(column)).cmp(&sales_value(&b.text(column))),
        Column::Tomatometer | Column::AudienceScore => {
            rating_key(&a.rating(column)).cmp(&rating_key(&b.rating(column)))
        }
        Column::Title | Column::Distributor => a.text(column).cmp(&b.text(column)),
    }
}

pub fn sort_rows<T: ColumnValues>(rows: &mut [T], column: Column, descending: bool) {
    rows.sort_by(|a, b| {
        let ord = compare_by_column(a, b, column);
        if descending {
            ord.reverse()
        } else {
            ord
        }
    });
}
