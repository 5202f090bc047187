use serde::{Deserialize, Serialize};
use std::fmt;

pub const AMBIGUOUS_RELEASES: [&str; 6] = ["Spring", "Summer", "Fall", "Winter", "During", "TBD"];

pub static MONTHS: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

pub fn is_ambiguous_release(date: &str) -> bool {
    AMBIGUOUS_RELEASES.iter().any(|tag| date.contains(tag))
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RowToken(String);

impl RowToken {
    pub fn from_parts(title: &str, distributor: &str) -> Self {
        let raw: String = title
            .chars()
            .chain(distributor.chars())
            .filter(|c| !c.is_whitespace())
            .collect();
        Self(raw)
    }

    pub(crate) fn with_suffix(&self, n: usize) -> Self {
        Self(format!("{}#{}", self.0, n))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for RowToken {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl fmt::Display for RowToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseRow {
    pub token: RowToken,
    pub release_date: String,
    pub title: String,
    pub display_title: String,
    pub distributor: String,
    pub domestic_sales: String,
    pub detail_link: Option<String>,
    pub year: String,
}

// variant order is the sort order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum Rating {
    #[default]
    Unresolved,
    NotFound,
    NotRated,
    Scored(u8),
}

impl fmt::Display for Rating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rating::Unresolved => Ok(()),
            Rating::NotFound => f.write_str("N/A"),
            Rating::NotRated => f.write_str("Not rated"),
            Rating::Scored(n) => write!(f, "{}%", n),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RatingResult {
    pub critics: Rating,
    pub audience: Rating,
    pub resolved_link: Option<String>,
}

impl RatingResult {
    pub fn not_found() -> Self {
        Self {
            critics: Rating::NotFound,
            audience: Rating::NotFound,
            resolved_link: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SearchScope {
    #[default]
    #[serde(alias = "theatrical", alias = "Theatrical releases")]
    TheatricalReleases,
    #[serde(alias = "home_media", alias = "Home media")]
    HomeMedia,
}

impl SearchScope {
    pub fn path(&self) -> &'static str {
        match self {
            SearchScope::TheatricalReleases => "/movies/release-schedule",
            SearchScope::HomeMedia => "/home-market/release-schedule",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MonthFilter {
    #[default]
    All,
    Month(usize),
}

impl MonthFilter {
    pub fn parse(input: &str) -> Option<Self> {
        let input = input.trim();
        if input.is_empty() || input.eq_ignore_ascii_case("all") {
            return Some(MonthFilter::All);
        }
        MONTHS
            .iter()
            .position(|m| m.eq_ignore_ascii_case(input))
            .map(MonthFilter::Month)
    }

    pub fn months(&self) -> &'static [&'static str] {
        match *self {
            MonthFilter::All => &MONTHS,
            MonthFilter::Month(i) => MONTHS.get(i..=i).unwrap_or_default(),
        }
    }
}

impl Serialize for MonthFilter {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            MonthFilter::All => serializer.serialize_str("All"),
            MonthFilter::Month(i) => serializer.serialize_str(MONTHS.get(*i).copied().unwrap_or("All")),
        }
    }
}

impl<'de> Deserialize<'de> for MonthFilter {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        MonthFilter::parse(&s)
            .ok_or_else(|| serde::de::Error::custom(format!("unknown month '{}'", s)))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Column {
    #[serde(alias = "Release Date", alias = "release_date")]
    ReleaseDate,
    #[serde(alias = "title")]
    Title,
    #[serde(alias = "distributor")]
    Distributor,
    #[serde(alias = "Domestic Sales", alias = "domestic_sales")]
    DomesticSales,
    #[serde(alias = "tomatometer")]
    Tomatometer,
    #[serde(alias = "Audience Score", alias = "audience_score")]
    AudienceScore,
}

impl Column {
    pub fn header(&self) -> &'static str {
        match self {
            Column::ReleaseDate => "Release Date",
            Column::Title => "Title",
            Column::Distributor => "Distributor",
            Column::DomesticSales => "Domestic Sales",
            Column::Tomatometer => "Tomatometer",
            Column::AudienceScore => "Audience Score",
        }
    }

    pub fn is_rating(&self) -> bool {
        matches!(self, Column::Tomatometer | Column::AudienceScore)
    }
}
