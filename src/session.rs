use std::collections::{HashMap, HashSet};
use thiserror::Error;
use tracing::{debug, info};

use crate::dispatch::RatingRequest;
use crate::models::{Column, Rating, RatingResult, ReleaseRow, RowToken};
use crate::normalize::{sort_rows, ColumnValues};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Listing,
    RatingsPending,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchOutcome {
    NoResults,
    Listed(usize),
    // a later search was started before this one finished
    Superseded,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeOutcome {
    Merged(usize),
    Stale,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("Please select a movie first.")]
    NoSelection,
}

#[derive(Debug, Clone)]
pub struct RatingsTicket {
    pub generation: u64,
    pub requests: Vec<RatingRequest>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionRow {
    pub release: ReleaseRow,
    pub rating: RatingResult,
}

impl ColumnValues for SessionRow {
    fn text(&self, column: Column) -> String {
        match column {
            Column::ReleaseDate => self.release.release_date.clone(),
            Column::Title => self.release.display_title.clone(),
            Column::Distributor => self.release.distributor.clone(),
            Column::DomesticSales => self.release.domestic_sales.clone(),
            Column::Tomatometer | Column::AudienceScore => self.rating(column).to_string(),
        }
    }

    fn rating(&self, column: Column) -> Rating {
        match column {
            Column::AudienceScore => self.rating.audience,
            _ => self.rating.critics,
        }
    }
}

#[derive(Debug)]
pub struct ListingSession {
    state: SessionState,
    generation: u64,
    search_seq: u64,
    order: Vec<RowToken>,
    rows: HashMap<RowToken, SessionRow>,
    // next direction per column; first activation sorts descending
    descending_next: HashMap<Column, bool>,
}

impl Default for ListingSession {
    fn default() -> Self {
        Self::new()
    }
}

impl ListingSession {
    pub fn new() -> Self {
        Self {
            state: SessionState::Idle,
            generation: 0,
            search_seq: 0,
            order: Vec::new(),
            rows: HashMap::new(),
            descending_next: HashMap::new(),
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn begin_search(&mut self) -> u64 {
        self.search_seq += 1;
        self.search_seq
    }

    // a result from any search but the latest one is dropped
    pub fn apply_search(&mut self, seq: u64, rows: Vec<ReleaseRow>) -> SearchOutcome {
        if seq != self.search_seq {
            info!(
                "Discarding {} rows from search #{} (latest is #{})",
                rows.len(),
                seq,
                self.search_seq
            );
            return SearchOutcome::Superseded;
        }
        self.generation += 1;
        self.order.clear();
        self.rows.clear();
        self.descending_next.clear();

        for release in rows {
            let token = release.token.clone();
            if self.rows.contains_key(&token) {
                debug!("Skipping duplicate row token {}", token);
                continue;
            }
            self.order.push(token.clone());
            self.rows.insert(
                token,
                SessionRow {
                    release,
                    rating: RatingResult::default(),
                },
            );
        }

        if self.order.is_empty() {
            self.state = SessionState::Idle;
            info!("Search returned no results");
            SearchOutcome::NoResults
        } else {
            self.state = SessionState::Listing;
            info!("Listing {} releases", self.order.len());
            SearchOutcome::Listed(self.order.len())
        }
    }

    pub fn begin_ratings(&mut self, selection: &[RowToken]) -> Result<RatingsTicket, SessionError> {
        let tokens: Vec<&RowToken> = if selection.is_empty() {
            self.order.iter().collect()
        } else {
            let mut seen = HashSet::new();
            selection
                .iter()
                .filter(|t| self.rows.contains_key(*t) && seen.insert(*t))
                .collect()
        };
        if tokens.is_empty() {
            return Err(SessionError::NoSelection);
        }

        let requests = tokens
            .into_iter()
            .filter_map(|t| self.rows.get(t))
            .map(|row| RatingRequest {
                token: row.release.token.clone(),
                title: row.release.title.clone(),
                year: row.release.year.clone(),
            })
            .collect::<Vec<_>>();

        self.state = SessionState::RatingsPending;
        Ok(RatingsTicket {
            generation: self.generation,
            requests,
        })
    }

    pub fn apply_ratings(
        &mut self,
        generation: u64,
        results: HashMap<RowToken, RatingResult>,
    ) -> MergeOutcome {
        if generation != self.generation {
            info!(
                "Discarding {} ratings from a replaced listing",
                results.len()
            );
            return MergeOutcome::Stale;
        }

        let mut merged = 0;
        for (token, result) in results {
            if let Some(row) = self.rows.get_mut(&token) {
                row.rating = result;
                merged += 1;
            }
        }
        self.state = SessionState::Listing;
        MergeOutcome::Merged(merged)
    }

    pub fn sort_by(&mut self, column: Column) {
        let next = self.descending_next.entry(column).or_insert(true);
        let descending = *next;
        *next = !descending;

        let mut rows: Vec<&SessionRow> = self.order.iter().filter_map(|t| self.rows.get(t)).collect();
        sort_rows(&mut rows, column, descending);
        self.order = rows.into_iter().map(|r| r.release.token.clone()).collect();
        debug!(
            "Sorted by {} ({})",
            column.header(),
            if descending { "descending" } else { "ascending" }
        );
    }

    pub fn rows(&self) -> impl Iterator<Item = &SessionRow> {
        self.order.iter().filter_map(|t| self.rows.get(t))
    }

    pub fn row(&self, token: &RowToken) -> Option<&SessionRow> {
        self.rows.get(token)
    }

    // rating columns open the ratings page, everything else the detail page
    pub fn link_for(&self, token: &RowToken, column: Column) -> Option<&str> {
        let row = self.rows.get(token)?;
        if column.is_rating() {
            row.rating.resolved_link.as_deref()
        } else {
            row.release.detail_link.as_deref()
        }
    }
}
