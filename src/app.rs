use anyhow::Result;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;
use tokio::sync::Mutex;
use tower_http::{limit::RequestBodyLimitLayer, trace::TraceLayer};
use tracing::{error, info, warn};

use crate::config::Settings;
use crate::dispatch;
use crate::fetch::{HttpFetcher, PageFetcher};
use crate::listing::{self, ListingQuery};
use crate::models::{Column, RowToken};
use crate::ratings::{RatingLookup, RatingResolver};
use crate::session::{ListingSession, MergeOutcome, SearchOutcome, SessionRow};

const MAX_BODY_BYTES: usize = 64 * 1024;

#[derive(Clone)]
pub struct AppState {
    pub session: Arc<Mutex<ListingSession>>,
    pub fetcher: Arc<dyn PageFetcher>,
    pub lookup: Arc<dyn RatingLookup>,
    pub listing_base: String,
    pub workers: usize,
}

impl AppState {
    pub fn new(settings: &Settings, fetcher: Arc<dyn PageFetcher>) -> Self {
        let lookup: Arc<dyn RatingLookup> = Arc::new(RatingResolver::new(
            fetcher.clone(),
            settings.ratings_base.clone(),
        ));
        Self {
            session: Arc::new(Mutex::new(ListingSession::new())),
            fetcher,
            lookup,
            listing_base: settings.listing_base.clone(),
            workers: settings.workers,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RowView {
    pub token: RowToken,
    pub release_date: String,
    pub title: String,
    pub distributor: String,
    pub domestic_sales: String,
    pub tomatometer: String,
    pub audience_score: String,
    pub has_link: bool,
}

impl From<&SessionRow> for RowView {
    fn from(row: &SessionRow) -> Self {
        Self {
            token: row.release.token.clone(),
            release_date: row.release.release_date.clone(),
            title: row.release.display_title.clone(),
            distributor: row.release.distributor.clone(),
            domestic_sales: row.release.domestic_sales.clone(),
            tomatometer: row.rating.critics.to_string(),
            audience_score: row.rating.audience.to_string(),
            has_link: row.release.detail_link.is_some(),
        }
    }
}

pub async fn run_server(settings: Settings) -> Result<()> {
    let fetcher: Arc<dyn PageFetcher> = Arc::new(HttpFetcher::new(&settings)?);
    let state = AppState::new(&settings, fetcher);
    let app = build_router(state);

    info!("Listening on {} (ratings workers={})", settings.bind, settings.workers);
    let listener = tokio::net::TcpListener::bind(settings.bind).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/search", post(handle_search))
        .route("/ratings", post(handle_ratings))
        .route("/rows", get(handle_rows))
        .route("/rows/:token/link", get(handle_link))
        .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health() -> &'static str {
    "OK"
}

fn rows_json(session: &ListingSession) -> Value {
    let rows: Vec<RowView> = session.rows().map(RowView::from).collect();
    json!({ "status": "ok", "rows": rows })
}

async fn handle_search(
    State(state): State<AppState>,
    Json(query): Json<ListingQuery>,
) -> (StatusCode, Json<Value>) {
    let seq = state.session.lock().await.begin_search();
    let rows = listing::search(state.fetcher.as_ref(), &state.listing_base, &query).await;

    let mut session = state.session.lock().await;
    match session.apply_search(seq, rows) {
        SearchOutcome::NoResults => (
            StatusCode::OK,
            Json(json!({ "status": "no_results", "message": "No results." })),
        ),
        SearchOutcome::Listed(_) => (StatusCode::OK, Json(rows_json(&session))),
        SearchOutcome::Superseded => (
            StatusCode::CONFLICT,
            Json(json!({ "status": "superseded", "message": "A newer search replaced this one." })),
        ),
    }
}

#[derive(Debug, Default, Deserialize)]
struct RatingsBody {
    #[serde(default)]
    selection: Vec<RowToken>,
}

async fn handle_ratings(
    State(state): State<AppState>,
    Json(body): Json<RatingsBody>,
) -> (StatusCode, Json<Value>) {
    let ticket = {
        let mut session = state.session.lock().await;
        match session.begin_ratings(&body.selection) {
            Ok(ticket) => ticket,
            Err(e) => {
                warn!("Ratings requested without anything to rate");
                return (
                    StatusCode::UNPROCESSABLE_ENTITY,
                    Json(json!({ "status": "no_selection", "message": e.to_string() })),
                );
            }
        }
    };

    // The session stays unlocked while lookups run so a new search can replace it.
    let results = dispatch::fan_out(state.lookup.clone(), ticket.requests, state.workers).await;

    let mut session = state.session.lock().await;
    match session.apply_ratings(ticket.generation, results) {
        MergeOutcome::Merged(n) => {
            info!("Merged ratings for {} rows", n);
            (StatusCode::OK, Json(rows_json(&session)))
        }
        MergeOutcome::Stale => (
            StatusCode::CONFLICT,
            Json(json!({ "status": "stale", "message": "Listing changed before ratings arrived." })),
        ),
    }
}

#[derive(Debug, Deserialize)]
struct RowsQuery {
    sort: Option<Column>,
}

async fn handle_rows(
    State(state): State<AppState>,
    Query(query): Query<RowsQuery>,
) -> Json<Value> {
    let mut session = state.session.lock().await;
    if let Some(column) = query.sort {
        session.sort_by(column);
    }
    Json(rows_json(&session))
}

#[derive(Debug, Deserialize)]
struct LinkQuery {
    column: Column,
}

async fn handle_link(
    State(state): State<AppState>,
    Path(token): Path<String>,
    Query(query): Query<LinkQuery>,
) -> (StatusCode, Json<Value>) {
    let session = state.session.lock().await;
    match session.link_for(&RowToken::from(token.as_str()), query.column) {
        Some(link) => (StatusCode::OK, Json(json!({ "link": link }))),
        None => (StatusCode::NOT_FOUND, Json(json!({ "link": null }))),
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut term) => {
                term.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Shutdown signal received (Ctrl+C)");
        }
        _ = terminate => {
            info!("Shutdown signal received (SIGTERM)");
        }
    }
}
