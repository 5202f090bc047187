//! Fetch one release schedule and print the parsed rows as JSON lines.
//! Usage:
//!   cargo run --bin listing_probe -- [--scope theatrical|home] [--month <name>] [--year <yyyy>]
//! CINEVAL_LISTING_BASE overrides the site root (.env supported).

use anyhow::{anyhow, Context, Result};
use cineval::config::Settings;
use cineval::fetch::HttpFetcher;
use cineval::listing::{fetch_listing, ListingQuery};
use cineval::models::{MonthFilter, SearchScope};
use dotenvy::dotenv;
use serde_json::json;
use std::env;
use tracing_subscriber::EnvFilter;

fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn,cineval=debug"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();
}

fn parse_args() -> Result<ListingQuery> {
    let mut query = ListingQuery::default();
    let mut args = env::args().skip(1);
    while let Some(arg) = args.next() {
        let value = args
            .next()
            .with_context(|| format!("missing value for {}", arg))?;
        match arg.as_str() {
            "--scope" => {
                query.scope = match value.to_lowercase().as_str() {
                    "theatrical" => SearchScope::TheatricalReleases,
                    "home" | "home-media" => SearchScope::HomeMedia,
                    _ => return Err(anyhow!("scope must be 'theatrical' or 'home'")),
                }
            }
            "--month" => {
                query.month = MonthFilter::parse(&value)
                    .ok_or_else(|| anyhow!("unknown month '{}'", value))?
            }
            "--year" => query.year = value,
            _ => return Err(anyhow!("unknown argument '{}'", arg)),
        }
    }
    Ok(query)
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    init_tracing();

    let query = parse_args()?;
    let settings = Settings::from_env()?;
    let fetcher = HttpFetcher::new(&settings)?;

    let rows = fetch_listing(&fetcher, &settings.listing_base, &query).await?;
    for row in &rows {
        let line = json!({
            "token": row.token,
            "release_date": row.release_date,
            "title": row.title,
            "display_title": row.display_title,
            "distributor": row.distributor,
            "domestic_sales": row.domestic_sales,
            "year": row.year,
            "detail_link": row.detail_link,
        });
        println!("{}", line);
    }
    eprintln!("{} rows", rows.len());
    Ok(())
}
