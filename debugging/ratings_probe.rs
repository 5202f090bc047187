//! Show the slugs tried for a title and the ratings that come back.
//! Usage:
//!   cargo run --bin ratings_probe -- "<title>" [<year>]
//! RUST_LOG controls resolver logging (default shows each probed slug).
//! CINEVAL_RATINGS_BASE overrides the ratings site (.env supported).

use anyhow::{Context, Result};
use cineval::config::Settings;
use cineval::fetch::HttpFetcher;
use cineval::ratings::{candidate_slugs, RatingResolver};
use dotenvy::dotenv;
use std::env;
use std::sync::Arc;
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

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    init_tracing();

    let mut args = env::args().skip(1);
    let title = args.next().context("usage: ratings_probe <title> [year]")?;
    let year = args.next().unwrap_or_default();

    let settings = Settings::from_env()?;
    for slug in candidate_slugs(&title, &year) {
        println!("candidate: {}{}", settings.ratings_base, slug);
    }

    let fetcher = Arc::new(HttpFetcher::new(&settings)?);
    let resolver = RatingResolver::new(fetcher, settings.ratings_base.clone());
    let result = resolver.try_resolve(&title, &year).await?;

    println!("tomatometer:    {}", result.critics);
    println!("audience score: {}", result.audience);
    println!(
        "page:           {}",
        result.resolved_link.as_deref().unwrap_or("(not found)")
    );
    Ok(())
}
