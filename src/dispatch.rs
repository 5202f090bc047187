use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{error, info};

use crate::models::{RatingResult, RowToken};
use crate::ratings::RatingLookup;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RatingRequest {
    pub token: RowToken,
    pub title: String,
    pub year: String,
}

pub async fn fan_out(
    lookup: Arc<dyn RatingLookup>,
    requests: Vec<RatingRequest>,
    workers: usize,
) -> HashMap<RowToken, RatingResult> {
    let workers = workers.max(1);
    info!(
        "Fetching ratings for {} rows (workers={})",
        requests.len(),
        workers
    );

    let mut results: HashMap<RowToken, RatingResult> = requests
        .iter()
        .map(|r| (r.token.clone(), RatingResult::not_found()))
        .collect();

    let sem = Arc::new(Semaphore::new(workers));
    let mut joinset = JoinSet::new();
    for request in requests {
        let lookup = lookup.clone();
        let sem = sem.clone();
        joinset.spawn(async move {
            let _permit = sem.acquire_owned().await.ok();
            let result = lookup.lookup(&request.title, &request.year).await;
            (request.token, result)
        });
    }

    while let Some(res) = joinset.join_next().await {
        match res {
            Ok((token, result)) => {
                results.insert(token, result);
            }
            Err(e) => error!("Ratings task panicked: {}", e),
        }
    }

    results
}
