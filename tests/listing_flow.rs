use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use cineval::app::{build_router, AppState};
use cineval::config::Settings;
use cineval::fetch::{FetchedPage, PageFetcher};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tower::util::ServiceExt;

const SCHEDULE_2023: &str = "https://www.the-numbers.com/movies/release-schedule/2023";
const SCHEDULE_2024: &str = "https://www.the-numbers.com/movies/release-schedule/2024";

const SCHEDULE_2023_HTML: &str = r#"
<table>
  <tr><td colspan="4"><h3>December 2023</h3></td></tr>
  <tr id="2023-12-15">
    <td>December 15</td>
    <td><a href="/movie/Wonka">Wonka</a></td>
    <td>Warner Bros.</td>
    <td>$218,402,312</td>
  </tr>
</table>
"#;

const SCHEDULE_HTML: &str = r#"
<table>
  <tr><td colspan="4"><h3>June 2024</h3></td></tr>
  <tr id="2024-06-14">
    <td>June 14</td>
    <td><a href="/movie/Inside-Out-2">Inside Out 2</a></td>
    <td>Walt Disney</td>
    <td>$652,980,194</td>
  </tr>
  <tr>
    <td></td>
    <td>Ghostlight</td>
    <td>IFC Films</td>
    <td>&nbsp;</td>
  </tr>
  <tr><td colspan="4"><h3>July 2024</h3></td></tr>
  <tr id="2024-07-26">
    <td>July 26</td>
    <td><a href="/movie/Deadpool-and-Wolverine">Deadpool and Wolverine</a></td>
    <td>Walt Disney</td>
    <td>$636,745,858</td>
  </tr>
</table>
"#;

const INSIDE_OUT_RATINGS: &str = r#"
<div class="mop-ratings-wrap__half"><span class="mop-ratings-wrap__percentage">91%</span></div>
<div class="mop-ratings-wrap__half audience-score"><span class="mop-ratings-wrap__percentage">95%</span></div>
"#;

struct FakeSites {
    pages: HashMap<String, String>,
    requested: Mutex<Vec<String>>,
}

impl FakeSites {
    fn new() -> Self {
        let pages = HashMap::from([
            (SCHEDULE_2023.to_string(), SCHEDULE_2023_HTML.to_string()),
            (SCHEDULE_2024.to_string(), SCHEDULE_HTML.to_string()),
            (
                "https://www.rottentomatoes.com/m/Inside_Out_2_2024".to_string(),
                INSIDE_OUT_RATINGS.to_string(),
            ),
        ]);
        Self {
            pages,
            requested: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait::async_trait]
impl PageFetcher for FakeSites {
    async fn get(&self, url: &str) -> anyhow::Result<FetchedPage> {
        self.requested.lock().unwrap().push(url.to_string());
        if url.contains("Ghostlight") {
            anyhow::bail!("connection reset");
        }
        if url == SCHEDULE_2023 {
            tokio::time::sleep(Duration::from_millis(300)).await;
        }
        Ok(match self.pages.get(url) {
            Some(body) => FetchedPage {
                status: 200,
                body: body.clone(),
            },
            None => FetchedPage {
                status: 404,
                body: String::new(),
            },
        })
    }
}

fn app() -> (Router, Arc<FakeSites>) {
    let sites = Arc::new(FakeSites::new());
    let settings = Settings {
        workers: 2,
        ..Settings::default()
    };
    let state = AppState::new(&settings, sites.clone());
    (build_router(state), sites)
}

async fn send(app: &Router, req: Request<Body>) -> (StatusCode, Value) {
    let res = app.clone().oneshot(req).await.unwrap();
    let status = res.status();
    let bytes = axum::body::to_bytes(res.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn titles(value: &Value) -> Vec<String> {
    value["rows"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["title"].as_str().unwrap().to_string())
        .collect()
}

fn row<'a>(value: &'a Value, title: &str) -> &'a Value {
    value["rows"]
        .as_array()
        .unwrap()
        .iter()
        .find(|r| r["title"] == title)
        .unwrap()
}

#[tokio::test]
async fn health_is_ok() {
    let (app, _) = app();
    let res = app.clone().oneshot(get("/health")).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn search_then_rate_selected_row() {
    let (app, sites) = app();

    let (status, listed) = send(
        &app,
        post_json("/search", json!({ "scope": "TheatricalReleases", "month": "All", "year": "2024" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listed["status"], "ok");
    assert_eq!(
        titles(&listed),
        vec!["Inside Out 2", "Ghostlight", "Deadpool and Wolverine"]
    );
    assert_eq!(row(&listed, "Ghostlight")["release_date"], "June 14, 2024");
    assert_eq!(row(&listed, "Ghostlight")["has_link"], false);
    assert_eq!(row(&listed, "Inside Out 2")["tomatometer"], "");

    let token = row(&listed, "Inside Out 2")["token"].clone();
    let (status, rated) = send(&app, post_json("/ratings", json!({ "selection": [token] }))).await;
    assert_eq!(status, StatusCode::OK);
    let inside_out = row(&rated, "Inside Out 2");
    assert_eq!(inside_out["tomatometer"], "91%");
    assert_eq!(inside_out["audience_score"], "95%");
    assert_eq!(row(&rated, "Deadpool and Wolverine")["tomatometer"], "");

    let requested = sites.requested.lock().unwrap().clone();
    assert_eq!(
        &requested[1..],
        &[
            "https://www.rottentomatoes.com/m/Inside_Out_2".to_string(),
            "https://www.rottentomatoes.com/m/Inside_Out_2_2024".to_string(),
        ]
    );

    let uri = format!(
        "/rows/{}/link?column=Tomatometer",
        inside_out["token"].as_str().unwrap()
    );
    let (status, link) = send(&app, get(&uri)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(link["link"], "https://www.rottentomatoes.com/m/Inside_Out_2_2024");

    let uri = format!(
        "/rows/{}/link?column=Title",
        inside_out["token"].as_str().unwrap()
    );
    let (_, link) = send(&app, get(&uri)).await;
    assert_eq!(link["link"], "https://www.the-numbers.com/movie/Inside-Out-2");
}

#[tokio::test]
async fn rating_all_rows_absorbs_failures() {
    let (app, _) = app();
    send(&app, post_json("/search", json!({ "year": "2024" }))).await;

    let (status, rated) = send(&app, post_json("/ratings", json!({}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(rated["rows"].as_array().unwrap().len(), 3);
    assert_eq!(row(&rated, "Ghostlight")["tomatometer"], "N/A");
    assert_eq!(row(&rated, "Ghostlight")["audience_score"], "N/A");
    assert_eq!(row(&rated, "Deadpool and Wolverine")["tomatometer"], "N/A");
    assert_eq!(row(&rated, "Inside Out 2")["audience_score"], "95%");
}

#[tokio::test]
async fn sorting_toggles_between_requests() {
    let (app, _) = app();
    send(&app, post_json("/search", json!({ "year": "2024" }))).await;

    let (_, first) = send(&app, get("/rows?sort=DomesticSales")).await;
    assert_eq!(
        titles(&first),
        vec!["Inside Out 2", "Deadpool and Wolverine", "Ghostlight"]
    );
    let (_, second) = send(&app, get("/rows?sort=DomesticSales")).await;
    assert_eq!(
        titles(&second),
        vec!["Ghostlight", "Deadpool and Wolverine", "Inside Out 2"]
    );
}

#[tokio::test]
async fn bad_year_and_empty_listing_paths() {
    let (app, sites) = app();

    let (status, body) = send(&app, post_json("/search", json!({ "year": "1901" }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "no_results");
    assert!(sites.requested.lock().unwrap().is_empty());

    let (status, body) = send(&app, post_json("/ratings", json!({ "selection": [] }))).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["status"], "no_selection");
    assert_eq!(body["message"], "Please select a movie first.");

    let (_, body) = send(&app, post_json("/search", json!({ "year": "2031", "month": "March" }))).await;
    assert_eq!(body["status"], "no_results");
}

#[tokio::test]
async fn slower_older_search_does_not_replace_newer_listing() {
    let (app, _) = app();

    let older = tokio::spawn({
        let app = app.clone();
        async move { send(&app, post_json("/search", json!({ "year": "2023" }))).await }
    });
    tokio::time::sleep(Duration::from_millis(50)).await;

    let (status, newer) = send(&app, post_json("/search", json!({ "year": "2024" }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(titles(&newer).len(), 3);

    let (status, body) = older.await.unwrap();
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["status"], "superseded");

    let (_, current) = send(&app, get("/rows")).await;
    assert_eq!(
        titles(&current),
        vec!["Inside Out 2", "Ghostlight", "Deadpool and Wolverine"]
    );
}
