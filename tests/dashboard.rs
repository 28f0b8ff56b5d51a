use axum::{
    extract::{Path, Query, State},
    http::{header::AUTHORIZATION, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{delete, get},
    Json, Router,
};
use chrono::Utc;
use githappy::{stats::current_week, tags::TagCache, AppState, BackendClient};
use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};
use reqwest::{header, redirect::Policy, Client};
use serde_json::{json, Value};
use std::{collections::HashMap, sync::Arc, time::Duration};
use tokio::{net::TcpListener, sync::Mutex, time::sleep};

const TOKEN: &str = "secret";

/// What the fake changelog API holds and what it was asked.
#[derive(Default)]
struct MockData {
    tags: Vec<Value>,
    entries: Vec<Value>,
    created: Vec<Value>,
    tag_creates: usize,
    tag_fetches: usize,
    weeks: Vec<u32>,
    limits: Vec<Option<String>>,
    fail_entries: bool,
    slow_first_tag_fetch: bool,
}

type Mock = Arc<Mutex<MockData>>;

fn authorized(headers: &HeaderMap) -> bool {
    let expected = format!("Bearer {TOKEN}");
    headers.get(AUTHORIZATION).and_then(|value| value.to_str().ok()) == Some(expected.as_str())
}

fn rejected() -> Response {
    (StatusCode::UNAUTHORIZED, Json(json!({ "detail": "Not authenticated" }))).into_response()
}

async fn list_tags(State(mock): State<Mock>, headers: HeaderMap) -> Response {
    if !authorized(&headers) {
        return rejected();
    }
    let (tags, slow) = {
        let mut data = mock.lock().await;
        data.tag_fetches += 1;
        (data.tags.clone(), data.slow_first_tag_fetch && data.tag_fetches == 1)
    };
    if slow {
        sleep(Duration::from_millis(400)).await;
    }
    Json(tags).into_response()
}

async fn create_tag(State(mock): State<Mock>, headers: HeaderMap, Json(body): Json<Value>) -> Response {
    if !authorized(&headers) {
        return rejected();
    }
    let mut data = mock.lock().await;
    data.tag_creates += 1;
    let tag = json!({
        "id": format!("new{}", data.tag_creates),
        "name": body["name"],
        "user_id": "u1",
    });
    data.tags.push(tag.clone());
    Json(tag).into_response()
}

async fn delete_tag(State(mock): State<Mock>, headers: HeaderMap, Path(id): Path<String>) -> Response {
    if !authorized(&headers) {
        return rejected();
    }
    let mut data = mock.lock().await;
    let before = data.tags.len();
    data.tags.retain(|tag| tag["id"] != id.as_str());
    if data.tags.len() == before {
        return (StatusCode::NOT_FOUND, Json(json!({ "detail": "Tag not found" }))).into_response();
    }
    StatusCode::NO_CONTENT.into_response()
}

async fn list_entries(
    State(mock): State<Mock>,
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    if !authorized(&headers) {
        return rejected();
    }
    let mut data = mock.lock().await;
    data.limits.push(query.get("limit").cloned());
    if data.fail_entries {
        return (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({ "detail": "boom" }))).into_response();
    }
    let limit = query
        .get("limit")
        .and_then(|limit| limit.parse().ok())
        .unwrap_or(usize::MAX);
    let entries: Vec<Value> = data.entries.iter().take(limit).cloned().collect();
    Json(entries).into_response()
}

async fn week_entries(State(mock): State<Mock>, headers: HeaderMap, Path(week): Path<u32>) -> Response {
    if !authorized(&headers) {
        return rejected();
    }
    let mut data = mock.lock().await;
    data.weeks.push(week);
    Json(data.entries.clone()).into_response()
}

async fn create_entry(State(mock): State<Mock>, headers: HeaderMap, Json(body): Json<Value>) -> Response {
    if !authorized(&headers) {
        return rejected();
    }
    match body["content"].as_str() {
        Some("reject") => {
            return (StatusCode::BAD_REQUEST, Json(json!({ "detail": "Content rejected" }))).into_response();
        }
        Some("invalid") => {
            return (
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(json!({ "detail": [{ "msg": "field required" }] })),
            )
                .into_response();
        }
        _ => {}
    }
    let mut data = mock.lock().await;
    let mut created = body.clone();
    created["_id"] = json!(format!("e{}", data.created.len() + 1));
    created["created_at"] = json!(Utc::now().to_rfc3339());
    data.created.push(body);
    Json(created).into_response()
}

fn mock_router(mock: Mock) -> Router {
    Router::new()
        .route("/api/tags/", get(list_tags).post(create_tag))
        .route("/api/tags/:id", delete(delete_tag))
        .route("/api/changelog/", get(list_entries).post(create_entry))
        .route("/api/changelog/week/:week", get(week_entries))
        .with_state(mock)
}

async fn serve(router: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{addr}")
}

struct TestApp {
    base_url: String,
    backend_url: String,
    mock: Mock,
    state: AppState,
    client: Client,
}

impl TestApp {
    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    async fn get(&self, path: &str) -> reqwest::Response {
        self.client
            .get(self.url(path))
            .header(header::COOKIE, session_cookie())
            .send()
            .await
            .unwrap()
    }

    async fn get_text(&self, path: &str) -> String {
        self.get(path).await.text().await.unwrap()
    }

    async fn post_form(&self, path: &str, body: &[(&str, &str)]) -> reqwest::Response {
        self.client
            .post(self.url(path))
            .header(header::COOKIE, session_cookie())
            .form(body)
            .send()
            .await
            .unwrap()
    }
}

async fn spawn_app(mock: MockData) -> TestApp {
    let mock: Mock = Arc::new(Mutex::new(mock));
    let backend_url = serve(mock_router(Arc::clone(&mock))).await;
    let state = AppState::new(BackendClient::new(backend_url.clone()));
    let base_url = serve(githappy::router(state.clone())).await;
    let client = Client::builder().redirect(Policy::none()).build().unwrap();
    TestApp {
        base_url,
        backend_url,
        mock,
        state,
        client,
    }
}

fn session_cookie() -> String {
    let user = json!({ "id": "u1", "username": "ada", "role": "user" }).to_string();
    format!(
        "token={TOKEN}; user={}",
        utf8_percent_encode(&user, NON_ALPHANUMERIC)
    )
}

fn tag(id: &str, name: &str) -> Value {
    json!({ "id": id, "name": name, "user_id": "u1" })
}

fn entry(id: &str, content: &str, mood: &str, tags: &[&str]) -> Value {
    json!({
        "_id": id,
        "content": content,
        "entry_type": "HIGHLIGHT",
        "mood": mood,
        "sentiment_score": 0.6,
        "gitmojis": ["✨"],
        "tags": tags,
        "created_at": Utc::now().to_rfc3339(),
        "user_id": "u1",
    })
}

#[tokio::test]
async fn root_follows_the_session() {
    let app = spawn_app(MockData::default()).await;

    let anonymous = app.client.get(app.url("/")).send().await.unwrap();
    assert_eq!(anonymous.status(), reqwest::StatusCode::SEE_OTHER);
    assert_eq!(anonymous.headers()[header::LOCATION], "/login");

    let signed_in = app.get("/").await;
    assert_eq!(signed_in.headers()[header::LOCATION], "/dashboard");
}

#[tokio::test]
async fn dashboard_shell_names_the_user_and_its_widgets() {
    let app = spawn_app(MockData::default()).await;

    let html = app.get_text("/dashboard").await;
    assert!(html.contains("Signed in as <strong>ada</strong>"));
    for src in [
        "/fragments/weekly",
        "/fragments/mood",
        "/fragments/recent-tags",
        "/fragments/entries?limit=5",
    ] {
        assert!(html.contains(&format!(r#"data-src="{src}""#)), "{src}");
    }
}

#[tokio::test]
async fn entries_fragment_resolves_tag_names() {
    let long = "Shipped the new onboarding flow after three weeks of pairing with design";
    let app = spawn_app(MockData {
        tags: vec![tag("t1", "work")],
        entries: vec![
            entry("e1", long, "EXCITED", &["t1", "gone"]),
            entry("e2", "Quiet day", "TIRED", &[]),
            entry("e3", "Read a book", "HAPPY", &[]),
        ],
        ..MockData::default()
    })
    .await;

    let html = app.get_text("/fragments/entries?limit=2").await;
    assert_eq!(html.matches(r#"class="card entry""#).count(), 2);
    assert!(html.contains(">work<"));
    assert!(html.contains(">unknown<"));
    assert!(html.contains(&format!("{}...", &long[..60])));
    assert!(html.contains(long));
    assert!(!html.contains("Read a book"));
    assert_eq!(app.mock.lock().await.limits, [Some("2".to_string())]);
}

#[tokio::test]
async fn entries_fragment_reports_failure_and_emptiness() {
    let app = spawn_app(MockData::default()).await;
    let empty = app.get_text("/fragments/entries").await;
    assert!(empty.contains("No changelog entries found. Create your first entry!"));

    app.mock.lock().await.fail_entries = true;
    let failed = app.get("/fragments/entries").await;
    assert_eq!(failed.status(), reqwest::StatusCode::OK);
    assert!(failed
        .text()
        .await
        .unwrap()
        .contains("Error: Failed to fetch changelog entries"));
}

#[tokio::test]
async fn changelog_page_grows_by_ten() {
    let app = spawn_app(MockData::default()).await;

    let html = app.get_text("/dashboard/changelog?limit=20").await;
    assert!(html.contains(r#"data-src="/fragments/entries?limit=20""#));
    assert!(html.contains(r#"href="?limit=30""#));
}

#[tokio::test]
async fn stat_widgets_use_week_and_mood_counts() {
    let app = spawn_app(MockData {
        entries: vec![
            entry("e1", "a", "TIRED", &[]),
            entry("e2", "b", "HAPPY", &[]),
            entry("e3", "c", "TIRED", &[]),
        ],
        ..MockData::default()
    })
    .await;

    let weekly = app.get_text("/fragments/weekly").await;
    assert!(weekly.contains("3 entries this week"));
    assert_eq!(app.mock.lock().await.weeks, [current_week()]);

    let mood = app.get_text("/fragments/mood").await;
    assert!(mood.contains("😴 TIRED"));
    assert!(mood.contains("2 entries with this mood"));
}

#[tokio::test]
async fn api_stats_summarizes_everything() {
    let app = spawn_app(MockData {
        tags: (1..=7).map(|n| tag(&format!("t{n}"), &format!("tag{n}"))).collect(),
        entries: vec![
            entry("e1", "a", "HAPPY", &[]),
            entry("e2", "b", "", &[]),
            entry("e3", "c", "SAD", &[]),
            entry("e4", "d", "SAD", &[]),
        ],
        ..MockData::default()
    })
    .await;

    let stats: Value = app.get("/api/stats").await.json().await.unwrap();
    assert_eq!(stats["week"], current_week());
    assert_eq!(stats["weekly_count"], 4);
    assert_eq!(stats["weekly_summary"], "4 entries this week");
    assert_eq!(
        stats["moods"],
        json!([
            { "mood": "HAPPY", "count": 1 },
            { "mood": "UNKNOWN", "count": 1 },
            { "mood": "SAD", "count": 2 },
        ])
    );
    assert_eq!(stats["top_mood"], json!({ "mood": "SAD", "count": 2 }));
    let recent: Vec<&str> = stats["recent_tags"]
        .as_array()
        .unwrap()
        .iter()
        .map(|tag| tag["name"].as_str().unwrap())
        .collect();
    assert_eq!(recent, ["tag1", "tag2", "tag3", "tag4", "tag5"]);
}

#[tokio::test]
async fn tags_are_created_listed_and_deleted() {
    let app = spawn_app(MockData {
        tags: vec![tag("t1", "family")],
        ..MockData::default()
    })
    .await;

    let created = app.post_form("/dashboard/tags", &[("name", "  work  ")]).await;
    assert_eq!(created.headers()[header::LOCATION], "/dashboard/tags");
    assert_eq!(app.mock.lock().await.tags[1]["name"], "work");

    let recent = app.get_text("/fragments/recent-tags").await;
    assert!(recent.contains(">family<"));
    assert!(recent.contains(">work<"));

    let deleted = app.post_form("/dashboard/tags/t1/delete", &[]).await;
    assert_eq!(deleted.headers()[header::LOCATION], "/dashboard/tags");
    let page = app.get_text("/dashboard/tags").await;
    assert!(!page.contains("<span>family</span>"));
    assert!(page.contains("<span>work</span>"));
    assert!(!page.contains(r#"role="alert""#));

    // The backend no longer knows t1, so a second delete fails and is shown.
    app.post_form("/dashboard/tags/t1/delete", &[]).await;
    assert!(app.get_text("/dashboard/tags").await.contains("Failed to delete tag"));
}

#[tokio::test]
async fn blank_tag_name_never_reaches_the_backend() {
    let app = spawn_app(MockData::default()).await;

    let response = app.post_form("/dashboard/tags", &[("name", "   ")]).await;
    assert_eq!(response.status(), reqwest::StatusCode::UNPROCESSABLE_ENTITY);
    assert!(response.text().await.unwrap().contains("Tag name cannot be empty"));
    assert_eq!(app.mock.lock().await.tag_creates, 0);
}

#[tokio::test]
async fn compose_adds_and_selects_a_new_tag() {
    let app = spawn_app(MockData {
        tags: vec![tag("t1", "work")],
        ..MockData::default()
    })
    .await;

    let response = app
        .post_form(
            "/dashboard/changelog/new",
            &[
                ("content", "Half written"),
                ("mood", "STRESSED"),
                ("tags", "t1"),
                ("new_tag", "reading"),
                ("intent", "add_tag"),
            ],
        )
        .await;
    assert_eq!(response.status(), reqwest::StatusCode::OK);
    let html = response.text().await.unwrap();
    assert!(html.contains("Half written"));
    assert!(html.contains(r#"<option value="STRESSED" selected>"#));
    assert!(html.contains(r#"value="t1" checked"#));
    assert!(html.contains(r#"value="new1" checked"#));
    assert!(html.contains(r#"<span class="badge">reading</span>"#));
    assert!(app.mock.lock().await.created.is_empty());
}

#[tokio::test]
async fn compose_creates_an_entry() {
    let app = spawn_app(MockData {
        tags: vec![tag("t1", "work")],
        ..MockData::default()
    })
    .await;

    let response = app
        .post_form(
            "/dashboard/changelog/new",
            &[
                ("content", "Fixed the flaky build"),
                ("entry_type", "BUG"),
                ("mood", "EXCITED"),
                ("tags", "t1"),
                ("intent", "create"),
            ],
        )
        .await;
    assert_eq!(response.status(), reqwest::StatusCode::SEE_OTHER);
    assert_eq!(response.headers()[header::LOCATION], "/dashboard/changelog");
    assert_eq!(
        app.mock.lock().await.created,
        [json!({
            "content": "Fixed the flaky build",
            "entry_type": "BUG",
            "mood": "EXCITED",
            "tags": ["t1"],
        })]
    );
}

#[tokio::test]
async fn compose_surfaces_backend_and_local_errors() {
    let app = spawn_app(MockData::default()).await;

    let blank = app
        .post_form("/dashboard/changelog/new", &[("content", "  ")])
        .await;
    assert_eq!(blank.status(), reqwest::StatusCode::UNPROCESSABLE_ENTITY);
    assert!(blank.text().await.unwrap().contains("Content cannot be empty"));

    let unknown = app
        .post_form(
            "/dashboard/changelog/new",
            &[
                ("content", "Kept after a bad mood"),
                ("entry_type", "QUESTION"),
                ("mood", "GRUMPY"),
            ],
        )
        .await;
    assert_eq!(unknown.status(), reqwest::StatusCode::UNPROCESSABLE_ENTITY);
    let html = unknown.text().await.unwrap();
    assert!(html.contains("Unknown mood &#39;GRUMPY&#39;"));
    assert!(html.contains(">Kept after a bad mood</textarea>"));
    assert!(html.contains(r#"<option value="QUESTION" selected>"#));

    let rejected = app
        .post_form("/dashboard/changelog/new", &[("content", "reject")])
        .await;
    assert_eq!(rejected.status(), reqwest::StatusCode::BAD_GATEWAY);
    let html = rejected.text().await.unwrap();
    assert!(html.contains("Content rejected"));
    assert!(html.contains(">reject</textarea>"));

    let invalid = app
        .post_form("/dashboard/changelog/new", &[("content", "invalid")])
        .await;
    assert!(invalid.text().await.unwrap().contains("Failed to create entry"));

    assert!(app.mock.lock().await.created.is_empty());
}

#[tokio::test]
async fn logout_expires_cookies_and_drops_the_tag_cache() {
    let app = spawn_app(MockData::default()).await;
    app.get("/fragments/recent-tags").await;
    assert_eq!(app.state.tags.len().await, 1);

    let response = app.post_form("/logout", &[]).await;
    assert_eq!(response.headers()[header::LOCATION], "/login");
    let cookies: Vec<&str> = response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .map(|value| value.to_str().unwrap())
        .collect();
    assert_eq!(cookies, ["token=; Path=/; Max-Age=0", "user=; Path=/; Max-Age=0"]);
    assert!(app.state.tags.is_empty().await);
}

#[tokio::test]
async fn rejected_token_shows_fetch_error() {
    let app = spawn_app(MockData {
        tags: vec![tag("t1", "work")],
        ..MockData::default()
    })
    .await;

    let html = app
        .client
        .get(app.url("/dashboard/tags"))
        .header(header::COOKIE, "token=wrong")
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(html.contains("Failed to fetch tags"));
    assert!(!html.contains("<span>work</span>"));
    assert!(app.state.tags.is_empty().await);

    app.get("/fragments/recent-tags").await;
    assert_eq!(app.state.tags.len().await, 1);
}

#[tokio::test]
async fn tag_ids_travel_percent_encoded() {
    let app = spawn_app(MockData {
        tags: vec![tag("a/b c", "odd"), tag("t2", "plain")],
        ..MockData::default()
    })
    .await;

    let page = app.get_text("/dashboard/tags").await;
    assert!(page.contains(r#"action="/dashboard/tags/a%2Fb%20c/delete""#));

    let deleted = app.post_form("/dashboard/tags/a%2Fb%20c/delete", &[]).await;
    assert_eq!(deleted.headers()[header::LOCATION], "/dashboard/tags");
    let remaining: Vec<Value> = app.mock.lock().await.tags.clone();
    assert_eq!(remaining, [tag("t2", "plain")]);
    assert!(!app.get_text("/dashboard/tags").await.contains("Failed to delete tag"));
}

#[tokio::test]
async fn stale_tag_fetch_is_discarded() {
    let app = spawn_app(MockData {
        tags: vec![tag("t1", "old")],
        slow_first_tag_fetch: true,
        ..MockData::default()
    })
    .await;
    let cache = Arc::new(TagCache::new(BackendClient::new(app.backend_url.clone()), TOKEN));

    let slow = tokio::spawn({
        let cache = Arc::clone(&cache);
        async move { cache.refresh_tags().await }
    });
    // Let the first request reach the backend before the list changes.
    sleep(Duration::from_millis(100)).await;
    assert!(cache.snapshot().await.loading);
    app.mock.lock().await.tags = vec![tag("t2", "new")];

    cache.refresh_tags().await;
    slow.await.unwrap();

    let snapshot = cache.snapshot().await;
    assert_eq!(snapshot.tags.len(), 1);
    assert_eq!(snapshot.tags[0].name, "new");
    assert!(!snapshot.loading);
    assert!(snapshot.error.is_none());
}
