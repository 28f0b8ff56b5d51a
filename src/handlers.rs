use crate::compose::{EntryDraft, Intent, PostedDraft};
use crate::errors::AppError;
use crate::format::weekly_summary;
use crate::models::{MoodCount, StatsResponse};
use crate::session::Session;
use crate::state::AppState;
use crate::stats::{current_week, mood_distribution, top_mood, RECENT_TAG_COUNT};
use crate::tags::TagSnapshot;
use crate::ui::{
    self,
    entries::{render_changelog, render_dashboard, render_entry_list, PAGE_STEP},
    forms::{render_new_entry, render_tags_page},
    widgets::{render_mood, render_recent_tags, render_weekly},
    Fetch, Nav,
};
use axum::{
    extract::{Path, Query, RawForm, State},
    http::{header::SET_COOKIE, StatusCode},
    response::{AppendHeaders, Html, IntoResponse, Redirect, Response},
    Form, Json,
};
use chrono::Utc;
use serde::Deserialize;
use tracing::{info, warn};

pub const ENTRIES_FAILED: &str = "Failed to fetch changelog entries";
pub const CREATE_ENTRY_FAILED: &str = "Failed to create entry";
pub const TAG_NAME_REQUIRED: &str = "Tag name cannot be empty";

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub limit: Option<u32>,
}

impl ListQuery {
    fn limit(&self) -> u32 {
        self.limit.unwrap_or(PAGE_STEP).max(1)
    }
}

#[derive(Debug, Deserialize)]
pub struct TagForm {
    #[serde(default)]
    pub name: String,
}

/// Pages answer a missing credential with a trip to the sign-in page.
fn page_token(session: &Session) -> Result<&str, Redirect> {
    session.token().ok_or_else(|| Redirect::to("/login"))
}

/// Fragments and JSON answer a missing credential with 401.
fn api_token(session: &Session) -> Result<&str, AppError> {
    session.token().ok_or_else(AppError::unauthorized)
}

fn page(title: &str, nav: Nav, session: &Session, body: &str) -> Html<String> {
    Html(ui::render_page(title, nav, session.user(), body))
}

pub async fn index(session: Session) -> Redirect {
    if session.is_authenticated() {
        Redirect::to("/dashboard")
    } else {
        Redirect::to("/login")
    }
}

pub async fn login() -> Html<String> {
    Html(ui::render_login())
}

pub async fn logout(State(state): State<AppState>, mut session: Session) -> impl IntoResponse {
    if let Some(token) = session.token() {
        state.tags.evict(token).await;
        info!("session logged out");
    }
    let [token_cookie, user_cookie] = session.logout();
    (
        AppendHeaders([(SET_COOKIE, token_cookie), (SET_COOKIE, user_cookie)]),
        Redirect::to("/login"),
    )
}

pub async fn dashboard(session: Session) -> Result<Html<String>, Redirect> {
    page_token(&session)?;
    Ok(page("Dashboard", Nav::Dashboard, &session, &render_dashboard()))
}

pub async fn changelog(
    session: Session,
    Query(query): Query<ListQuery>,
) -> Result<Html<String>, Redirect> {
    page_token(&session)?;
    Ok(page(
        "Changelog",
        Nav::Changelog,
        &session,
        &render_changelog(query.limit()),
    ))
}

pub async fn new_entry_form(
    State(state): State<AppState>,
    session: Session,
) -> Result<Response, Redirect> {
    let token = page_token(&session)?;
    let tags = state.tags.for_token(token).await.snapshot().await;
    Ok(compose_page(&session, &EntryDraft::default(), &tags, None, StatusCode::OK))
}

pub async fn submit_entry(
    State(state): State<AppState>,
    session: Session,
    RawForm(body): RawForm,
) -> Result<Response, Redirect> {
    let token = page_token(&session)?;
    let cache = state.tags.for_token(token).await;

    let PostedDraft {
        mut draft,
        intent,
        error,
    } = EntryDraft::from_pairs(form_urlencoded::parse(&body));
    if let Some(message) = error {
        let tags = cache.snapshot().await;
        return Ok(compose_page(
            &session,
            &draft,
            &tags,
            Some(&message),
            StatusCode::UNPROCESSABLE_ENTITY,
        ));
    }

    match intent {
        Intent::AddTag => {
            let name = draft.new_tag.trim().to_string();
            if !name.is_empty() {
                if let Some(tag) = cache.create_tag(&name).await {
                    draft.select(tag.id);
                    draft.new_tag.clear();
                }
            }
            let tags = cache.snapshot().await;
            draft.retain_known(&tags);
            Ok(compose_page(&session, &draft, &tags, None, StatusCode::OK))
        }
        Intent::Create => {
            let request = match draft.to_request() {
                Ok(request) => request,
                Err(message) => {
                    let tags = cache.snapshot().await;
                    return Ok(compose_page(
                        &session,
                        &draft,
                        &tags,
                        Some(&message),
                        StatusCode::UNPROCESSABLE_ENTITY,
                    ));
                }
            };

            match state.backend.create_entry(token, &request).await {
                Ok(entry) => {
                    info!(id = %entry.id, "changelog entry created");
                    Ok(Redirect::to("/dashboard/changelog").into_response())
                }
                Err(err) => {
                    let message = err.detail().unwrap_or(CREATE_ENTRY_FAILED).to_string();
                    let tags = cache.snapshot().await;
                    Ok(compose_page(
                        &session,
                        &draft,
                        &tags,
                        Some(&message),
                        StatusCode::BAD_GATEWAY,
                    ))
                }
            }
        }
    }
}

fn compose_page(
    session: &Session,
    draft: &EntryDraft,
    tags: &TagSnapshot,
    error: Option<&str>,
    status: StatusCode,
) -> Response {
    let body = render_new_entry(draft, tags, error);
    (status, page("New Entry", Nav::Changelog, session, &body)).into_response()
}

pub async fn tags_page(
    State(state): State<AppState>,
    session: Session,
) -> Result<Html<String>, Redirect> {
    let token = page_token(&session)?;
    let tags = state.tags.for_token(token).await.snapshot().await;
    Ok(page("Tags", Nav::Tags, &session, &render_tags_page(&tags, "", None)))
}

pub async fn create_tag(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<TagForm>,
) -> Result<Response, Redirect> {
    let token = page_token(&session)?;
    let cache = state.tags.for_token(token).await;

    let name = form.name.trim();
    if name.is_empty() {
        let tags = cache.snapshot().await;
        let body = render_tags_page(&tags, &form.name, Some(TAG_NAME_REQUIRED));
        return Ok((
            StatusCode::UNPROCESSABLE_ENTITY,
            page("Tags", Nav::Tags, &session, &body),
        )
            .into_response());
    }

    // A failure is recorded in the cache and shown on the tags page.
    cache.create_tag(name).await;
    Ok(Redirect::to("/dashboard/tags").into_response())
}

pub async fn delete_tag(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<String>,
) -> Result<Redirect, Redirect> {
    let token = page_token(&session)?;
    state.tags.for_token(token).await.delete_tag(&id).await;
    Ok(Redirect::to("/dashboard/tags"))
}

pub async fn refresh_tags(
    State(state): State<AppState>,
    session: Session,
) -> Result<Redirect, Redirect> {
    let token = page_token(&session)?;
    state.tags.for_token(token).await.refresh_tags().await;
    Ok(Redirect::to("/dashboard/tags"))
}

pub async fn entries_fragment(
    State(state): State<AppState>,
    session: Session,
    Query(query): Query<ListQuery>,
) -> Result<Html<String>, AppError> {
    let token = api_token(&session)?;
    let cache = state.tags.for_token(token).await;

    let result = state.backend.list_entries(token, Some(query.limit())).await;
    let tags = cache.snapshot().await;
    let html = match &result {
        Ok(entries) => render_entry_list(Fetch::Loaded(entries.as_slice()), &tags, Utc::now()),
        Err(err) => {
            warn!("failed to fetch changelog entries: {err}");
            render_entry_list(Fetch::Failed(ENTRIES_FAILED.to_string()), &tags, Utc::now())
        }
    };
    Ok(Html(html))
}

pub async fn weekly_fragment(
    State(state): State<AppState>,
    session: Session,
) -> Result<Html<String>, AppError> {
    let token = api_token(&session)?;
    let count = match state.backend.week_entries(token, current_week()).await {
        Ok(entries) => Fetch::Loaded(entries.len()),
        Err(err) => {
            warn!("failed to fetch weekly entries: {err}");
            Fetch::Failed(err.to_string())
        }
    };
    Ok(Html(render_weekly(count)))
}

pub async fn mood_fragment(
    State(state): State<AppState>,
    session: Session,
) -> Result<Html<String>, AppError> {
    let token = api_token(&session)?;
    let html = match state.backend.list_entries(token, None).await {
        Ok(entries) => {
            let distribution = mood_distribution(&entries);
            render_mood(Fetch::Loaded(top_mood(&distribution)))
        }
        Err(err) => {
            warn!("failed to fetch entries for mood stats: {err}");
            render_mood(Fetch::Failed(err.to_string()))
        }
    };
    Ok(Html(html))
}

pub async fn recent_tags_fragment(
    State(state): State<AppState>,
    session: Session,
) -> Result<Html<String>, AppError> {
    let token = api_token(&session)?;
    let tags = state.tags.for_token(token).await.snapshot().await;
    Ok(Html(render_recent_tags(&tags)))
}

pub async fn get_stats(
    State(state): State<AppState>,
    session: Session,
) -> Result<Json<StatsResponse>, AppError> {
    let token = api_token(&session)?;
    let week = current_week();

    let (weekly, all, cache) = tokio::join!(
        state.backend.week_entries(token, week),
        state.backend.list_entries(token, None),
        state.tags.for_token(token),
    );
    let weekly = weekly.map_err(|err| AppError::backend("Failed to fetch weekly stats", err))?;
    let all = all.map_err(|err| AppError::backend("Failed to fetch entries", err))?;

    let moods = mood_distribution(&all);
    let top_mood: Option<MoodCount> = top_mood(&moods).cloned();
    let recent_tags = cache.snapshot().await.recent(RECENT_TAG_COUNT).to_vec();

    Ok(Json(StatsResponse {
        week,
        weekly_count: weekly.len(),
        weekly_summary: weekly_summary(weekly.len()),
        moods,
        top_mood,
        recent_tags,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::BackendClient;
    use std::io;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl io::Write for Captured {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl Captured {
        fn text(&self) -> String {
            String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
        }
    }

    #[tokio::test]
    async fn failed_widget_fetches_are_logged() {
        let logs = Captured::default();
        let writer = logs.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish();
        let _guard = tracing::subscriber::set_default(subscriber);

        // Nothing listens on the discard port.
        let state = AppState::new(BackendClient::new("http://127.0.0.1:9"));
        let session = || Session::from_cookie_header("token=abc");

        let html = entries_fragment(
            State(state.clone()),
            session(),
            Query(ListQuery { limit: None }),
        )
        .await
        .unwrap();
        assert!(html.0.contains(ENTRIES_FAILED));
        weekly_fragment(State(state.clone()), session()).await.unwrap();
        mood_fragment(State(state), session()).await.unwrap();

        let logs = logs.text();
        assert!(logs.contains("failed to fetch changelog entries"), "{logs}");
        assert!(logs.contains("failed to fetch weekly entries"), "{logs}");
        assert!(logs.contains("failed to fetch entries for mood stats"), "{logs}");
    }
}
