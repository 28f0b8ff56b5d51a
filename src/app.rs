use crate::handlers;
use crate::state::AppState;
use axum::{routing::{get, post}, Router};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/login", get(handlers::login))
        .route("/logout", post(handlers::logout))
        .route("/dashboard", get(handlers::dashboard))
        .route("/dashboard/changelog", get(handlers::changelog))
        .route(
            "/dashboard/changelog/new",
            get(handlers::new_entry_form).post(handlers::submit_entry),
        )
        .route(
            "/dashboard/tags",
            get(handlers::tags_page).post(handlers::create_tag),
        )
        .route("/dashboard/tags/refresh", post(handlers::refresh_tags))
        .route("/dashboard/tags/:id/delete", post(handlers::delete_tag))
        .route("/fragments/entries", get(handlers::entries_fragment))
        .route("/fragments/weekly", get(handlers::weekly_fragment))
        .route("/fragments/mood", get(handlers::mood_fragment))
        .route("/fragments/recent-tags", get(handlers::recent_tags_fragment))
        .route("/api/stats", get(handlers::get_stats))
        .with_state(state)
}
