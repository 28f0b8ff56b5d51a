use super::{fragment_slot, widgets, Fetch};
use crate::format::{entry_title, escape_html, relative_time, SentimentColor};
use crate::models::{entry_type_color, ChangelogEntry};
use crate::tags::TagSnapshot;
use chrono::{DateTime, Utc};

pub const DASHBOARD_LIMIT: u32 = 5;
pub const PAGE_STEP: u32 = 10;
const SKELETON_CARDS: usize = 3;

pub fn render_entry_list(
    entries: Fetch<&[ChangelogEntry]>,
    tags: &TagSnapshot,
    now: DateTime<Utc>,
) -> String {
    match entries {
        Fetch::Loading => render_skeletons(),
        Fetch::Failed(message) => format!(
            r#"<div class="card"><p class="error">Error: {}</p></div>"#,
            escape_html(&message)
        ),
        Fetch::Loaded([]) => r#"<div class="card center"><p class="muted">No changelog entries found. Create your first entry!</p></div>"#.to_string(),
        Fetch::Loaded(entries) => {
            let cards: String = entries
                .iter()
                .map(|entry| render_entry(entry, tags, now))
                .collect();
            format!(r#"<div class="grid entries">{cards}</div>"#)
        }
    }
}

pub fn render_skeletons() -> String {
    let card = r#"<div class="card skeleton-card">
        <div class="skeleton" style="height:1.5rem;width:33%"></div>
        <div class="skeleton" style="height:1rem;width:25%"></div>
        <div class="skeleton" style="height:5rem;width:100%"></div>
        <div class="skeleton" style="height:1rem;width:50%"></div>
      </div>"#;
    format!(r#"<div class="grid entries">{}</div>"#, card.repeat(SKELETON_CARDS))
}

fn render_entry(entry: &ChangelogEntry, tags: &TagSnapshot, now: DateTime<Utc>) -> String {
    let color = SentimentColor::for_score(entry.sentiment_score).css();
    let (title, full) = entry_title(&entry.content);

    let emojis: String = entry
        .emojis
        .iter()
        .map(|emoji| format!("<span>{}</span>", escape_html(emoji)))
        .collect();

    let full = match full {
        Some(content) => format!(
            r#"<p class="entry-content" style="color:{color}">{}</p>"#,
            escape_html(content)
        ),
        None => String::new(),
    };

    let badges: String = entry
        .tags
        .iter()
        .map(|id| format!(r#"<span class="badge">{}</span>"#, escape_html(tags.tag_name(id))))
        .collect();

    let mood = entry.mood.as_deref().unwrap_or("");

    format!(
        r#"<article class="card entry" data-id="{id}">
        <div class="stripe" style="background:{stripe}"></div>
        <div class="entry-head">
          <div>
            <h3>{emojis}<span class="entry-title" style="color:{color}">{title}</span></h3>
            <p class="muted">{when}</p>
          </div>
          <span class="badge outline">{mood}</span>
        </div>
        {full}
        <div class="badges">{badges}</div>
      </article>"#,
        id = escape_html(&entry.id),
        stripe = entry_type_color(&entry.entry_type),
        title = escape_html(&title),
        when = escape_html(&relative_time(&entry.created_at, now)),
        mood = escape_html(mood),
    )
}

pub fn render_dashboard() -> String {
    format!(
        r#"<section class="grid">
      {weekly}
      {mood}
      {tags}
    </section>
    <section class="field">
      <h3>Recent Changelog Entries</h3>
      {entries}
    </section>"#,
        weekly = fragment_slot("/fragments/weekly", &widgets::render_weekly(Fetch::Loading)),
        mood = fragment_slot("/fragments/mood", &widgets::render_mood(Fetch::Loading)),
        tags = fragment_slot("/fragments/recent-tags", &widgets::render_recent_tags(&TagSnapshot {
            loading: true,
            ..TagSnapshot::default()
        })),
        entries = fragment_slot(
            &format!("/fragments/entries?limit={DASHBOARD_LIMIT}"),
            &render_skeletons()
        ),
    )
}

pub fn render_changelog(limit: u32) -> String {
    let slot = fragment_slot(&format!("/fragments/entries?limit={limit}"), &render_skeletons())
        .replacen("<div class=\"slot\"", "<div id=\"entry-list\" class=\"slot\"", 1);
    format!(
        r#"<section class="entry-head">
      <h2>Changelog</h2>
      <a class="button" href="/dashboard/changelog/new">New Entry</a>
    </section>
    {slot}
    <div class="center card" style="background:transparent;border:none">
      <a class="button secondary" href="?limit={next}" data-load-more="entry-list" data-limit="{limit}">Load More</a>
    </div>"#,
        next = limit.saturating_add(PAGE_STEP),
    )
}
