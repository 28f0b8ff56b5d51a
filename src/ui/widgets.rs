use super::Fetch;
use crate::format::{escape_html, weekly_summary};
use crate::models::{mood_emoji, MoodCount};
use crate::stats::RECENT_TAG_COUNT;
use crate::tags::TagSnapshot;

fn stat_card(label: &str, value: &str, note: &str) -> String {
    format!(
        r#"<div class="card stat">
        <span class="label">{label}</span>
        <span class="value">{value}</span>
        <p class="muted">{note}</p>
      </div>"#
    )
}

/// "This Week's Entries". A failed count keeps the loading placeholder.
pub fn render_weekly(count: Fetch<usize>) -> String {
    match count {
        Fetch::Loaded(count) => stat_card(
            "This Week's Entries",
            &count.to_string(),
            &weekly_summary(count),
        ),
        Fetch::Loading | Fetch::Failed(_) => {
            stat_card("This Week's Entries", "...", &weekly_summary(0))
        }
    }
}

pub fn render_mood(top: Fetch<Option<&MoodCount>>) -> String {
    match top {
        Fetch::Loaded(Some(top)) => stat_card(
            "Most Common Mood",
            &format!("{} {}", mood_emoji(&top.mood), escape_html(&top.mood)),
            &format!("{} entries with this mood", top.count),
        ),
        Fetch::Loaded(None) => stat_card("Most Common Mood", "No data", "Log more entries to see stats"),
        Fetch::Loading | Fetch::Failed(_) => {
            stat_card("Most Common Mood", "...", "Log more entries to see stats")
        }
    }
}

pub fn render_recent_tags(tags: &TagSnapshot) -> String {
    let recent = tags.recent(RECENT_TAG_COUNT);
    let body = if tags.loading {
        r#"<p class="muted">Loading tags...</p>"#.to_string()
    } else if recent.is_empty() {
        r#"<p class="muted">No tags created yet</p>"#.to_string()
    } else {
        let badges: String = recent
            .iter()
            .map(|tag| format!(r#"<span class="badge outline">{}</span>"#, escape_html(&tag.name)))
            .collect();
        format!(r#"<div class="badges">{badges}</div>"#)
    };

    format!(
        r#"<div class="card stat recent-tags">
        <span class="label">Recent Tags</span>
        {body}
      </div>"#
    )
}
