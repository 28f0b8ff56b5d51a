use crate::models::{ChangelogEntry, MoodCount};
use chrono::{Datelike, Local, NaiveDate};

pub const UNKNOWN_MOOD: &str = "UNKNOWN";
pub const RECENT_TAG_COUNT: usize = 5;

pub fn current_week() -> u32 {
    week_number(Local::now().date_naive())
}

/// ISO-8601 week: weeks start on Monday and week 1 holds the year's first
/// Thursday.
pub fn week_number(date: NaiveDate) -> u32 {
    date.iso_week().week()
}

/// Counts entries per mood in first-seen order. Entries without a mood land
/// in the `UNKNOWN` bucket.
pub fn mood_distribution(entries: &[ChangelogEntry]) -> Vec<MoodCount> {
    let mut counts: Vec<MoodCount> = Vec::new();
    for entry in entries {
        let mood = entry
            .mood
            .as_deref()
            .filter(|mood| !mood.is_empty())
            .unwrap_or(UNKNOWN_MOOD);
        match counts.iter_mut().find(|count| count.mood == mood) {
            Some(count) => count.count += 1,
            None => counts.push(MoodCount {
                mood: mood.to_string(),
                count: 1,
            }),
        }
    }
    counts
}

/// Most frequent mood; on a tie the mood seen first wins.
pub fn top_mood(distribution: &[MoodCount]) -> Option<&MoodCount> {
    distribution
        .iter()
        .fold(None, |best: Option<&MoodCount>, current| match best {
            Some(best) if best.count >= current.count => Some(best),
            _ => Some(current),
        })
}
