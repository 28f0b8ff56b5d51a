use chrono::{DateTime, NaiveDateTime, Utc};

pub const TITLE_LIMIT: usize = 60;

/// Title line of an entry card, plus the full text when the title had to be
/// cut.
pub fn entry_title(content: &str) -> (String, Option<&str>) {
    match content.char_indices().nth(TITLE_LIMIT) {
        Some((cut, _)) => (format!("{}...", &content[..cut]), Some(content)),
        None => (content.to_string(), None),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SentimentColor {
    VeryPositive,
    Positive,
    Neutral,
    Negative,
    VeryNegative,
}

impl SentimentColor {
    pub fn for_score(score: f64) -> Self {
        if score > 0.5 {
            SentimentColor::VeryPositive
        } else if score > 0.1 {
            SentimentColor::Positive
        } else if score > -0.1 {
            SentimentColor::Neutral
        } else if score > -0.5 {
            SentimentColor::Negative
        } else {
            SentimentColor::VeryNegative
        }
    }

    pub fn css(self) -> &'static str {
        match self {
            SentimentColor::VeryPositive => "#22c55e",
            SentimentColor::Positive => "#4ade80",
            SentimentColor::Neutral => "#6b7280",
            SentimentColor::Negative => "#f87171",
            SentimentColor::VeryNegative => "#ef4444",
        }
    }
}

pub fn weekly_summary(count: usize) -> String {
    match count {
        0 => "No entries this week".to_string(),
        1 => "1 entry this week".to_string(),
        n => format!("{n} entries this week"),
    }
}

/// Backend timestamps come with or without an offset; bare ones are UTC.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc())
}

/// "3 hours ago" style distance between `raw` and `now`. Unparsable
/// timestamps are shown as they came.
pub fn relative_time(raw: &str, now: DateTime<Utc>) -> String {
    let Some(at) = parse_timestamp(raw) else {
        return raw.to_string();
    };
    let seconds = (now - at).num_seconds();
    let distance = distance_words(seconds.unsigned_abs());
    if seconds >= 0 {
        format!("{distance} ago")
    } else {
        format!("in {distance}")
    }
}

fn distance_words(seconds: u64) -> String {
    const MINUTE: u64 = 60;
    const HOUR: u64 = 60 * MINUTE;
    const DAY: u64 = 24 * HOUR;
    const MONTH: u64 = 30 * DAY;
    const YEAR: u64 = 365 * DAY;

    let minutes = (seconds + 30) / MINUTE;
    match seconds {
        s if s < 30 => "less than a minute".to_string(),
        s if s < 90 => "1 minute".to_string(),
        s if s < 45 * MINUTE => format!("{minutes} minutes"),
        s if s < 90 * MINUTE => "about 1 hour".to_string(),
        s if s < DAY => format!("about {} hours", (s + HOUR / 2) / HOUR),
        s if s < 42 * HOUR => "1 day".to_string(),
        s if s < MONTH => format!("{} days", (s + DAY / 2) / DAY),
        s if s < 45 * DAY => "about 1 month".to_string(),
        s if s < 60 * DAY => "about 2 months".to_string(),
        s if s < YEAR => format!("{} months", (s + MONTH / 2) / MONTH),
        s => match s / YEAR {
            1 => "about 1 year".to_string(),
            years => format!("about {years} years"),
        },
    }
}

pub fn escape_html(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    #[test]
    fn short_content_is_its_own_title() {
        let content = "a".repeat(60);
        let (title, full) = entry_title(&content);
        assert_eq!(title, content);
        assert_eq!(full, None);
        assert_eq!(entry_title(""), (String::new(), None));
    }

    #[test]
    fn long_content_is_cut_at_sixty_chars() {
        let content = "b".repeat(61);
        let (title, full) = entry_title(&content);
        assert_eq!(title, format!("{}...", "b".repeat(60)));
        assert_eq!(full, Some(content.as_str()));
    }

    #[test]
    fn truncation_counts_characters_not_bytes() {
        let content = "é".repeat(70);
        let (title, full) = entry_title(&content);
        assert_eq!(title.chars().count(), 63);
        assert!(title.starts_with(&"é".repeat(60)));
        assert!(full.is_some());
    }

    #[test]
    fn sentiment_thresholds_partition_the_line() {
        use SentimentColor::*;
        let cases = [
            (f64::INFINITY, VeryPositive),
            (0.51, VeryPositive),
            (0.5, Positive),
            (0.11, Positive),
            (0.1, Neutral),
            (0.0, Neutral),
            (-0.1, Negative),
            (-0.49, Negative),
            (-0.5, VeryNegative),
            (f64::NEG_INFINITY, VeryNegative),
            (f64::NAN, VeryNegative),
        ];
        for (score, expected) in cases {
            assert_eq!(SentimentColor::for_score(score), expected, "{score}");
        }
    }

    #[test]
    fn weekly_summary_phrasing() {
        assert_eq!(weekly_summary(0), "No entries this week");
        assert_eq!(weekly_summary(1), "1 entry this week");
        assert_eq!(weekly_summary(7), "7 entries this week");
    }

    #[test]
    fn relative_time_reads_like_prose() {
        let now = Utc.with_ymd_and_hms(2026, 10, 18, 12, 0, 0).unwrap();
        let at = |delta: Duration| (now - delta).to_rfc3339();
        assert_eq!(relative_time(&at(Duration::seconds(10)), now), "less than a minute ago");
        assert_eq!(relative_time(&at(Duration::minutes(5)), now), "5 minutes ago");
        assert_eq!(relative_time(&at(Duration::hours(3)), now), "about 3 hours ago");
        assert_eq!(relative_time(&at(Duration::days(4)), now), "4 days ago");
        assert_eq!(relative_time(&at(Duration::days(400)), now), "about 1 year ago");
        assert_eq!(relative_time("2026-10-18T11:00:00", now), "about 1 hour ago");
        assert_eq!(relative_time("yesterday", now), "yesterday");
    }

    #[test]
    fn escapes_markup() {
        assert_eq!(
            escape_html(r#"<b class="x">Tom & Jerry's</b>"#),
            "&lt;b class=&quot;x&quot;&gt;Tom &amp; Jerry&#39;s&lt;/b&gt;"
        );
    }
}
