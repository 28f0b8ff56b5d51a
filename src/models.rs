use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EntryType {
    #[default]
    Highlight,
    Bug,
    Reflection,
    Insight,
    Challenge,
    Progress,
    Question,
}

impl EntryType {
    pub const ALL: [EntryType; 7] = [
        EntryType::Highlight,
        EntryType::Bug,
        EntryType::Reflection,
        EntryType::Insight,
        EntryType::Challenge,
        EntryType::Progress,
        EntryType::Question,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            EntryType::Highlight => "HIGHLIGHT",
            EntryType::Bug => "BUG",
            EntryType::Reflection => "REFLECTION",
            EntryType::Insight => "INSIGHT",
            EntryType::Challenge => "CHALLENGE",
            EntryType::Progress => "PROGRESS",
            EntryType::Question => "QUESTION",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            EntryType::Highlight => "Highlight",
            EntryType::Bug => "Bug",
            EntryType::Reflection => "Reflection",
            EntryType::Insight => "Insight",
            EntryType::Challenge => "Challenge",
            EntryType::Progress => "Progress",
            EntryType::Question => "Question",
        }
    }

    /// Accent color of the stripe drawn above an entry card.
    pub fn color(self) -> &'static str {
        match self {
            EntryType::Highlight => "#22c55e",
            EntryType::Bug => "#ef4444",
            EntryType::Reflection => "#3b82f6",
            EntryType::Insight => "#a855f7",
            EntryType::Challenge => "#f97316",
            EntryType::Progress => "#06b6d4",
            EntryType::Question => "#eab308",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Mood {
    #[default]
    Happy,
    Neutral,
    Sad,
    Excited,
    Stressed,
    Tired,
}

impl Mood {
    pub const ALL: [Mood; 6] = [
        Mood::Happy,
        Mood::Neutral,
        Mood::Sad,
        Mood::Excited,
        Mood::Stressed,
        Mood::Tired,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Mood::Happy => "HAPPY",
            Mood::Neutral => "NEUTRAL",
            Mood::Sad => "SAD",
            Mood::Excited => "EXCITED",
            Mood::Stressed => "STRESSED",
            Mood::Tired => "TIRED",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Mood::Happy => "Happy",
            Mood::Neutral => "Neutral",
            Mood::Sad => "Sad",
            Mood::Excited => "Excited",
            Mood::Stressed => "Stressed",
            Mood::Tired => "Tired",
        }
    }

    pub fn emoji(self) -> &'static str {
        match self {
            Mood::Happy => "😊",
            Mood::Neutral => "😐",
            Mood::Sad => "😢",
            Mood::Excited => "🎉",
            Mood::Stressed => "😰",
            Mood::Tired => "😴",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown value '{0}'")]
pub struct UnknownVariant(pub String);

impl FromStr for EntryType {
    type Err = UnknownVariant;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        EntryType::ALL
            .into_iter()
            .find(|kind| kind.as_str() == value)
            .ok_or_else(|| UnknownVariant(value.to_string()))
    }
}

impl FromStr for Mood {
    type Err = UnknownVariant;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Mood::ALL
            .into_iter()
            .find(|mood| mood.as_str() == value)
            .ok_or_else(|| UnknownVariant(value.to_string()))
    }
}

/// Emoji for a mood as the backend spelled it; unrecognized moods get "❓".
pub fn mood_emoji(raw: &str) -> &'static str {
    raw.parse::<Mood>().map(Mood::emoji).unwrap_or("❓")
}

pub const DEFAULT_ENTRY_TYPE_COLOR: &str = "#6b7280";

/// Stripe color for an entry type as the backend spelled it.
pub fn entry_type_color(raw: &str) -> &'static str {
    raw.parse::<EntryType>()
        .map(EntryType::color)
        .unwrap_or(DEFAULT_ENTRY_TYPE_COLOR)
}

/// A changelog entry as returned by the backend.
///
/// Mood and entry type stay raw so that values this dashboard does not know
/// still decode and fall through to the neutral color / "❓" emoji.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChangelogEntry {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    pub content: String,
    #[serde(default)]
    pub entry_type: String,
    #[serde(default)]
    pub mood: Option<String>,
    #[serde(default)]
    pub sentiment_score: f64,
    #[serde(default, rename = "gitmojis")]
    pub emojis: Vec<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    pub created_at: String,
    #[serde(default)]
    pub updated_at: Option<String>,
}

impl ChangelogEntry {
    pub fn entry_type(&self) -> Option<EntryType> {
        self.entry_type.parse().ok()
    }

    pub fn mood(&self) -> Option<Mood> {
        self.mood.as_deref().and_then(|mood| mood.parse().ok())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tag {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub user_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub username: String,
    pub role: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct NewEntryRequest {
    pub content: String,
    pub entry_type: EntryType,
    pub mood: Mood,
    pub tags: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct NewTagRequest<'a> {
    pub name: &'a str,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MoodCount {
    pub mood: String,
    pub count: usize,
}

#[derive(Debug, Serialize)]
pub struct StatsResponse {
    pub week: u32,
    pub weekly_count: usize,
    pub weekly_summary: String,
    pub moods: Vec<MoodCount>,
    pub top_mood: Option<MoodCount>,
    pub recent_tags: Vec<Tag>,
}
