use crate::models::{EntryType, Mood, NewEntryRequest};
use crate::tags::TagSnapshot;

pub const CONTENT_REQUIRED: &str = "Content cannot be empty";

/// What the compose form's submit button asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Intent {
    #[default]
    Create,
    AddTag,
}

/// State of the new-entry form between round trips.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EntryDraft {
    pub content: String,
    pub entry_type: EntryType,
    pub mood: Mood,
    pub tags: Vec<String>,
    pub new_tag: String,
}

/// A posted compose form: the draft as far as it could be read, what the
/// user asked for and the first field that could not be read.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PostedDraft {
    pub draft: EntryDraft,
    pub intent: Intent,
    pub error: Option<String>,
}

impl EntryDraft {
    /// Reads the posted form. An unknown enum value keeps that field's
    /// default and is reported in `error`; it never reaches the backend.
    pub fn from_pairs<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> PostedDraft
    where
        K: AsRef<str>,
        V: Into<String> + AsRef<str>,
    {
        let mut posted = PostedDraft::default();
        let draft = &mut posted.draft;

        for (key, value) in pairs {
            match key.as_ref() {
                "content" => draft.content = value.into(),
                "entry_type" => match value.as_ref().parse() {
                    Ok(entry_type) => draft.entry_type = entry_type,
                    Err(_) => {
                        posted
                            .error
                            .get_or_insert_with(|| format!("Unknown entry type '{}'", value.as_ref()));
                    }
                },
                "mood" => match value.as_ref().parse() {
                    Ok(mood) => draft.mood = mood,
                    Err(_) => {
                        posted
                            .error
                            .get_or_insert_with(|| format!("Unknown mood '{}'", value.as_ref()));
                    }
                },
                "tags" => draft.select(value.into()),
                "new_tag" => draft.new_tag = value.into(),
                "intent" if value.as_ref() == "add_tag" => posted.intent = Intent::AddTag,
                _ => {}
            }
        }

        posted
    }

    pub fn select(&mut self, id: String) {
        if !id.is_empty() && !self.tags.contains(&id) {
            self.tags.push(id);
        }
    }

    pub fn is_selected(&self, id: &str) -> bool {
        self.tags.iter().any(|tag| tag == id)
    }

    /// Drops selected ids the cache no longer holds. Skipped while the cache
    /// is loading or failed, since its list is not trustworthy then.
    pub fn retain_known(&mut self, tags: &TagSnapshot) {
        if tags.loading || tags.error.is_some() {
            return;
        }
        self.tags.retain(|id| tags.contains(id));
    }

    pub fn to_request(&self) -> Result<NewEntryRequest, String> {
        if self.content.trim().is_empty() {
            return Err(CONTENT_REQUIRED.to_string());
        }
        Ok(NewEntryRequest {
            content: self.content.clone(),
            entry_type: self.entry_type,
            mood: self.mood,
            tags: self.tags.clone(),
        })
    }
}
