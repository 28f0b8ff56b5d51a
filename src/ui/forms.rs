use crate::backend::path_segment;
use crate::compose::EntryDraft;
use crate::format::escape_html;
use crate::models::{EntryType, Mood};
use crate::tags::TagSnapshot;

fn alert(message: Option<&str>) -> String {
    match message {
        Some(message) => format!(r#"<p class="error" role="alert">{}</p>"#, escape_html(message)),
        None => String::new(),
    }
}

fn options<T: Copy + PartialEq>(
    all: &[T],
    selected: T,
    value: impl Fn(T) -> &'static str,
    label: impl Fn(T) -> &'static str,
) -> String {
    all.iter()
        .map(|item| {
            let marker = if *item == selected { " selected" } else { "" };
            format!(
                r#"<option value="{}"{marker}>{}</option>"#,
                value(*item),
                label(*item)
            )
        })
        .collect()
}

pub fn render_new_entry(draft: &EntryDraft, tags: &TagSnapshot, error: Option<&str>) -> String {
    format!(
        r#"<section class="card">
      <h2>Create New Changelog Entry</h2>
      <p class="muted">Record what's happening in your life, just like a GitHub commit</p>
      {alert}
      <form method="post" action="/dashboard/changelog/new" class="field" data-once>
        <label class="field" for="content">What's on your mind?
          <textarea id="content" name="content" placeholder="I had a great day today..." required>{content}</textarea>
        </label>
        <div class="grid">
          <label class="field" for="entry_type">Entry Type
            <select id="entry_type" name="entry_type">{types}</select>
          </label>
          <label class="field" for="mood">Mood
            <select id="mood" name="mood">{moods}</select>
          </label>
        </div>
        <div class="field">
          <span>Tags</span>
          {selector}
        </div>
        <button type="submit" name="intent" value="create">Create Entry</button>
      </form>
    </section>"#,
        alert = alert(error),
        content = escape_html(&draft.content),
        types = options(&EntryType::ALL, draft.entry_type, EntryType::as_str, EntryType::label),
        moods = options(&Mood::ALL, draft.mood, Mood::as_str, Mood::label),
        selector = render_tag_selector(draft, tags),
    )
}

/// Tag picker inside the compose form: current selection, one toggle per
/// cached tag and an inline "create and select" field.
fn render_tag_selector(draft: &EntryDraft, tags: &TagSnapshot) -> String {
    let selected = if draft.tags.is_empty() {
        r#"<p class="muted">No tags selected</p>"#.to_string()
    } else {
        draft
            .tags
            .iter()
            .map(|id| format!(r#"<span class="badge">{}</span>"#, escape_html(tags.tag_name(id))))
            .collect()
    };

    let choices = if tags.tags.is_empty() {
        let note = if tags.loading { "Loading tags..." } else { "No tags found." };
        format!(r#"<p class="muted">{note}</p>"#)
    } else {
        tags.tags
            .iter()
            .map(|tag| {
                let checked = if draft.is_selected(&tag.id) { " checked" } else { "" };
                format!(
                    r#"<label class="toggle"><input type="checkbox" name="tags" value="{}"{checked} /> {}</label>"#,
                    escape_html(&tag.id),
                    escape_html(&tag.name)
                )
            })
            .collect()
    };

    format!(
        r#"<div class="badges selected-tags">{selected}</div>
          <div class="badges tag-choices">{choices}</div>
          {error}
          <div class="inline">
            <input type="text" name="new_tag" placeholder="Create new tag..." value="{new_tag}" />
            <button class="secondary" type="submit" name="intent" value="add_tag" formnovalidate>Add tag</button>
          </div>"#,
        error = alert(tags.error.as_deref()),
        new_tag = escape_html(&draft.new_tag),
    )
}

pub fn render_tags_page(tags: &TagSnapshot, name: &str, error: Option<&str>) -> String {
    let list = if tags.loading {
        r#"<p class="muted">Loading tags...</p>"#.to_string()
    } else if tags.tags.is_empty() {
        r#"<p class="muted">You don't have any tags yet. Create one above.</p>"#.to_string()
    } else {
        let items: String = tags
            .tags
            .iter()
            .map(|tag| {
                format!(
                    r#"<form class="badge tag-item" method="post" action="/dashboard/tags/{id}/delete">
            <span>{name}</span>
            <button class="ghost" type="submit" aria-label="Delete {name}">✕</button>
          </form>"#,
                    id = escape_html(&path_segment(&tag.id)),
                    name = escape_html(&tag.name),
                )
            })
            .collect();
        format!(r#"<div class="badges">{items}</div>"#)
    };

    format!(
        r#"<h2>Tags</h2>
    <section class="card">
      <h3>Create New Tag</h3>
      <p class="muted">Tags help you categorize your changelog entries</p>
      {form_error}
      <form class="inline" method="post" action="/dashboard/tags">
        <label class="field" for="tagName">Tag Name
          <input id="tagName" type="text" name="name" value="{name}" placeholder="e.g., work, family, health" />
        </label>
        <button type="submit">Add Tag</button>
      </form>
    </section>
    <section class="card">
      <div class="entry-head">
        <div>
          <h3>Your Tags</h3>
          <p class="muted">Manage your existing tags</p>
        </div>
        <form method="post" action="/dashboard/tags/refresh"><button class="secondary" type="submit">Refresh</button></form>
      </div>
      {cache_error}
      {list}
    </section>"#,
        form_error = alert(error),
        name = escape_html(name),
        cache_error = alert(tags.error.as_deref()),
    )
}
