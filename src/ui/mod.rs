//! Server-rendered HTML for the dashboard pages and their widget fragments.
//!
//! Pages are shells: widgets that need their own backend call sit in a
//! placeholder (`data-src`) that the page script swaps for the fragment once
//! it arrives, so each widget loads, succeeds or fails on its own.

pub mod entries;
pub mod forms;
pub mod widgets;

use crate::format::escape_html;
use crate::models::User;

/// Loading state of a widget's data.
#[derive(Debug, Clone, PartialEq)]
pub enum Fetch<T> {
    Loading,
    Loaded(T),
    Failed(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Nav {
    Dashboard,
    Changelog,
    Tags,
}

const NAV_ITEMS: [(Nav, &str, &str); 3] = [
    (Nav::Dashboard, "Dashboard", "/dashboard"),
    (Nav::Changelog, "Changelog", "/dashboard/changelog"),
    (Nav::Tags, "Tags", "/dashboard/tags"),
];

pub fn render_page(title: &str, active: Nav, user: Option<&User>, body: &str) -> String {
    let nav: String = NAV_ITEMS
        .iter()
        .map(|(item, label, href)| {
            let class = if *item == active { "nav-link active" } else { "nav-link" };
            format!(r#"<a class="{class}" href="{href}">{label}</a>"#)
        })
        .collect();

    let who = match user {
        Some(user) => format!(
            r#"<span class="who">Signed in as <strong>{}</strong></span>"#,
            escape_html(&user.username)
        ),
        None => String::new(),
    };

    fill(
        PAGE_HTML,
        &[
            ("STYLE", STYLE),
            ("TITLE", &escape_html(title)),
            ("NAV", &nav),
            ("USER", &who),
            ("BODY", body),
        ],
    )
}

pub fn render_login() -> String {
    let body = r#"<section class="card center">
      <h2>You are signed out</h2>
      <p class="muted">Sign in through the GitHappy service to track your life like a GitHub project.</p>
    </section>"#;
    fill(LOGIN_HTML, &[("STYLE", STYLE), ("BODY", body)])
}

/// Substitutes `{{NAME}}` placeholders in one pass over `template`; inserted
/// values are never scanned again.
fn fill(template: &str, values: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(start) = rest.find("{{") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let value = after.find("}}").and_then(|end| {
            let name = &after[..end];
            values
                .iter()
                .find(|(key, _)| *key == name)
                .map(|(_, value)| (*value, end))
        });
        match value {
            Some((value, end)) => {
                out.push_str(value);
                rest = &after[end + 2..];
            }
            None => {
                out.push_str("{{");
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}

/// Placeholder that the page script replaces with the fragment at `src`.
pub fn fragment_slot(src: &str, placeholder: &str) -> String {
    format!(
        r#"<div class="slot" data-src="{}">{placeholder}</div>"#,
        escape_html(src)
    )
}

const STYLE: &str = r#"
    @import url('https://fonts.googleapis.com/css2?family=Space+Grotesk:wght@400;500;600&family=Fraunces:wght@600&display=swap');

    :root {
      --bg-1: #f8f3e6;
      --bg-2: #f5d3a7;
      --ink: #2b2a28;
      --muted: #7a746d;
      --accent: #ff6b4a;
      --accent-2: #2f4858;
      --card: rgba(255, 255, 255, 0.86);
      --shadow: 0 24px 60px rgba(47, 72, 88, 0.18);
    }

    * {
      box-sizing: border-box;
    }

    body {
      margin: 0;
      min-height: 100vh;
      background: radial-gradient(circle at top, var(--bg-2), transparent 60%),
        linear-gradient(135deg, var(--bg-1), #ffe9d4 60%, #f9f2e9 100%);
      color: var(--ink);
      font-family: "Space Grotesk", "Trebuchet MS", sans-serif;
      padding: 32px 18px 48px;
    }

    .app {
      width: min(960px, 100%);
      margin: 0 auto;
      background: var(--card);
      backdrop-filter: blur(12px);
      border-radius: 28px;
      box-shadow: var(--shadow);
      padding: 36px;
      display: grid;
      gap: 28px;
    }

    header {
      display: flex;
      flex-wrap: wrap;
      align-items: center;
      justify-content: space-between;
      gap: 12px;
    }

    h1 {
      font-family: "Fraunces", "Georgia", serif;
      font-weight: 600;
      font-size: clamp(1.8rem, 4vw, 2.4rem);
      margin: 0;
    }

    h2, h3 {
      margin: 0;
    }

    nav {
      display: flex;
      gap: 6px;
      padding: 6px;
      background: rgba(47, 72, 88, 0.08);
      border-radius: 999px;
    }

    .nav-link {
      border-radius: 999px;
      padding: 8px 14px;
      font-weight: 600;
      color: #6b645d;
      text-decoration: none;
    }

    .nav-link.active {
      background: white;
      color: var(--accent-2);
    }

    .who {
      color: var(--muted);
    }

    .grid {
      display: grid;
      grid-template-columns: repeat(auto-fit, minmax(200px, 1fr));
      gap: 16px;
    }

    .card {
      background: white;
      border-radius: 18px;
      padding: 18px;
      border: 1px solid rgba(47, 72, 88, 0.08);
      display: grid;
      gap: 10px;
    }

    .card.center {
      text-align: center;
    }

    .stripe {
      height: 4px;
      border-radius: 4px;
    }

    .label {
      font-size: 0.85rem;
      text-transform: uppercase;
      letter-spacing: 0.12em;
      color: #8b857d;
    }

    .value {
      font-size: 1.7rem;
      font-weight: 600;
      color: var(--accent-2);
    }

    .muted {
      color: var(--muted);
      margin: 0;
    }

    .error {
      color: #c63b2b;
      margin: 0;
    }

    .badge {
      display: inline-flex;
      align-items: center;
      gap: 6px;
      border-radius: 999px;
      padding: 3px 10px;
      font-size: 0.85rem;
      background: rgba(47, 72, 88, 0.08);
    }

    .badge.outline {
      background: transparent;
      border: 1px solid rgba(47, 72, 88, 0.25);
    }

    .badges {
      display: flex;
      flex-wrap: wrap;
      gap: 8px;
    }

    .entry-head {
      display: flex;
      justify-content: space-between;
      align-items: flex-start;
      gap: 12px;
    }

    .skeleton {
      border-radius: 8px;
      background: linear-gradient(90deg, #eee6dc, #f8f3ec, #eee6dc);
      background-size: 200% 100%;
      animation: shimmer 1.4s infinite;
    }

    .inline {
      display: flex;
      gap: 10px;
      align-items: flex-end;
      flex-wrap: wrap;
    }

    input[type="text"], textarea, select {
      font: inherit;
      padding: 10px 12px;
      border-radius: 12px;
      border: 1px solid rgba(47, 72, 88, 0.2);
      background: white;
      width: 100%;
    }

    textarea {
      min-height: 8rem;
    }

    button, .button {
      appearance: none;
      border: none;
      border-radius: 999px;
      padding: 10px 18px;
      font: inherit;
      font-weight: 600;
      cursor: pointer;
      background: var(--accent);
      color: white;
      text-decoration: none;
      display: inline-flex;
      justify-content: center;
    }

    button.secondary, .button.secondary {
      background: var(--accent-2);
    }

    button.ghost {
      background: transparent;
      color: var(--muted);
      padding: 2px 6px;
    }

    button:disabled {
      opacity: 0.6;
      cursor: progress;
    }

    .field {
      display: grid;
      gap: 6px;
    }

    .toggle {
      display: inline-flex;
      align-items: center;
      gap: 6px;
    }

    @keyframes shimmer {
      from {
        background-position: 200% 0;
      }
      to {
        background-position: -200% 0;
      }
    }

    @media (max-width: 600px) {
      .app {
        padding: 28px 22px;
      }
    }
"#;

const PAGE_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <title>GitHappy - {{TITLE}}</title>
  <style>{{STYLE}}</style>
</head>
<body>
  <main class="app">
    <header>
      <h1>GitHappy</h1>
      <nav>{{NAV}}</nav>
      <div class="badges">
        {{USER}}
        <form method="post" action="/logout"><button class="ghost" type="submit">Log out</button></form>
      </div>
    </header>
    {{BODY}}
  </main>

  <script>
    // Each slot numbers its loads; a response older than the last one shown
    // is dropped, so a slow early load never replaces a later one.
    const loadSlot = async (slot) => {
      const ticket = Number(slot.dataset.issued || 0) + 1;
      slot.dataset.issued = ticket;
      slot.dataset.state = 'loading';
      try {
        const res = await fetch(slot.dataset.src, { credentials: 'same-origin' });
        const html = await res.text();
        if (ticket <= Number(slot.dataset.applied || 0)) {
          return;
        }
        slot.dataset.applied = ticket;
        if (!res.ok) {
          slot.dataset.state = 'error';
          return;
        }
        slot.innerHTML = html;
        slot.dataset.state = 'ready';
      } catch (err) {
        console.error(err);
        slot.dataset.state = 'error';
      }
    };

    document.querySelectorAll('.slot[data-src]').forEach((slot) => loadSlot(slot));

    document.querySelectorAll('[data-load-more]').forEach((link) => {
      link.addEventListener('click', (event) => {
        const slot = document.getElementById(link.dataset.loadMore);
        if (!slot) {
          return;
        }
        event.preventDefault();
        const limit = Number(link.dataset.limit) + 10;
        link.dataset.limit = limit;
        link.href = `?limit=${limit + 10}`;
        slot.dataset.src = `/fragments/entries?limit=${limit}`;
        history.replaceState(null, '', `?limit=${limit}`);
        loadSlot(slot);
      });
    });

    document.querySelectorAll('form[data-once]').forEach((form) => {
      form.addEventListener('submit', (event) => {
        const button = event.submitter;
        if (!button || button.value !== 'create') {
          return;
        }
        if (form.dataset.busy) {
          event.preventDefault();
          return;
        }
        form.dataset.busy = '1';
        setTimeout(() => {
          button.disabled = true;
          button.textContent = 'Creating entry...';
        }, 0);
      });
    });
  </script>
</body>
</html>
"#;

const LOGIN_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <title>GitHappy - Sign in</title>
  <style>{{STYLE}}</style>
</head>
<body>
  <main class="app">
    <header>
      <h1>GitHappy</h1>
    </header>
    {{BODY}}
  </main>
</body>
</html>
"#;
