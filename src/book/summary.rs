//! `SUMMARY.md` navigation parsing.
//!
//! The summary is a (possibly nested) markdown list of links. List position
//! gives each entry its level: top-level items are `1`, `2`, ...; nested
//! items extend their parent's level (`2.1`, `2.1.3`).

use pulldown_cmark::{Event, Parser, Tag, TagEnd};

/// One navigation entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryEntry {
    pub level: String,
    pub title: String,
    /// Linked page, `None` for part titles without a page.
    pub path: Option<String>,
}

/// Parse a summary document into entries in navigation order.
///
/// Several top-level lists (e.g. separated by part headings) continue the
/// same top-level numbering.
pub fn parse_summary(markdown: &str) -> Vec<SummaryEntry> {
    let mut entries: Vec<SummaryEntry> = Vec::new();
    // One counter per open list, outermost first.
    let mut counters: Vec<usize> = Vec::new();
    // Indexes into `entries` of the items currently open.
    let mut open_items: Vec<usize> = Vec::new();
    let mut top_level_count = 0;

    for event in Parser::new(markdown) {
        // Only the innermost item collects title text, and only until its
        // own nested list opens.
        let collecting = if open_items.len() == counters.len() {
            open_items.last().copied()
        } else {
            None
        };

        match event {
            Event::Start(Tag::List(_)) => {
                counters.push(if counters.is_empty() { top_level_count } else { 0 });
            }
            Event::End(TagEnd::List(_)) => {
                if let Some(count) = counters.pop()
                    && counters.is_empty()
                {
                    top_level_count = count;
                }
            }
            Event::Start(Tag::Item) => {
                if let Some(count) = counters.last_mut() {
                    *count += 1;
                }
                let level = counters
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join(".");
                entries.push(SummaryEntry {
                    level,
                    title: String::new(),
                    path: None,
                });
                open_items.push(entries.len() - 1);
            }
            Event::End(TagEnd::Item) => {
                open_items.pop();
            }
            Event::Start(Tag::Link { dest_url, .. }) => {
                if let Some(idx) = collecting
                    && entries[idx].path.is_none()
                    && let Some(path) = normalize_link(&dest_url)
                {
                    entries[idx].path = Some(path);
                }
            }
            Event::Text(text) | Event::Code(text) => {
                if let Some(idx) = collecting {
                    entries[idx].title.push_str(&text);
                }
            }
            Event::SoftBreak | Event::HardBreak => {
                if let Some(idx) = collecting {
                    entries[idx].title.push(' ');
                }
            }
            _ => {}
        }
    }

    for entry in &mut entries {
        entry.title = entry.title.trim().to_string();
    }
    entries
}

/// Strip `./` prefixes and `#fragment`s; external links are not pages.
fn normalize_link(dest: &str) -> Option<String> {
    if dest.contains("://") || dest.starts_with("mailto:") {
        return None;
    }
    let path = dest.split('#').next().unwrap_or_default();
    let path = path.trim_start_matches("./");
    (!path.is_empty()).then(|| path.to_string())
}
