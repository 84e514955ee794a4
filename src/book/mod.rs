//! Host-side book model: navigation entries, rendered pages and host shapes.

mod layout;
mod source;
mod summary;

pub use layout::{FlatLayout, PageLayout, SectionedLayout, layout_for};
pub use source::{BookSource, DirectoryBook, render_markdown};
pub use summary::{SummaryEntry, parse_summary};

use crate::error::{Error, Result};

/// A page as listed by the book's navigation, before it is rendered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRef {
    /// Source path relative to the book root (e.g. `chapter1/intro.md`).
    pub path: String,
    /// Hierarchical level in the table of contents (e.g. `1.2`).
    pub level: String,
    pub title: String,
}

impl PageRef {
    pub fn new(path: impl Into<String>, level: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            level: level.into(),
            title: title.into(),
        }
    }

    /// Path of the page once published (`README.md` → `index.html`,
    /// `*.md` → `*.html`).
    pub fn published_path(&self) -> String {
        published_path(&self.path)
    }
}

/// Kind of a content section on hosts that split pages into sections.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectionKind {
    /// Regular rendered markdown.
    Normal,
    /// Interactive exercise block.
    Exercise,
    /// Interactive quiz block.
    Quiz,
}

/// One content section of a page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    pub kind: SectionKind,
    pub content: String,
}

impl Section {
    pub fn normal(content: impl Into<String>) -> Self {
        Self {
            kind: SectionKind::Normal,
            content: content.into(),
        }
    }
}

/// Reading progress attached to pages by legacy hosts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Progress {
    /// Level of the current page.
    pub current_level: String,
}

/// A rendered page as handed to the per-page hook.
///
/// Current hosts fill `content`; legacy hosts fill `sections` and `progress`.
/// [`PageLayout`] hides the difference.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Page {
    /// Published path, used for figure backlinks.
    pub path: String,
    pub level: String,
    pub content: String,
    pub sections: Vec<Section>,
    pub progress: Option<Progress>,
}

impl Page {
    /// A page whose body is a single block of rendered markup.
    pub fn flat(path: impl Into<String>, level: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            level: level.into(),
            content: content.into(),
            ..Default::default()
        }
    }

    /// A page split into sections, with its level carried by `progress`.
    pub fn sectioned(path: impl Into<String>, level: impl Into<String>, sections: Vec<Section>) -> Self {
        Self {
            path: path.into(),
            progress: Some(Progress {
                current_level: level.into(),
            }),
            sections,
            ..Default::default()
        }
    }
}

/// Generation of the host build tool, detected once per build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HostVersion {
    /// Hosts before 3.0: pages are split into sections.
    Legacy,
    /// Hosts 3.0 and later: a page's content is a single string.
    #[default]
    Current,
}

impl HostVersion {
    /// Detect the host generation from a configured version string.
    ///
    /// Accepts plain versions (`2.6.7`) and simple requirements (`>=3.0.0`,
    /// `^2.0`); the first version in the string decides.
    pub fn detect(version: Option<&str>) -> Result<Self> {
        let Some(raw) = version.map(str::trim).filter(|v| !v.is_empty()) else {
            return Ok(HostVersion::Current);
        };

        let req = semver::VersionReq::parse(raw)
            .map_err(|e| Error::Config(format!("invalid host version {raw:?}: {e}")))?;
        let major = req.comparators.first().map(|c| c.major);

        Ok(match major {
            Some(major) if major < 3 => HostVersion::Legacy,
            _ => HostVersion::Current,
        })
    }
}

/// Published path of a source page.
pub fn published_path(source: &str) -> String {
    let (dir, file) = match source.rfind('/') {
        Some(idx) => source.split_at(idx + 1),
        None => ("", source),
    };

    if file.eq_ignore_ascii_case("readme.md") {
        return format!("{dir}index.html");
    }
    match file.len().checked_sub(3) {
        Some(stem) if file.is_char_boundary(stem) && file[stem..].eq_ignore_ascii_case(".md") => {
            format!("{dir}{}.html", &file[..stem])
        }
        _ => source.to_string(),
    }
}
