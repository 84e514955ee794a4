//! Book sources: the host side of the caption passes.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use log::{debug, warn};
use pulldown_cmark::{Options, Parser, html};

use super::summary::parse_summary;
use super::{HostVersion, Page, PageRef, Section};
use crate::config::BookConfig;
use crate::error::{Error, Result};
use crate::util::decode_text;

/// A book as seen by the plugin: navigation plus page rendering.
///
/// `load_page` is called from several threads during the collection pass,
/// hence the `Sync` bound.
pub trait BookSource: Sync {
    /// Host generation; selects the page layout.
    fn version(&self) -> HostVersion;

    /// Pages in navigation order. This order, not file order, numbers images.
    fn pages(&self) -> Vec<PageRef>;

    /// Read and render one page.
    fn load_page(&self, page: &PageRef) -> Result<Page>;
}

/// A book stored as a directory of markdown files.
///
/// ```text
/// book/
///   book.json      configuration (optional)
///   SUMMARY.md     navigation (optional)
///   README.md      introduction, level 0 unless listed in SUMMARY.md
///   chapter1/...
/// ```
#[derive(Debug, Clone)]
pub struct DirectoryBook {
    root: PathBuf,
    config: BookConfig,
    version: HostVersion,
    pages: Vec<PageRef>,
}

const README: &str = "README.md";
const SUMMARY: &str = "SUMMARY.md";
const BOOK_JSON: &str = "book.json";

impl DirectoryBook {
    /// Open a book directory: read `book.json` and `SUMMARY.md`.
    pub fn open(root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref().to_path_buf();
        let config = BookConfig::load(&root.join(BOOK_JSON))?;
        let version = HostVersion::detect(config.gitbook.as_deref())?;

        let summary_path = root.join(SUMMARY);
        let entries = match std::fs::read(&summary_path) {
            Ok(bytes) => parse_summary(&decode_text(&bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Vec::new(),
            Err(e) => return Err(Error::io(summary_path, e)),
        };

        let mut seen = HashSet::new();
        let mut pages = Vec::new();
        let readme_listed = entries
            .iter()
            .any(|e| e.path.as_deref().is_some_and(|p| p.eq_ignore_ascii_case(README)));
        if !readme_listed && root.join(README).is_file() {
            seen.insert(README.to_string());
            pages.push(PageRef::new(README, "0", "Introduction"));
        }

        for entry in entries {
            let Some(path) = entry.path else {
                warn!("summary entry {:?} ({}) has no page", entry.title, entry.level);
                continue;
            };
            if !seen.insert(path.clone()) {
                warn!("{path} is listed more than once in {SUMMARY}; keeping the first entry");
                continue;
            }
            pages.push(PageRef::new(path, entry.level, entry.title));
        }

        debug!("opened {} with {} pages", root.display(), pages.len());

        Ok(Self {
            root,
            config,
            version,
            pages,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config(&self) -> &BookConfig {
        &self.config
    }
}

impl BookSource for DirectoryBook {
    fn version(&self) -> HostVersion {
        self.version
    }

    fn pages(&self) -> Vec<PageRef> {
        self.pages.clone()
    }

    fn load_page(&self, page: &PageRef) -> Result<Page> {
        let path = self.root.join(&page.path);
        let bytes = std::fs::read(&path).map_err(|e| Error::io(&path, e))?;
        let html = render_markdown(&decode_text(&bytes));

        Ok(match self.version {
            HostVersion::Current => Page::flat(page.published_path(), &page.level, html),
            HostVersion::Legacy => {
                Page::sectioned(page.published_path(), &page.level, vec![Section::normal(html)])
            }
        })
    }
}

/// Render page markdown to HTML.
pub fn render_markdown(markdown: &str) -> String {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_FOOTNOTES);
    options.insert(Options::ENABLE_STRIKETHROUGH);

    let mut out = String::with_capacity(markdown.len() * 3 / 2);
    html::push_html(&mut out, Parser::new_ext(markdown, options));
    out
}
