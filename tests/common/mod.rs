//! In-memory book used by the integration tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::time::Duration;

use image_captions::book::{BookSource, HostVersion, Page, PageRef, Section};
use image_captions::{Error, Result};

/// A book whose pages are HTML strings, with optional per-page load delays
/// to shuffle the completion order of the collection pass.
pub struct MemoryBook {
    pub version: HostVersion,
    pages: Vec<PageRef>,
    content: HashMap<String, String>,
    delays: HashMap<String, Duration>,
}

impl MemoryBook {
    pub fn new() -> Self {
        Self {
            version: HostVersion::Current,
            pages: Vec::new(),
            content: HashMap::new(),
            delays: HashMap::new(),
        }
    }

    pub fn legacy() -> Self {
        Self {
            version: HostVersion::Legacy,
            ..Self::new()
        }
    }

    pub fn page(mut self, path: &str, level: &str, html: &str) -> Self {
        self.pages.push(PageRef::new(path, level, path));
        self.content.insert(path.to_string(), html.to_string());
        self
    }

    /// A page listed in navigation whose source cannot be read.
    pub fn broken_page(mut self, path: &str, level: &str) -> Self {
        self.pages.push(PageRef::new(path, level, path));
        self
    }

    pub fn delay(mut self, path: &str, millis: u64) -> Self {
        self.delays.insert(path.to_string(), Duration::from_millis(millis));
        self
    }

    /// Load every page, in navigation order.
    pub fn load_all(&self) -> Vec<Page> {
        self.pages
            .iter()
            .map(|p| self.load_page(p).unwrap())
            .collect()
    }
}

impl BookSource for MemoryBook {
    fn version(&self) -> HostVersion {
        self.version
    }

    fn pages(&self) -> Vec<PageRef> {
        self.pages.clone()
    }

    fn load_page(&self, page: &PageRef) -> Result<Page> {
        if let Some(delay) = self.delays.get(&page.path) {
            std::thread::sleep(*delay);
        }
        let html = self.content.get(&page.path).ok_or_else(|| {
            Error::io(
                &page.path,
                std::io::Error::new(std::io::ErrorKind::NotFound, "no such page"),
            )
        })?;

        Ok(match self.version {
            HostVersion::Current => Page::flat(page.published_path(), &page.level, html.as_str()),
            HostVersion::Legacy => {
                Page::sectioned(page.published_path(), &page.level, vec![Section::normal(html.as_str())])
            }
        })
    }
}
