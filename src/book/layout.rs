//! Page shapes of the different host generations.

use super::{HostVersion, Page, SectionKind};

/// How a host lays out a rendered page.
///
/// Both caption passes go through this trait so they never look at host
/// specific page fields directly.
pub trait PageLayout: Send + Sync {
    /// The page's hierarchical level.
    fn page_level<'a>(&self, page: &'a Page) -> &'a str;

    /// The markup units of a page that captions may rewrite, in page order.
    fn content_units<'a>(&self, page: &'a mut Page) -> Vec<&'a mut String>;

    /// Read-only view of [`PageLayout::content_units`].
    fn contents<'a>(&self, page: &'a Page) -> Vec<&'a str>;
}

/// Current hosts: the whole page body is one string.
#[derive(Debug, Clone, Copy, Default)]
pub struct FlatLayout;

impl PageLayout for FlatLayout {
    fn page_level<'a>(&self, page: &'a Page) -> &'a str {
        &page.level
    }

    fn content_units<'a>(&self, page: &'a mut Page) -> Vec<&'a mut String> {
        vec![&mut page.content]
    }

    fn contents<'a>(&self, page: &'a Page) -> Vec<&'a str> {
        vec![page.content.as_str()]
    }
}

/// Legacy hosts: pages are split into sections and only `normal` sections
/// carry rendered markdown.
#[derive(Debug, Clone, Copy, Default)]
pub struct SectionedLayout;

impl PageLayout for SectionedLayout {
    fn page_level<'a>(&self, page: &'a Page) -> &'a str {
        page.progress
            .as_ref()
            .map(|p| p.current_level.as_str())
            .unwrap_or(&page.level)
    }

    fn content_units<'a>(&self, page: &'a mut Page) -> Vec<&'a mut String> {
        page.sections
            .iter_mut()
            .filter(|s| s.kind == SectionKind::Normal)
            .map(|s| &mut s.content)
            .collect()
    }

    fn contents<'a>(&self, page: &'a Page) -> Vec<&'a str> {
        page.sections
            .iter()
            .filter(|s| s.kind == SectionKind::Normal)
            .map(|s| s.content.as_str())
            .collect()
    }
}

/// Pick the page layout for a host generation.
pub fn layout_for(version: HostVersion) -> Box<dyn PageLayout> {
    match version {
        HostVersion::Legacy => Box::new(SectionedLayout),
        HostVersion::Current => Box::new(FlatLayout),
    }
}
