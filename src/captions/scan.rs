//! Page scanner: qualifying images of one page, without touching it.

use log::debug;

use super::key::ImageKey;
use super::qualify::{image_label, may_contain_images, qualifying_images};
use crate::book::{Page, PageLayout};
use crate::dom::parse_fragment;

/// An image found by the scanner, before book-wide numbering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageDraft {
    pub key: ImageKey,
    /// 1-based position among the page's qualifying images.
    pub index: usize,
    pub page_level: String,
    pub label: String,
    pub source: Option<String>,
    pub backlink: String,
}

/// Scan a page for qualifying images, in document order.
///
/// Images in every content unit of the page share one local index.
pub fn scan_page(layout: &dyn PageLayout, page: &Page) -> Vec<ImageDraft> {
    let page_level = layout.page_level(page);
    let mut drafts = Vec::new();

    for content in layout.contents(page) {
        scan_content(&page.path, page_level, content, &mut drafts);
    }

    debug!("{}: {} qualifying images", page.path, drafts.len());
    drafts
}

/// Scan one markup unit, appending to `drafts` and continuing its numbering.
pub fn scan_content(page_path: &str, page_level: &str, content: &str, drafts: &mut Vec<ImageDraft>) {
    if !may_contain_images(content) {
        return;
    }

    let markup = parse_fragment(content);
    for img in qualifying_images(&markup) {
        let Some(label) = image_label(&markup.dom, img) else {
            continue;
        };
        let index = drafts.len() + 1;
        let key = ImageKey::new(page_level, index);
        drafts.push(ImageDraft {
            backlink: key.backlink(page_path),
            key,
            index,
            page_level: page_level.to_string(),
            label: label.to_string(),
            source: markup.dom.get_attr(img, "src").map(str::to_string),
        });
    }
}
