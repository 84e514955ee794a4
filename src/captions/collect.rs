//! Document collector: scan every page, number images book-wide and render
//! their captions.

use log::debug;
use rayon::prelude::*;

use super::registry::{ImageRecord, ImageRegistry};
use super::scan::{ImageDraft, scan_page};
use super::template::render;
use crate::book::{BookSource, PageLayout, layout_for};
use crate::config::{CaptionKind, CaptionsConfig};
use crate::error::Result;

/// Build the image registry of a book.
///
/// Pages are loaded and scanned in parallel; results are put back in
/// navigation order before numbering. Any page that fails to load aborts
/// the whole collection.
pub fn collect_all(source: &dyn BookSource, config: &CaptionsConfig) -> Result<ImageRegistry> {
    let layout = layout_for(source.version());
    let pages = source.pages();

    let mut scanned = pages
        .par_iter()
        .enumerate()
        .map(|(order, page_ref)| {
            let page = source
                .load_page(page_ref)
                .map_err(|e| e.in_page(&page_ref.path))?;
            Ok((order, scan_page(layout.as_ref(), &page)))
        })
        .collect::<Result<Vec<_>>>()?;
    scanned.sort_by_key(|(order, _)| *order);

    let drafts = scanned.into_iter().flat_map(|(_, drafts)| drafts);
    let registry = number_images(drafts, config);
    debug!("collected {} images from {} pages", registry.len(), pages.len());
    Ok(registry)
}

/// Collect a single already-loaded page, numbering from 1.
pub fn collect_page(
    layout: &dyn PageLayout,
    page: &crate::book::Page,
    config: &CaptionsConfig,
) -> ImageRegistry {
    number_images(scan_page(layout, page), config)
}

/// Assign `nro` in order, resolve per-image options and render captions.
fn number_images(drafts: impl IntoIterator<Item = ImageDraft>, config: &CaptionsConfig) -> ImageRegistry {
    let records = drafts
        .into_iter()
        .enumerate()
        .map(|(i, draft)| finalize(draft, i + 1, config))
        .collect();
    ImageRegistry::from_records(records)
}

fn finalize(draft: ImageDraft, nro: usize, config: &CaptionsConfig) -> ImageRecord {
    let key = draft.key.into_string();
    let mut record = ImageRecord {
        attributes: config.attributes(&key),
        align: config.align(&key).map(str::to_string),
        skip: config.skip(&key),
        key,
        index: draft.index,
        page_level: draft.page_level,
        label: draft.label,
        source: draft.source,
        backlink: draft.backlink,
        nro,
        caption: String::new(),
        list_caption: String::new(),
    };
    record.caption = render(config.template(&record.key, CaptionKind::Caption), &record);
    record.list_caption = render(config.template(&record.key, CaptionKind::ListCaption), &record);
    record
}
