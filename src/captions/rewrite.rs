//! Page rewriter: wrap registered images in numbered figures.

use log::debug;

use super::key::ImageKey;
use super::qualify::{may_contain_images, qualifying_images};
use super::registry::{ImageRecord, ImageRegistry};
use crate::book::{Page, PageLayout};
use crate::dom::{ArenaDom, ArenaNodeId, parse_fragment};
use crate::error::{Error, Result};

/// Rewrite every content unit of a page in place.
///
/// Images are numbered across the page's units the same way the scanner
/// numbers them, so keys line up with the registry. On error the page is
/// left untouched.
pub fn rewrite_page(registry: &ImageRegistry, layout: &dyn PageLayout, page: &mut Page) -> Result<()> {
    let page_level = layout.page_level(page).to_string();
    let page_path = page.path.clone();
    let mut next_index = 1;
    let mut wrapped = 0;

    let rewritten = layout
        .contents(page)
        .into_iter()
        .map(|content| rewrite_unit(registry, &page_path, &page_level, content, &mut next_index, &mut wrapped))
        .collect::<Result<Vec<_>>>()?;

    for (content, html) in layout.content_units(page).into_iter().zip(rewritten) {
        if let Some(html) = html {
            *content = html;
        }
    }

    debug!("{page_path}: wrapped {wrapped} images");
    Ok(())
}

/// Rewrite a single block of page markup, numbering from 1.
///
/// Content without qualifying images comes back unchanged.
pub fn rewrite_content(registry: &ImageRegistry, page_path: &str, page_level: &str, content: &str) -> Result<String> {
    let mut next_index = 1;
    let mut wrapped = 0;
    Ok(
        rewrite_unit(registry, page_path, page_level, content, &mut next_index, &mut wrapped)?
            .unwrap_or_else(|| content.to_string()),
    )
}

/// Returns `None` when nothing in the unit was changed.
fn rewrite_unit(
    registry: &ImageRegistry,
    page_path: &str,
    page_level: &str,
    content: &str,
    next_index: &mut usize,
    wrapped: &mut usize,
) -> Result<Option<String>> {
    if !may_contain_images(content) {
        return Ok(None);
    }

    let mut markup = parse_fragment(content);
    let images = qualifying_images(&markup);
    if images.is_empty() {
        return Ok(None);
    }

    let mut changed = false;
    for img in images {
        let key = ImageKey::new(page_level, *next_index);
        *next_index += 1;

        let record = registry.get(key.as_str()).ok_or_else(|| Error::MissingImage {
            key: key.to_string(),
            page: page_path.to_string(),
        })?;
        if record.skip {
            continue;
        }

        wrap_image(&mut markup.dom, img, &key, record);
        changed = true;
        *wrapped += 1;
    }

    Ok(changed.then(|| markup.to_html()))
}

/// Replace an image's line with `<figure id="fig{key}">{img}<figcaption>…`.
fn wrap_image(dom: &mut ArenaDom, img: ArenaNodeId, key: &ImageKey, record: &ImageRecord) {
    for (name, value) in &record.attributes {
        dom.set_attr(img, name, value);
    }

    let figure = dom.create_html_element("figure");
    dom.set_attr(figure, "id", &key.anchor());
    let figcaption = dom.create_html_element("figcaption");
    append_caption(dom, figcaption, &record.caption);
    if let Some(align) = &record.align {
        dom.add_class(figcaption, align);
    }

    let parent = dom.parent(img);
    if dom.is_tag(parent, "p") {
        dom.replace(parent, figure);
        dom.detach(img);
    } else {
        dom.replace(img, figure);
        lift_out_of_paragraph(dom, figure);
    }

    dom.append(figure, img);
    dom.append(figure, figcaption);
}

/// Append a rendered caption to a figcaption as markup.
fn append_caption(dom: &mut ArenaDom, figcaption: ArenaNodeId, caption: &str) {
    if !caption.contains(['<', '&']) {
        dom.append_text(figcaption, caption);
        return;
    }

    let parsed = parse_fragment(caption);
    for child in parsed.dom.children(parsed.root) {
        let copy = dom.import(&parsed.dom, child);
        dom.append(figcaption, copy);
    }
}

/// Move a figure out of any paragraph that contains it.
///
/// The paragraph is split around the inline branch holding the figure (a
/// link, usually): content before it stays in the paragraph, content after
/// it moves to a new paragraph, and the branch goes in between. Halves left
/// with nothing but whitespace are dropped.
fn lift_out_of_paragraph(dom: &mut ArenaDom, figure: ArenaNodeId) {
    let mut branch = figure;
    let mut para = dom.parent(figure);
    while para.is_some() && !dom.is_tag(para, "p") {
        branch = para;
        para = dom.parent(para);
    }
    if para.is_none() {
        return;
    }

    let tail: Vec<_> = dom.children(para).skip_while(|&c| c != branch).skip(1).collect();
    dom.detach(branch);
    dom.insert_after(para, branch);

    if !tail.is_empty() {
        let rest = dom.create_html_element("p");
        for node in tail {
            dom.detach(node);
            dom.append(rest, node);
        }
        if !is_blank(dom, rest) {
            dom.insert_after(branch, rest);
        }
    }
    if is_blank(dom, para) {
        dom.detach(para);
    }
}

fn is_blank(dom: &ArenaDom, node: ArenaNodeId) -> bool {
    dom.element_children(node).next().is_none() && dom.text(node).trim().is_empty()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::book::{FlatLayout, Section, SectionedLayout};
    use crate::captions::collect::collect_page;
    use crate::config::CaptionsConfig;

    fn rewrite(html: &str, config: &str) -> String {
        let config: CaptionsConfig = serde_json::from_str(config).unwrap();
        let mut page = Page::flat("index.html", "0", html);
        let registry = collect_page(&FlatLayout, &page, &config);
        rewrite_page(&registry, &FlatLayout, &mut page).unwrap();
        page.content
    }

    #[test]
    fn test_wraps_paragraph_image() {
        assert_eq!(
            rewrite(r#"<p><img src="foo.jpg" alt="bar"></p>"#, "{}"),
            r#"<figure id="fig0.1"><img src="foo.jpg" alt="bar"><figcaption>Figure: bar</figcaption></figure>"#
        );
    }

    #[test]
    fn test_attributes_and_align() {
        assert_eq!(
            rewrite(
                r#"<p><img src="foo.jpg" alt="bar"></p>"#,
                r#"{"align": "left", "attributes": {"width": "300"}}"#
            ),
            r#"<figure id="fig0.1"><img src="foo.jpg" alt="bar" width="300"><figcaption class="left">Figure: bar</figcaption></figure>"#
        );
    }

    #[test]
    fn test_caption_is_escaped_text() {
        assert_eq!(
            rewrite(r#"<p><img src="a.png" alt="a &lt;b&gt; &amp; c"></p>"#, "{}"),
            r#"<figure id="fig0.1"><img src="a.png" alt="a <b> &amp; c"><figcaption>Figure: a &lt;b&gt; &amp; c</figcaption></figure>"#
        );
    }

    #[test]
    fn test_link_keeps_wrapper_and_drops_paragraph() {
        assert_eq!(
            rewrite(r#"<p><a href="big.jpg"><img src="small.jpg" alt="x"></a></p>"#, "{}"),
            r#"<a href="big.jpg"><figure id="fig0.1"><img src="small.jpg" alt="x"><figcaption>Figure: x</figcaption></figure></a>"#
        );
    }

    #[test]
    fn test_link_in_prose_splits_paragraph() {
        let once = rewrite(
            r#"<p>See <a href="f.png"><img src="t.png" alt="x"></a> for details.</p>"#,
            "{}",
        );
        assert_eq!(
            once,
            r#"<p>See </p><a href="f.png"><figure id="fig0.1"><img src="t.png" alt="x"><figcaption>Figure: x</figcaption></figure></a><p> for details.</p>"#
        );
        assert_eq!(parse_fragment(&once).to_html(), once);
    }

    #[test]
    fn test_link_at_end_of_prose_survives_reparse() {
        let once = rewrite(r#"<p>See <a href="f.png"><img src="t.png" alt="x"></a></p>"#, "{}");
        assert_eq!(
            once,
            r#"<p>See </p><a href="f.png"><figure id="fig0.1"><img src="t.png" alt="x"><figcaption>Figure: x</figcaption></figure></a>"#
        );
        assert_eq!(parse_fragment(&once).to_html(), once);
    }

    #[test]
    fn test_span_in_paragraph_is_lifted() {
        let once = rewrite(r#"<p><span class="c"><img src="a.png" alt="a"></span> text</p>"#, "{}");
        assert_eq!(
            once,
            r#"<span class="c"><figure id="fig0.1"><img src="a.png" alt="a"><figcaption>Figure: a</figcaption></figure></span><p> text</p>"#
        );
        assert_eq!(parse_fragment(&once).to_html(), once);
    }

    #[test]
    fn test_caption_template_markup() {
        assert_eq!(
            rewrite(
                r#"<p><img src="a.jpg" alt="cat"></p>"#,
                r#"{"caption": "<strong>Fig _BOOK_IMAGE_NUMBER_</strong> _CAPTION_"}"#
            ),
            r#"<figure id="fig0.1"><img src="a.jpg" alt="cat"><figcaption><strong>Fig 1</strong> cat</figcaption></figure>"#
        );
    }

    #[test]
    fn test_caption_template_markup_keeps_label_escaped() {
        assert_eq!(
            rewrite(
                r#"<p><img src="a.jpg" alt="&lt;b&gt;"></p>"#,
                r#"{"caption": "<em>_CAPTION_</em>"}"#
            ),
            r#"<figure id="fig0.1"><img src="a.jpg" alt="<b>"><figcaption><em>&lt;b&gt;</em></figcaption></figure>"#
        );
    }

    #[test]
    fn test_failed_section_leaves_page_untouched() {
        let config = CaptionsConfig::default();
        let mut page = Page::sectioned(
            "ch.html",
            "1",
            vec![
                Section::normal(r#"<p><img src="a.jpg" alt="a"></p>"#),
                Section::normal(r#"<p><img src="b.jpg" alt="b"></p>"#),
            ],
        );
        let first_only = Page::flat("ch.html", "1", r#"<p><img src="a.jpg" alt="a"></p>"#);
        let registry = collect_page(&FlatLayout, &first_only, &config);
        let before = page.clone();

        let err = rewrite_page(&registry, &SectionedLayout, &mut page).unwrap_err();

        assert!(matches!(err, Error::MissingImage { ref key, .. } if key == "1.2"));
        assert_eq!(page, before);
    }

    #[test]
    fn test_link_outside_paragraph_stays_in_place() {
        assert_eq!(
            rewrite(r#"<div><a href="big.jpg"><img src="small.jpg" alt="x"></a></div>"#, "{}"),
            r#"<div><a href="big.jpg"><figure id="fig0.1"><img src="small.jpg" alt="x"><figcaption>Figure: x</figcaption></figure></a></div>"#
        );
    }

    #[test]
    fn test_other_parent_wrapped_in_place() {
        assert_eq!(
            rewrite(r#"<div class="center"><img src="a.jpg" alt="a"></div>"#, "{}"),
            r#"<div class="center"><figure id="fig0.1"><img src="a.jpg" alt="a"><figcaption>Figure: a</figcaption></figure></div>"#
        );
    }

    #[test]
    fn test_image_alias_is_wrapped() {
        assert_eq!(
            rewrite(r#"<p><image src="cat.png" alt="cat"></p>"#, "{}"),
            r#"<figure id="fig0.1"><img src="cat.png" alt="cat"><figcaption>Figure: cat</figcaption></figure>"#
        );
    }

    #[test]
    fn test_no_qualifying_images_unchanged() {
        let html = "<p>foo <img src=\"img.jpg\" alt=\"bar\"> bar</p>\n<p>plain&nbsp;text</p>";
        assert_eq!(rewrite(html, "{}"), html);
    }

    #[test]
    fn test_skip_leaves_image_alone() {
        let html = r#"<p><img src="a.jpg" alt="a"></p><p><img src="b.jpg" alt="b"></p>"#;
        assert_eq!(
            rewrite(html, r#"{"images": {"0.1": {"skip": true}}}"#),
            r#"<p><img src="a.jpg" alt="a"></p><figure id="fig0.2"><img src="b.jpg" alt="b"><figcaption>Figure: b</figcaption></figure>"#
        );
    }

    #[test]
    fn test_rewrite_is_idempotent() {
        let once = rewrite(r#"<p><a href="x"><img src="a.jpg" alt="a"></a></p><p><img src="b.jpg" alt="b"></p>"#, "{}");
        let registry = ImageRegistry::default();
        assert_eq!(rewrite_content(&registry, "index.html", "0", &once).unwrap(), once);
    }

    #[test]
    fn test_missing_registry_entry() {
        let registry = ImageRegistry::default();
        let err = rewrite_content(&registry, "ch1.html", "1", r#"<p><img src="a.jpg" alt="a"></p>"#).unwrap_err();
        match err {
            Error::MissingImage { key, page } => {
                assert_eq!(key, "1.1");
                assert_eq!(page, "ch1.html");
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
