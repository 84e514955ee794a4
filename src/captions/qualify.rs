//! Which images get a caption.
//!
//! Only images standing alone on their own line are wrapped: the image must
//! be the only element in its parent, the parent must hold no text, and the
//! image must carry a non-empty `title` or `alt`. Inline images inside prose
//! and decorative images (`alt=""`) are left alone.

use std::sync::LazyLock;

use aho_corasick::AhoCorasick;

use crate::dom::{ArenaDom, ArenaNodeId, Markup};

/// Start tags the HTML parser turns into `<img>`.
static IMAGE_TAGS: LazyLock<AhoCorasick> = LazyLock::new(|| {
    AhoCorasick::builder()
        .ascii_case_insensitive(true)
        .build(["<img", "<image"])
        .expect("image tag patterns are valid")
});

/// Caption text of an image: `title` if non-empty, else `alt` if non-empty.
pub fn image_label(dom: &ArenaDom, img: ArenaNodeId) -> Option<&str> {
    ["title", "alt"]
        .into_iter()
        .filter_map(|attr| dom.get_attr(img, attr))
        .find(|value| !value.is_empty())
}

/// Whether an image element should be wrapped in a figure.
pub fn should_wrap(dom: &ArenaDom, img: ArenaNodeId) -> bool {
    let parent = dom.parent(img);
    dom.is_element(parent)
        && dom.element_children(parent).count() == 1
        && dom.text(parent).is_empty()
        && image_label(dom, img).is_some()
}

/// Qualifying images of parsed content, in document order.
pub fn qualifying_images(markup: &Markup) -> Vec<ArenaNodeId> {
    markup
        .dom
        .elements_by_tag(markup.root, "img")
        .into_iter()
        .filter(|&img| should_wrap(&markup.dom, img))
        .collect()
}

/// Cheap pre-check so pages without images are never parsed.
pub fn may_contain_images(content: &str) -> bool {
    IMAGE_TAGS.is_match(content)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::parse_fragment;

    fn wrapped(html: &str) -> Vec<bool> {
        let markup = parse_fragment(html);
        markup
            .dom
            .elements_by_tag(markup.root, "img")
            .into_iter()
            .map(|img| should_wrap(&markup.dom, img))
            .collect()
    }

    #[test]
    fn test_standalone_image_with_alt() {
        assert_eq!(wrapped(r#"<p><img src="foo.jpg" alt="bar"></p>"#), vec![true]);
    }

    #[test]
    fn test_empty_alt_is_decorative() {
        assert_eq!(wrapped(r#"<p><img src="img.jpg" alt=""></p>"#), vec![false]);
        assert_eq!(wrapped(r#"<p><img src="img.jpg"></p>"#), vec![false]);
    }

    #[test]
    fn test_inline_images_are_ignored() {
        assert_eq!(wrapped(r#"<p>foo <img src="img.jpg" alt="bar"></p>"#), vec![false]);
        assert_eq!(wrapped(r#"<p><img src="img.jpg" alt="bar"> bar</p>"#), vec![false]);
        assert_eq!(wrapped(r#"<p>foo <img src="img.jpg" alt="bar"> bar</p>"#), vec![false]);
    }

    #[test]
    fn test_multiple_images_in_paragraph() {
        assert_eq!(
            wrapped(r#"<p><img src="foo1.jpg" alt="bar1"><img src="foo2.jpg" alt="bar2"></p>"#),
            vec![false, false]
        );
    }

    #[test]
    fn test_linked_image_qualifies() {
        assert_eq!(wrapped(r#"<p><a href="big.jpg"><img src="small.jpg" alt="x"></a></p>"#), vec![true]);
    }

    #[test]
    fn test_figure_is_not_rewrapped() {
        assert_eq!(
            wrapped(r#"<figure id="fig1.1"><img src="a.jpg" alt="a"><figcaption>Figure: a</figcaption></figure>"#),
            vec![false]
        );
    }

    #[test]
    fn test_label_prefers_title() {
        let markup = parse_fragment(r#"<p><img src="i.jpg" alt="A" title="T"></p><p><img alt="bar" title=""></p>"#);
        let imgs = markup.dom.elements_by_tag(markup.root, "img");
        assert_eq!(image_label(&markup.dom, imgs[0]), Some("T"));
        assert_eq!(image_label(&markup.dom, imgs[1]), Some("bar"));
    }

    #[test]
    fn test_may_contain_images() {
        assert!(may_contain_images("<P><IMG SRC=x>"));
        assert!(!may_contain_images("<h1>heading</h1>\n<p>paragraph</p>"));
    }

    #[test]
    fn test_image_tag_alias() {
        assert!(may_contain_images(r#"<p><IMAGE src="cat.png" alt="cat"></p>"#));
        assert_eq!(wrapped(r#"<p><image src="cat.png" alt="cat"></p>"#), vec![true]);
    }
}
