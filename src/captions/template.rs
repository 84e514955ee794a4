//! Caption template rendering.
//!
//! Templates are plain strings with four placeholders:
//!
//! | Placeholder             | Value                                  |
//! |-------------------------|----------------------------------------|
//! | `_CAPTION_`             | image title, or alt text               |
//! | `_PAGE_LEVEL_`          | level of the page the image is on      |
//! | `_PAGE_IMAGE_NUMBER_`   | position of the image on its page      |
//! | `_BOOK_IMAGE_NUMBER_`   | position of the image in the whole book|
//!
//! Every occurrence is substituted in one left-to-right pass, so text coming
//! from a label is never itself treated as a placeholder. Anything else in
//! the template, including unknown `_NAME_` tokens, is copied verbatim.
//!
//! Templates are markup. The label is HTML-escaped on substitution; the rest
//! of the template, tags included, is inserted as written.

use std::sync::LazyLock;

use aho_corasick::AhoCorasick;

use super::registry::ImageRecord;
use crate::dom::escape_text;

/// Placeholders in substitution order.
pub const PLACEHOLDERS: [&str; 4] = [
    "_CAPTION_",
    "_PAGE_LEVEL_",
    "_PAGE_IMAGE_NUMBER_",
    "_BOOK_IMAGE_NUMBER_",
];

static FINDER: LazyLock<AhoCorasick> =
    LazyLock::new(|| AhoCorasick::new(PLACEHOLDERS).expect("placeholder patterns are valid"));

/// Render a caption template for an image.
pub fn render(template: &str, image: &ImageRecord) -> String {
    let index = image.index.to_string();
    let nro = image.nro.to_string();
    let label = escape_text(&image.label);
    let values = [label.as_str(), image.page_level.as_str(), &index, &nro];
    FINDER.replace_all(template, &values)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn image(label: &str, page_level: &str, index: usize, nro: usize) -> ImageRecord {
        ImageRecord {
            key: format!("{page_level}.{index}"),
            index,
            page_level: page_level.to_string(),
            label: label.to_string(),
            nro,
            ..Default::default()
        }
    }

    #[test]
    fn test_default_template() {
        assert_eq!(render("Figure: _CAPTION_", &image("bar", "0", 1, 1)), "Figure: bar");
    }

    #[test]
    fn test_book_number() {
        assert_eq!(
            render("Image _BOOK_IMAGE_NUMBER_. - _CAPTION_", &image("cat", "1", 1, 3)),
            "Image 3. - cat"
        );
    }

    #[test]
    fn test_page_numbers() {
        assert_eq!(
            render("Image _PAGE_LEVEL_._PAGE_IMAGE_NUMBER_ - _CAPTION_", &image("bar", "0", 1, 1)),
            "Image 0.1 - bar"
        );
    }

    #[test]
    fn test_repeated_placeholder_replaced_everywhere() {
        assert_eq!(
            render("_CAPTION_ / _CAPTION_", &image("dog", "2", 4, 9)),
            "dog / dog"
        );
    }

    #[test]
    fn test_label_is_not_rescanned() {
        assert_eq!(
            render("_CAPTION_ (_PAGE_LEVEL_)", &image("see _PAGE_LEVEL_", "2.1", 1, 1)),
            "see _PAGE_LEVEL_ (2.1)"
        );
    }

    #[test]
    fn test_label_is_escaped_template_is_not() {
        assert_eq!(
            render("<em>_CAPTION_</em>", &image("a < b & c", "1", 1, 1)),
            "<em>a &lt; b &amp; c</em>"
        );
    }

    #[test]
    fn test_unknown_placeholder_kept() {
        assert_eq!(
            render("_CHAPTER_ _CAPTION_", &image("x", "1", 1, 1)),
            "_CHAPTER_ x"
        );
    }
}
