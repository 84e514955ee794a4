//! Image identity: `<page_level>.<local_index>`.

use std::fmt;

/// Stable identifier of a qualifying image.
///
/// `local_index` is 1-based and counts only qualifying images on the page,
/// in document order; images that do not qualify take no number.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ImageKey(String);

impl ImageKey {
    pub fn new(page_level: &str, local_index: usize) -> Self {
        ImageKey(format!("{page_level}.{local_index}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Value of the `id` attribute of the image's `<figure>`.
    pub fn anchor(&self) -> String {
        format!("fig{}", self.0)
    }

    /// Link from a listing back to the figure on its page.
    pub fn backlink(&self, page_path: &str) -> String {
        format!("{page_path}#{}", self.anchor())
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for ImageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn test_key_format() {
        let key = ImageKey::new("1.2", 3);
        assert_eq!(key.as_str(), "1.2.3");
        assert_eq!(key.anchor(), "fig1.2.3");
        assert_eq!(key.backlink("chapter1/intro.html"), "chapter1/intro.html#fig1.2.3");
    }

    proptest! {
        #[test]
        fn prop_key_is_deterministic(level in "[0-9]{1,2}(\\.[0-9]{1,2}){0,3}", index in 1usize..500) {
            prop_assert_eq!(ImageKey::new(&level, index), ImageKey::new(&level, index));
            let expected_suffix = format!(".{index}");
            prop_assert!(ImageKey::new(&level, index).as_str().ends_with(&expected_suffix));
        }

        #[test]
        fn prop_indexes_on_one_page_never_collide(level in "[0-9]{1,2}(\\.[0-9]{1,2}){0,3}", a in 1usize..500, b in 1usize..500) {
            prop_assume!(a != b);
            prop_assert_ne!(ImageKey::new(&level, a), ImageKey::new(&level, b));
        }
    }
}
