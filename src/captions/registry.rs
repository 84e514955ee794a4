//! The numbered, caption-rendered list of images of a book.

use std::collections::HashMap;
use std::collections::hash_map::Entry;

use log::warn;
use serde::ser::{Serialize, SerializeSeq, Serializer};

use crate::config::Attributes;

/// A qualifying image after collection, numbering and caption rendering.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize)]
pub struct ImageRecord {
    pub key: String,
    pub index: usize,
    pub page_level: String,
    pub label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    pub backlink: String,
    /// Book-wide number, 1-based.
    pub nro: usize,
    pub caption: String,
    pub list_caption: String,
    pub attributes: Attributes,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub align: Option<String>,
    pub skip: bool,
}

/// Images of a book in (page order, in-page order), looked up by key.
///
/// Serializes as a plain JSON array of records.
#[derive(Debug, Clone, Default)]
pub struct ImageRegistry {
    images: Vec<ImageRecord>,
    by_key: HashMap<String, usize>,
}

impl ImageRegistry {
    /// Build a registry from records already in book order.
    ///
    /// When two records share a key, lookups resolve to the first one.
    pub fn from_records(images: Vec<ImageRecord>) -> Self {
        let mut by_key = HashMap::with_capacity(images.len());
        for (i, image) in images.iter().enumerate() {
            match by_key.entry(image.key.clone()) {
                Entry::Vacant(slot) => {
                    slot.insert(i);
                }
                Entry::Occupied(first) => {
                    warn!(
                        "duplicate image key {} (book image {}), keeping book image {}",
                        image.key,
                        image.nro,
                        images[*first.get()].nro
                    );
                }
            }
        }
        Self { images, by_key }
    }

    pub fn get(&self, key: &str) -> Option<&ImageRecord> {
        self.by_key.get(key).map(|&i| &self.images[i])
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ImageRecord> {
        self.images.iter()
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    pub fn into_records(self) -> Vec<ImageRecord> {
        self.images
    }
}

impl<'a> IntoIterator for &'a ImageRegistry {
    type Item = &'a ImageRecord;
    type IntoIter = std::slice::Iter<'a, ImageRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.images.iter()
    }
}

impl Serialize for ImageRegistry {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.images.len()))?;
        for image in &self.images {
            seq.serialize_element(image)?;
        }
        seq.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(key: &str, nro: usize) -> ImageRecord {
        ImageRecord {
            key: key.to_string(),
            nro,
            ..Default::default()
        }
    }

    #[test]
    fn test_lookup_by_key() {
        let registry = ImageRegistry::from_records(vec![record("0.1", 1), record("1.1", 2)]);
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.get("1.1").map(|r| r.nro), Some(2));
        assert!(registry.get("2.1").is_none());
    }

    #[test]
    fn test_duplicate_key_resolves_to_first() {
        let mut first = record("1.1", 1);
        first.caption = "first".to_string();
        let mut second = record("1.1", 2);
        second.caption = "second".to_string();

        let registry = ImageRegistry::from_records(vec![first, second]);

        assert_eq!(registry.len(), 2);
        let found = registry.get("1.1").unwrap();
        assert_eq!(found.nro, 1);
        assert_eq!(found.caption, "first");
    }

    #[test]
    fn test_serializes_as_array() {
        let mut image = record("0.1", 1);
        image.label = "bar".to_string();
        image.backlink = "index.html#fig0.1".to_string();
        let registry = ImageRegistry::from_records(vec![image]);

        let value = serde_json::to_value(&registry).unwrap();
        let items = value.as_array().unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0]["key"], "0.1");
        assert_eq!(items[0]["nro"], 1);
        assert_eq!(items[0]["backlink"], "index.html#fig0.1");
        assert_eq!(items[0]["skip"], false);
        assert!(items[0].get("align").is_none());
    }
}
