//! Book and plugin configuration.
//!
//! The book configuration is a gitbook-style `book.json`; the caption options
//! live under `pluginsConfig["image-captions"]`. Every option is optional and
//! resolves per image: `images[key]` override, then the global option, then
//! the built-in default.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::error::{Error, Result};

/// Key of this plugin inside `pluginsConfig`.
pub const PLUGIN_NAME: &str = "image-captions";

/// Template used when neither the image nor the book configures one.
pub const DEFAULT_CAPTION: &str = "Figure: _CAPTION_";

/// Variable the image registry is published under by default.
pub const DEFAULT_VARIABLE_NAME: &str = "_pictures";

/// Extra attributes applied to an image element, by attribute name.
pub type Attributes = BTreeMap<String, String>;

/// The parts of `book.json` this crate reads.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookConfig {
    /// Host version (or version requirement) the book targets.
    #[serde(default)]
    pub gitbook: Option<String>,
    /// Per-plugin option objects.
    #[serde(default)]
    pub plugins_config: Map<String, Value>,
    /// Template variables defined by the book author.
    #[serde(default)]
    pub variables: Map<String, Value>,
}

impl BookConfig {
    /// Parse a `book.json` document.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load `book.json` from disk. A missing file yields the default config.
    pub fn load(path: &Path) -> Result<Self> {
        match std::fs::read_to_string(path) {
            Ok(json) => Self::from_json(&json),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(Error::io(path, e)),
        }
    }
}

/// Which of the two rendered captions a template is for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptionKind {
    /// Caption placed in the page's `<figcaption>`.
    Caption,
    /// Caption used by listings of the registry ("List of Figures").
    ListCaption,
}

impl CaptionKind {
    fn pick<'a>(self, caption: &'a Option<String>, list_caption: &'a Option<String>) -> Option<&'a str> {
        match self {
            CaptionKind::Caption => caption.as_deref(),
            CaptionKind::ListCaption => list_caption.as_deref(),
        }
    }
}

/// Options of the image-captions plugin.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CaptionsConfig {
    #[serde(default, deserialize_with = "non_empty")]
    pub caption: Option<String>,
    #[serde(default, deserialize_with = "non_empty")]
    pub list_caption: Option<String>,
    #[serde(default, deserialize_with = "non_empty")]
    pub align: Option<String>,
    #[serde(default, deserialize_with = "attribute_map")]
    pub attributes: Option<Attributes>,
    #[serde(default, deserialize_with = "non_empty")]
    pub variable_name: Option<String>,
    #[serde(default)]
    pub images: BTreeMap<String, ImageOverride>,
}

/// Per-image options, keyed by image key (`<page_level>.<index>`).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ImageOverride {
    #[serde(default, deserialize_with = "non_empty")]
    pub caption: Option<String>,
    #[serde(default, deserialize_with = "non_empty")]
    pub list_caption: Option<String>,
    #[serde(default, deserialize_with = "non_empty")]
    pub align: Option<String>,
    #[serde(default, deserialize_with = "attribute_map")]
    pub attributes: Option<Attributes>,
    #[serde(default)]
    pub skip: Option<bool>,
}

impl CaptionsConfig {
    /// Extract the plugin section from a book configuration.
    pub fn from_book(book: &BookConfig) -> Result<Self> {
        match book.plugins_config.get(PLUGIN_NAME) {
            None | Some(Value::Null) => Ok(Self::default()),
            Some(section) => serde_json::from_value(section.clone())
                .map_err(|e| Error::Config(format!("pluginsConfig.{PLUGIN_NAME}: {e}"))),
        }
    }

    /// Name of the variable the registry is published under.
    pub fn variable_name(&self) -> &str {
        self.variable_name.as_deref().unwrap_or(DEFAULT_VARIABLE_NAME)
    }

    fn image(&self, key: &str) -> Option<&ImageOverride> {
        self.images.get(key)
    }

    /// Caption template for an image.
    pub fn template(&self, key: &str, kind: CaptionKind) -> &str {
        self.image(key)
            .and_then(|o| kind.pick(&o.caption, &o.list_caption))
            .or_else(|| kind.pick(&self.caption, &self.list_caption))
            .unwrap_or(DEFAULT_CAPTION)
    }

    /// Attributes to set on an image element.
    pub fn attributes(&self, key: &str) -> Attributes {
        self.image(key)
            .and_then(|o| o.attributes.as_ref())
            .or(self.attributes.as_ref())
            .cloned()
            .unwrap_or_default()
    }

    /// CSS class for the image's figcaption, if any.
    pub fn align(&self, key: &str) -> Option<&str> {
        self.image(key)
            .and_then(|o| o.align.as_deref())
            .or(self.align.as_deref())
    }

    /// Whether the rewrite pass leaves this image alone.
    pub fn skip(&self, key: &str) -> bool {
        self.image(key).and_then(|o| o.skip).unwrap_or(false)
    }
}

/// Empty strings mean "not configured".
fn non_empty<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.filter(|s| !s.is_empty()))
}

/// Attribute values may be written as JSON strings, numbers or booleans.
fn attribute_map<'de, D>(deserializer: D) -> std::result::Result<Option<Attributes>, D::Error>
where
    D: Deserializer<'de>,
{
    let Some(raw) = Option::<BTreeMap<String, Value>>::deserialize(deserializer)? else {
        return Ok(None);
    };

    raw.into_iter()
        .filter(|(_, v)| !v.is_null())
        .map(|(name, value)| match value {
            Value::String(s) => Ok((name, s)),
            Value::Number(n) => Ok((name, n.to_string())),
            Value::Bool(b) => Ok((name, b.to_string())),
            other => Err(serde::de::Error::custom(format!(
                "attribute {name} must be a string, number or boolean, got {other}"
            ))),
        })
        .collect::<std::result::Result<Attributes, _>>()
        .map(Some)
}
