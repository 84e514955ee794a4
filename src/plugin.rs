//! The plugin's lifecycle hooks.
//!
//! ```
//! use image_captions::book::{BookSource, HostVersion, Page, PageRef};
//! use image_captions::{CaptionsConfig, ImageCaptions, Variables};
//!
//! struct OnePage;
//!
//! impl BookSource for OnePage {
//!     fn version(&self) -> HostVersion {
//!         HostVersion::Current
//!     }
//!     fn pages(&self) -> Vec<PageRef> {
//!         vec![PageRef::new("README.md", "0", "Introduction")]
//!     }
//!     fn load_page(&self, page: &PageRef) -> image_captions::Result<Page> {
//!         Ok(Page::flat(page.published_path(), &page.level, r#"<p><img src="a.png" alt="A cat"></p>"#))
//!     }
//! }
//!
//! let plugin = ImageCaptions::new(CaptionsConfig::default());
//! let mut vars = Variables::default();
//! let session = plugin.on_init(&OnePage, &mut vars)?;
//! assert_eq!(vars.get("_pictures").map(|v| v[0]["caption"].clone()), Some("Figure: A cat".into()));
//!
//! let mut page = OnePage.load_page(&OnePage.pages()[0])?;
//! session.on_page(&mut page)?;
//! assert!(page.content.contains(r#"<figure id="fig0.1">"#));
//! # Ok::<(), image_captions::Error>(())
//! ```

use log::info;
use serde_json::{Map, Value};

use crate::book::{BookSource, Page, PageLayout, layout_for};
use crate::captions::{ImageRegistry, collect_all, rewrite_page};
use crate::config::{BookConfig, CaptionsConfig};
use crate::error::Result;

/// Variables visible to page templates, e.g. a "List of Figures" page.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Variables(Map<String, Value>);

impl Variables {
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    pub fn set(&mut self, name: impl Into<String>, value: Value) {
        self.0.insert(name.into(), value);
    }

    pub fn remove(&mut self, name: &str) -> Option<Value> {
        self.0.remove(name)
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }
}

impl From<Map<String, Value>> for Variables {
    fn from(map: Map<String, Value>) -> Self {
        Variables(map)
    }
}

/// The image-captions plugin, before a build starts.
#[derive(Debug, Clone, Default)]
pub struct ImageCaptions {
    config: CaptionsConfig,
}

impl ImageCaptions {
    pub fn new(config: CaptionsConfig) -> Self {
        Self { config }
    }

    /// Configure the plugin from a book's `pluginsConfig`.
    pub fn from_book(book: &BookConfig) -> Result<Self> {
        Ok(Self::new(CaptionsConfig::from_book(book)?))
    }

    pub fn config(&self) -> &CaptionsConfig {
        &self.config
    }

    /// Init hook: collect and number every image of the book, then publish
    /// the registry under the configured variable name.
    ///
    /// A registry left over from a previous build is removed first; on error
    /// nothing is published. Pages can only be rewritten through the
    /// returned [`Session`].
    pub fn on_init(&self, source: &dyn BookSource, vars: &mut Variables) -> Result<Session> {
        let name = self.config.variable_name();
        vars.remove(name);

        let registry = collect_all(source, &self.config)?;
        vars.set(name, serde_json::to_value(&registry)?);
        info!("published {} images as {name}", registry.len());

        Ok(Session {
            registry,
            layout: layout_for(source.version()),
        })
    }
}

/// A build whose images have been collected.
pub struct Session {
    registry: ImageRegistry,
    layout: Box<dyn PageLayout>,
}

impl Session {
    /// Page hook: wrap the page's registered images in figures.
    pub fn on_page(&self, page: &mut Page) -> Result<()> {
        let path = page.path.clone();
        rewrite_page(&self.registry, self.layout.as_ref(), page).map_err(|e| e.in_page(&path))
    }

    pub fn registry(&self) -> &ImageRegistry {
        &self.registry
    }

    pub fn into_registry(self) -> ImageRegistry {
        self.registry
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::book::{HostVersion, PageRef};
    use crate::error::Error;

    struct Pages(Vec<(&'static str, &'static str, &'static str)>);

    impl BookSource for Pages {
        fn version(&self) -> HostVersion {
            HostVersion::Current
        }

        fn pages(&self) -> Vec<PageRef> {
            self.0.iter().map(|(path, level, _)| PageRef::new(*path, *level, "")).collect()
        }

        fn load_page(&self, page: &PageRef) -> Result<Page> {
            let (_, _, html) = self.0.iter().find(|(p, _, _)| *p == page.path).ok_or_else(|| {
                Error::io(&page.path, std::io::Error::from(std::io::ErrorKind::NotFound))
            })?;
            Ok(Page::flat(page.published_path(), &page.level, *html))
        }
    }

    #[test]
    fn test_publishes_under_configured_name() {
        let config: CaptionsConfig = serde_json::from_str(r#"{"variable_name": "figures"}"#).unwrap();
        let plugin = ImageCaptions::new(config);
        let source = Pages(vec![("README.md", "0", r#"<p><img src="a.png" alt="a"></p>"#)]);

        let mut vars = Variables::default();
        let session = plugin.on_init(&source, &mut vars).unwrap();

        assert!(vars.get("_pictures").is_none());
        let published = vars.get("figures").and_then(Value::as_array).unwrap();
        assert_eq!(published.len(), 1);
        assert_eq!(published[0]["backlink"], "index.html#fig0.1");
        assert_eq!(session.registry().len(), 1);
    }

    #[test]
    fn test_init_resets_previous_registry() {
        let plugin = ImageCaptions::default();
        let mut vars = Variables::default();
        vars.set("_pictures", Value::String("stale".into()));

        let source = Pages(vec![("README.md", "0", "<p>no images</p>")]);
        plugin.on_init(&source, &mut vars).unwrap();
        assert_eq!(vars.get("_pictures"), Some(&Value::Array(Vec::new())));
    }

    #[test]
    fn test_failed_init_publishes_nothing() {
        let plugin = ImageCaptions::default();
        let mut vars = Variables::default();
        vars.set("_pictures", Value::String("stale".into()));

        let source = Pages(vec![("README.md", "0", "")]);
        struct Broken(Pages);
        impl BookSource for Broken {
            fn version(&self) -> HostVersion {
                self.0.version()
            }
            fn pages(&self) -> Vec<PageRef> {
                let mut pages = self.0.pages();
                pages.push(PageRef::new("missing.md", "1", "Missing"));
                pages
            }
            fn load_page(&self, page: &PageRef) -> Result<Page> {
                self.0.load_page(page)
            }
        }

        let err = plugin.on_init(&Broken(source), &mut vars).err().unwrap();
        assert!(matches!(err, Error::Page { ref path, .. } if path == "missing.md"));
        assert!(vars.get("_pictures").is_none());
    }

    #[test]
    fn test_on_page_reports_page_path() {
        let plugin = ImageCaptions::default();
        let source = Pages(vec![("README.md", "0", "<p>text</p>")]);
        let session = plugin.on_init(&source, &mut Variables::default()).unwrap();

        let mut page = Page::flat("index.html", "0", r#"<p><img src="new.png" alt="new"></p>"#);
        let err = session.on_page(&mut page).unwrap_err();
        assert!(matches!(err, Error::MissingImage { ref key, .. } if key == "0.1"));
    }
}
