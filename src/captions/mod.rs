//! Image captioning.
//!
//! Two passes over a book:
//!
//! 1. [`collect_all`] scans every page for qualifying images, numbers them
//!    in navigation order and renders their captions into an
//!    [`ImageRegistry`].
//! 2. [`rewrite_page`] wraps each registered image of a page in a
//!    `<figure>` with a `<figcaption>`.
//!
//! An image qualifies when it stands alone in its parent element and has a
//! non-empty `title` or `alt`; see [`should_wrap`].

mod collect;
mod key;
mod qualify;
mod registry;
mod rewrite;
mod scan;
mod template;

pub use collect::{collect_all, collect_page};
pub use key::ImageKey;
pub use qualify::{image_label, qualifying_images, should_wrap};
pub use registry::{ImageRecord, ImageRegistry};
pub use rewrite::{rewrite_content, rewrite_page};
pub use scan::{ImageDraft, scan_content, scan_page};
pub use template::{PLACEHOLDERS, render};
