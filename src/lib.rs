//! # image-captions
//!
//! Numbered figure captions for books built from markdown.
//!
//! Every image that stands alone on its line and has a `title` or `alt` text
//! is wrapped in a `<figure>` with a `<figcaption>` rendered from a template:
//!
//! ```text
//! <p><img src="cat.png" alt="A cat"></p>
//!
//! <figure id="fig1.2"><img src="cat.png" alt="A cat"><figcaption>Figure: A cat</figcaption></figure>
//! ```
//!
//! Images get a key `<page_level>.<n>` (the n-th captioned image of the
//! page) and a book-wide number. The numbered list of all images is
//! published as a template variable so a book can render a list of figures.
//!
//! ## Templates
//!
//! | Placeholder           | Value                     |
//! |-----------------------|---------------------------|
//! | `_CAPTION_`           | `title`, else `alt`       |
//! | `_PAGE_LEVEL_`        | level of the page         |
//! | `_PAGE_IMAGE_NUMBER_` | number within the page    |
//! | `_BOOK_IMAGE_NUMBER_` | number within the book    |
//!
//! ## Usage
//!
//! ```no_run
//! use image_captions::book::{BookSource, DirectoryBook};
//! use image_captions::{ImageCaptions, Variables};
//!
//! let book = DirectoryBook::open("my-book")?;
//! let plugin = ImageCaptions::from_book(book.config())?;
//! let mut vars = Variables::from(book.config().variables.clone());
//!
//! let session = plugin.on_init(&book, &mut vars)?;
//! for page_ref in book.pages() {
//!     let mut page = book.load_page(&page_ref)?;
//!     session.on_page(&mut page)?;
//! }
//! # Ok::<(), image_captions::Error>(())
//! ```

pub mod book;
pub mod captions;
pub mod config;
pub mod dom;
pub mod error;
pub mod plugin;
pub(crate) mod util;

pub use captions::{ImageRecord, ImageRegistry};
pub use config::{BookConfig, CaptionsConfig, ImageOverride};
pub use error::{Error, Result};
pub use plugin::{ImageCaptions, Session, Variables};
