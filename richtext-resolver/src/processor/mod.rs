//! Rich-text processing stages.
//!
//! Each stage works in place on a [`Document`](crate::dom::Document):
//!
//! - [`links`]: resolve `xlink:href` references or collapse dead links
//! - [`scrub`]: drop every leftover xlink attribute
//! - [`images`]: optional context path for `src` attributes
//! - [`anchors`]: make empty anchors addressable but invisible
//!
//! [`process`] chains them between loading and serialization, and [`core`]
//! wraps that pipeline in the [`RichTextResolver`] facade.
pub mod anchors;
pub mod core;
pub mod images;
pub mod links;
pub mod process;
pub mod scrub;

pub use anchors::normalize_empty_anchors;
pub use self::core::{RichTextResolver, RichTextResolverBuilder};
pub use images::adjust_image_sources;
pub use links::{RewriteSummary, rewrite_links, unresolved_reference};
pub use process::{ProcessedFragment, process_fragment};
pub use scrub::scrub_xlink_attributes;
