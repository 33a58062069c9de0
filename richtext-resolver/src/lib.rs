//! # richtext-resolver
//!
//! Post-processing for rich-text fragments authored in a content management
//! system. Fragments reference other CMS items through `xlink:href="tcm:..."`
//! anchors; this crate turns those into real links, removes the authoring
//! markup that is left over, and fixes empty named anchors so the fragment can
//! be dropped straight into a delivered page.
//!
//! ## Quick Start
//!
//! ```rust
//! use richtext_resolver::{MapLinkResolver, ResolverOptions, RichTextResolver};
//!
//! let links = MapLinkResolver::new().with_link("tcm:1-2", "/page/a");
//! let resolver = RichTextResolver::builder()
//!   .link_resolver(links)
//!   .logger(log::logger())
//!   .configuration(ResolverOptions::default())
//!   .build()
//!   .unwrap();
//!
//! // Resolvable references become plain links
//! let html = resolver
//!   .resolve(r#"<a xlink:href="tcm:1-2">text</a>"#, None)
//!   .unwrap();
//! assert_eq!(html, r#"<a href="/page/a">text</a>"#);
//!
//! // Dead links collapse into their content
//! let html = resolver
//!   .resolve(r#"<p>see <a xlink:href="tcm:9-9">this</a></p>"#, None)
//!   .unwrap();
//! assert_eq!(html, "<p>see this</p>");
//! ```
//!
//! ## Pipeline
//!
//! 1. [`dom::wrap`] wraps the fragment in a synthetic root and parses it
//! 2. [`processor::rewrite_links`] resolves `tcm:` references
//! 3. [`processor::scrub_xlink_attributes`] removes leftover xlink attributes
//! 4. [`processor::adjust_image_sources`] (inert unless a context path is set)
//! 5. [`processor::normalize_empty_anchors`] fixes empty anchors
//! 6. [`dom::serialize`] unwraps and cleans namespace declarations
//!
//! Every stage is available on its own for callers that need a custom
//! pipeline.
pub mod dom;
mod error;
pub mod processor;
mod types;
pub mod utils;

pub use crate::{
  error::{BoxError, RichTextError, RichTextResult},
  processor::{
    ProcessedFragment,
    RichTextResolver,
    RichTextResolverBuilder,
    process_fragment,
  },
  types::{
    EMPTY_ANCHOR_TEXT,
    HIDDEN_ANCHOR_STYLE,
    LinkResolver,
    MapLinkResolver,
    NULL_URI,
    ResolverOptions,
    TCM_PREFIX,
    XHTML_NAMESPACE,
    XLINK_NAMESPACE,
    XML_NAMESPACE,
    XMLNS_NAMESPACE,
  },
};
