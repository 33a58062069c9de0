//! The complete transformation pipeline.
use super::{
  anchors::normalize_empty_anchors,
  images::adjust_image_sources,
  links::{RewriteSummary, rewrite_links},
  scrub::scrub_xlink_attributes,
};
use crate::{
  dom::{serialize, wrap},
  error::RichTextResult,
  types::{LinkResolver, ResolverOptions},
};

/// Result of processing one fragment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessedFragment {
  /// The rewritten fragment.
  pub html: String,

  /// Link rewriting outcome.
  pub links: RewriteSummary,

  /// Number of xlink attributes removed by the scrubber.
  pub scrubbed_attributes: usize,

  /// Number of `src` attributes given the context path.
  pub adjusted_sources: usize,

  /// Number of empty anchors normalized.
  pub normalized_anchors: usize,
}

/// Run every stage over `fragment`: load, rewrite links, scrub xlink
/// attributes, adjust sources, normalize empty anchors, serialize.
///
/// # Errors
///
/// Returns [`RichTextError::MalformedFragment`] if the fragment cannot be
/// parsed, or [`RichTextError::Resolver`] if `resolver` fails. No output is
/// produced in either case.
///
/// [`RichTextError::MalformedFragment`]: crate::RichTextError::MalformedFragment
/// [`RichTextError::Resolver`]: crate::RichTextError::Resolver
pub fn process_fragment(
  fragment: &str,
  page_id: Option<&str>,
  resolver: &dyn LinkResolver,
  options: &ResolverOptions,
) -> RichTextResult<ProcessedFragment> {
  let mut document = wrap(fragment)?;

  let links = rewrite_links(&mut document, page_id, resolver)?;
  let scrubbed_attributes = scrub_xlink_attributes(&mut document);
  let adjusted_sources = adjust_image_sources(
    &mut document,
    options.image_context_path.as_deref(),
  );
  let normalized_anchors = normalize_empty_anchors(&mut document, options);

  Ok(ProcessedFragment {
    html: serialize(&document),
    links,
    scrubbed_attributes,
    adjusted_sources,
    normalized_anchors,
  })
}
