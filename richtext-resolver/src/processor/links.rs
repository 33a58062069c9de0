//! Cross-reference link rewriting.
use crate::{
  dom::{Document, Element, NodeId},
  error::{RichTextError, RichTextResult},
  types::{LinkResolver, NULL_URI, TCM_PREFIX, XLINK_NAMESPACE},
};

/// Outcome counts of a [`rewrite_links`] pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RewriteSummary {
  /// Anchors that received an `href`.
  pub resolved: usize,
  /// Anchors collapsed into their content.
  pub dead:     usize,
}

/// The internal reference of an anchor that still needs resolving.
///
/// An anchor qualifies when its `xlink:href` starts with `tcm:` and its
/// conventional `href` is missing or empty.
#[must_use]
pub fn unresolved_reference(element: &Element) -> Option<&str> {
  if !element.is_anchor() {
    return None;
  }

  let reference = element.attribute("href", Some(XLINK_NAMESPACE))?;
  if !reference.value.starts_with(TCM_PREFIX) {
    return None;
  }

  if element.href().is_some_and(|href| !href.value.is_empty()) {
    return None;
  }

  Some(reference.value.as_str())
}

/// Resolve every unresolved reference anchor in `document`.
///
/// Without a page id (or with an empty one) each reference is resolved on its
/// own; otherwise it is resolved in the context of that page with
/// [`NULL_URI`] as the excluded component. Resolved anchors get an `href` and
/// lose all their xlink attributes. Anchors whose reference does not resolve
/// are replaced by their children.
///
/// # Errors
///
/// Returns [`RichTextError::Resolver`] with the resolver's own error the
/// first time a resolver call fails. Anchors handled before the failure stay
/// rewritten, but callers never see the partially rewritten document.
pub fn rewrite_links(
  document: &mut Document,
  page_id: Option<&str>,
  resolver: &dyn LinkResolver,
) -> RichTextResult<RewriteSummary> {
  let page_id = page_id.filter(|id| !id.is_empty());

  let candidates: Vec<(NodeId, String)> = document
    .elements()
    .into_iter()
    .filter_map(|id| {
      let reference = unresolved_reference(document.element(id)?)?;
      Some((id, reference.to_string()))
    })
    .collect();

  let mut summary = RewriteSummary::default();
  for (id, reference) in candidates {
    let url = match page_id {
      Some(page_id) => {
        resolver.resolve_link_in_page(page_id, &reference, NULL_URI)
      },
      None => resolver.resolve_link(&reference),
    }
    .map_err(RichTextError::Resolver)?
    .filter(|url| !url.is_empty());

    if let Some(url) = url {
      if let Some(anchor) = document.element_mut(id) {
        anchor.set_href(url);
        anchor.remove_attributes_in(XLINK_NAMESPACE);
        summary.resolved += 1;
      }
    } else {
      document.unwrap_node(id);
      summary.dead += 1;
    }
  }

  Ok(summary)
}
