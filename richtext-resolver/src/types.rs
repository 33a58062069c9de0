//! Public types shared by the resolver stages: namespace constants, the link
//! resolver collaborator and the resolver options.
use std::collections::HashMap;

use crate::error::BoxError;

/// Namespace URI of XHTML markup.
pub const XHTML_NAMESPACE: &str = "http://www.w3.org/1999/xhtml";

/// Namespace URI used by authored, not yet resolved, cross-reference links.
pub const XLINK_NAMESPACE: &str = "http://www.w3.org/1999/xlink";

/// Namespace URI bound to `xmlns` and `xmlns:*` declaration attributes.
pub const XMLNS_NAMESPACE: &str = "http://www.w3.org/2000/xmlns/";

/// Namespace URI bound to the reserved `xml` prefix.
pub const XML_NAMESPACE: &str = "http://www.w3.org/XML/1998/namespace";

/// Scheme prefix of internal item references.
pub const TCM_PREFIX: &str = "tcm:";

/// The null item reference, passed as the excluded component when resolving
/// in the context of a page.
pub const NULL_URI: &str = "tcm:0-0-0";

/// Style given to empty anchors so they stay addressable but invisible.
pub const HIDDEN_ANCHOR_STYLE: &str = "position:absolute;visibility:hidden;";

/// Text given to empty anchors that have no `id`.
pub const EMPTY_ANCHOR_TEXT: &str = "empty";

/// Resolves internal item references to deliverable URLs.
///
/// `Ok(None)` and `Ok(Some(""))` both mean the target does not resolve, which
/// is a normal outcome and turns the link into plain content. Errors are
/// surfaced to the caller of [`RichTextResolver::resolve`] unchanged.
///
/// [`RichTextResolver::resolve`]: crate::RichTextResolver::resolve
pub trait LinkResolver {
  /// Resolve a reference without page context.
  ///
  /// # Errors
  ///
  /// Any failure of the underlying resolution mechanism.
  fn resolve_link(&self, reference_id: &str)
  -> Result<Option<String>, BoxError>;

  /// Resolve a reference as seen from `page_id`, never linking to
  /// `exclude_component_id`.
  ///
  /// # Errors
  ///
  /// Any failure of the underlying resolution mechanism.
  fn resolve_link_in_page(
    &self,
    page_id: &str,
    reference_id: &str,
    exclude_component_id: &str,
  ) -> Result<Option<String>, BoxError>;
}

impl<T: LinkResolver + ?Sized> LinkResolver for Box<T> {
  fn resolve_link(
    &self,
    reference_id: &str,
  ) -> Result<Option<String>, BoxError> {
    (**self).resolve_link(reference_id)
  }

  fn resolve_link_in_page(
    &self,
    page_id: &str,
    reference_id: &str,
    exclude_component_id: &str,
  ) -> Result<Option<String>, BoxError> {
    (**self).resolve_link_in_page(page_id, reference_id, exclude_component_id)
  }
}

/// In-memory [`LinkResolver`] backed by static maps.
///
/// Page-specific entries take precedence over global ones; a page without an
/// entry for a reference falls back to the global map.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MapLinkResolver {
  links: HashMap<String, String>,
  pages: HashMap<String, HashMap<String, String>>,
}

impl MapLinkResolver {
  /// Create an empty resolver. Every reference is a dead link.
  #[must_use]
  pub fn new() -> Self {
    Self::default()
  }

  /// Create a resolver from a global reference to URL map.
  #[must_use]
  pub fn from_links(links: HashMap<String, String>) -> Self {
    Self {
      links,
      pages: HashMap::new(),
    }
  }

  /// Add a global mapping.
  #[must_use]
  pub fn with_link(
    mut self,
    reference_id: impl Into<String>,
    url: impl Into<String>,
  ) -> Self {
    self.links.insert(reference_id.into(), url.into());
    self
  }

  /// Add a mapping that only applies when resolving in the context of
  /// `page_id`.
  #[must_use]
  pub fn with_page_link(
    mut self,
    page_id: impl Into<String>,
    reference_id: impl Into<String>,
    url: impl Into<String>,
  ) -> Self {
    self
      .pages
      .entry(page_id.into())
      .or_default()
      .insert(reference_id.into(), url.into());
    self
  }

  /// Add all mappings for one page.
  pub fn extend_page(
    &mut self,
    page_id: impl Into<String>,
    links: impl IntoIterator<Item = (String, String)>,
  ) {
    self.pages.entry(page_id.into()).or_default().extend(links);
  }

  /// Number of global mappings.
  #[must_use]
  pub fn len(&self) -> usize {
    self.links.len()
  }

  /// Whether there are no mappings at all.
  #[must_use]
  pub fn is_empty(&self) -> bool {
    self.links.is_empty() && self.pages.values().all(HashMap::is_empty)
  }
}

impl LinkResolver for MapLinkResolver {
  fn resolve_link(
    &self,
    reference_id: &str,
  ) -> Result<Option<String>, BoxError> {
    Ok(self.links.get(reference_id).cloned())
  }

  fn resolve_link_in_page(
    &self,
    page_id: &str,
    reference_id: &str,
    exclude_component_id: &str,
  ) -> Result<Option<String>, BoxError> {
    if reference_id == exclude_component_id {
      return Ok(None);
    }

    let url = self
      .pages
      .get(page_id)
      .and_then(|links| links.get(reference_id))
      .or_else(|| self.links.get(reference_id))
      .cloned();
    Ok(url)
  }
}

/// Options controlling the non-link stages of the resolver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolverOptions {
  /// Style attribute value given to empty anchors.
  pub hidden_anchor_style: String,

  /// Text given to empty anchors without an `id`.
  pub empty_anchor_text: String,

  /// Context path prepended to root-relative `src` attributes.
  /// `None` leaves every `src` untouched.
  pub image_context_path: Option<String>,
}

impl Default for ResolverOptions {
  fn default() -> Self {
    Self {
      hidden_anchor_style: HIDDEN_ANCHOR_STYLE.to_string(),
      empty_anchor_text:   EMPTY_ANCHOR_TEXT.to_string(),
      image_context_path:  None,
    }
  }
}
