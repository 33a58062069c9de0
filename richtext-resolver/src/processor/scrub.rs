//! Removal of leftover xlink attributes.
use crate::{dom::Document, types::XLINK_NAMESPACE};

/// Remove every xlink attribute from every element, whether or not the
/// element was a link candidate. Returns the number of attributes removed.
///
/// Running this twice leaves the tree exactly as running it once.
pub fn scrub_xlink_attributes(document: &mut Document) -> usize {
  document
    .elements()
    .into_iter()
    .map(|id| {
      document
        .element_mut(id)
        .map_or(0, |element| element.remove_attributes_in(XLINK_NAMESPACE))
    })
    .sum()
}

#[cfg(test)]
mod tests {
  #![allow(clippy::unwrap_used, reason = "Fine in tests")]

  use super::*;
  use crate::dom::{serialize, wrap};

  #[test]
  fn test_scrub_removes_xlink_from_any_element() {
    let mut doc = wrap(
      r#"<p xlink:role="x"><a href="/kept" xlink:href="tcm:1-2">a</a><img src="/i.png" xlink:title="t"/></p>"#,
    )
    .unwrap();

    assert_eq!(scrub_xlink_attributes(&mut doc), 3);
    assert_eq!(
      serialize(&doc),
      r#"<p><a href="/kept">a</a><img src="/i.png" /></p>"#
    );
  }

  #[test]
  fn test_scrub_keeps_other_namespaces() {
    let mut doc = wrap(
      r#"<p xmlns:foo="urn:foo" foo:bar="1" xhtml:lang="en">x</p>"#,
    )
    .unwrap();
    assert_eq!(scrub_xlink_attributes(&mut doc), 0);
    assert_eq!(
      serialize(&doc),
      r#"<p xmlns:foo="urn:foo" foo:bar="1" xhtml:lang="en">x</p>"#
    );
  }

  #[test]
  fn test_scrub_matches_on_namespace_not_prefix() {
    let mut doc = wrap(
      r#"<p xmlns:l="http://www.w3.org/1999/xlink" l:href="tcm:1-2" xmlns:xlink="urn:other" xlink:href="kept">x</p>"#,
    )
    .unwrap();
    assert_eq!(scrub_xlink_attributes(&mut doc), 1);
    assert!(serialize(&doc).contains(r#"xlink:href="kept""#));
  }

  #[test]
  fn test_scrub_is_idempotent() {
    let mut doc =
      wrap(r#"<a xlink:href="http://x" xlink:title="t">y</a>"#).unwrap();
    scrub_xlink_attributes(&mut doc);
    let once = serialize(&doc);

    assert_eq!(scrub_xlink_attributes(&mut doc), 0);
    assert_eq!(serialize(&doc), once);
  }
}
