//! Empty anchor normalization.
use crate::{
  dom::{Document, Element, NodeId},
  types::ResolverOptions,
};

/// Make anchors without any child node addressable but invisible.
///
/// Each empty anchor gets `options.hidden_anchor_style` as its `style`
/// (replacing any existing one, appended last) and a text child: its `id`
/// when that is non-empty, else `options.empty_anchor_text`. Returns the
/// number of anchors changed.
pub fn normalize_empty_anchors(
  document: &mut Document,
  options: &ResolverOptions,
) -> usize {
  let empty: Vec<NodeId> = document
    .elements()
    .into_iter()
    .filter(|&id| {
      document.children(id).is_empty()
        && document.element(id).is_some_and(Element::is_anchor)
    })
    .collect();

  for &id in &empty {
    let Some(anchor) = document.element_mut(id) else {
      continue;
    };
    anchor.append_attribute("style", options.hidden_anchor_style.as_str());

    let text = anchor
      .get("id")
      .filter(|id| !id.is_empty())
      .unwrap_or(options.empty_anchor_text.as_str())
      .to_string();
    document.set_text(id, text);
  }

  empty.len()
}
