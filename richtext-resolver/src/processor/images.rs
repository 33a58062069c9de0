//! Context path adjustment for `src` attributes.
//!
//! Selection always runs, but nothing is rewritten unless a context path is
//! configured. With the default options this stage leaves the tree untouched.
use crate::{
  dom::{Document, NodeId},
  utils::normalize_context_path,
};

/// Prefix root-relative `src` values with `context_path`.
///
/// Only values starting with a single `/` are rewritten; absolute URLs,
/// protocol-relative URLs, relative paths and values that already carry the
/// context path are kept. Returns the number of attributes changed.
pub fn adjust_image_sources(
  document: &mut Document,
  context_path: Option<&str>,
) -> usize {
  let sources: Vec<NodeId> = document
    .elements()
    .into_iter()
    .filter(|&id| {
      document
        .element(id)
        .is_some_and(|element| element.get("src").is_some())
    })
    .collect();

  let Some(context) = context_path
    .map(normalize_context_path)
    .filter(|context| !context.is_empty())
  else {
    return 0;
  };

  let mut adjusted = 0;
  for id in sources {
    let Some(element) = document.element_mut(id) else {
      continue;
    };
    for attr in &mut element.attributes {
      if attr.namespace.is_none()
        && attr.name == "src"
        && needs_context(&attr.value, &context)
      {
        attr.value = format!("{context}{}", attr.value);
        adjusted += 1;
      }
    }
  }

  adjusted
}

fn needs_context(src: &str, context: &str) -> bool {
  src.starts_with('/')
    && !src.starts_with("//")
    && src != context
    && !src
      .strip_prefix(context)
      .is_some_and(|rest| rest.starts_with(['/', '?', '#']))
}
