//! Fragment serialization.
//!
//! Writes the children of the synthetic root back out as markup. Namespace
//! declarations that only exist because of the authoring format are dropped
//! while writing, and [`strip_namespace_declarations`] removes any textual
//! leftovers of the same declarations.
use std::{borrow::Cow, sync::LazyLock};

use regex::Regex;

use super::tree::{Attribute, Document, NodeData, NodeId};
use crate::{
  types::{XHTML_NAMESPACE, XLINK_NAMESPACE, XMLNS_NAMESPACE},
  utils::never_matching_regex,
};

/// Namespace declarations that never belong in delivered markup.
const NOISE_DECLARATIONS: [(&str, &str); 4] = [
  ("xmlns", ""),
  ("xmlns", XHTML_NAMESPACE),
  ("xmlns:xhtml", XHTML_NAMESPACE),
  ("xmlns:xlink", XLINK_NAMESPACE),
];

static NOISE_DECLARATION_RE: LazyLock<Regex> = LazyLock::new(|| {
  let alternatives = NOISE_DECLARATIONS
    .iter()
    .map(|(name, uri)| regex::escape(&format!("{name}=\"{uri}\"")))
    .collect::<Vec<_>>()
    .join("|");

  Regex::new(&format!(" ?(?:{alternatives})")).unwrap_or_else(|e| {
    log::error!(
      "Failed to compile NOISE_DECLARATION_RE regex: {e}\n Falling back to \
       never matching regex."
    );
    never_matching_regex()
  })
});

/// Serialize the inner markup of the synthetic root.
#[must_use]
pub fn serialize(document: &Document) -> String {
  let mut out = String::new();
  for &child in document.children(document.root()) {
    write_node(document, child, &mut out);
  }
  strip_namespace_declarations(&out).into_owned()
}

/// Remove every textual occurrence of the `xmlns=""`, XHTML default,
/// `xmlns:xhtml` and `xmlns:xlink` declarations, each with one preceding
/// space if present.
#[must_use]
pub fn strip_namespace_declarations(html: &str) -> Cow<'_, str> {
  if !html.contains("xmlns") {
    return Cow::Borrowed(html);
  }
  NOISE_DECLARATION_RE.replace_all(html, "")
}

fn is_noise_declaration(attr: &Attribute) -> bool {
  attr.is_in_namespace(XMLNS_NAMESPACE)
    && NOISE_DECLARATIONS
      .iter()
      .any(|(name, uri)| attr.name == *name && attr.value == *uri)
}

fn write_node(document: &Document, id: NodeId, out: &mut String) {
  match document.data(id) {
    NodeData::Element(element) => {
      out.push('<');
      out.push_str(&element.name);
      for attr in element
        .attributes
        .iter()
        .filter(|attr| !is_noise_declaration(attr))
      {
        out.push(' ');
        out.push_str(&attr.name);
        out.push_str("=\"");
        out.push_str(&html_escape::encode_double_quoted_attribute(&attr.value));
        out.push('"');
      }

      let children = document.children(id);
      if children.is_empty() && element.self_closing {
        out.push_str(" />");
        return;
      }

      out.push('>');
      for &child in children {
        write_node(document, child, out);
      }
      out.push_str("</");
      out.push_str(&element.name);
      out.push('>');
    },
    NodeData::Text(text) => out.push_str(&html_escape::encode_text(text)),
    NodeData::CData(text) => {
      out.push_str("<![CDATA[");
      out.push_str(text);
      out.push_str("]]>");
    },
    NodeData::Comment(text) => {
      out.push_str("<!--");
      out.push_str(text);
      out.push_str("-->");
    },
    NodeData::ProcessingInstruction(text) => {
      out.push_str("<?");
      out.push_str(text);
      out.push_str("?>");
    },
  }
}

#[cfg(test)]
mod tests {
  #![allow(clippy::unwrap_used, reason = "Fine in tests")]

  use super::*;
  use crate::dom::wrap;

  fn round_trip(fragment: &str) -> String {
    serialize(&wrap(fragment).unwrap())
  }

  #[test]
  fn test_serialize_plain_markup_unchanged() {
    let fragment =
      r#"<p class="intro">Hello <b>world</b>, <a href="/x" id="y">go</a></p>"#;
    assert_eq!(round_trip(fragment), fragment);
  }

  #[test]
  fn test_serialize_never_emits_wrapper() {
    let out = round_trip("a<br />b");
    assert_eq!(out, "a<br />b");
    assert!(!out.contains("xhtmlroot"));
  }

  #[test]
  fn test_serialize_self_closing_style() {
    assert_eq!(round_trip("<img src=\"/a.png\"/>"), "<img src=\"/a.png\" />");
  }

  #[test]
  fn test_serialize_escapes() {
    assert_eq!(
      round_trip(r#"<a title="&quot;x&quot; &amp; y">1 &lt; 2 &amp; 3 &gt; 0</a>"#),
      r#"<a title="&quot;x&quot; &amp; y">1 &lt; 2 &amp; 3 &gt; 0</a>"#
    );
  }

  #[test]
  fn test_serialize_single_quoted_attributes_become_double() {
    assert_eq!(round_trip("<p class='x'>y</p>"), r#"<p class="x">y</p>"#);
  }

  #[test]
  fn test_serialize_drops_noise_declarations() {
    let fragment = format!(
      r#"<p xmlns="{XHTML_NAMESPACE}">a <span xmlns="">b</span> <i xmlns:xlink="{XLINK_NAMESPACE}" xmlns:xhtml="{XHTML_NAMESPACE}">c</i></p>"#
    );
    assert_eq!(round_trip(&fragment), "<p>a <span>b</span> <i>c</i></p>");
  }

  #[test]
  fn test_serialize_keeps_foreign_declarations() {
    let fragment = r#"<svg xmlns="http://www.w3.org/2000/svg"><circle r="1" /></svg>"#;
    assert_eq!(round_trip(fragment), fragment);
  }

  #[test]
  fn test_serialize_preserves_comments_cdata_and_pis() {
    let fragment = "<!-- note --><p><![CDATA[a < b]]></p><?php echo 1; ?>";
    assert_eq!(round_trip(fragment), fragment);
  }

  #[test]
  fn test_strip_namespace_declarations_every_variant() {
    let html = format!(
      r#"<a xmlns="" xmlns="{XHTML_NAMESPACE}" xmlns:xhtml="{XHTML_NAMESPACE}" xmlns:xlink="{XLINK_NAMESPACE}">x</a><b xmlns="">y</b>"#
    );
    assert_eq!(strip_namespace_declarations(&html), "<a>x</a><b>y</b>");
  }

  #[test]
  fn test_strip_namespace_declarations_leaves_other_uris() {
    let html = r#"<a xmlns:xlink="urn:x">x</a>"#;
    assert_eq!(strip_namespace_declarations(html), html);
  }

  #[test]
  fn test_strip_namespace_declarations_borrows_when_clean() {
    assert!(matches!(
      strip_namespace_declarations("<p>clean</p>"),
      Cow::Borrowed(_)
    ));
  }
}
