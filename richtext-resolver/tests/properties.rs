#![allow(clippy::expect_used, clippy::unwrap_used, reason = "Fine in tests")]
//! Invariants that must hold for any fragment, checked over a corpus of
//! representative inputs.
use richtext_resolver::{
  MapLinkResolver,
  ResolverOptions,
  XLINK_NAMESPACE,
  dom::{self, Document, NodeData},
  processor::{
    normalize_empty_anchors,
    process_fragment,
    rewrite_links,
    scrub_xlink_attributes,
  },
};

const CORPUS: &[&str] = &[
  r#"<a xlink:href="tcm:1-1">one</a>"#,
  r#"<p>a <a xlink:href="tcm:1-2" xlink:title="two">two <em>2</em></a> b</p>"#,
  r#"<a href="/kept" xlink:href="tcm:1-1" xlink:title="kept">kept</a>"#,
  r#"<a href="" xlink:href="tcm:1-1">empty href</a>"#,
  r#"<a xlink:href="https://example.com" xlink:type="simple">external</a>"#,
  r#"<ul><li><a xlink:href="tcm:1-3"/></li><li><a id="n"/></li></ul>"#,
  r#"<span xlink:role="x"><img src="/a.png" xlink:title="t"/></span>"#,
  r#"<a xlink:href="tcm:1-2"><a xlink:href="tcm:1-1">nested</a></a>"#,
  "plain text only",
  "",
];

fn links() -> MapLinkResolver {
  MapLinkResolver::new()
    .with_link("tcm:1-1", "/one")
    .with_link("tcm:1-3", "/three")
}

fn xlink_attribute_count(document: &Document) -> usize {
  document
    .elements()
    .into_iter()
    .filter_map(|id| document.element(id))
    .map(|element| {
      element
        .attributes
        .iter()
        .filter(|attr| attr.is_in_namespace(XLINK_NAMESPACE))
        .count()
    })
    .sum()
}

#[test]
fn test_scrub_is_idempotent() {
  for fragment in CORPUS {
    let mut once = dom::wrap(fragment).unwrap();
    scrub_xlink_attributes(&mut once);

    let mut twice = once.clone();
    scrub_xlink_attributes(&mut twice);

    assert_eq!(dom::serialize(&once), dom::serialize(&twice), "{fragment}");
  }
}

#[test]
fn test_no_xlink_attribute_survives() {
  for fragment in CORPUS {
    let mut document = dom::wrap(fragment).unwrap();
    rewrite_links(&mut document, None, &links()).unwrap();
    scrub_xlink_attributes(&mut document);
    normalize_empty_anchors(&mut document, &ResolverOptions::default());

    assert_eq!(xlink_attribute_count(&document), 0, "{fragment}");

    let html = process_fragment(
      fragment,
      None,
      &links(),
      &ResolverOptions::default(),
    )
    .unwrap()
    .html;
    assert!(!html.contains("xlink"), "{fragment} -> {html}");
  }
}

#[test]
fn test_resolved_anchor_has_url_and_no_xlink() {
  let html = process_fragment(
    r#"<p><a xlink:href="tcm:1-1" xlink:title="t" class="c">x</a></p>"#,
    None,
    &links(),
    &ResolverOptions::default(),
  )
  .unwrap()
  .html;

  let document = dom::wrap(&html).unwrap();
  let anchor = document
    .elements()
    .into_iter()
    .filter_map(|id| document.element(id))
    .find(|element| element.name == "a")
    .unwrap();
  assert_eq!(anchor.get("href"), Some("/one"));
  assert!(!anchor.has_attribute_in(XLINK_NAMESPACE));
}

#[test]
fn test_dead_anchor_content_stays_in_place() {
  let html = process_fragment(
    r#"<p>before <a xlink:href="tcm:9-9">in <b>bold</b> and <i>it</i></a> after</p>"#,
    None,
    &links(),
    &ResolverOptions::default(),
  )
  .unwrap()
  .html;

  assert_eq!(html, "<p>before in <b>bold</b> and <i>it</i> after</p>");
}

#[test]
fn test_every_empty_anchor_is_filled_and_hidden() {
  for fragment in CORPUS {
    let input = dom::wrap(fragment).unwrap();
    let empty_in_input = input
      .elements()
      .into_iter()
      .filter(|&id| {
        input.children(id).is_empty()
          && input.element(id).is_some_and(dom::Element::is_anchor)
      })
      .count();

    let html = process_fragment(
      fragment,
      None,
      &links(),
      &ResolverOptions::default(),
    )
    .unwrap()
    .html;
    let output = dom::wrap(&html).unwrap();

    let mut hidden = 0;
    for id in output.elements() {
      let element = output.element(id).unwrap();
      if !element.is_anchor() {
        continue;
      }
      assert!(!output.children(id).is_empty(), "{fragment} -> {html}");
      if element.get("style") == Some("position:absolute;visibility:hidden;") {
        assert!(!output.text_contents(id).is_empty());
        hidden += 1;
      }
    }
    assert!(hidden >= empty_in_input, "{fragment} -> {html}");
  }
}

#[test]
fn test_plain_content_round_trips() {
  let plain = [
    "just text",
    r#"<p class="x">Hello <b>there</b><br /><a href="/y">link</a></p>"#,
    "<table><tr><td>1</td><td>2 &amp; 3</td></tr></table>",
    "<!-- comment --> text <![CDATA[raw <stuff>]]>",
    "  leading and trailing whitespace  ",
  ];

  for fragment in plain {
    let html = process_fragment(
      fragment,
      None,
      &MapLinkResolver::new(),
      &ResolverOptions::default(),
    )
    .unwrap()
    .html;
    assert_eq!(html, fragment);
  }
}

#[test]
fn test_plain_content_loses_only_namespace_noise() {
  let fragment = r#"<p xmlns="http://www.w3.org/1999/xhtml">x <span xmlns="">y</span></p>"#;
  let html = process_fragment(
    fragment,
    None,
    &MapLinkResolver::new(),
    &ResolverOptions::default(),
  )
  .unwrap()
  .html;
  assert_eq!(html, "<p>x <span>y</span></p>");
}

#[test]
fn test_tree_contains_no_detached_references() {
  let mut document = dom::wrap(CORPUS[7]).unwrap();
  rewrite_links(&mut document, None, &links()).unwrap();

  for id in document.elements() {
    assert!(document.is_attached(id));
    if let NodeData::Element(element) = document.data(id) {
      assert_ne!(element.name, "");
    }
  }
}
