//! Arena-backed document tree.
//!
//! Nodes live in a single `Vec` and are addressed by [`NodeId`]. Detaching a
//! node unlinks it from its parent but keeps it in the arena, so handles
//! collected before a mutation never dangle; they may only point at nodes that
//! are no longer reachable from the root.
use crate::types::XHTML_NAMESPACE;

/// Handle to a node in a [`Document`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

/// An attribute as authored, with its namespace resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
  /// Qualified name as written, e.g. `xlink:href`.
  pub name:      String,
  /// Resolved namespace URI. Unprefixed attributes have none.
  pub namespace: Option<String>,
  pub value:     String,
}

impl Attribute {
  #[must_use]
  pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
    Self {
      name:      name.into(),
      namespace: None,
      value:     value.into(),
    }
  }

  /// Name without its prefix.
  #[must_use]
  pub fn local_name(&self) -> &str {
    local_part(&self.name)
  }

  #[must_use]
  pub fn is_in_namespace(&self, namespace: &str) -> bool {
    self.namespace.as_deref() == Some(namespace)
  }
}

/// An element node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
  /// Qualified name as written.
  pub name:         String,
  /// Resolved namespace URI of the element.
  pub namespace:    Option<String>,
  pub attributes:   Vec<Attribute>,
  /// Authored as `<name/>`. Only affects serialization while the element has
  /// no children.
  pub self_closing: bool,
}

impl Element {
  #[must_use]
  pub fn new(name: impl Into<String>) -> Self {
    Self {
      name:         name.into(),
      namespace:    None,
      attributes:   Vec::new(),
      self_closing: false,
    }
  }

  #[must_use]
  pub fn local_name(&self) -> &str {
    local_part(&self.name)
  }

  /// Whether this is an `a` element in the XHTML namespace or in no
  /// namespace at all.
  #[must_use]
  pub fn is_anchor(&self) -> bool {
    self.local_name() == "a"
      && self
        .namespace
        .as_deref()
        .is_none_or(|ns| ns == XHTML_NAMESPACE)
  }

  /// Find an attribute by local name and exact namespace.
  #[must_use]
  pub fn attribute(
    &self,
    local_name: &str,
    namespace: Option<&str>,
  ) -> Option<&Attribute> {
    self.attributes.iter().find(|attr| {
      attr.local_name() == local_name && attr.namespace.as_deref() == namespace
    })
  }

  /// Value of an unprefixed attribute.
  #[must_use]
  pub fn get(&self, name: &str) -> Option<&str> {
    self.attribute(name, None).map(|attr| attr.value.as_str())
  }

  /// The conventional `href`: unprefixed, or explicitly in the XHTML
  /// namespace.
  #[must_use]
  pub fn href(&self) -> Option<&Attribute> {
    self.attributes.iter().find(|attr| {
      attr.local_name() == "href"
        && attr
          .namespace
          .as_deref()
          .is_none_or(|ns| ns == XHTML_NAMESPACE)
    })
  }

  /// Set the conventional `href`, replacing an existing one in place or
  /// appending a new unprefixed attribute.
  pub fn set_href(&mut self, url: impl Into<String>) {
    let url = url.into();
    let existing = self.attributes.iter_mut().find(|attr| {
      attr.local_name() == "href"
        && attr
          .namespace
          .as_deref()
          .is_none_or(|ns| ns == XHTML_NAMESPACE)
    });

    match existing {
      Some(attr) => attr.value = url,
      None => self.attributes.push(Attribute::new("href", url)),
    }
  }

  /// Drop any unprefixed attribute called `name` and append a fresh one at
  /// the end of the attribute list.
  pub fn append_attribute(
    &mut self,
    name: impl Into<String>,
    value: impl Into<String>,
  ) {
    let attr = Attribute::new(name, value);
    self
      .attributes
      .retain(|existing| existing.namespace.is_some() || existing.name != attr.name);
    self.attributes.push(attr);
  }

  /// Remove every attribute in `namespace`, returning how many were removed.
  pub fn remove_attributes_in(&mut self, namespace: &str) -> usize {
    let before = self.attributes.len();
    self.attributes.retain(|attr| !attr.is_in_namespace(namespace));
    before - self.attributes.len()
  }

  /// Whether any attribute lives in `namespace`.
  #[must_use]
  pub fn has_attribute_in(&self, namespace: &str) -> bool {
    self
      .attributes
      .iter()
      .any(|attr| attr.is_in_namespace(namespace))
  }
}

/// Payload of a node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeData {
  Element(Element),
  /// Unescaped character data.
  Text(String),
  CData(String),
  Comment(String),
  /// Raw content between `<?` and `?>`.
  ProcessingInstruction(String),
}

#[derive(Debug, Clone)]
struct Node {
  parent:   Option<NodeId>,
  children: Vec<NodeId>,
  data:     NodeData,
}

/// A parsed fragment: a synthetic root element and everything below it.
#[derive(Debug, Clone)]
pub struct Document {
  nodes: Vec<Node>,
  root:  NodeId,
}

impl Document {
  /// Create a document holding only `root`.
  #[must_use]
  pub fn new(root: Element) -> Self {
    Self {
      nodes: vec![Node {
        parent:   None,
        children: Vec::new(),
        data:     NodeData::Element(root),
      }],
      root:  NodeId(0),
    }
  }

  #[must_use]
  pub const fn root(&self) -> NodeId {
    self.root
  }

  #[must_use]
  pub fn data(&self, id: NodeId) -> &NodeData {
    &self.nodes[id.0].data
  }

  pub fn data_mut(&mut self, id: NodeId) -> &mut NodeData {
    &mut self.nodes[id.0].data
  }

  #[must_use]
  pub fn element(&self, id: NodeId) -> Option<&Element> {
    match self.data(id) {
      NodeData::Element(element) => Some(element),
      _ => None,
    }
  }

  pub fn element_mut(&mut self, id: NodeId) -> Option<&mut Element> {
    match self.data_mut(id) {
      NodeData::Element(element) => Some(element),
      _ => None,
    }
  }

  #[must_use]
  pub fn parent(&self, id: NodeId) -> Option<NodeId> {
    self.nodes[id.0].parent
  }

  #[must_use]
  pub fn children(&self, id: NodeId) -> &[NodeId] {
    &self.nodes[id.0].children
  }

  /// Create a node and append it as the last child of `parent`.
  pub fn append(&mut self, parent: NodeId, data: NodeData) -> NodeId {
    let id = NodeId(self.nodes.len());
    self.nodes.push(Node {
      parent: Some(parent),
      children: Vec::new(),
      data,
    });
    self.nodes[parent.0].children.push(id);
    id
  }

  /// Unlink `id` from its parent. The subtree stays intact but unreachable.
  pub fn detach(&mut self, id: NodeId) {
    if let Some(parent) = self.nodes[id.0].parent.take() {
      self.nodes[parent.0].children.retain(|&child| child != id);
    }
  }

  /// Put the children of `id` into its parent, in order, where `id` was, and
  /// detach `id`. Does nothing for the root or for detached nodes.
  pub fn unwrap_node(&mut self, id: NodeId) {
    let Some(parent) = self.nodes[id.0].parent else {
      return;
    };
    let Some(position) = self.nodes[parent.0]
      .children
      .iter()
      .position(|&child| child == id)
    else {
      return;
    };

    let children = std::mem::take(&mut self.nodes[id.0].children);
    for &child in &children {
      self.nodes[child.0].parent = Some(parent);
    }
    self.nodes[parent.0]
      .children
      .splice(position..=position, children);
    self.nodes[id.0].parent = None;
  }

  /// Replace every child of `id` with a single text node.
  pub fn set_text(&mut self, id: NodeId, text: impl Into<String>) {
    for child in std::mem::take(&mut self.nodes[id.0].children) {
      self.nodes[child.0].parent = None;
    }
    self.append(id, NodeData::Text(text.into()));
  }

  /// Whether `id` is the root or hangs off it.
  #[must_use]
  pub fn is_attached(&self, id: NodeId) -> bool {
    let mut current = id;
    while let Some(parent) = self.parent(current) {
      current = parent;
    }
    current == self.root
  }

  /// Every node below `id` in document order, `id` itself excluded.
  #[must_use]
  pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
    let mut out = Vec::new();
    let mut stack: Vec<NodeId> =
      self.children(id).iter().rev().copied().collect();

    while let Some(next) = stack.pop() {
      out.push(next);
      stack.extend(self.children(next).iter().rev().copied());
    }

    out
  }

  /// Every element reachable from the root, excluding the root itself, in
  /// document order.
  #[must_use]
  pub fn elements(&self) -> Vec<NodeId> {
    self
      .descendants(self.root)
      .into_iter()
      .filter(|&id| self.element(id).is_some())
      .collect()
  }

  /// Concatenated text and CDATA content below `id`.
  #[must_use]
  pub fn text_contents(&self, id: NodeId) -> String {
    self
      .descendants(id)
      .into_iter()
      .filter_map(|node| {
        match self.data(node) {
          NodeData::Text(text) | NodeData::CData(text) => Some(text.as_str()),
          _ => None,
        }
      })
      .collect()
  }
}

fn local_part(name: &str) -> &str {
  name.split_once(':').map_or(name, |(_, local)| local)
}
