//! Fragment loading.
//!
//! Fragments have no guaranteed single root, so they are wrapped in a
//! synthetic `xhtmlroot` element that declares the `xhtml` and `xlink`
//! prefixes before being parsed as XML. Any well-formedness problem is fatal.
use log::trace;
use quick_xml::{
  Reader,
  events::{BytesStart, Event},
};

use super::tree::{Attribute, Document, Element, NodeData, NodeId};
use crate::{
  error::{RichTextError, RichTextResult},
  types::{XHTML_NAMESPACE, XLINK_NAMESPACE, XML_NAMESPACE, XMLNS_NAMESPACE},
};

/// Name of the synthetic root element.
pub const ROOT_ELEMENT: &str = "xhtmlroot";

/// Wrap `fragment` in the synthetic root and parse it.
///
/// # Errors
///
/// Returns [`RichTextError::MalformedFragment`] if the wrapped fragment is not
/// well-formed XML: unbalanced or mismatched tags, invalid names, undeclared
/// namespace prefixes, unknown entities, duplicate attributes, characters
/// outside the XML `Char` production, a raw `<` in an attribute value, XML or
/// doctype declarations, or markup that closes the wrapper early.
pub fn wrap(fragment: &str) -> RichTextResult<Document> {
  let head = format!(
    "<{ROOT_ELEMENT} xmlns:xhtml=\"{XHTML_NAMESPACE}\" \
     xmlns:xlink=\"{XLINK_NAMESPACE}\">"
  );
  let wrapped = format!("{head}{fragment}</{ROOT_ELEMENT}>");

  let mut loader = Loader {
    document: None,
    open:     Vec::new(),
    scopes:   Vec::new(),
    closed:   false,
    head_len: head.len(),
    body_len: fragment.len(),
  };
  let mut reader = Reader::from_str(&wrapped);

  loop {
    let event = match reader.read_event() {
      Ok(event) => event,
      Err(err) => {
        let position = byte_position(reader.error_position());
        return Err(loader.malformed(position, err.to_string()));
      },
    };
    let position = byte_position(reader.buffer_position());

    match event {
      Event::Start(start) => loader.start(&start, false, position)?,
      Event::Empty(start) => loader.start(&start, true, position)?,
      Event::End(end) => {
        let name = utf8(end.name().as_ref());
        loader.end(&name, position)?;
      },
      Event::Text(text) => {
        let unescaped = text
          .unescape()
          .map_err(|err| loader.malformed(position, err.to_string()))?;
        loader.text(unescaped.into_owned(), position)?;
      },
      Event::CData(cdata) => {
        let content = utf8(&cdata);
        loader.check_chars(&content, position)?;
        loader.push(NodeData::CData(content), position)?;
      },
      Event::Comment(comment) => {
        let content = utf8(&comment);
        loader.check_chars(&content, position)?;
        loader.push(NodeData::Comment(content), position)?;
      },
      Event::PI(pi) => {
        let content = utf8(&pi);
        loader.check_chars(&content, position)?;
        loader.push(NodeData::ProcessingInstruction(content), position)?;
      },
      Event::Eof => break,
      _ => {
        return Err(loader.malformed(
          position,
          "XML and doctype declarations are not allowed in a fragment",
        ));
      },
    }
  }

  loader.finish(byte_position(reader.buffer_position()))
}

/// Builds a [`Document`] from reader events while tracking namespace scopes.
struct Loader {
  document: Option<Document>,
  /// Elements whose end tag has not been seen yet.
  open:     Vec<NodeId>,
  /// Namespace declarations per open element, `""` being the default
  /// namespace.
  scopes:   Vec<Vec<(String, String)>>,
  /// The synthetic root has been closed.
  closed:   bool,
  head_len: usize,
  body_len: usize,
}

impl Loader {
  /// Build a parse error, translating `position` in the wrapped input into an
  /// offset in the caller's fragment.
  fn malformed(&self, position: usize, reason: impl Into<String>) -> RichTextError {
    let offset = position.saturating_sub(self.head_len).min(self.body_len);
    RichTextError::malformed(offset, reason)
  }

  fn start(
    &mut self,
    start: &BytesStart<'_>,
    self_closing: bool,
    position: usize,
  ) -> RichTextResult<()> {
    if self.closed {
      return Err(self.malformed(position, "markup after the end of the fragment"));
    }

    let name = utf8(start.name().as_ref());
    if !is_valid_name(&name) {
      return Err(self.malformed(position, format!("invalid element name '{name}'")));
    }

    let mut raw = Vec::new();
    let mut scope = Vec::new();
    for attr in start.attributes() {
      let attr = attr.map_err(|err| self.malformed(position, err.to_string()))?;
      let key = utf8(attr.key.as_ref());
      if !is_valid_name(&key) {
        return Err(self.malformed(position, format!("invalid attribute name '{key}'")));
      }
      if attr.value.contains(&b'<') {
        return Err(self.malformed(
          position,
          format!("'<' is not allowed in the value of attribute '{key}'"),
        ));
      }
      let value = attr
        .unescape_value()
        .map_err(|err| self.malformed(position, err.to_string()))?
        .into_owned();
      self.check_chars(&value, position)?;

      if key == "xmlns" {
        scope.push((String::new(), value.clone()));
      } else if let Some(prefix) = key.strip_prefix("xmlns:") {
        if value.is_empty() {
          return Err(self.malformed(
            position,
            format!("prefix '{prefix}' cannot be bound to an empty namespace"),
          ));
        }
        scope.push((prefix.to_string(), value.clone()));
      }
      raw.push((key, value));
    }
    self.scopes.push(scope);

    let namespace = match name.split_once(':') {
      Some((prefix, _)) => {
        Some(self.lookup(prefix).ok_or_else(|| {
          self.malformed(position, format!("undeclared prefix '{prefix}'"))
        })?)
      },
      None => self.lookup("").filter(|uri| !uri.is_empty()),
    };

    let mut attributes = Vec::with_capacity(raw.len());
    for (key, value) in raw {
      let namespace = if key == "xmlns" || key.starts_with("xmlns:") {
        Some(XMLNS_NAMESPACE.to_string())
      } else if let Some((prefix, _)) = key.split_once(':') {
        Some(self.lookup(prefix).ok_or_else(|| {
          self.malformed(position, format!("undeclared prefix '{prefix}'"))
        })?)
      } else {
        None
      };
      attributes.push(Attribute {
        name: key,
        namespace,
        value,
      });
    }

    let element = Element {
      name,
      namespace,
      attributes,
      self_closing,
    };

    let parent = self.open.last().copied();
    let id = match (parent, self.document.as_mut()) {
      (_, None) => {
        let document = Document::new(element);
        let root = document.root();
        self.document = Some(document);
        root
      },
      (Some(parent), Some(document)) => {
        document.append(parent, NodeData::Element(element))
      },
      (None, Some(_)) => {
        return Err(self.malformed(position, "markup after the end of the fragment"));
      },
    };

    if self_closing {
      self.scopes.pop();
      if self.open.is_empty() {
        self.closed = true;
      }
    } else {
      self.open.push(id);
    }
    Ok(())
  }

  fn end(&mut self, name: &str, position: usize) -> RichTextResult<()> {
    let expected = self
      .open
      .last()
      .and_then(|&id| self.document.as_ref()?.element(id))
      .map(|element| element.name.clone());

    match expected {
      Some(expected) if expected == name => {
        self.open.pop();
        self.scopes.pop();
        if self.open.is_empty() {
          self.closed = true;
        }
        Ok(())
      },
      Some(expected) => {
        Err(self.malformed(
          position,
          format!("expected </{expected}>, found </{name}>"),
        ))
      },
      None => Err(self.malformed(position, format!("unmatched end tag </{name}>"))),
    }
  }

  fn text(&mut self, text: String, position: usize) -> RichTextResult<()> {
    if text.is_empty() {
      return Ok(());
    }
    self.check_chars(&text, position)?;
    if self.open.is_empty() && text.trim().is_empty() {
      return Ok(());
    }
    self.push(NodeData::Text(text), position)
  }

  fn push(&mut self, data: NodeData, position: usize) -> RichTextResult<()> {
    let parent = self.open.last().copied();
    match (self.document.as_mut(), parent) {
      (Some(document), Some(parent)) => {
        document.append(parent, data);
        Ok(())
      },
      _ => Err(self.malformed(position, "content outside of the fragment")),
    }
  }

  fn finish(self, position: usize) -> RichTextResult<Document> {
    if let Some(&id) = self.open.last() {
      let name = self
        .document
        .as_ref()
        .and_then(|document| document.element(id))
        .map_or_else(String::new, |element| element.name.clone());
      return Err(self.malformed(position, format!("unclosed element <{name}>")));
    }

    let document = self
      .document
      .ok_or_else(|| RichTextError::malformed(0, "empty document"))?;
    trace!(
      "Loaded fragment with {} element(s)",
      document.elements().len()
    );
    Ok(document)
  }

  /// Reject characters outside the XML `Char` production.
  fn check_chars(&self, content: &str, position: usize) -> RichTextResult<()> {
    match content.chars().find(|&c| !is_xml_char(c)) {
      Some(c) => {
        Err(self.malformed(
          position,
          format!("invalid character U+{:04X}", u32::from(c)),
        ))
      },
      None => Ok(()),
    }
  }

  /// Resolve a prefix against the open scopes, innermost first.
  fn lookup(&self, prefix: &str) -> Option<String> {
    match prefix {
      "xml" => return Some(XML_NAMESPACE.to_string()),
      "xmlns" => return Some(XMLNS_NAMESPACE.to_string()),
      _ => {},
    }

    self
      .scopes
      .iter()
      .rev()
      .flat_map(|scope| scope.iter().rev())
      .find(|(declared, _)| declared == prefix)
      .map(|(_, uri)| uri.clone())
  }
}

fn byte_position<P>(position: P) -> usize
where
  usize: TryFrom<P>,
{
  usize::try_from(position).unwrap_or(usize::MAX)
}

fn utf8(bytes: &[u8]) -> String {
  String::from_utf8_lossy(bytes).into_owned()
}

/// Whether `c` may appear in an XML document. Surrogates cannot occur in a
/// `char`, so only the C0 controls and the two noncharacters are excluded.
const fn is_xml_char(c: char) -> bool {
  !matches!(c, '\u{0}'..='\u{8}' | '\u{B}' | '\u{C}' | '\u{E}'..='\u{1F}')
    && !matches!(c, '\u{FFFE}' | '\u{FFFF}')
}

/// A pragmatic subset of the XML `QName` production.
fn is_valid_name(name: &str) -> bool {
  let mut chars = name.chars();
  let Some(first) = chars.next() else {
    return false;
  };

  (first.is_alphabetic() || first == '_')
    && chars.all(|c| c.is_alphanumeric() || matches!(c, '-' | '_' | '.' | ':'))
    && name.matches(':').count() <= 1
    && !name.ends_with(':')
}
