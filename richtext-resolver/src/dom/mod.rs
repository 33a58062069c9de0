//! Document model for rich-text fragments.
//!
//! - [`tree`]: the arena tree and its node types
//! - [`parse`]: wrapping and loading a fragment
//! - [`serialize`]: unwrapping a tree back into a fragment
pub mod parse;
pub mod serialize;
pub mod tree;

pub use parse::{ROOT_ELEMENT, wrap};
pub use serialize::{serialize, strip_namespace_declarations};
pub use tree::{Attribute, Document, Element, NodeData, NodeId};
