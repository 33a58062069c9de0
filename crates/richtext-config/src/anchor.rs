use richtext_resolver::{EMPTY_ANCHOR_TEXT, HIDDEN_ANCHOR_STYLE};
use serde::{Deserialize, Serialize};

/// Configuration for empty anchor normalization
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnchorConfig {
  /// Style given to anchors that have no content.
  ///
  /// The anchor stays addressable as a jump target but is not rendered.
  pub hidden_style: String,

  /// Text placed inside an empty anchor that has no `id`.
  pub fallback_text: String,
}

impl Default for AnchorConfig {
  fn default() -> Self {
    Self {
      hidden_style:  HIDDEN_ANCHOR_STYLE.to_string(),
      fallback_text: EMPTY_ANCHOR_TEXT.to_string(),
    }
  }
}
