//! Error types for rich-text resolution.

/// Boxed error returned by [`LinkResolver`](crate::LinkResolver)
/// implementations. Passed through to the caller untouched.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Result type for rich-text resolution.
pub type RichTextResult<T> = Result<T, RichTextError>;

/// Errors that can occur while building or running a resolver.
#[derive(Debug, thiserror::Error)]
pub enum RichTextError {
  /// A required collaborator was not supplied to the builder.
  #[error("Missing required dependency: {0}")]
  Configuration(&'static str),

  /// The fragment is not well-formed once wrapped in the synthetic root.
  #[error("Malformed fragment at byte {offset}: {reason}")]
  MalformedFragment {
    /// Byte offset into the caller's fragment, clamped to its bounds.
    offset: usize,
    reason: String,
  },

  /// The link resolver failed.
  #[error(transparent)]
  Resolver(BoxError),
}

impl RichTextError {
  pub(crate) fn malformed(offset: usize, reason: impl Into<String>) -> Self {
    Self::MalformedFragment {
      offset,
      reason: reason.into(),
    }
  }

  /// Whether this error was raised by the fragment parser.
  #[must_use]
  pub const fn is_malformed(&self) -> bool {
    matches!(self, Self::MalformedFragment { .. })
  }
}
