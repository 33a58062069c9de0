//! Small helpers shared across stages.
use regex::Regex;

/// A regex that never matches, used when a static pattern fails to compile so
/// that the affected cleanup degrades to a no-op instead of panicking.
#[must_use]
pub fn never_matching_regex() -> Regex {
  // A character that is neither whitespace nor non-whitespace cannot exist
  #[allow(
    clippy::expect_used,
    reason = "This pattern is guaranteed to be valid"
  )]
  Regex::new(r"[^\s\S]").expect("regex pattern [^\\s\\S] should always compile")
}

/// Normalize a context path to `/segment/segment` form: leading slash, no
/// trailing slash. The root context `/` (or an empty string) becomes empty.
#[must_use]
pub fn normalize_context_path(path: &str) -> String {
  let trimmed = path.trim().trim_matches('/');
  if trimmed.is_empty() {
    String::new()
  } else {
    format!("/{trimmed}")
  }
}
