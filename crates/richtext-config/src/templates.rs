use std::fmt;

/// Error type for template operations.
#[derive(Debug)]
pub enum TemplateError {
  /// The requested configuration format is not supported. Contains the name
  /// of the unsupported format.
  UnsupportedFormat(String),
}

impl fmt::Display for TemplateError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::UnsupportedFormat(format) => {
        write!(f, "Unsupported config format: {format}")
      },
    }
  }
}

impl std::error::Error for TemplateError {}

/// Default configuration template in TOML, commented so that a fresh config
/// explains itself.
pub const DEFAULT_TOML_TEMPLATE: &str = r#"# richtext configuration file

# Page that fragments are rendered into. Links are resolved in the context of
# this page unless a page is given on the command line.
# page_id = "tcm:1-10-64"

# Context path prepended to root-relative image sources (e.g. "/site").
# Leave unset to keep sources as authored.
# context_path = "/site"

# Number of threads to use for batch processing (defaults to number of CPU cores)
# jobs = 4

# Empty anchor handling
[anchor]
# Style given to anchors without content
hidden_style = "position:absolute;visibility:hidden;"

# Text placed in empty anchors that have no id
fallback_text = "empty"

# Link targets, keyed by CMS reference
[links]
# "tcm:1-2" = "/products/widget.html"

# Per-page link targets. Lookups for a page fall back to [links].
# [pages."tcm:1-10-64"]
# "tcm:1-2" = "/en/products/widget.html"
"#;

/// Default configuration template in JSON.
pub const DEFAULT_JSON_TEMPLATE: &str = r#"{
  "page_id": null,
  "context_path": null,
  "jobs": null,
  "anchor": {
    "hidden_style": "position:absolute;visibility:hidden;",
    "fallback_text": "empty"
  },
  "links": {},
  "pages": {}
}
"#;

/// Get the correct configuration template based on the requested format.
///
/// # Errors
///
/// Returns an error if the requested format is not supported.
pub fn get_template(format: &str) -> Result<&'static str, TemplateError> {
  match format.to_lowercase().as_str() {
    "toml" => Ok(DEFAULT_TOML_TEMPLATE),
    "json" => Ok(DEFAULT_JSON_TEMPLATE),
    _ => Err(TemplateError::UnsupportedFormat(format.to_string())),
  }
}
