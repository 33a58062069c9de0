use std::{
  collections::HashMap,
  fs,
  path::{Path, PathBuf},
  sync::OnceLock,
};

use richtext_resolver::{MapLinkResolver, ResolverOptions};
use serde::{Deserialize, Serialize};

use crate::{anchor::AnchorConfig, error::ConfigError};

/// Configuration for the richtext resolver.
///
/// [`Config`] holds the resolver options and the static link table used by
/// the command line front end. Fields are typically loaded from a TOML or
/// JSON config file, but can also be set via `--config KEY=VALUE`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
  /// Page that fragments are rendered into, if any.
  pub page_id: Option<String>,

  /// Context path prepended to root-relative image sources.
  pub context_path: Option<String>,

  /// Number of threads to use for batch processing.
  pub jobs: Option<usize>,

  /// Empty anchor handling.
  pub anchor: Option<AnchorConfig>,

  /// Link targets keyed by CMS reference.
  pub links: HashMap<String, String>,

  /// Per-page link targets keyed by page, then by CMS reference.
  pub pages: HashMap<String, HashMap<String, String>>,
}

impl Config {
  /// Load configuration from a file (TOML or JSON).
  ///
  /// # Errors
  ///
  /// Returns an error if the file cannot be read or parsed, or if the format is
  /// unsupported.
  pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(ConfigError::io(path))?;

    let Some(ext) = path.extension().and_then(|ext| ext.to_str()) else {
      return Err(ConfigError::Config(format!(
        "Config file has no extension: {}",
        path.display()
      )));
    };

    match ext.to_lowercase().as_str() {
      "json" => {
        serde_json::from_str(&content).map_err(|source| {
          ConfigError::Serde {
            path: path.to_path_buf(),
            source,
          }
        })
      },
      "toml" => {
        toml::from_str(&content).map_err(|source| {
          ConfigError::Toml {
            path: path.to_path_buf(),
            source,
          }
        })
      },
      _ => {
        Err(ConfigError::Config(format!(
          "Unsupported config file format: {}",
          path.display()
        )))
      },
    }
  }

  /// Load configuration from the given files, merged in order, then apply
  /// `KEY=VALUE` overrides.
  ///
  /// With no files, a config file in a standard location is used if one
  /// exists, otherwise the defaults.
  ///
  /// # Errors
  ///
  /// Returns an error if a file cannot be loaded, an override is invalid, or
  /// the resulting configuration is inconsistent.
  pub fn load(
    config_files: &[PathBuf],
    config_overrides: &[String],
  ) -> Result<Self, ConfigError> {
    let mut config = if let Some((first, rest)) = config_files.split_first() {
      let mut merged_config = Self::from_file(first)?;

      for config_path in rest {
        merged_config.merge(Self::from_file(config_path)?);
      }

      if config_files.len() > 1 {
        log::info!("Loaded and merged {} config files", config_files.len());
      }

      merged_config
    } else if let Some(discovered_config) = Self::find_config_file() {
      log::info!(
        "Using discovered config file: {}",
        discovered_config.display()
      );
      Self::from_file(&discovered_config)?
    } else {
      Self::default()
    };

    if !config_overrides.is_empty() {
      config.apply_overrides(config_overrides)?;
    }

    config.validate()?;
    Ok(config)
  }

  /// Apply configuration overrides from KEY=VALUE strings.
  ///
  /// Keys are field names, with dotted paths for nested values:
  /// `anchor.fallback_text`, `links.<reference>` and
  /// `pages.<page>.<reference>`. An empty value clears optional fields and
  /// removes link entries.
  ///
  /// # Errors
  ///
  /// Returns an error if an override is not in KEY=VALUE format, the key is
  /// not recognized, or the value cannot be parsed.
  ///
  /// # Example
  ///
  /// ```rust, ignore
  /// config.apply_overrides(&vec![
  ///     "page_id=tcm:1-10-64".to_string(),
  ///     "links.tcm:1-2=/products/widget.html".to_string(),
  /// ])?;
  /// ```
  pub fn apply_overrides(
    &mut self,
    overrides: &[String],
  ) -> Result<(), ConfigError> {
    for override_str in overrides {
      let (key, value) = override_str.split_once('=').ok_or_else(|| {
        ConfigError::Config(format!(
          "Invalid config override format: '{override_str}'. Expected \
           KEY=VALUE"
        ))
      })?;

      self.apply_override(key.trim(), value.trim())?;
    }

    Ok(())
  }

  /// Apply a single override.
  ///
  /// # Errors
  ///
  /// Returns an error if the key is unknown or the value is invalid.
  pub fn apply_override(
    &mut self,
    key: &str,
    value: &str,
  ) -> Result<(), ConfigError> {
    match key {
      "page_id" => self.page_id = non_empty(value),
      "context_path" => self.context_path = non_empty(value),
      "jobs" => {
        self.jobs = if value.is_empty() {
          None
        } else {
          Some(value.parse().map_err(|_| {
            ConfigError::Config(format!(
              "Invalid value for 'jobs': '{value}'. Expected a positive \
               integer"
            ))
          })?)
        };
      },
      "anchor.hidden_style" => {
        self.anchor.get_or_insert_with(AnchorConfig::default).hidden_style =
          value.to_string();
      },
      "anchor.fallback_text" => {
        self
          .anchor
          .get_or_insert_with(AnchorConfig::default)
          .fallback_text = value.to_string();
      },
      _ => {
        if let Some(reference) = key.strip_prefix("links.")
          && !reference.is_empty()
        {
          set_link(&mut self.links, reference, value);
        } else if let Some((page, reference)) = key
          .strip_prefix("pages.")
          .and_then(|rest| rest.split_once('.'))
          && !page.is_empty()
          && !reference.is_empty()
        {
          let links = self.pages.entry(page.to_string()).or_default();
          set_link(links, reference, value);
        } else {
          return Err(ConfigError::Config(format!(
            "Unknown configuration key: '{key}'. See documentation for \
             supported keys."
          )));
        }
      },
    }

    Ok(())
  }

  /// Merge another config into this one, with the other config's values taking
  /// precedence.
  ///
  /// # Merge Rules
  ///
  /// - [`Option<T>`] fields: Other's [`Some`] value replaces this config's
  ///   value
  /// - [`HashMap`] fields: Other's entries are merged in, overriding
  ///   individual keys. Per-page tables are merged page by page.
  pub fn merge(&mut self, other: Self) {
    if other.page_id.is_some() {
      self.page_id = other.page_id;
    }
    if other.context_path.is_some() {
      self.context_path = other.context_path;
    }
    if other.jobs.is_some() {
      self.jobs = other.jobs;
    }
    if other.anchor.is_some() {
      self.anchor = other.anchor;
    }

    self.links.extend(other.links);
    for (page, links) in other.pages {
      self.pages.entry(page).or_default().extend(links);
    }
  }

  /// Check the configuration for values the resolver cannot work with.
  ///
  /// # Errors
  ///
  /// Returns an error listing every problem found.
  pub fn validate(&self) -> Result<(), ConfigError> {
    let mut errors = Vec::new();

    if self.jobs == Some(0) {
      errors.push("jobs must be at least 1".to_string());
    }

    if let Some(ref anchor) = self.anchor {
      if anchor.hidden_style.is_empty() {
        errors.push("anchor.hidden_style must not be empty".to_string());
      }
      if anchor.fallback_text.is_empty() {
        errors.push("anchor.fallback_text must not be empty".to_string());
      }
    }

    for (reference, url) in self
      .links
      .iter()
      .chain(self.pages.values().flat_map(HashMap::iter))
    {
      if url.is_empty() {
        errors.push(format!("Link target for '{reference}' is empty"));
      }
    }

    if !errors.is_empty() {
      let error_message = errors.join("\n");
      return Err(ConfigError::Config(format!(
        "Configuration validation errors:\n{error_message}"
      )));
    }

    Ok(())
  }

  /// Build the resolver options described by this configuration.
  #[must_use]
  pub fn resolver_options(&self) -> ResolverOptions {
    let anchor = self.anchor.clone().unwrap_or_default();
    ResolverOptions {
      hidden_anchor_style: anchor.hidden_style,
      empty_anchor_text:   anchor.fallback_text,
      image_context_path:  self.context_path.clone(),
    }
  }

  /// Build a link resolver over the configured link tables.
  #[must_use]
  pub fn link_resolver(&self) -> MapLinkResolver {
    let mut resolver = MapLinkResolver::from_links(self.links.clone());
    for (page, links) in &self.pages {
      resolver.extend_page(page.clone(), links.clone());
    }
    resolver
  }

  /// Search for config files in common locations
  #[must_use]
  pub fn find_config_file() -> Option<PathBuf> {
    static RESULT: OnceLock<Option<PathBuf>> = OnceLock::new();
    RESULT
      .get_or_init(|| {
        let config_filenames = [
          "richtext.toml",
          "richtext.json",
          ".richtext.toml",
          ".richtext.json",
          ".config/richtext.toml",
          ".config/richtext.json",
        ];

        let current_dir = std::env::current_dir().ok()?;
        for filename in &config_filenames {
          let config_path = current_dir.join(filename);
          if config_path.exists() {
            return Some(config_path);
          }
        }

        if let Ok(xdg_config_home) = std::env::var("XDG_CONFIG_HOME") {
          let xdg_config_dir = PathBuf::from(xdg_config_home).join("richtext");
          for filename in &["config.toml", "config.json"] {
            let config_path = xdg_config_dir.join(filename);
            if config_path.exists() {
              return Some(config_path);
            }
          }
        }

        None
      })
      .clone()
  }

  /// Generate a default configuration file with commented explanations
  ///
  /// # Errors
  ///
  /// Returns an error if the format is not supported or the file cannot be
  /// written.
  pub fn generate_default_config(
    format: &str,
    path: &Path,
  ) -> Result<(), ConfigError> {
    let config_content = crate::templates::get_template(format)
      .map_err(|e| ConfigError::Template(e.to_string()))?;

    fs::write(path, config_content).map_err(ConfigError::io(path))?;

    log::info!("Created default configuration file: {}", path.display());
    Ok(())
  }
}

fn non_empty(value: &str) -> Option<String> {
  (!value.is_empty()).then(|| value.to_string())
}

fn set_link(links: &mut HashMap<String, String>, reference: &str, url: &str) {
  if url.is_empty() {
    links.remove(reference);
  } else {
    links.insert(reference.to_string(), url.to_string());
  }
}

#[cfg(test)]
mod tests {
  #![allow(
    clippy::useless_vec,
    clippy::unwrap_used,
    clippy::field_reassign_with_default,
    reason = "Fine in tests"
  )]

  use richtext_resolver::LinkResolver;

  use super::*;

  #[test]
  fn test_config_merge_option_fields() {
    let mut base = Config::default();
    base.page_id = Some("tcm:1-10-64".to_string());
    base.context_path = None;

    let mut override_config = Config::default();
    override_config.page_id = None; // should not replace
    override_config.context_path = Some("/site".to_string());

    base.merge(override_config);

    assert_eq!(base.page_id.as_deref(), Some("tcm:1-10-64"));
    assert_eq!(base.context_path.as_deref(), Some("/site"));
  }

  #[test]
  fn test_config_merge_link_tables() {
    let mut base = Config::default();
    base.links.insert("tcm:1-1".into(), "/one".into());
    base.links.insert("tcm:1-2".into(), "/two".into());
    base
      .pages
      .entry("tcm:1-10-64".into())
      .or_default()
      .insert("tcm:1-1".into(), "/page/one".into());

    let mut override_config = Config::default();
    override_config.links.insert("tcm:1-2".into(), "/deux".into());
    override_config
      .pages
      .entry("tcm:1-10-64".into())
      .or_default()
      .insert("tcm:1-3".into(), "/page/three".into());

    base.merge(override_config);

    assert_eq!(base.links.len(), 2);
    assert_eq!(base.links["tcm:1-2"], "/deux");
    assert_eq!(base.pages["tcm:1-10-64"].len(), 2);
  }

  #[test]
  fn test_apply_overrides_string() {
    let mut config = Config::default();

    config
      .apply_overrides(&vec![
        "page_id=tcm:1-10-64".to_string(),
        "context_path = /site".to_string(),
      ])
      .unwrap();

    assert_eq!(config.page_id.as_deref(), Some("tcm:1-10-64"));
    assert_eq!(config.context_path.as_deref(), Some("/site"));
  }

  #[test]
  fn test_apply_overrides_empty_clears_option() {
    let mut config = Config::default();
    config.page_id = Some("tcm:1-10-64".to_string());

    config.apply_override("page_id", "").unwrap();
    assert!(config.page_id.is_none());
  }

  #[test]
  fn test_apply_overrides_numeric() {
    let mut config = Config::default();
    config.apply_override("jobs", "8").unwrap();
    assert_eq!(config.jobs, Some(8));

    config.apply_override("jobs", "").unwrap();
    assert!(config.jobs.is_none());
  }

  #[test]
  fn test_apply_overrides_links() {
    let mut config = Config::default();

    config
      .apply_overrides(&vec![
        "links.tcm:1-2=/products/widget.html".to_string(),
        "pages.tcm:1-10-64.tcm:1-2=/en/widget.html".to_string(),
      ])
      .unwrap();

    assert_eq!(config.links["tcm:1-2"], "/products/widget.html");
    assert_eq!(config.pages["tcm:1-10-64"]["tcm:1-2"], "/en/widget.html");

    config.apply_override("links.tcm:1-2", "").unwrap();
    assert!(config.links.is_empty());
  }

  #[test]
  fn test_apply_override_creates_anchor_config() {
    let mut config = Config::default();
    assert!(config.anchor.is_none());

    config.apply_override("anchor.fallback_text", "top").unwrap();

    let anchor = config.anchor.as_ref().unwrap();
    assert_eq!(anchor.fallback_text, "top");
    assert_eq!(anchor.hidden_style, "position:absolute;visibility:hidden;");
  }

  #[test]
  fn test_apply_overrides_invalid_format() {
    let mut config = Config::default();

    let result = config.apply_overrides(&vec!["no_equals_sign".to_string()]);

    assert!(result.is_err());
    assert!(
      result
        .unwrap_err()
        .to_string()
        .contains("Expected KEY=VALUE")
    );
  }

  #[test]
  fn test_apply_overrides_unknown_key() {
    let mut config = Config::default();

    for key in ["unknown_key=value", "links.=x", "pages.tcm:1-10-64=x"] {
      let result = config.apply_overrides(&vec![key.to_string()]);
      assert!(
        result
          .unwrap_err()
          .to_string()
          .contains("Unknown configuration key"),
        "{key}"
      );
    }
  }

  #[test]
  fn test_apply_overrides_invalid_numeric() {
    let mut config = Config::default();

    let result = config.apply_overrides(&vec!["jobs=not_a_number".to_string()]);

    assert!(result.is_err());
    assert!(result.unwrap_err().to_string().contains("Invalid value"));
  }

  #[test]
  fn test_validate_reports_every_problem() {
    let mut config = Config::default();
    config.jobs = Some(0);
    config.anchor = Some(AnchorConfig {
      hidden_style:  String::new(),
      fallback_text: "empty".to_string(),
    });

    let err = config.validate().unwrap_err().to_string();
    assert!(err.contains("jobs must be at least 1"));
    assert!(err.contains("anchor.hidden_style"));
    assert!(!err.contains("anchor.fallback_text"));
  }

  #[test]
  fn test_resolver_options_follow_config() {
    let mut config = Config::default();
    assert_eq!(config.resolver_options(), ResolverOptions::default());

    config.context_path = Some("/site".to_string());
    config.apply_override("anchor.fallback_text", "top").unwrap();

    let options = config.resolver_options();
    assert_eq!(options.image_context_path.as_deref(), Some("/site"));
    assert_eq!(options.empty_anchor_text, "top");
  }

  #[test]
  fn test_link_resolver_uses_both_tables() {
    let mut config = Config::default();
    config
      .apply_overrides(&vec![
        "links.tcm:1-2=/global".to_string(),
        "pages.tcm:1-10-64.tcm:1-2=/in-page".to_string(),
      ])
      .unwrap();

    let resolver = config.link_resolver();
    assert_eq!(
      resolver.resolve_link("tcm:1-2").unwrap().as_deref(),
      Some("/global")
    );
    assert_eq!(
      resolver
        .resolve_link_in_page("tcm:1-10-64", "tcm:1-2", "tcm:0-0-0")
        .unwrap()
        .as_deref(),
      Some("/in-page")
    );
  }

  #[test]
  fn test_from_file_toml_and_json() {
    let dir = tempfile::tempdir().unwrap();

    let toml_path = dir.path().join("richtext.toml");
    fs::write(
      &toml_path,
      "page_id = \"tcm:1-10-64\"\n[links]\n\"tcm:1-2\" = \"/a\"\n",
    )
    .unwrap();
    let config = Config::from_file(&toml_path).unwrap();
    assert_eq!(config.page_id.as_deref(), Some("tcm:1-10-64"));
    assert_eq!(config.links["tcm:1-2"], "/a");

    let json_path = dir.path().join("richtext.json");
    fs::write(&json_path, r#"{"context_path": "/site", "jobs": 2}"#).unwrap();
    let config = Config::from_file(&json_path).unwrap();
    assert_eq!(config.context_path.as_deref(), Some("/site"));
    assert_eq!(config.jobs, Some(2));
  }

  #[test]
  fn test_from_file_errors_carry_path_and_source() {
    let dir = tempfile::tempdir().unwrap();

    let missing = dir.path().join("missing.toml");
    let err = Config::from_file(&missing).unwrap_err();
    assert!(matches!(err, ConfigError::Io { ref path, .. } if *path == missing));
    assert!(err.to_string().contains("missing.toml"));

    let bad_toml = dir.path().join("bad.toml");
    fs::write(&bad_toml, "jobs = [").unwrap();
    let err = Config::from_file(&bad_toml).unwrap_err();
    assert!(matches!(err, ConfigError::Toml { .. }));
    assert!(std::error::Error::source(&err).is_some());

    let bad_json = dir.path().join("bad.json");
    fs::write(&bad_json, r#"{"jobs": "many"}"#).unwrap();
    let err = Config::from_file(&bad_json).unwrap_err();
    assert!(matches!(err, ConfigError::Serde { .. }));
    assert!(err.to_string().contains("bad.json"));
  }

  #[test]
  fn test_generate_default_config_reports_unwritable_path() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("no-such-dir/richtext.toml");

    let err = Config::generate_default_config("toml", &path).unwrap_err();
    assert!(matches!(err, ConfigError::Io { .. }));
  }

  #[test]
  fn test_from_file_rejects_unknown_extension() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("richtext.yaml");
    fs::write(&path, "page_id: x").unwrap();

    let err = Config::from_file(&path).unwrap_err().to_string();
    assert!(err.contains("Unsupported config file format"));
  }

  #[test]
  fn test_load_merges_files_in_order() {
    let dir = tempfile::tempdir().unwrap();
    let first = dir.path().join("base.toml");
    let second = dir.path().join("site.json");
    fs::write(&first, "jobs = 2\n[links]\n\"tcm:1-1\" = \"/one\"\n").unwrap();
    fs::write(&second, r#"{"jobs": 4, "links": {"tcm:1-2": "/two"}}"#)
      .unwrap();

    let config =
      Config::load(&[first, second], &["page_id=tcm:1-10-64".to_string()])
        .unwrap();

    assert_eq!(config.jobs, Some(4));
    assert_eq!(config.links.len(), 2);
    assert_eq!(config.page_id.as_deref(), Some("tcm:1-10-64"));
  }

  #[test]
  fn test_load_rejects_invalid_result() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bad.toml");
    fs::write(&path, "jobs = 0\n").unwrap();

    assert!(Config::load(&[path], &[]).is_err());
  }

  #[test]
  fn test_generate_default_config() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("richtext.toml");

    Config::generate_default_config("toml", &path).unwrap();
    let config = Config::from_file(&path).unwrap();
    assert_eq!(config.resolver_options(), ResolverOptions::default());

    let err = Config::generate_default_config("yaml", &path).unwrap_err();
    assert!(matches!(err, ConfigError::Template(_)));
  }
}
