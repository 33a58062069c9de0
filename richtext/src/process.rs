//! Single fragment resolution.
use std::{
  fs,
  io::{self, Write},
  path::Path,
};

use color_eyre::eyre::{Context, Result, eyre};
use log::debug;
use richtext_config::Config;
use richtext_resolver::RichTextResolver;

/// Build a resolver from the configuration.
///
/// # Errors
///
/// Returns an error if the resolver cannot be assembled.
pub fn build_resolver(config: &Config) -> Result<RichTextResolver> {
  RichTextResolver::builder()
    .link_resolver(config.link_resolver())
    .logger(log::logger())
    .configuration(config.resolver_options())
    .build()
    .map_err(|e| eyre!("Failed to build resolver: {e}"))
}

/// Pick the page to resolve against: the command line value if given,
/// otherwise the configured one. Empty values mean no page.
#[must_use]
pub fn effective_page<'a>(
  cli_page: Option<&'a str>,
  config: &'a Config,
) -> Option<&'a str> {
  cli_page
    .or(config.page_id.as_deref())
    .filter(|page| !page.is_empty())
}

/// Resolve one fragment read from `input` (or stdin) and write the result to
/// `output` (or stdout).
///
/// # Errors
///
/// Returns an error if reading, resolving or writing fails.
pub fn resolve_fragment(
  resolver: &RichTextResolver,
  input: Option<&Path>,
  output: Option<&Path>,
  page_id: Option<&str>,
) -> Result<()> {
  let fragment = match input {
    Some(path) => {
      fs::read_to_string(path)
        .wrap_err_with(|| format!("Failed to read {}", path.display()))?
    },
    None => io::read_to_string(io::stdin()).wrap_err("Failed to read stdin")?,
  };

  let processed = resolver.process(&fragment, page_id).wrap_err_with(|| {
    format!(
      "Failed to resolve {}",
      input.map_or_else(|| "<stdin>".into(), |p| p.display().to_string())
    )
  })?;
  debug!(
    "{} link(s) resolved, {} dead",
    processed.links.resolved, processed.links.dead
  );

  match output {
    Some(path) => {
      if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
      {
        fs::create_dir_all(parent).wrap_err_with(|| {
          format!("Failed to create directory: {}", parent.display())
        })?;
      }
      fs::write(path, processed.html)
        .wrap_err_with(|| format!("Failed to write {}", path.display()))?;
    },
    None => {
      let mut stdout = io::stdout().lock();
      stdout
        .write_all(processed.html.as_bytes())
        .and_then(|()| stdout.flush())
        .wrap_err("Failed to write stdout")?;
    },
  }

  Ok(())
}
