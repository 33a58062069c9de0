//! Directory-wide fragment resolution.
use std::{
  fs,
  path::{Path, PathBuf},
};

use color_eyre::eyre::{Context, Result, bail, eyre};
use log::{debug, info};
use rayon::prelude::*;
use richtext_config::Config;

use crate::process::build_resolver;

/// File extensions treated as fragments.
pub const FRAGMENT_EXTENSIONS: &[&str] = &["html", "xhtml", "xml"];

/// Outcome of a batch run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchReport {
  /// Number of files written.
  pub files:    usize,
  /// Links resolved across all files.
  pub resolved: usize,
  /// Dead links removed across all files.
  pub dead:     usize,
}

/// Collect every fragment file under `input_dir`, sorted by path.
#[must_use]
pub fn collect_fragment_files(input_dir: &Path) -> Vec<PathBuf> {
  let mut files: Vec<PathBuf> = walkdir::WalkDir::new(input_dir)
    .follow_links(true)
    .into_iter()
    .filter_map(std::result::Result::ok)
    .filter(|e| {
      e.file_type().is_file()
        && e
          .path()
          .extension()
          .and_then(|ext| ext.to_str())
          .is_some_and(|ext| {
            FRAGMENT_EXTENSIONS
              .iter()
              .any(|known| ext.eq_ignore_ascii_case(known))
          })
    })
    .map(walkdir::DirEntry::into_path)
    .collect();
  files.sort();
  files
}

/// Resolve every fragment under `input_dir` into `output_dir`.
///
/// Files are processed in parallel on a pool of `jobs` threads (all cores by
/// default). Each worker owns its own resolver. The first failure aborts the
/// run.
///
/// # Errors
///
/// Returns an error if the input directory is missing, the thread pool cannot
/// be created, or any file fails to read, resolve or write.
pub fn process_batch(
  config: &Config,
  input_dir: &Path,
  output_dir: &Path,
  page_id: Option<&str>,
  jobs: Option<usize>,
) -> Result<BatchReport> {
  if !input_dir.is_dir() {
    bail!("Input directory does not exist: {}", input_dir.display());
  }

  let files = collect_fragment_files(input_dir);
  info!(
    "Found {} fragment file(s) in {}",
    files.len(),
    input_dir.display()
  );

  let thread_count = jobs.or(config.jobs).unwrap_or_else(num_cpus::get);
  let pool = rayon::ThreadPoolBuilder::new()
    .num_threads(thread_count)
    .build()
    .wrap_err("Failed to create thread pool")?;

  let results: Vec<(usize, usize)> = pool.install(|| {
    files
      .par_iter()
      .map_init(
        || build_resolver(config),
        |resolver, file_path| -> Result<(usize, usize)> {
          let resolver = resolver.as_ref().map_err(|e| eyre!("{e}"))?;

          let rel_path = file_path.strip_prefix(input_dir).wrap_err_with(|| {
            format!("{} is outside the input directory", file_path.display())
          })?;
          let output_path = output_dir.join(rel_path);

          let content = fs::read_to_string(file_path).wrap_err_with(|| {
            format!("Failed to read {}", file_path.display())
          })?;
          let processed = resolver
            .process(&content, page_id)
            .wrap_err_with(|| {
              format!("Failed to resolve {}", file_path.display())
            })?;

          if let Some(parent) = output_path.parent() {
            fs::create_dir_all(parent).wrap_err_with(|| {
              format!("Failed to create directory: {}", parent.display())
            })?;
          }
          fs::write(&output_path, &processed.html).wrap_err_with(|| {
            format!("Failed to write {}", output_path.display())
          })?;

          debug!("Resolved {}", rel_path.display());
          Ok((processed.links.resolved, processed.links.dead))
        },
      )
      .collect::<Result<Vec<_>>>()
  })?;

  Ok(results.into_iter().fold(
    BatchReport {
      files: files.len(),
      ..Default::default()
    },
    |mut report, (resolved, dead)| {
      report.resolved += resolved;
      report.dead += dead;
      report
    },
  ))
}
