use std::fs;

use color_eyre::eyre::{Context, Result, bail};
use log::{LevelFilter, info};
use richtext::{
  batch::process_batch,
  cli::{Cli, Commands},
  process::{build_resolver, effective_page, resolve_fragment},
};
use richtext_config::Config;

fn main() -> Result<()> {
  color_eyre::install()?;

  let cli = Cli::parse_args();

  // Initialize logging first so we can log during command handling
  env_logger::Builder::new()
    .filter_level(if cli.verbose {
      LevelFilter::Debug
    } else {
      LevelFilter::Info
    })
    .write_style(env_logger::WriteStyle::Always)
    .init();

  match &cli.command {
    Commands::Init {
      output,
      format,
      force,
    } => {
      // Check if file already exists and that we're not forcing overwrite
      if output.exists() && !force {
        bail!(
          "Configuration file already exists: {}. Use --force to overwrite.",
          output.display()
        );
      }

      if let Some(parent) = output.parent()
        && !parent.as_os_str().is_empty()
        && !parent.exists()
      {
        fs::create_dir_all(parent).wrap_err_with(|| {
          format!("Failed to create directory: {}", parent.display())
        })?;
        info!("Created directory: {}", parent.display());
      }

      Config::generate_default_config(format, output).wrap_err_with(|| {
        format!(
          "Failed to generate configuration file: {}",
          output.display()
        )
      })?;
    },

    Commands::Resolve {
      input,
      output,
      page,
    } => {
      let config = Config::load(&cli.config_files, &cli.config_overrides)?;
      let resolver = build_resolver(&config)?;
      resolve_fragment(
        &resolver,
        input.as_deref(),
        output.as_deref(),
        effective_page(page.as_deref(), &config),
      )?;
    },

    Commands::Batch {
      input_dir,
      output_dir,
      page,
      jobs,
    } => {
      let config = Config::load(&cli.config_files, &cli.config_overrides)?;
      let report = process_batch(
        &config,
        input_dir,
        output_dir,
        effective_page(page.as_deref(), &config),
        *jobs,
      )?;

      info!(
        "Resolved {} file(s) into {}: {} link(s) resolved, {} dead",
        report.files,
        output_dir.display(),
        report.resolved,
        report.dead
      );
    },
  }

  Ok(())
}
