use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Command line interface for richtext
#[derive(Parser, Debug)]
#[command(
  author,
  version,
  about = "Resolve CMS cross-references in rich-text fragments"
)]
pub struct Cli {
  /// Subcommand to execute (see [`Commands`])
  #[command(subcommand)]
  pub command: Commands,

  /// Enable verbose debug logging
  #[arg(short, long, global = true)]
  pub verbose: bool,

  /// Path to configuration file(s) (TOML or JSON, can be specified multiple
  /// times). Multiple files are merged in order, with later files overriding
  /// earlier ones
  #[arg(
    short = 'c',
    long = "config-file",
    global = true,
    action = clap::ArgAction::Append
  )]
  pub config_files: Vec<PathBuf>,

  /// Override configuration values (KEY=VALUE format, can be used multiple
  /// times)
  #[arg(long = "config", global = true, action = clap::ArgAction::Append)]
  pub config_overrides: Vec<String>,
}

/// All supported subcommands for the richtext CLI.
#[derive(Subcommand, Debug)]
pub enum Commands {
  /// Resolve a single fragment.
  Resolve {
    /// File to read the fragment from. Reads stdin if omitted.
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// File to write the result to. Writes stdout if omitted.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Page the fragment is rendered into. Overrides `page_id` from the
    /// configuration; pass an empty value to resolve without page context.
    #[arg(short, long)]
    page: Option<String>,
  },

  /// Resolve every fragment file under a directory.
  Batch {
    /// Directory containing `.html`, `.xhtml` or `.xml` fragments.
    #[arg(short, long)]
    input_dir: PathBuf,

    /// Directory to write results to, mirroring the input layout.
    #[arg(short, long)]
    output_dir: PathBuf,

    /// Page the fragments are rendered into.
    #[arg(short, long)]
    page: Option<String>,

    /// Number of threads to use for parallel processing.
    #[arg(short, long)]
    jobs: Option<usize>,
  },

  /// Initialize a new richtext configuration file
  Init {
    /// Path to create the configuration file at
    #[arg(short, long, default_value = "richtext.toml")]
    output: PathBuf,

    /// Format of the configuration file.
    #[arg(short = 'F', long, default_value = "toml", value_parser = ["toml", "json"])]
    format: String,

    /// Force overwrite if file already exists
    #[arg(short, long)]
    force: bool,
  },
}

impl Cli {
  /// Parse command line arguments into a [`Cli`] struct.
  #[must_use]
  pub fn parse_args() -> Self {
    Self::parse()
  }
}
