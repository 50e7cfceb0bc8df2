// Command-line interface definitions and parsing for vitalsup

use crate::config::CliConfig;
use crate::core::constants::output_formats;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(author, version, about, long_about = None, arg_required_else_help = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    // Output & Verbosity
    /// Suppress all output except errors
    #[arg(short = 'q', long, global = true, help_heading = "Output & Verbosity")]
    pub quiet: bool,

    /// Enable verbose logging
    #[arg(short = 'v', long, global = true, help_heading = "Output & Verbosity")]
    pub verbose: bool,

    /// Output format for the terminal summary
    #[arg(long, value_name = "FORMAT", value_parser = output_formats::ALL, global = true, help_heading = "Output & Verbosity")]
    pub format: Option<String>,

    /// Disable progress spinners
    #[arg(long, global = true, help_heading = "Output & Verbosity")]
    pub no_progress: bool,

    /// Dashboard title
    #[arg(long, value_name = "TITLE", global = true, help_heading = "Output & Verbosity")]
    pub title: Option<String>,

    // Configuration
    /// Use specific config file
    #[arg(long, value_name = "FILE", global = true, help_heading = "Configuration")]
    pub config: Option<String>,

    /// Ignore config files
    #[arg(long, global = true, conflicts_with = "config", help_heading = "Configuration")]
    pub no_config: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Render a dashboard for every release under a base directory
    Report {
        /// Where to write the HTML dashboard
        #[arg(value_name = "OUTPUT.html")]
        output: PathBuf,

        /// Directory holding the release-<N> folders
        #[arg(value_name = "BASE_DIR")]
        base_dir: PathBuf,
    },
    /// Compare two summary files
    Compare {
        /// Summary of the earlier run
        #[arg(value_name = "BEFORE.json")]
        before: PathBuf,

        /// Summary of the later run
        #[arg(value_name = "AFTER.json")]
        after: PathBuf,

        /// Also write an HTML dashboard
        #[arg(value_name = "OUTPUT.html")]
        output: Option<PathBuf>,
    },
    /// Measure the configured pages for a release
    Run {
        /// Release folder name, e.g. release-29
        #[arg(long, value_name = "NAME")]
        release: String,

        /// Only measure this page (repeatable)
        #[arg(long = "page", value_name = "NAME")]
        pages: Vec<String>,

        /// Directory holding the release-<N> folders (default: current directory)
        #[arg(long, value_name = "DIR")]
        base_dir: Option<String>,

        /// Timeout per page in seconds (default: 1800)
        #[arg(short = 't', long, value_name = "SECONDS")]
        timeout: Option<u64>,

        /// Render the batch dashboard afterwards
        #[arg(long, value_name = "OUTPUT.html")]
        report: Option<PathBuf>,
    },
    /// Generate shell completions
    #[command(name = "completion-generate", arg_required_else_help = true)]
    CompletionGenerate {
        /// The shell to generate completions for
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

/// Collect the options that override configuration file values
pub fn cli_to_config(cli: &Cli) -> CliConfig {
    let mut cli_config = CliConfig {
        title: cli.title.clone(),
        quiet: cli.quiet,
        verbose: cli.verbose,
        output_format: cli.format.clone(),
        no_progress: cli.no_progress,
        config_file: cli.config.clone(),
        no_config: cli.no_config,
        ..CliConfig::default()
    };

    if let Commands::Run {
        ref base_dir,
        timeout,
        ..
    } = cli.command
    {
        cli_config.base_dir = base_dir.clone();
        cli_config.tool_timeout = timeout;
    }

    cli_config
}
