use clap::{CommandFactory, Parser};
use vitalsup::config::{CliConfig, Config};
use vitalsup::core::constants::output_formats;
use vitalsup::reporting::logging;
use vitalsup::reporting::{HtmlDashboard, Report, build_batch_report, build_pairwise_report};
use vitalsup::runner::{self, CancelHandle, CancelSignal, CommandTool, cancellation};
use vitalsup::VitalsUpError;
use vitalsup::ui::output;
use vitalsup::ui::{Cli, Commands, ProgressReporter, cli_to_config, print_completions};

use std::path::Path;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Handle completion commands first
    if let Commands::CompletionGenerate { shell } = cli.command {
        let mut app = Cli::command();
        print_completions(shell, &mut app);
        std::process::exit(0);
    }

    match run_vitalsup_logic(&cli).await {
        Ok(exit_code) => std::process::exit(exit_code),
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    }
}

/// Dispatch the selected subcommand
pub async fn run_vitalsup_logic(cli: &Cli) -> Result<i32, Box<dyn std::error::Error>> {
    // The only place the working directory is read
    let working_dir = std::env::current_dir()?;
    let cli_config = cli_to_config(cli);

    let config = load_and_merge_config(&cli_config, &working_dir)?;
    let output_settings = setup_output_settings(&cli_config, &config);
    logging::init_logger(output_settings.verbose, output_settings.quiet);
    logging::log_config_info(&config);

    match cli.command {
        Commands::Report {
            output: ref output_path,
            ref base_dir,
        } => {
            let base_dir = working_dir.join(base_dir);
            let report = build_batch_report(&config, &base_dir)?;
            write_dashboard(&report, &working_dir.join(output_path), &output_settings)?;
            output::display_report_summary(
                &report,
                &output_settings.output_format,
                output_settings.quiet,
            );
        }
        Commands::Compare {
            ref before,
            ref after,
            output: ref output_path,
        } => {
            let report = build_pairwise_report(
                &working_dir.join(before),
                &working_dir.join(after),
                config.title(),
            )?;
            output::display_report_summary(
                &report,
                &output_settings.output_format,
                output_settings.quiet,
            );
            if let Some(output_path) = output_path {
                write_dashboard(&report, &working_dir.join(output_path), &output_settings)?;
            }
        }
        Commands::Run {
            ref release,
            ref pages,
            ref report,
            ..
        } => {
            let base_dir = config.base_dir(&working_dir);
            let pages = runner::select_pages(&config.pages(), pages)?;
            let tool = CommandTool::new(config.tool_timeout_duration());

            // Not aborted: tokio keeps its SIGINT handler once registered, so
            // the listener has to keep turning Ctrl-C into a failed command
            let (handle, cancel) = cancellation();
            let _ctrl_c = spawn_ctrl_c_listener(handle);

            let mut progress = create_progress_reporter(&output_settings);
            let result = runner::run_release(
                &tool,
                &config,
                &base_dir,
                release,
                &pages,
                &cancel,
                progress.as_mut(),
            )
            .await;
            if let Some(progress) = progress {
                progress.finish_and_clear();
            }

            let runs = result?;
            if output_settings.output_format == output_formats::TEXT {
                output::display_run_summary(release, &runs, output_settings.quiet);
            }

            if let Some(report_path) = report {
                let report = build_batch_report(&config, &base_dir)?;
                interrupted(&cancel)?;
                write_dashboard(&report, &working_dir.join(report_path), &output_settings)?;
            }
            interrupted(&cancel)?;
        }
        Commands::CompletionGenerate { .. } => {}
    }

    Ok(0)
}

/// Load configuration from file or standard locations and merge with CLI config
pub fn load_and_merge_config(
    cli_config: &CliConfig,
    working_dir: &Path,
) -> Result<Config, Box<dyn std::error::Error>> {
    let mut config = if cli_config.no_config {
        Config::default()
    } else if let Some(ref config_file) = cli_config.config_file {
        Config::load_from_file(working_dir.join(config_file)).inspect_err(|e| {
            logging::log_error(
                &format!("Could not load config file '{config_file}'"),
                Some(e),
            );
        })?
    } else {
        Config::load_from_standard_locations(working_dir)?
    };

    // Merge CLI arguments with configuration (CLI takes precedence)
    config.merge_with_cli(cli_config);
    config.validate()?;
    Ok(config)
}

/// Settings for output formatting and display
pub struct OutputSettings {
    pub quiet: bool,
    pub verbose: bool,
    pub output_format: String,
    pub show_progress: bool,
}

/// Setup output settings based on CLI and config
pub fn setup_output_settings(cli_config: &CliConfig, config: &Config) -> OutputSettings {
    let quiet = cli_config.quiet;
    let verbose = config.verbose.unwrap_or(false);
    let output_format = config.output_format().to_string();
    let show_progress = !quiet && !cli_config.no_progress;

    OutputSettings {
        quiet,
        verbose,
        output_format,
        show_progress,
    }
}

/// Create progress reporter if needed
pub fn create_progress_reporter(output_settings: &OutputSettings) -> Option<ProgressReporter> {
    if output_settings.show_progress && output_settings.output_format == output_formats::TEXT {
        Some(ProgressReporter::new(true))
    } else {
        None
    }
}

/// Fail once Ctrl-C was pressed, even after the tool finished
fn interrupted(cancel: &CancelSignal) -> vitalsup::Result<()> {
    if cancel.is_cancelled() {
        Err(VitalsUpError::Cancelled("vitalsup run".to_string()))
    } else {
        Ok(())
    }
}

/// Cancel the running tool on Ctrl-C
fn spawn_ctrl_c_listener(handle: CancelHandle) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            logging::log_warning("Interrupted, stopping the running tool");
            handle.cancel();
        }
    })
}

fn write_dashboard(
    report: &Report,
    path: &Path,
    output_settings: &OutputSettings,
) -> Result<(), Box<dyn std::error::Error>> {
    HtmlDashboard::generate_dashboard(report, path).inspect_err(|e| {
        logging::log_error(
            &format!("Could not write dashboard '{}'", path.display()),
            Some(e),
        );
    })?;
    if output_settings.output_format == output_formats::TEXT {
        output::display_dashboard_written(path, output_settings.quiet);
    }
    Ok(())
}
