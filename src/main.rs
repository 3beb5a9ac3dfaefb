//! Snapshot Node Finder - Main CLI Application
//!
//! Finds the cluster RPC nodes that serve their snapshot fastest.

use clap::Parser;
use snapshot_node_finder::{
    cli::Cli,
    config::{display_config_summary, load_config, validate_config},
    error::{AppError, Result},
    output::OutputFormatterFactory,
    App, Config, PKG_NAME, VERSION,
};
use std::process;

#[tokio::main]
async fn main() {
    std::panic::set_hook(Box::new(|panic_info| {
        eprintln!("Application panic: {}", panic_info);
    }));

    // Argument errors share the configuration exit code
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let code = if e.use_stderr() { 1 } else { 0 };
            let _ = e.print();
            process::exit(code);
        }
    };

    if let Err(message) = cli.validate() {
        let error = AppError::validation(message);
        eprintln!("{}", error.format_for_console(cli.use_colors()));
        process::exit(error.exit_code());
    }

    if cli.debug {
        eprintln!("{} v{}", PKG_NAME, VERSION);
        eprintln!("{}", snapshot_node_finder::build_info());
        eprintln!();
    }

    // Until the config is loaded only the flags and the terminal decide color
    let pre_config_color = cli.use_colors();
    let config = match load_config(cli) {
        Ok(config) => config,
        Err(e) => exit_with(&e, pre_config_color),
    };

    let use_color = config.enable_color;
    if let Err(e) = run_application(config).await {
        exit_with(&e, use_color);
    }
}

/// Print a run-level error and exit with its code
fn exit_with(error: &AppError, use_color: bool) -> ! {
    eprintln!("{}", error.format_for_console(use_color));
    eprintln!();
    eprintln!("{}", error.user_friendly_message());
    process::exit(error.exit_code());
}

/// Main application logic
async fn run_application(config: Config) -> Result<()> {
    if config.debug {
        eprintln!("Configuration loaded successfully:");
        eprintln!("{}", display_config_summary(&config));
        eprintln!();
    }

    let formatter = OutputFormatterFactory::create_formatter(config.json_output, config.enable_color);

    for warning in validate_config(&config)? {
        eprintln!("{}", warning.format(config.enable_color));
    }

    let report = App::new(config).run().await?;

    if report.interrupted {
        eprintln!("{}", formatter.format_warning("Run interrupted; the report is partial")?);
    }

    print!("{}", formatter.format_report(&report.results, &report.summary)?);

    Ok(())
}
