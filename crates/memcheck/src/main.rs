//! memcheck CLI - load-store unit memory trace checker

mod cli;
mod terminal;

use clap::Parser;
use clap::error::ErrorKind;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

use cli::Cli;
use memcheck::report::{self, EXIT_FAILURE, EXIT_SUCCESS};

fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            let _ = err.print();
            let code = match err.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => EXIT_SUCCESS,
                _ => EXIT_FAILURE,
            };
            std::process::exit(code);
        }
    };

    let metrics_handle = if cli.metrics {
        memcheck::metrics::CliRecorder::new().install()
    } else {
        None
    };
    memcheck::metrics::init();

    let level = if cli.verbose {
        LevelFilter::DEBUG
    } else if cli.silent {
        LevelFilter::ERROR
    } else {
        LevelFilter::WARN
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(level.into()))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let exit_code = run(&cli);

    if let Some(handle) = metrics_handle {
        handle.print_summary();
    }

    std::process::exit(exit_code);
}

fn run(cli: &Cli) -> i32 {
    match memcheck::check_file(&cli.trace, &cli.config()) {
        Ok(outcome) => {
            memcheck::metrics::record_outcome(&outcome);
            terminal::print_report(&report::report(&outcome));
            outcome.exit_code()
        }
        Err(err) => {
            terminal::print_line(&report::error_line(&err));
            EXIT_FAILURE
        }
    }
}
