mod bam_utils;
mod cli;
mod genome_ref;
mod globals;
mod log_utils;
mod logger;
mod os_utils;
mod refine;
mod refine_sv;
mod run_stats;
mod soft_clip;
mod sv_candidate;
mod worker_thread_data;

use std::{error, process};

use hhmmss::Hhmmss;
use log::info;

use crate::cli::Commands;
use crate::globals::{PROGRAM_NAME, PROGRAM_VERSION};
use crate::logger::setup_output_dir_and_logger;
use crate::refine::run_refine;

/// Run system configuration steps prior to starting any other program logic
///
fn system_configuration_prelude() {
    os_utils::attempt_max_open_file_limit();
}

fn run(settings: &cli::Settings) -> Result<(), Box<dyn error::Error>> {
    info!("Starting {PROGRAM_NAME} {PROGRAM_VERSION}");
    info!(
        "cmdline: {}",
        std::env::args().collect::<Vec<_>>().join(" ")
    );
    info!("Running on {} threads", settings.shared.thread_count);

    let start = std::time::Instant::now();

    match &settings.command {
        Commands::Refine(x) => {
            run_refine(&settings.shared, x);
        }
    }

    info!(
        "{PROGRAM_NAME} completed. Total Runtime: {}",
        start.elapsed().hhmmssxxx()
    );
    Ok(())
}

fn main() {
    system_configuration_prelude();

    let settings = cli::validate_and_fix_settings(cli::parse_settings());

    // Setup logger, including creation of the output directory for the log file:
    setup_output_dir_and_logger(
        settings.get_output_dir(),
        settings.shared.clobber,
        settings.shared.debug,
    );

    if let Err(err) = run(&settings) {
        eprintln!("{err}");
        process::exit(2);
    }
}
