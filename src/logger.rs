//! Logger setup for all splitrefine commands
//!

use camino::Utf8Path;

use crate::cli;
use crate::globals::PROGRAM_NAME;
use crate::os_utils::create_dir_all;

/// Setup a logger writing to both stderr and a log file in `output_dir`
///
/// If debug is true the log level is Debug, and Info otherwise.
///
fn setup_logger(output_dir: &Utf8Path, debug: bool) -> Result<(), fern::InitError> {
    let level = if debug {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };
    let log_filename = output_dir.join(format!("{PROGRAM_NAME}.log"));

    fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!(
                "{}[{}][{}] {}",
                chrono::Local::now().format("[%Y-%m-%d][%H:%M:%S]"),
                PROGRAM_NAME,
                record.level(),
                message
            ))
        })
        .level(level)
        .chain(std::io::stderr())
        .chain(fern::log_file(log_filename)?)
        .apply()?;
    Ok(())
}

/// Check and create the output directory, then setup the logger to write there
///
/// An existing output directory is only accepted when `clobber` is set.
///
pub fn setup_output_dir_and_logger(output_dir: &Utf8Path, clobber: bool, debug: bool) {
    // No logger is available yet, so errors follow the command-line validation pattern
    if let Err(msg) = cli::check_novel_dirname(output_dir, "Output directory") {
        if !clobber {
            eprintln!("Invalid command-line setting: {msg}");
            std::process::exit(exitcode::USAGE);
        }
    };
    create_dir_all(output_dir, "output");
    if let Err(err) = setup_logger(output_dir, debug) {
        eprintln!("Unable to setup logger in output directory '{output_dir}': {err}");
        std::process::exit(exitcode::CANTCREAT);
    }
}
