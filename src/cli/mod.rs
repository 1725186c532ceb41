pub mod defaults;
mod refine;
mod shared;
mod utils;

use camino::Utf8Path;
use clap::{Parser, Subcommand};
use simple_error::{SimpleResult, bail};

use self::refine::validate_and_fix_refine_settings;
pub use self::refine::{RefineSettings, SequencingTechnology, write_refine_settings};
use self::shared::validate_and_fix_shared_settings;
pub use self::shared::SharedSettings;

#[derive(Subcommand)]
pub enum Commands {
    /// Refine SV candidate breakpoints to base-pair precision by aligning each candidate's
    /// consensus sequence to the expected SV haplotype
    Refine(RefineSettings),
}

#[derive(Parser)]
#[command(
    author,
    version,
    about,
    help_template = "\
{before-help}{name} {version}
{author-with-newline}{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}"
)]
#[clap(propagate_version = true, rename_all = "kebab_case")]
pub struct Settings {
    #[command(flatten)]
    pub shared: SharedSettings,

    #[command(subcommand)]
    pub command: Commands,
}

impl Settings {
    pub fn get_output_dir(&self) -> &Utf8Path {
        match &self.command {
            Commands::Refine(x) => &x.output_dir,
        }
    }
}

/// Checks if a directory does not exist
///
pub fn check_novel_dirname(dirname: &Utf8Path, label: &str) -> SimpleResult<()> {
    if dirname.exists() {
        bail!("{label} already exists: \"{dirname}\"");
    }
    Ok(())
}

fn validate_and_fix_settings_impl(mut settings: Settings) -> SimpleResult<Settings> {
    settings.shared = validate_and_fix_shared_settings(settings.shared)?;

    settings.command = match settings.command {
        Commands::Refine(x) => Commands::Refine(validate_and_fix_refine_settings(x)?),
    };

    Ok(settings)
}

/// Validate settings and update to parameters that can't be processed automatically by clap.
///
/// Assumes that the logger is not setup
///
pub fn validate_and_fix_settings(settings: Settings) -> Settings {
    match validate_and_fix_settings_impl(settings) {
        Ok(x) => x,
        Err(msg) => {
            eprintln!("Invalid command-line setting: {msg}");
            std::process::exit(exitcode::USAGE);
        }
    }
}

pub fn parse_settings() -> Settings {
    Settings::parse()
}
