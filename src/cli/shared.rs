use clap::Args;
use simple_error::{SimpleResult, bail};

#[derive(Args)]
pub struct SharedSettings {
    /// Number of threads to use. Defaults to all logical cpus detected.
    #[arg(long = "threads", global = true, value_name = "THREAD_COUNT")]
    thread_count_option: Option<usize>,

    /// This value will be filled in by thread_count_option
    #[arg(hide = true, default_value_t = 0)]
    pub thread_count: usize,

    /// Overwrite an existing output directory
    #[arg(long, global = true)]
    pub clobber: bool,

    /// Turn on extra debug logging
    ///
    /// This option enables debug level log output, including the reason each SV candidate
    /// could not be refined.
    ///
    #[arg(long, global = true)]
    pub debug: bool,
}

pub fn validate_and_fix_shared_settings(
    mut settings: SharedSettings,
) -> SimpleResult<SharedSettings> {
    settings.thread_count = match settings.thread_count_option {
        Some(0) => {
            bail!("--threads argument must be greater than 0");
        }
        Some(count) => count,
        None => num_cpus::get(),
    };

    Ok(settings)
}
