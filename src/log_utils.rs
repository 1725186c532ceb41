pub use log::debug;

/// Print a debug message either when global debug logging is on or when a local debug flag is set
///
/// The local flag is the first argument. When it is true the message is written directly to
/// stderr regardless of log level, which is used to trace a single SV candidate.
///
/// # Examples
///
/// ```ignore
/// debug_msg!(false, "Refining {}", sv.id); // debug log message, only shown with --debug
/// debug_msg!(true, "Refining {}", sv.id); // always printed to stderr
/// ```
macro_rules! debug_msg {
    ($flag:expr, $($arg:tt)+) => {
        if $flag {
            eprintln!($($arg)+);
        } else {
            $crate::log_utils::debug!($($arg)+);
        }
    }
}

pub(crate) use debug_msg;
