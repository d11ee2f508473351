//! A small, zero-dependency diagnostics logger for `astore`.
//!
//! Every message goes to stderr so that diagnostics never interleave with
//! data written to stdout by an export stage. Messages carry the module path
//! of the call site and are coloured by level unless `NO_COLOR` is set.
//!
//! # Example
//!
//! ```
//! use astore_log::{debug, error, info, Level};
//!
//! astore_log::set_level(Level::Debug);
//!
//! let slots = 10099;
//! info!("string set size is {}", slots);
//! debug!("load factor {:.2}", 0.42);
//! error!("the string set is full");
//! ```
//!
//! The level is usually taken from the environment once at startup:
//!
//! ```
//! astore_log::init_from_env("ASTORE_LOG");
//! ```

use std::fmt::{self, Arguments};
use std::io::Write;
use std::str::FromStr;
use std::sync::OnceLock;
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};

/// Severity of a log message.
///
/// Lower numeric values are more severe; a logger set to `Info` lets
/// `Error`, `Warn` and `Info` through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Level {
    /// Unrecoverable conditions, reported right before the run aborts.
    Error = 0,
    /// Suspicious but survivable situations.
    Warn = 1,
    /// Run-level progress.
    Info = 2,
    /// Capacity tuning feedback (sizes, load factors).
    Debug = 3,
    /// Full container dumps.
    Trace = 4,
}

impl Level {
    const ALL: [Level; 5] = [
        Level::Error,
        Level::Warn,
        Level::Info,
        Level::Debug,
        Level::Trace,
    ];

    const fn color_code(self) -> &'static str {
        match self {
            Level::Error => "\x1b[31m",
            Level::Warn => "\x1b[33m",
            Level::Info => "\x1b[32m",
            Level::Debug => "\x1b[36m",
            Level::Trace => "\x1b[35m",
        }
    }

    /// Upper-case name of the level, as printed in log lines.
    pub const fn as_str(self) -> &'static str {
        match self {
            Level::Error => "ERROR",
            Level::Warn => "WARN",
            Level::Info => "INFO",
            Level::Debug => "DEBUG",
            Level::Trace => "TRACE",
        }
    }

    const fn from_u8(raw: u8) -> Self {
        match raw {
            0 => Level::Error,
            1 => Level::Warn,
            2 => Level::Info,
            3 => Level::Debug,
            _ => Level::Trace,
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a string does not name a [`Level`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseLevelError {
    input: String,
}

impl fmt::Display for ParseLevelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "invalid log level `{}` (expected one of error, warn, info, debug, trace)",
            self.input
        )
    }
}

impl std::error::Error for ParseLevelError {}

impl FromStr for Level {
    type Err = ParseLevelError;

    /// Parses a level name, ignoring ASCII case.
    ///
    /// ```
    /// use astore_log::Level;
    ///
    /// assert_eq!("debug".parse::<Level>(), Ok(Level::Debug));
    /// assert_eq!("WARN".parse::<Level>(), Ok(Level::Warn));
    /// assert!("verbose".parse::<Level>().is_err());
    /// ```
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Level::ALL
            .into_iter()
            .find(|level| level.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| ParseLevelError {
                input: s.to_string(),
            })
    }
}

/// Process-wide logger state.
///
/// The threshold is atomic so that the logger can be shared freely, even
/// though the ingestion pipeline itself is single threaded.
pub struct Logger {
    level: AtomicU8,
    color: AtomicBool,
}

impl Logger {
    const fn new(level: Level, color: bool) -> Self {
        Logger {
            level: AtomicU8::new(level as u8),
            color: AtomicBool::new(color),
        }
    }

    /// Sets the most verbose level that will still be printed.
    pub fn set_level(&self, level: Level) {
        self.level.store(level as u8, Ordering::SeqCst);
    }

    /// Returns the current threshold.
    pub fn level(&self) -> Level {
        Level::from_u8(self.level.load(Ordering::Relaxed))
    }

    /// Returns true if a message at `level` would be printed.
    pub fn enabled(&self, level: Level) -> bool {
        level as u8 <= self.level.load(Ordering::Relaxed)
    }

    /// Turns ANSI colouring on or off.
    pub fn set_color(&self, color: bool) {
        self.color.store(color, Ordering::Relaxed);
    }

    fn color(&self) -> bool {
        self.color.load(Ordering::Relaxed)
    }
}

static LOGGER: OnceLock<Logger> = OnceLock::new();

/// Returns the global logger, creating it at `Info` on first use.
///
/// Colour is disabled when the `NO_COLOR` environment variable is present.
pub fn get_logger() -> &'static Logger {
    LOGGER.get_or_init(|| Logger::new(Level::Info, std::env::var_os("NO_COLOR").is_none()))
}

/// Sets the threshold of the global logger.
pub fn set_level(level: Level) {
    get_logger().set_level(level);
}

/// Parses `s` and sets the threshold of the global logger.
///
/// ```
/// astore_log::set_level_from_str("trace").unwrap();
/// assert_eq!(astore_log::get_logger().level(), astore_log::Level::Trace);
/// ```
pub fn set_level_from_str(s: &str) -> Result<(), ParseLevelError> {
    set_level(s.parse()?);
    Ok(())
}

/// Configures the global logger from the environment variable `var`.
///
/// A missing variable keeps the current level. An unparsable value keeps the
/// current level too and is reported as a warning.
pub fn init_from_env(var: &str) -> Level {
    if let Ok(value) = std::env::var(var)
        && let Err(err) = set_level_from_str(&value)
    {
        __log_with_target(Level::Warn, module_path!(), format_args!("{var}: {err}"));
    }
    get_logger().level()
}

#[doc(hidden)]
pub fn __log_with_target(level: Level, target: &str, args: Arguments<'_>) {
    const RESET: &str = "\x1b[0m";

    let logger = get_logger();
    if !logger.enabled(level) {
        return;
    }

    let stderr = std::io::stderr();
    let mut out = stderr.lock();
    // Nothing sensible can be done when stderr itself is gone.
    let _ = if logger.color() {
        writeln!(out, "{}[{}]{RESET} {target}: {args}", level.color_code(), level)
    } else {
        writeln!(out, "[{level}] {target}: {args}")
    };
}

/// Logs a message at an explicit level.
///
/// ```
/// use astore_log::{log, Level};
///
/// log!(level: Level::Info, "parsed {} lines", 128);
/// ```
#[macro_export]
macro_rules! log {
    (level: $level:expr, $($arg:tt)*) => {{
        let level = $level;
        if $crate::get_logger().enabled(level) {
            $crate::__log_with_target(level, module_path!(), format_args!($($arg)*));
        }
    }};
}

/// Logs at [`Level::Error`].
#[macro_export]
macro_rules! error {
    ($($arg:tt)*) => {
        $crate::log!(level: $crate::Level::Error, $($arg)*)
    };
}

/// Logs at [`Level::Warn`].
#[macro_export]
macro_rules! warn {
    ($($arg:tt)*) => {
        $crate::log!(level: $crate::Level::Warn, $($arg)*)
    };
}

/// Logs at [`Level::Info`].
#[macro_export]
macro_rules! info {
    ($($arg:tt)*) => {
        $crate::log!(level: $crate::Level::Info, $($arg)*)
    };
}

/// Logs at [`Level::Debug`].
#[macro_export]
macro_rules! debug {
    ($($arg:tt)*) => {
        $crate::log!(level: $crate::Level::Debug, $($arg)*)
    };
}

/// Logs at [`Level::Trace`].
#[macro_export]
macro_rules! trace {
    ($($arg:tt)*) => {
        $crate::log!(level: $crate::Level::Trace, $($arg)*)
    };
}
