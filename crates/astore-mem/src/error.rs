//! Error types for the storage substrate.
//!
//! Most conditions in this crate are either expected negative results
//! (a binary-search miss, a duplicate intern) or caller contract violations
//! that are asserted. The few runtime conditions that can be reported as
//! values live in [`MemError`]; the ones that must end the run go through
//! [`fatal`].

use std::fmt;

/// Errors reported by the storage layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MemError {
    /// The interning table has no empty slot left for new content.
    TableFull {
        /// The fixed capacity the table was reserved with.
        capacity: usize,
    },

    /// A configuration value could not be parsed.
    InvalidConfig {
        /// Name of the configuration key (environment variable).
        key: &'static str,
        /// The rejected raw value.
        value: String,
    },
}

impl fmt::Display for MemError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MemError::TableFull { capacity } => write!(
                f,
                "The string set is full (STRING_SET_SIZE={capacity}), re-run with a bigger size"
            ),
            MemError::InvalidConfig { key, value } => {
                write!(f, "Invalid value for {key}: `{value}`")
            }
        }
    }
}

impl std::error::Error for MemError {}

/// Result type for storage operations.
pub type Result<T> = std::result::Result<T, MemError>;

/// Aborts the run on an unrecoverable storage condition.
///
/// Continuing with an incomplete symbol table would silently produce wrong
/// output downstream, so the error is logged and the run unwinds.
#[cold]
#[track_caller]
pub fn fatal(err: &MemError) -> ! {
    astore_log::error!("{err}");

    #[cfg(feature = "fatal-backtrace")]
    astore_log::error!("{:?}", backtrace::Backtrace::new());

    panic!("{err}");
}
