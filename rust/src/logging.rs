//! Logging macros with verbosity level control.
//!
//! Records go through the `log` facade, so the host application picks the
//! backend. The verbosity carried in `EnumerationConfig` decides whether a
//! record is emitted at all:
//! - 0: SILENT (nothing)
//! - 1: CHANGES (results delivered, enumeration totals)
//! - 2: CHECKS (path selection, candidate counts)
//! - 3: DEBUG (per-chunk and alignment details)

/// Verbosity level constants.
pub const VERBOSITY_SILENT: u8 = 0;
pub const VERBOSITY_CHANGES: u8 = 1;
pub const VERBOSITY_CHECKS: u8 = 2;
pub const VERBOSITY_DEBUG: u8 = 3;

/// Log at CHANGES level (verbosity >= 1), emitted as `info`.
#[macro_export]
macro_rules! log_changes {
    ($verbosity:expr, $($arg:tt)*) => {
        if $verbosity >= $crate::logging::VERBOSITY_CHANGES {
            ::log::info!($($arg)*);
        }
    };
}

/// Log at CHECKS level (verbosity >= 2), emitted as `debug`.
#[macro_export]
macro_rules! log_checks {
    ($verbosity:expr, $($arg:tt)*) => {
        if $verbosity >= $crate::logging::VERBOSITY_CHECKS {
            ::log::debug!($($arg)*);
        }
    };
}

/// Log at DEBUG level (verbosity >= 3), emitted as `trace`.
#[macro_export]
macro_rules! log_debug {
    ($verbosity:expr, $($arg:tt)*) => {
        if $verbosity >= $crate::logging::VERBOSITY_DEBUG {
            ::log::trace!($($arg)*);
        }
    };
}
