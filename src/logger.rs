//! Process-wide log level. Everything goes to stderr so stdout stays
//! reserved for the JSON response.

use std::sync::atomic::{AtomicU8, Ordering};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[repr(u8)]
pub enum LogLevel {
    /// Warnings only.
    Quiet = 0,
    /// Plan and summary lines.
    Normal = 1,
    /// Every ladder attempt as well.
    Verbose = 2,
}

impl LogLevel {
    /// `--quiet` wins over `--verbose`.
    pub fn from_flags(quiet: bool, verbose: bool) -> Self {
        match (quiet, verbose) {
            (true, _) => LogLevel::Quiet,
            (false, true) => LogLevel::Verbose,
            (false, false) => LogLevel::Normal,
        }
    }

    fn from_u8(value: u8) -> Self {
        match value {
            0 => LogLevel::Quiet,
            2 => LogLevel::Verbose,
            _ => LogLevel::Normal,
        }
    }
}

static LOG_LEVEL: AtomicU8 = AtomicU8::new(LogLevel::Normal as u8);

pub fn set_log_level(level: LogLevel) {
    LOG_LEVEL.store(level as u8, Ordering::Relaxed);
}

pub fn log_level() -> LogLevel {
    LogLevel::from_u8(LOG_LEVEL.load(Ordering::Relaxed))
}

pub fn enabled(level: LogLevel) -> bool {
    log_level() >= level
}

pub fn is_quiet() -> bool {
    log_level() == LogLevel::Quiet
}

#[macro_export]
macro_rules! info {
    ($($arg:tt)*) => {
        if $crate::logger::enabled($crate::logger::LogLevel::Normal) {
            eprintln!($($arg)*);
        }
    };
}

#[macro_export]
macro_rules! verbose {
    ($($arg:tt)*) => {
        if $crate::logger::enabled($crate::logger::LogLevel::Verbose) {
            eprintln!("🔍 {}", format!($($arg)*));
        }
    };
}

/// Printed at every level; a quiet run should still say why an image was skipped.
#[macro_export]
macro_rules! warn {
    ($($arg:tt)*) => {
        eprintln!("⚠️  {}", format!($($arg)*));
    };
}
