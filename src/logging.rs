//! Leveled build logging
//!
//! The build host owns the log; everything in this crate only ever borrows
//! it through the [BuildLog] trait. Two implementations are provided:
//!
//! - [ConsoleLog]: colored terminal output for interactive and CI runs
//! - [MemoryLog]: captures entries for assertions in tests

use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Mutex;

use crate::error::{CiVersionError, Result};

/// Output verbosity, ordered from least to most chatty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[repr(u8)]
pub enum Verbosity {
    Quiet = 0,
    Minimal = 1,
    Normal = 2,
    Verbose = 3,
    Diagnostic = 4,
}

impl Verbosity {
    fn from_u8(value: u8) -> Self {
        match value {
            0 => Verbosity::Quiet,
            1 => Verbosity::Minimal,
            3 => Verbosity::Verbose,
            4 => Verbosity::Diagnostic,
            _ => Verbosity::Normal,
        }
    }

    /// Whether a message of the given level is emitted at this verbosity.
    pub fn allows(self, level: LogLevel) -> bool {
        self >= level.threshold()
    }
}

impl FromStr for Verbosity {
    type Err = CiVersionError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "quiet" => Ok(Verbosity::Quiet),
            "minimal" => Ok(Verbosity::Minimal),
            "normal" => Ok(Verbosity::Normal),
            "verbose" => Ok(Verbosity::Verbose),
            "diagnostic" => Ok(Verbosity::Diagnostic),
            other => Err(CiVersionError::config(format!(
                "Unknown verbosity level: '{}'",
                other
            ))),
        }
    }
}

impl fmt::Display for Verbosity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Verbosity::Quiet => "Quiet",
            Verbosity::Minimal => "Minimal",
            Verbosity::Normal => "Normal",
            Verbosity::Verbose => "Verbose",
            Verbosity::Diagnostic => "Diagnostic",
        };
        write!(f, "{}", name)
    }
}

/// Severity of a single log message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Debug,
    Verbose,
    Information,
    Warning,
    Error,
}

impl LogLevel {
    /// Minimum verbosity at which messages of this level appear.
    pub fn threshold(self) -> Verbosity {
        match self {
            LogLevel::Error => Verbosity::Quiet,
            LogLevel::Warning => Verbosity::Minimal,
            LogLevel::Information => Verbosity::Normal,
            LogLevel::Verbose => Verbosity::Verbose,
            LogLevel::Debug => Verbosity::Diagnostic,
        }
    }
}

/// Leveled message sink injected into the build context.
///
/// Implementations filter by their current [Verbosity]; callers just emit.
pub trait BuildLog: Send + Sync {
    /// Current verbosity.
    fn verbosity(&self) -> Verbosity;

    /// Change verbosity. Used once, during context construction, when the
    /// `LOGGINGLEVEL` environment variable overrides the default.
    fn set_verbosity(&self, verbosity: Verbosity);

    /// Emit a message at the given level.
    fn log(&self, level: LogLevel, message: &str);

    /// Emit a message regardless of the current verbosity. Used for the
    /// confirmation of the verbosity override itself, which must stay
    /// visible even at `Quiet`.
    fn always(&self, message: &str);

    fn debug(&self, message: &str) {
        self.log(LogLevel::Debug, message);
    }

    fn verbose(&self, message: &str) {
        self.log(LogLevel::Verbose, message);
    }

    fn info(&self, message: &str) {
        self.log(LogLevel::Information, message);
    }

    fn warning(&self, message: &str) {
        self.log(LogLevel::Warning, message);
    }

    fn error(&self, message: &str) {
        self.log(LogLevel::Error, message);
    }
}

/// Console logger with the usual color conventions.
pub struct ConsoleLog {
    verbosity: AtomicU8,
}

impl ConsoleLog {
    pub fn new(verbosity: Verbosity) -> Self {
        ConsoleLog {
            verbosity: AtomicU8::new(verbosity as u8),
        }
    }
}

impl Default for ConsoleLog {
    fn default() -> Self {
        Self::new(Verbosity::Normal)
    }
}

impl BuildLog for ConsoleLog {
    fn verbosity(&self) -> Verbosity {
        Verbosity::from_u8(self.verbosity.load(Ordering::Relaxed))
    }

    fn set_verbosity(&self, verbosity: Verbosity) {
        self.verbosity.store(verbosity as u8, Ordering::Relaxed);
    }

    fn always(&self, message: &str) {
        println!("{}", message);
    }

    fn log(&self, level: LogLevel, message: &str) {
        if !self.verbosity().allows(level) {
            return;
        }
        match level {
            LogLevel::Error => eprintln!("{} {}", console::style("ERROR:").red().bold(), message),
            LogLevel::Warning => {
                println!("{} {}", console::style("WARNING:").yellow(), message)
            }
            LogLevel::Information => println!("{}", message),
            LogLevel::Verbose | LogLevel::Debug => {
                println!("{}", console::style(message).dim())
            }
        }
    }
}

/// A captured log entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    pub level: LogLevel,
    pub message: String,
}

/// In-memory logger for tests.
///
/// Applies the same verbosity filtering as [ConsoleLog], so assertions on
/// entry counts see exactly what a console user would.
pub struct MemoryLog {
    verbosity: AtomicU8,
    entries: Mutex<Vec<LogEntry>>,
}

impl Default for MemoryLog {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryLog {
    pub fn new() -> Self {
        MemoryLog {
            verbosity: AtomicU8::new(Verbosity::Normal as u8),
            entries: Mutex::new(Vec::new()),
        }
    }

    /// All captured entries.
    pub fn entries(&self) -> Vec<LogEntry> {
        self.entries.lock().unwrap().clone()
    }

    /// Captured entries of one level.
    pub fn entries_at(&self, level: LogLevel) -> Vec<LogEntry> {
        self.entries()
            .into_iter()
            .filter(|e| e.level == level)
            .collect()
    }

    /// Captured warning messages.
    pub fn warnings(&self) -> Vec<String> {
        self.entries_at(LogLevel::Warning)
            .into_iter()
            .map(|e| e.message)
            .collect()
    }
}

impl BuildLog for MemoryLog {
    fn verbosity(&self) -> Verbosity {
        Verbosity::from_u8(self.verbosity.load(Ordering::Relaxed))
    }

    fn set_verbosity(&self, verbosity: Verbosity) {
        self.verbosity.store(verbosity as u8, Ordering::Relaxed);
    }

    fn always(&self, message: &str) {
        self.entries.lock().unwrap().push(LogEntry {
            level: LogLevel::Information,
            message: message.to_string(),
        });
    }

    fn log(&self, level: LogLevel, message: &str) {
        if !self.verbosity().allows(level) {
            return;
        }
        self.entries.lock().unwrap().push(LogEntry {
            level,
            message: message.to_string(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verbosity_ordering() {
        assert!(Verbosity::Quiet < Verbosity::Minimal);
        assert!(Verbosity::Minimal < Verbosity::Normal);
        assert!(Verbosity::Normal < Verbosity::Verbose);
        assert!(Verbosity::Verbose < Verbosity::Diagnostic);
    }

    #[test]
    fn test_verbosity_parse_case_insensitive() {
        assert_eq!("quiet".parse::<Verbosity>().unwrap(), Verbosity::Quiet);
        assert_eq!("DIAGNOSTIC".parse::<Verbosity>().unwrap(), Verbosity::Diagnostic);
        assert_eq!("Verbose".parse::<Verbosity>().unwrap(), Verbosity::Verbose);
    }

    #[test]
    fn test_verbosity_parse_invalid() {
        assert!("chatty".parse::<Verbosity>().is_err());
        assert!("".parse::<Verbosity>().is_err());
    }

    #[test]
    fn test_verbosity_display_round_trip() {
        for v in [
            Verbosity::Quiet,
            Verbosity::Minimal,
            Verbosity::Normal,
            Verbosity::Verbose,
            Verbosity::Diagnostic,
        ] {
            assert_eq!(v.to_string().parse::<Verbosity>().unwrap(), v);
        }
    }

    #[test]
    fn test_level_thresholds() {
        assert!(Verbosity::Quiet.allows(LogLevel::Error));
        assert!(!Verbosity::Quiet.allows(LogLevel::Warning));
        assert!(Verbosity::Minimal.allows(LogLevel::Warning));
        assert!(!Verbosity::Minimal.allows(LogLevel::Information));
        assert!(Verbosity::Normal.allows(LogLevel::Information));
        assert!(!Verbosity::Normal.allows(LogLevel::Verbose));
        assert!(Verbosity::Diagnostic.allows(LogLevel::Debug));
    }

    #[test]
    fn test_memory_log_captures_entries() {
        let log = MemoryLog::new();
        log.info("hello");
        log.warning("careful");

        let entries = log.entries();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].level, LogLevel::Information);
        assert_eq!(log.warnings(), vec!["careful".to_string()]);
    }

    #[test]
    fn test_always_bypasses_verbosity_filter() {
        let log = MemoryLog::new();
        log.set_verbosity(Verbosity::Quiet);
        log.info("filtered");
        log.always("still here");

        let entries = log.entries();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].message, "still here");
        assert_eq!(entries[0].level, LogLevel::Information);
    }

    #[test]
    fn test_memory_log_filters_below_threshold() {
        let log = MemoryLog::new();
        log.debug("invisible at normal");
        log.verbose("also invisible");
        assert!(log.entries().is_empty());

        log.set_verbosity(Verbosity::Diagnostic);
        log.debug("now visible");
        assert_eq!(log.entries().len(), 1);
    }

    #[test]
    fn test_memory_log_quiet_keeps_errors() {
        let log = MemoryLog::new();
        log.set_verbosity(Verbosity::Quiet);
        log.info("dropped");
        log.error("kept");
        assert_eq!(log.entries().len(), 1);
        assert_eq!(log.entries()[0].level, LogLevel::Error);
    }
}
