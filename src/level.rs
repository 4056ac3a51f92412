use std::fmt::{self, Display, Formatter};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
/// The severity of a log record, ordered from the least to the most severe.
pub enum Level {
    Debug,
    Info,
    Warn,
    Error,
    /// Panics the calling thread after the record is written.
    Panic,
    /// Exits the process after the record is written.
    Fatal,
}

impl Level {
    /// Resolve a level name. Only `"debug"`, `"info"`, `"warn"` and `"error"` are recognized (case-sensitive); any other input falls back to `Level::Info`.
    pub fn from_name<S: AsRef<str>>(name: S) -> Level {
        match name.as_ref() {
            "debug" => Level::Debug,
            "info" => Level::Info,
            "warn" => Level::Warn,
            "error" => Level::Error,
            _ => Level::Info,
        }
    }

    #[inline]
    pub fn as_str(self) -> &'static str {
        match self {
            Level::Debug => "debug",
            Level::Info => "info",
            Level::Warn => "warn",
            Level::Error => "error",
            Level::Panic => "panic",
            Level::Fatal => "fatal",
        }
    }

    #[inline]
    pub fn capital_str(self) -> &'static str {
        match self {
            Level::Debug => "DEBUG",
            Level::Info => "INFO",
            Level::Warn => "WARN",
            Level::Error => "ERROR",
            Level::Panic => "PANIC",
            Level::Fatal => "FATAL",
        }
    }
}

impl Default for Level {
    #[inline]
    fn default() -> Self {
        Level::Info
    }
}

impl Display for Level {
    #[inline]
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
