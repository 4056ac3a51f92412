use std::backtrace::{Backtrace, BacktraceStatus};
use std::fmt::{self, Debug, Formatter};
use std::io::{self, Write};
use std::panic::Location;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::prelude::*;

use crate::fanout::FanoutWriter;
use crate::value::join_values;
use crate::{
    Abort, Caller, EncoderConfig, Encoding, Entry, ErrorHandler, Level, LogError,
    MaintenanceError, ProcessTerminator, RotatingFile, RotationPolicy, Terminator, Value,
    FATAL_EXIT_CODE,
};

/// The log file used when the given path is empty.
pub const DEFAULT_LOG_PATH: &str = "./logs/output.log";
pub const DEFAULT_MAX_SIZE_MB: u64 = 64;
pub const DEFAULT_MAX_BACKUPS: usize = 3;
/// Days.
pub const DEFAULT_MAX_AGE: u32 = 7;

// -----LoggerBuilder START-----

/// To build a Logger instance.
pub struct LoggerBuilder {
    path: PathBuf,
    level: Level,
    policy: RotationPolicy,
    encoder: EncoderConfig,
    encoding: Encoding,
    console: Option<Box<dyn Write + Send>>,
    name: Option<String>,
    stacktrace_level: Option<Level>,
    terminator: Arc<dyn Terminator>,
    error_handler: Option<ErrorHandler>,
    announce: bool,
}

impl Debug for LoggerBuilder {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        f.debug_struct("LoggerBuilder")
            .field("path", &self.path)
            .field("level", &self.level)
            .field("policy", &self.policy)
            .field("encoder", &self.encoder)
            .field("encoding", &self.encoding)
            .field("name", &self.name)
            .field("stacktrace_level", &self.stacktrace_level)
            .field("announce", &self.announce)
            .finish()
    }
}

fn default_policy(path: &Path) -> RotationPolicy {
    let mut policy = RotationPolicy::new(path);

    policy
        .set_max_size_mb(DEFAULT_MAX_SIZE_MB)
        .set_max_backups(DEFAULT_MAX_BACKUPS)
        .set_max_age(DEFAULT_MAX_AGE)
        .set_compress(true);

    policy
}

impl LoggerBuilder {
    /// Create a new LoggerBuilder. An empty path is replaced with `DEFAULT_LOG_PATH`.
    pub fn new<P: AsRef<Path>>(log_path: P) -> LoggerBuilder {
        let log_path = log_path.as_ref();

        let path = if log_path.as_os_str().is_empty() {
            PathBuf::from(DEFAULT_LOG_PATH)
        } else {
            log_path.to_path_buf()
        };

        let policy = default_policy(&path);

        LoggerBuilder {
            path,
            level: Level::Info,
            policy,
            encoder: EncoderConfig::default(),
            encoding: Encoding::Console,
            console: None,
            name: None,
            stacktrace_level: None,
            terminator: Arc::new(ProcessTerminator),
            error_handler: None,
            announce: true,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn level(&self) -> Level {
        self.level
    }

    pub fn policy(&self) -> &RotationPolicy {
        &self.policy
    }

    pub fn encoder(&self) -> &EncoderConfig {
        &self.encoder
    }

    pub fn encoding(&self) -> Encoding {
        self.encoding
    }

    pub fn set_level(&mut self, level: Level) -> &mut Self {
        self.level = level;
        self
    }

    /// Set the level by its name, see `Level::from_name`.
    pub fn set_level_name<S: AsRef<str>>(&mut self, name: S) -> &mut Self {
        self.level = Level::from_name(name);
        self
    }

    /// Replace the rotation policy. The log path follows the policy's path.
    pub fn set_policy(&mut self, policy: RotationPolicy) -> &mut Self {
        self.path = policy.path().to_path_buf();
        self.policy = policy;
        self
    }

    pub fn set_encoder(&mut self, encoder: EncoderConfig) -> &mut Self {
        self.encoder = encoder;
        self
    }

    pub fn set_encoding(&mut self, encoding: Encoding) -> &mut Self {
        self.encoding = encoding;
        self
    }

    /// Send the console copy of every record to any writer instead of stdout.
    pub fn set_console<W: Write + Send + 'static>(&mut self, console: W) -> &mut Self {
        self.console = Some(Box::new(console));
        self
    }

    pub fn set_name<S: Into<String>>(&mut self, name: S) -> &mut Self {
        self.name = Some(name.into());
        self
    }

    /// Attach a backtrace to records at or above this level. `None` disables it.
    pub fn set_stacktrace_level(&mut self, level: Option<Level>) -> &mut Self {
        self.stacktrace_level = level;
        self
    }

    pub fn set_terminator<T: Terminator + 'static>(&mut self, terminator: T) -> &mut Self {
        self.terminator = Arc::new(terminator);
        self
    }

    /// Replace the default handler, which writes maintenance errors of the log file as `WARN`
    /// records to stderr.
    pub fn set_error_handler(&mut self, error_handler: ErrorHandler) -> &mut Self {
        self.error_handler = Some(error_handler);
        self
    }

    /// Whether to write an `INFO` record about the log file path when the logger is built. It is
    /// written regardless of the level.
    pub fn set_announce(&mut self, announce: bool) -> &mut Self {
        self.announce = announce;
        self
    }

    /// Build a new Logger.
    pub fn build(self) -> Logger {
        let error_handler = match self.error_handler {
            Some(error_handler) => error_handler,
            None => self_log_handler(self.encoder.clone(), self.encoding, self.name.clone()),
        };

        let mut file = RotatingFile::new(self.policy);

        file.set_error_handler(error_handler);

        let console = self.console.unwrap_or_else(|| Box::new(io::stdout()));

        let logger = Logger {
            level: self.level,
            encoder: self.encoder,
            encoding: self.encoding,
            name: self.name,
            stacktrace_level: self.stacktrace_level,
            path: self.path,
            writer: Mutex::new(FanoutWriter::new(console, file)),
            terminator: self.terminator,
        };

        if self.announce {
            let message =
                format!("init Logger success logger file path {}", logger.path.to_string_lossy());

            if let Err(err) = logger.emit(Level::Info, &message, Location::caller()) {
                eprintln!("{}", err);
            }
        }

        logger
    }
}

/// Write maintenance errors as `WARN` records to stderr, without touching the sinks of the logger.
fn self_log_handler(
    encoder: EncoderConfig,
    encoding: Encoding,
    name: Option<String>,
) -> ErrorHandler {
    Arc::new(move |err: &MaintenanceError| {
        let message = err.to_string();

        let entry = Entry {
            level: Level::Warn,
            time: Local::now(),
            name: name.as_deref(),
            caller: None,
            message: &message,
            stack: None,
        };

        eprint!("{}", encoder.encode(encoding, &entry));
    })
}

// -----LoggerBuilder END-----

// -----Logger START-----

/// A leveled logger which writes every record to the console and to a rotating log file.
///
/// Every call is synchronous. Records from concurrent threads are never interleaved within a sink.
pub struct Logger {
    level: Level,
    encoder: EncoderConfig,
    encoding: Encoding,
    name: Option<String>,
    stacktrace_level: Option<Level>,
    path: PathBuf,
    writer: Mutex<FanoutWriter>,
    terminator: Arc<dyn Terminator>,
}

impl Debug for Logger {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        f.debug_struct("Logger")
            .field("level", &self.level)
            .field("encoding", &self.encoding)
            .field("name", &self.name)
            .field("path", &self.path)
            .finish()
    }
}

impl Logger {
    /// Create a logger writing to stdout and to `log_file`, rotated at 64 MB, keeping 3 compressed backups for 7 days.
    ///
    /// An empty `log_file` means `./logs/output.log`. `log_level` is resolved by `Level::from_name`.
    /// The log file is not opened until the first record, which is the initialization record written by this function.
    pub fn new<P: AsRef<Path>, S: AsRef<str>>(log_file: P, log_level: S) -> Logger {
        let mut builder = LoggerBuilder::new(log_file);

        builder.set_level_name(log_level);

        builder.build()
    }

    /// Create a new LoggerBuilder.
    #[inline]
    pub fn builder<P: AsRef<Path>>(log_path: P) -> LoggerBuilder {
        LoggerBuilder::new(log_path)
    }

    #[inline]
    pub fn level(&self) -> Level {
        self.level
    }

    #[inline]
    pub fn path(&self) -> &Path {
        &self.path
    }

    #[inline]
    pub fn encoder(&self) -> &EncoderConfig {
        &self.encoder
    }

    #[inline]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    #[inline]
    pub fn enabled(&self, level: Level) -> bool {
        level >= self.level
    }

    /// The names of the retained backups, oldest first.
    pub fn backups(&self) -> Vec<String> {
        self.lock().file().backups().to_vec()
    }

    /// Flush the console, and flush then fsync the log file.
    pub fn sync(&self) -> Result<(), LogError> {
        self.lock().sync()
    }

    /// Log values, joined with a space between two adjacent non-string values.
    ///
    /// Panic and Fatal still terminate when the level is below the threshold, without writing
    /// anything.
    #[track_caller]
    pub fn log(&self, level: Level, values: &[Value]) -> Result<(), LogError> {
        if !self.enabled(level) {
            if level >= Level::Panic {
                self.terminate(level, &join_values(values, &self.encoder));
            }

            return Ok(());
        }

        let message = join_values(values, &self.encoder);

        self.emit(level, &message, Location::caller())
    }

    /// Log a message built by `format_args!`.
    #[track_caller]
    pub fn logf(&self, level: Level, args: fmt::Arguments) -> Result<(), LogError> {
        if !self.enabled(level) {
            if level >= Level::Panic {
                self.terminate(level, &fmt::format(args));
            }

            return Ok(());
        }

        let message = fmt::format(args);

        self.emit(level, &message, Location::caller())
    }

    #[track_caller]
    #[inline]
    pub fn debug(&self, values: &[Value]) -> Result<(), LogError> {
        self.log(Level::Debug, values)
    }

    #[track_caller]
    #[inline]
    pub fn info(&self, values: &[Value]) -> Result<(), LogError> {
        self.log(Level::Info, values)
    }

    #[track_caller]
    #[inline]
    pub fn warn(&self, values: &[Value]) -> Result<(), LogError> {
        self.log(Level::Warn, values)
    }

    #[track_caller]
    #[inline]
    pub fn error(&self, values: &[Value]) -> Result<(), LogError> {
        self.log(Level::Error, values)
    }

    /// Log, then panic with the message.
    #[track_caller]
    #[inline]
    pub fn panic(&self, values: &[Value]) -> Result<(), LogError> {
        self.log(Level::Panic, values)
    }

    /// Log, then exit the process with `FATAL_EXIT_CODE`.
    #[track_caller]
    #[inline]
    pub fn fatal(&self, values: &[Value]) -> Result<(), LogError> {
        self.log(Level::Fatal, values)
    }

    #[track_caller]
    #[inline]
    pub fn debugf(&self, args: fmt::Arguments) -> Result<(), LogError> {
        self.logf(Level::Debug, args)
    }

    #[track_caller]
    #[inline]
    pub fn infof(&self, args: fmt::Arguments) -> Result<(), LogError> {
        self.logf(Level::Info, args)
    }

    #[track_caller]
    #[inline]
    pub fn warnf(&self, args: fmt::Arguments) -> Result<(), LogError> {
        self.logf(Level::Warn, args)
    }

    #[track_caller]
    #[inline]
    pub fn errorf(&self, args: fmt::Arguments) -> Result<(), LogError> {
        self.logf(Level::Error, args)
    }

    /// Log, then panic with the message.
    #[track_caller]
    #[inline]
    pub fn panicf(&self, args: fmt::Arguments) -> Result<(), LogError> {
        self.logf(Level::Panic, args)
    }

    /// Log, then exit the process with `FATAL_EXIT_CODE`.
    #[track_caller]
    #[inline]
    pub fn fatalf(&self, args: fmt::Arguments) -> Result<(), LogError> {
        self.logf(Level::Fatal, args)
    }

    fn lock(&self) -> MutexGuard<FanoutWriter> {
        // a panicking record must not wedge the other threads
        self.writer.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn stack(&self, level: Level) -> Option<String> {
        match self.stacktrace_level {
            Some(stacktrace_level) if level >= stacktrace_level => {
                let backtrace = Backtrace::force_capture();

                match backtrace.status() {
                    BacktraceStatus::Captured => Some(backtrace.to_string()),
                    _ => None,
                }
            }
            _ => None,
        }
    }

    fn emit(
        &self,
        level: Level,
        message: &str,
        caller: &'static Location<'static>,
    ) -> Result<(), LogError> {
        let stack = self.stack(level);

        let entry = Entry {
            level,
            time: Local::now(),
            name: self.name.as_deref(),
            caller: Some(Caller::from(caller)),
            message,
            stack: stack.as_deref(),
        };

        let record = self.encoder.encode(self.encoding, &entry);

        let result = {
            let mut writer = self.lock();

            let result = writer.write_record(record.as_bytes()).map(|_| ());

            if level >= Level::Panic {
                let synced = writer.sync();

                result.and(synced)
            } else {
                result
            }
        };

        self.terminate(level, message);

        result
    }

    fn terminate(&self, level: Level, message: &str) {
        match level {
            Level::Panic => self.terminator.abort(Abort::Unrecoverable(message.to_string())),
            Level::Fatal => self.terminator.abort(Abort::Terminate(FATAL_EXIT_CODE)),
            _ => (),
        }
    }
}

// -----Logger END-----
