extern crate fanout_logger_lib;

use std::collections::HashSet;
use std::fs;
use std::io::{self, Write};
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;

use regex::Regex;

use fanout_logger_lib::{
    debug, error, errorf, fatal, fatalf, info, infof, log_panic, log_panicf, warn, Abort, Encoding,
    Level, Logger, LoggerBuilder, MaintenanceError, RotationPolicy, Terminator, Value,
    COMPRESSED_EXTENSION, DEFAULT_LOG_PATH, DEFAULT_MAX_AGE, DEFAULT_MAX_BACKUPS,
    DEFAULT_MAX_SIZE_MB, FATAL_EXIT_CODE, MEGABYTE,
};

const LOG_FILE_NAME: &str = "logfile.log";

static LAST_TEST_FOLDER_ID: AtomicUsize = AtomicUsize::new(0);

fn create_test_folder() -> PathBuf {
    let test_folder_name =
        format!("logger-{}", LAST_TEST_FOLDER_ID.fetch_add(1, Ordering::SeqCst));

    let folder = Path::new("tests").join("out").join(&test_folder_name);

    let _ = fs::remove_dir_all(&folder);

    fs::create_dir_all(&folder).unwrap();

    folder
}

#[derive(Clone, Default)]
struct Console(Arc<Mutex<Vec<u8>>>);

impl Console {
    fn contents(&self) -> String {
        String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
    }
}

impl Write for Console {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);

        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

struct BrokenConsole;

impl Write for BrokenConsole {
    fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
        Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[derive(Clone, Default)]
struct RecordingTerminator(Arc<Mutex<Vec<Abort>>>);

impl Terminator for RecordingTerminator {
    fn abort(&self, abort: Abort) {
        self.0.lock().unwrap().push(abort);
    }
}

fn quiet_builder(test_log_path: &Path, console: &Console) -> LoggerBuilder {
    let mut builder = Logger::builder(test_log_path);

    builder.set_console(console.clone()).set_announce(false);

    builder
}

#[test]
fn level_from_name() {
    assert_eq!(Level::Debug, Level::from_name("debug"));
    assert_eq!(Level::Info, Level::from_name("info"));
    assert_eq!(Level::Warn, Level::from_name("warn"));
    assert_eq!(Level::Error, Level::from_name("error"));

    for name in ["", "DEBUG", "Warn", "panic", "fatal", "verbose", " info"].iter() {
        assert_eq!(Level::Info, Level::from_name(name));
    }

    assert!(Level::Debug < Level::Info);
    assert!(Level::Info < Level::Warn);
    assert!(Level::Warn < Level::Error);
    assert!(Level::Error < Level::Panic);
    assert!(Level::Panic < Level::Fatal);
}

#[test]
fn default_settings() {
    let builder = LoggerBuilder::new("");

    assert_eq!(Path::new(DEFAULT_LOG_PATH), builder.path());
    assert_eq!(Level::Info, builder.level());
    assert_eq!(Encoding::Console, builder.encoding());

    let policy = builder.policy();

    assert_eq!(Path::new(DEFAULT_LOG_PATH), policy.path());
    assert_eq!(DEFAULT_MAX_SIZE_MB * MEGABYTE, policy.max_size());
    assert_eq!(64 * 1024 * 1024, policy.max_size());
    assert_eq!(DEFAULT_MAX_BACKUPS, policy.max_backups());
    assert_eq!(3, policy.max_backups());
    assert_eq!(DEFAULT_MAX_AGE, policy.max_age());
    assert_eq!(7, policy.max_age());
    assert!(policy.compress());
}

#[test]
fn default_path_and_error_level() {
    let log_folder = Path::new("logs");

    let _ = fs::remove_dir_all(log_folder);

    {
        let logger = Logger::new("", "error");

        assert_eq!(Path::new(DEFAULT_LOG_PATH), logger.path());
        assert_eq!(Level::Error, logger.level());

        info!(logger, "ignored").unwrap();
        error!(logger, "boom").unwrap();
    }

    let string = fs::read_to_string(DEFAULT_LOG_PATH).unwrap();

    let lines = string.lines().collect::<Vec<_>>();

    assert_eq!(2, lines.len());

    assert!(lines[0].starts_with("[INFO]\t"));
    assert!(lines[0].ends_with("\tinit Logger success logger file path ./logs/output.log"));

    assert!(lines[1].starts_with("[ERROR]\t"));
    assert!(lines[1].ends_with("\tboom"));

    assert!(!string.contains("ignored"));

    fs::remove_dir_all(log_folder).unwrap();
}

#[test]
fn filter_by_level() {
    let test_folder = create_test_folder();

    let test_log_path = test_folder.join(LOG_FILE_NAME);

    let console = Console::default();
    let terminator = RecordingTerminator::default();

    {
        let mut builder = quiet_builder(&test_log_path, &console);

        builder.set_level(Level::Warn).set_terminator(terminator.clone());

        let logger = builder.build();

        debug!(logger, "debug").unwrap();
        info!(logger, "info").unwrap();
        logger.debugf(format_args!("debug {}", 1)).unwrap();
        logger.infof(format_args!("info {}", 2)).unwrap();

        assert!(!test_log_path.exists());
        assert!(console.contents().is_empty());

        warn!(logger, "warn").unwrap();
        error!(logger, "error").unwrap();
        log_panic!(logger, "panic").unwrap();
        fatal!(logger, "fatal").unwrap();
    }

    let expected = ["[WARN]", "[ERROR]", "[PANIC]", "[FATAL]"];

    for string in [fs::read_to_string(&test_log_path).unwrap(), console.contents()].iter() {
        let lines = string.lines().collect::<Vec<_>>();

        assert_eq!(expected.len(), lines.len());

        for (line, level) in lines.iter().zip(expected.iter()) {
            assert!(line.starts_with(level));
        }
    }

    assert_eq!(
        vec![Abort::Unrecoverable(String::from("panic")), Abort::Terminate(FATAL_EXIT_CODE)],
        *terminator.0.lock().unwrap()
    );

    fs::remove_dir_all(test_folder).unwrap();
}

#[test]
fn terminate_below_threshold() {
    let test_folder = create_test_folder();

    let test_log_path = test_folder.join(LOG_FILE_NAME);

    let console = Console::default();
    let terminator = RecordingTerminator::default();

    {
        let mut builder = quiet_builder(&test_log_path, &console);

        builder.set_level(Level::Fatal).set_terminator(terminator.clone());

        let logger = builder.build();

        log_panic!(logger, "must not continue").unwrap();
        logger.panicf(format_args!("still {}", "fatal")).unwrap();

        assert!(!test_log_path.exists());

        fatalf!(logger, "exit {}", FATAL_EXIT_CODE).unwrap();
    }

    assert_eq!(
        vec![
            Abort::Unrecoverable(String::from("must not continue")),
            Abort::Unrecoverable(String::from("still fatal")),
            Abort::Terminate(FATAL_EXIT_CODE),
        ],
        *terminator.0.lock().unwrap()
    );

    let string = fs::read_to_string(&test_log_path).unwrap();

    assert_eq!(1, string.lines().count());
    assert!(string.starts_with("[FATAL]\t"));
    assert!(string.ends_with("\texit 1\n"));

    fs::remove_dir_all(test_folder).unwrap();
}

#[test]
fn stacktrace_on_following_lines() {
    let test_folder = create_test_folder();

    let test_log_path = test_folder.join(LOG_FILE_NAME);

    let console = Console::default();

    {
        let mut builder = quiet_builder(&test_log_path, &console);

        builder.set_stacktrace_level(Some(Level::Error));

        let logger = builder.build();

        warn!(logger, "no stack").unwrap();
        error!(logger, "with stack").unwrap();
    }

    let string = fs::read_to_string(&test_log_path).unwrap();

    let lines = string.lines().collect::<Vec<_>>();

    assert!(lines.len() > 3);

    assert!(lines[0].starts_with("[WARN]\t"));
    assert!(lines[0].ends_with("\tno stack"));
    assert!(lines[1].starts_with("[ERROR]\t"));
    assert!(lines[1].ends_with("\twith stack"));

    fs::remove_dir_all(test_folder).unwrap();
}

#[test]
fn templated_message() {
    let test_folder = create_test_folder();

    let test_log_path = test_folder.join(LOG_FILE_NAME);

    let console = Console::default();

    {
        let logger = quiet_builder(&test_log_path, &console).build();

        infof!(logger, "hello {}", 42).unwrap();
    }

    assert!(console.contents().contains("hello 42"));
    assert!(fs::read_to_string(&test_log_path).unwrap().contains("hello 42"));

    fs::remove_dir_all(test_folder).unwrap();
}

#[test]
fn plain_message() {
    let test_folder = create_test_folder();

    let test_log_path = test_folder.join(LOG_FILE_NAME);

    let console = Console::default();

    {
        let logger = quiet_builder(&test_log_path, &console).build();

        info!(logger, "a", 1, 2, "b", true).unwrap();
        info!(logger, 1.5, -3, Value::error(&io::Error::new(io::ErrorKind::Other, "oops")))
            .unwrap();
        logger.warn(&[Value::from("x = "), Value::debug(&Some(1))]).unwrap();
    }

    let string = fs::read_to_string(&test_log_path).unwrap();

    let lines = string.lines().collect::<Vec<_>>();

    assert!(lines[0].ends_with("\ta1 2btrue"));
    assert!(lines[1].ends_with("\t1.5 -3 oops"));
    assert!(lines[2].ends_with("\tx = Some(1)"));

    fs::remove_dir_all(test_folder).unwrap();
}

#[test]
fn console_layout() {
    let test_folder = create_test_folder();

    let test_log_path = test_folder.join(LOG_FILE_NAME);

    let console = Console::default();

    let line_number = {
        let logger = quiet_builder(&test_log_path, &console).build();

        errorf!(logger, "layout {}", "check").unwrap();

        line!() - 2
    };

    let string = console.contents();

    assert!(string.ends_with('\n'));

    let fields = string.trim_end().split('\t').collect::<Vec<_>>();

    assert_eq!(4, fields.len());

    assert_eq!("[ERROR]", fields[0]);
    assert!(Regex::new(r"^\d{4}-\d{2}-\d{2} \d{2}:\d{2}:\d{2}$").unwrap().is_match(fields[1]));
    assert_eq!(format!("logger.rs:{}", line_number), fields[2]);
    assert_eq!("layout check", fields[3]);

    assert_eq!(string, fs::read_to_string(&test_log_path).unwrap());

    fs::remove_dir_all(test_folder).unwrap();
}

#[test]
fn named_json_records() {
    let test_folder = create_test_folder();

    let test_log_path = test_folder.join(LOG_FILE_NAME);

    let console = Console::default();

    {
        let mut builder = quiet_builder(&test_log_path, &console);

        builder.set_encoding(Encoding::Json).set_name("app");

        let logger = builder.build();

        warn!(logger, "say \"hi\"").unwrap();
    }

    let string = fs::read_to_string(&test_log_path).unwrap();

    let record: serde_json::Value = serde_json::from_str(string.trim_end()).unwrap();

    assert_eq!("[WARN]", record["level"]);
    assert_eq!("app", record["logger"]);
    assert_eq!("say \"hi\"", record["message"]);
    assert!(record["time"].is_string());
    assert!(record["lineNum"].as_str().unwrap().starts_with("logger.rs:"));

    fs::remove_dir_all(test_folder).unwrap();
}

#[test]
fn announce_regardless_of_level() {
    let test_folder = create_test_folder();

    let test_log_path = test_folder.join(LOG_FILE_NAME);

    let console = Console::default();

    {
        let mut builder = Logger::builder(&test_log_path);

        builder.set_console(console.clone()).set_level(Level::Error);

        let logger = builder.build();

        info!(logger, "filtered").unwrap();
    }

    let string = fs::read_to_string(&test_log_path).unwrap();

    assert_eq!(1, string.lines().count());
    assert!(string.starts_with("[INFO]\t"));
    assert!(string.contains("init Logger success logger file path "));
    assert_eq!(string, console.contents());

    fs::remove_dir_all(test_folder).unwrap();
}

#[test]
fn concurrent_records() {
    const THREADS: usize = 128;

    let test_folder = create_test_folder();

    let test_log_path = test_folder.join(LOG_FILE_NAME);

    let console = Console::default();

    {
        let logger = Arc::new(quiet_builder(&test_log_path, &console).build());

        let handles = (0..THREADS)
            .map(|i| {
                let logger = logger.clone();

                thread::spawn(move || {
                    infof!(logger, "record {} {}", i, "x".repeat(i)).unwrap();
                })
            })
            .collect::<Vec<_>>();

        for handle in handles {
            handle.join().unwrap();
        }
    }

    for string in [fs::read_to_string(&test_log_path).unwrap(), console.contents()].iter() {
        let lines = string.lines().collect::<Vec<_>>();

        assert_eq!(THREADS, lines.len());

        let mut seen = HashSet::new();

        for line in lines {
            let fields = line.split('\t').collect::<Vec<_>>();

            assert_eq!(4, fields.len());
            assert_eq!("[INFO]", fields[0]);

            let mut words = fields[3].split(' ');

            assert_eq!(Some("record"), words.next());

            let i = words.next().unwrap().parse::<usize>().unwrap();

            assert_eq!(Some("x".repeat(i).as_str()), words.next());

            assert!(seen.insert(i));
        }
    }

    fs::remove_dir_all(test_folder).unwrap();
}

#[test]
fn console_failure_still_writes_file() {
    let test_folder = create_test_folder();

    let test_log_path = test_folder.join(LOG_FILE_NAME);

    {
        let mut builder = Logger::builder(&test_log_path);

        builder.set_console(BrokenConsole).set_announce(false);

        let logger = builder.build();

        let err = error!(logger, "still here").unwrap_err();

        assert_eq!(io::ErrorKind::BrokenPipe, err.console_error().unwrap().kind());
        assert!(err.file_error().is_none());
    }

    assert!(fs::read_to_string(&test_log_path).unwrap().ends_with("\tstill here\n"));

    fs::remove_dir_all(test_folder).unwrap();
}

#[test]
fn panic_after_write() {
    let test_folder = create_test_folder();

    let test_log_path = test_folder.join(LOG_FILE_NAME);

    let console = Console::default();

    let logger = quiet_builder(&test_log_path, &console).build();

    let result = panic::catch_unwind(AssertUnwindSafe(|| {
        let _ = log_panicf!(logger, "boom {}", 1);
    }));

    let payload = result.unwrap_err();

    assert_eq!(Some(&String::from("boom 1")), payload.downcast_ref::<String>());

    assert!(fs::read_to_string(&test_log_path).unwrap().starts_with("[PANIC]\t"));

    // the logger keeps working after the panic
    info!(logger, "after").unwrap();

    assert_eq!(2, console.contents().lines().count());

    drop(logger);

    fs::remove_dir_all(test_folder).unwrap();
}

#[test]
fn rotate_through_logger() {
    let test_folder = create_test_folder();

    let test_log_path = test_folder.join(LOG_FILE_NAME);

    let console = Console::default();

    {
        let mut policy = RotationPolicy::new(&test_log_path);

        policy.set_max_size(64).set_max_backups(2);

        let mut builder = quiet_builder(&test_log_path, &console);

        builder.set_policy(policy);

        let logger = builder.build();

        for i in 0..5 {
            infof!(logger, "rotation {}", i).unwrap();
        }

        assert_eq!(2, logger.backups().len());

        logger.sync().unwrap();
    }

    assert_eq!(3, test_folder.read_dir().unwrap().count());

    let string = fs::read_to_string(&test_log_path).unwrap();

    assert_eq!(1, string.lines().count());
    assert!(string.ends_with("\trotation 4\n"));

    assert_eq!(5, console.contents().lines().count());

    fs::remove_dir_all(test_folder).unwrap();
}

#[test]
fn report_maintenance_errors() {
    let ext = match COMPRESSED_EXTENSION {
        Some(ext) => ext,
        None => return,
    };

    let test_folder = create_test_folder();

    let test_log_path = test_folder.join(LOG_FILE_NAME);

    let console = Console::default();

    let failures = Arc::new(Mutex::new(Vec::new()));

    {
        let mut policy = RotationPolicy::new(&test_log_path);

        policy.set_max_size(6).set_max_backups(1).set_compress(false);

        let collector = failures.clone();

        let mut builder = quiet_builder(&test_log_path, &console);

        builder.set_policy(policy).set_error_handler(Arc::new(move |err: &MaintenanceError| {
            collector.lock().unwrap().push(err.to_string());
        }));

        let logger = builder.build();

        info!(logger, "first").unwrap();
        info!(logger, "second").unwrap();

        let backups = logger.backups();

        assert_eq!(1, backups.len());

        // a directory cannot be removed as a file
        fs::create_dir(test_folder.join(format!("{}{}", backups[0], ext))).unwrap();

        info!(logger, "third").unwrap();

        assert_eq!(1, logger.backups().len());
        assert_ne!(backups, logger.backups());
    }

    let failures = failures.lock().unwrap();

    assert_eq!(1, failures.len());
    assert!(failures[0].starts_with("Cannot remove the rotated log file "));

    assert!(fs::read_to_string(&test_log_path).unwrap().ends_with("\tthird\n"));

    fs::remove_dir_all(test_folder).unwrap();
}
