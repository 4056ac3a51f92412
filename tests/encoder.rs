extern crate fanout_logger_lib;

use std::io;
use std::time::Duration;

use chrono::prelude::*;

use fanout_logger_lib::{
    bracket_capital_level_encoder, join_values, seconds_duration_encoder, short_caller_encoder,
    Caller, EncoderConfig, Encoding, Entry, Level, Value,
};

fn entry<'a>(level: Level, message: &'a str) -> Entry<'a> {
    Entry {
        level,
        time: Local.with_ymd_and_hms(2024, 5, 1, 12, 30, 45).unwrap(),
        name: None,
        caller: Some(Caller {
            file: "src/deep/dir/worker.rs",
            line: 7,
        }),
        message,
        stack: None,
    }
}

#[test]
fn default_keys() {
    let encoder = EncoderConfig::default();

    assert_eq!("message", encoder.message_key());
    assert_eq!("level", encoder.level_key());
    assert_eq!("time", encoder.time_key());
    assert_eq!("logger", encoder.name_key());
    assert_eq!("lineNum", encoder.caller_key());
    assert_eq!("stacktrace", encoder.stacktrace_key());
    assert_eq!("\n", encoder.line_ending());
}

#[test]
fn render_fields() {
    assert_eq!("[ERROR]", bracket_capital_level_encoder(Level::Error));
    assert_eq!("[DEBUG]", bracket_capital_level_encoder(Level::Debug));
    assert_eq!("[FATAL]", bracket_capital_level_encoder(Level::Fatal));

    assert_eq!("1.5s", seconds_duration_encoder(Duration::from_millis(1500)));
    assert_eq!("0.0s", seconds_duration_encoder(Duration::from_millis(20)));

    assert_eq!(
        "worker.rs:7",
        short_caller_encoder(&Caller {
            file: "src/deep/dir/worker.rs",
            line: 7,
        })
    );
    assert_eq!(
        "main.rs:12",
        short_caller_encoder(&Caller {
            file: "main.rs",
            line: 12,
        })
    );

    let encoder = EncoderConfig::default();

    assert_eq!(
        "2024-05-01 12:30:45",
        encoder.encode_time(&Local.with_ymd_and_hms(2024, 5, 1, 12, 30, 45).unwrap())
    );
}

#[test]
fn console_line() {
    let encoder = EncoderConfig::default();

    assert_eq!(
        "[WARN]\t2024-05-01 12:30:45\tworker.rs:7\tdisk is almost full\n",
        encoder.encode(Encoding::Console, &entry(Level::Warn, "disk is almost full"))
    );

    let mut named = entry(Level::Info, "started");

    named.name = Some("worker");
    named.caller = None;

    assert_eq!(
        "[INFO]\t2024-05-01 12:30:45\tworker\tstarted\n",
        encoder.encode(Encoding::Console, &named)
    );
}

#[test]
fn omit_empty_keys() {
    let mut encoder = EncoderConfig::default();

    encoder.set_time_key("").set_caller_key("").set_line_ending("\r\n");

    assert_eq!(
        "[ERROR]\tfailed\r\n",
        encoder.encode(Encoding::Console, &entry(Level::Error, "failed"))
    );
}

#[test]
fn json_line() {
    let mut encoder = EncoderConfig::default();

    encoder.set_message_key("msg");

    let line = encoder.encode(Encoding::Json, &entry(Level::Error, "tab\there \"quoted\""));

    assert_eq!(
        "{\"level\":\"[ERROR]\",\"time\":\"2024-05-01 12:30:45\",\"lineNum\":\"worker.rs:7\",\"msg\":\"tab\\there \\\"quoted\\\"\"}\n",
        line
    );
}

#[test]
fn stack_on_following_lines() {
    let encoder = EncoderConfig::default();

    let mut e = entry(Level::Panic, "crashed");

    e.stack = Some("   0: main");

    assert_eq!(
        "[PANIC]\t2024-05-01 12:30:45\tworker.rs:7\tcrashed\n   0: main\n",
        encoder.encode(Encoding::Console, &e)
    );
}

#[test]
fn join_plain_values() {
    let encoder = EncoderConfig::default();

    assert_eq!("", join_values(&[], &encoder));

    assert_eq!(
        "a1 2btrue",
        join_values(
            &[
                Value::from("a"),
                Value::from(1),
                Value::from(2u8),
                Value::from("b"),
                Value::from(true),
            ],
            &encoder
        )
    );

    assert_eq!(
        "took 2.5s",
        join_values(&[Value::from("took "), Value::from(Duration::from_millis(2500))], &encoder)
    );

    assert_eq!(
        "missing [1, 2]",
        join_values(
            &[
                Value::error(&io::Error::new(io::ErrorKind::NotFound, "missing")),
                Value::debug(&vec![1, 2]),
            ],
            &encoder
        )
    );
}
