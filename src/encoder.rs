use std::fmt::{self, Debug, Formatter};
use std::panic::Location;
use std::path::Path;
use std::time::Duration;

use chrono::prelude::*;

use crate::Level;

pub const DEFAULT_LINE_ENDING: &str = "\n";

const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
/// The layout of an encoded record.
pub enum Encoding {
    /// Tab-separated values, one record per line.
    Console,
    /// One JSON object per line.
    Json,
}

impl Default for Encoding {
    #[inline]
    fn default() -> Self {
        Encoding::Console
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
/// The source location of a log call.
pub struct Caller {
    pub file: &'static str,
    pub line: u32,
}

impl From<&Location<'static>> for Caller {
    #[inline]
    fn from(location: &Location<'static>) -> Self {
        Caller {
            file: location.file(),
            line: location.line(),
        }
    }
}

#[derive(Debug, Clone)]
/// A record ready to be encoded.
pub struct Entry<'a> {
    pub level: Level,
    pub time: DateTime<Local>,
    pub name: Option<&'a str>,
    pub caller: Option<Caller>,
    pub message: &'a str,
    pub stack: Option<&'a str>,
}

/// `[ERROR]`
pub fn bracket_capital_level_encoder(level: Level) -> String {
    format!("[{}]", level.capital_str())
}

/// `2006-01-02 15:04:05`
pub fn second_time_encoder(time: &DateTime<Local>) -> String {
    time.format(TIME_FORMAT).to_string()
}

/// `1.5s`
pub fn seconds_duration_encoder(duration: Duration) -> String {
    format!("{:.1}s", duration.as_secs_f64())
}

/// `logger.rs:42`, only the last segment of the file path is kept.
pub fn short_caller_encoder(caller: &Caller) -> String {
    let file = Path::new(caller.file)
        .file_name()
        .map(|name| name.to_string_lossy())
        .unwrap_or_else(|| caller.file.into());

    format!("{}:{}", file, caller.line)
}

#[derive(Clone)]
/// Field names and rendering functions of encoded records. An empty key leaves the field out.
pub struct EncoderConfig {
    message_key: String,
    level_key: String,
    time_key: String,
    name_key: String,
    caller_key: String,
    stacktrace_key: String,
    line_ending: String,
    level_encoder: fn(Level) -> String,
    time_encoder: fn(&DateTime<Local>) -> String,
    duration_encoder: fn(Duration) -> String,
    caller_encoder: fn(&Caller) -> String,
}

impl Debug for EncoderConfig {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        f.debug_struct("EncoderConfig")
            .field("message_key", &self.message_key)
            .field("level_key", &self.level_key)
            .field("time_key", &self.time_key)
            .field("name_key", &self.name_key)
            .field("caller_key", &self.caller_key)
            .field("stacktrace_key", &self.stacktrace_key)
            .field("line_ending", &self.line_ending)
            .finish()
    }
}

impl Default for EncoderConfig {
    fn default() -> Self {
        EncoderConfig {
            message_key: String::from("message"),
            level_key: String::from("level"),
            time_key: String::from("time"),
            name_key: String::from("logger"),
            caller_key: String::from("lineNum"),
            stacktrace_key: String::from("stacktrace"),
            line_ending: String::from(DEFAULT_LINE_ENDING),
            level_encoder: bracket_capital_level_encoder,
            time_encoder: second_time_encoder,
            duration_encoder: seconds_duration_encoder,
            caller_encoder: short_caller_encoder,
        }
    }
}

impl EncoderConfig {
    #[inline]
    pub fn new() -> EncoderConfig {
        EncoderConfig::default()
    }

    pub fn message_key(&self) -> &str {
        &self.message_key
    }

    pub fn level_key(&self) -> &str {
        &self.level_key
    }

    pub fn time_key(&self) -> &str {
        &self.time_key
    }

    pub fn name_key(&self) -> &str {
        &self.name_key
    }

    pub fn caller_key(&self) -> &str {
        &self.caller_key
    }

    pub fn stacktrace_key(&self) -> &str {
        &self.stacktrace_key
    }

    pub fn line_ending(&self) -> &str {
        &self.line_ending
    }

    pub fn set_message_key<S: Into<String>>(&mut self, key: S) -> &mut Self {
        self.message_key = key.into();
        self
    }

    pub fn set_level_key<S: Into<String>>(&mut self, key: S) -> &mut Self {
        self.level_key = key.into();
        self
    }

    pub fn set_time_key<S: Into<String>>(&mut self, key: S) -> &mut Self {
        self.time_key = key.into();
        self
    }

    pub fn set_name_key<S: Into<String>>(&mut self, key: S) -> &mut Self {
        self.name_key = key.into();
        self
    }

    pub fn set_caller_key<S: Into<String>>(&mut self, key: S) -> &mut Self {
        self.caller_key = key.into();
        self
    }

    pub fn set_stacktrace_key<S: Into<String>>(&mut self, key: S) -> &mut Self {
        self.stacktrace_key = key.into();
        self
    }

    pub fn set_line_ending<S: Into<String>>(&mut self, line_ending: S) -> &mut Self {
        self.line_ending = line_ending.into();
        self
    }

    pub fn set_level_encoder(&mut self, encoder: fn(Level) -> String) -> &mut Self {
        self.level_encoder = encoder;
        self
    }

    pub fn set_time_encoder(&mut self, encoder: fn(&DateTime<Local>) -> String) -> &mut Self {
        self.time_encoder = encoder;
        self
    }

    pub fn set_duration_encoder(&mut self, encoder: fn(Duration) -> String) -> &mut Self {
        self.duration_encoder = encoder;
        self
    }

    pub fn set_caller_encoder(&mut self, encoder: fn(&Caller) -> String) -> &mut Self {
        self.caller_encoder = encoder;
        self
    }

    #[inline]
    pub fn encode_level(&self, level: Level) -> String {
        (self.level_encoder)(level)
    }

    #[inline]
    pub fn encode_time(&self, time: &DateTime<Local>) -> String {
        (self.time_encoder)(time)
    }

    #[inline]
    pub fn encode_duration(&self, duration: Duration) -> String {
        (self.duration_encoder)(duration)
    }

    #[inline]
    pub fn encode_caller(&self, caller: &Caller) -> String {
        (self.caller_encoder)(caller)
    }

    /// Encode a record, including the line ending.
    pub fn encode(&self, encoding: Encoding, entry: &Entry) -> String {
        match encoding {
            Encoding::Console => self.encode_console(entry),
            Encoding::Json => self.encode_json(entry),
        }
    }

    fn fields(&self, entry: &Entry) -> Vec<(&str, String)> {
        let mut fields = Vec::with_capacity(5);

        if !self.level_key.is_empty() {
            fields.push((self.level_key.as_str(), self.encode_level(entry.level)));
        }

        if !self.time_key.is_empty() {
            fields.push((self.time_key.as_str(), self.encode_time(&entry.time)));
        }

        if let Some(name) = entry.name {
            if !self.name_key.is_empty() && !name.is_empty() {
                fields.push((self.name_key.as_str(), name.to_string()));
            }
        }

        if let Some(caller) = &entry.caller {
            if !self.caller_key.is_empty() {
                fields.push((self.caller_key.as_str(), self.encode_caller(caller)));
            }
        }

        if !self.message_key.is_empty() {
            fields.push((self.message_key.as_str(), entry.message.to_string()));
        }

        fields
    }

    fn encode_console(&self, entry: &Entry) -> String {
        let mut line =
            self.fields(entry).into_iter().map(|(_, value)| value).collect::<Vec<_>>().join("\t");

        if let Some(stack) = entry.stack {
            if !self.stacktrace_key.is_empty() {
                line.push('\n');
                line.push_str(stack);
            }
        }

        line.push_str(&self.line_ending);

        line
    }

    fn encode_json(&self, entry: &Entry) -> String {
        let mut fields = self.fields(entry);

        if let Some(stack) = entry.stack {
            if !self.stacktrace_key.is_empty() {
                fields.push((self.stacktrace_key.as_str(), stack.to_string()));
            }
        }

        let mut line = String::from("{");

        for (i, (key, value)) in fields.iter().enumerate() {
            if i > 0 {
                line.push(',');
            }

            line.push_str(&serde_json::Value::from(*key).to_string());
            line.push(':');
            line.push_str(&serde_json::Value::from(value.as_str()).to_string());
        }

        line.push('}');
        line.push_str(&self.line_ending);

        line
    }
}
