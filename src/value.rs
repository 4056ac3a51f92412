use std::borrow::Cow;
use std::error::Error;
use std::fmt::{Debug, Display, Write as FmtWrite};
use std::time::Duration;

use crate::EncoderConfig;

#[derive(Debug, Clone, PartialEq)]
/// One argument of a plain (non-templated) log call.
pub enum Value {
    Str(String),
    Int(i64),
    UInt(u64),
    Float(f64),
    Bool(bool),
    /// Rendered through the encoder's duration function.
    Duration(Duration),
    /// The `Display` text of an error.
    Error(String),
    /// Any other value, already rendered through `Display` or `Debug`.
    Other(String),
}

impl Value {
    /// Wrap an error.
    #[inline]
    pub fn error<E: Error + ?Sized>(err: &E) -> Value {
        Value::Error(err.to_string())
    }

    /// Wrap any value through its `Display` implementation.
    #[inline]
    pub fn display<T: Display + ?Sized>(value: &T) -> Value {
        Value::Other(value.to_string())
    }

    /// Wrap any value through its `Debug` implementation.
    #[inline]
    pub fn debug<T: Debug + ?Sized>(value: &T) -> Value {
        Value::Other(format!("{:?}", value))
    }

    #[inline]
    pub fn is_str(&self) -> bool {
        matches!(self, Value::Str(_))
    }

    fn render(&self, encoder: &EncoderConfig, out: &mut String) {
        match self {
            Value::Str(s) | Value::Error(s) | Value::Other(s) => out.push_str(s),
            Value::Int(n) => {
                let _ = write!(out, "{}", n);
            }
            Value::UInt(n) => {
                let _ = write!(out, "{}", n);
            }
            Value::Float(n) => {
                let _ = write!(out, "{}", n);
            }
            Value::Bool(b) => {
                let _ = write!(out, "{}", b);
            }
            Value::Duration(d) => out.push_str(&encoder.encode_duration(*d)),
        }
    }
}

/// Join values into one message. A space is inserted between two adjacent values when neither of them is a string.
pub fn join_values(values: &[Value], encoder: &EncoderConfig) -> String {
    let mut message = String::new();

    for (i, value) in values.iter().enumerate() {
        if i > 0 && !value.is_str() && !values[i - 1].is_str() {
            message.push(' ');
        }

        value.render(encoder, &mut message);
    }

    message
}

impl From<&str> for Value {
    #[inline]
    fn from(s: &str) -> Self {
        Value::Str(s.to_string())
    }
}

impl From<String> for Value {
    #[inline]
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

impl From<&String> for Value {
    #[inline]
    fn from(s: &String) -> Self {
        Value::Str(s.clone())
    }
}

impl<'a> From<Cow<'a, str>> for Value {
    #[inline]
    fn from(s: Cow<'a, str>) -> Self {
        Value::Str(s.into_owned())
    }
}

impl From<char> for Value {
    #[inline]
    fn from(c: char) -> Self {
        Value::Str(c.to_string())
    }
}

impl From<bool> for Value {
    #[inline]
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<Duration> for Value {
    #[inline]
    fn from(d: Duration) -> Self {
        Value::Duration(d)
    }
}

macro_rules! impl_from_number {
    ($variant:ident, $target:ty, $($t:ty),*) => {
        $(
            impl From<$t> for Value {
                #[inline]
                fn from(n: $t) -> Self {
                    Value::$variant(n as $target)
                }
            }
        )*
    };
}

impl_from_number!(Int, i64, i8, i16, i32, i64, isize);
impl_from_number!(UInt, u64, u8, u16, u32, u64, usize);
impl_from_number!(Float, f64, f32, f64);

impl From<&Value> for Value {
    #[inline]
    fn from(v: &Value) -> Self {
        v.clone()
    }
}
