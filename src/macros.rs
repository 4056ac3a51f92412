// The plain macros check the level before the values are converted. Panic and Fatal always reach
// the logger, which terminates even when they are filtered.

#[doc(hidden)]
#[macro_export]
macro_rules! __log_values {
    ($method:ident, $level:ident, $logger:expr $(, $value:expr)*) => {
        match &$logger {
            logger => {
                if $crate::Level::$level >= $crate::Level::Panic
                    || logger.enabled($crate::Level::$level)
                {
                    logger.$method(&[$($crate::Value::from($value)),*])
                } else {
                    ::core::result::Result::Ok(())
                }
            }
        }
    };
}

/// `debug!(logger, value, ...)`
#[macro_export]
macro_rules! debug {
    ($logger:expr $(, $value:expr)*) => {
        $crate::__log_values!(debug, Debug, $logger $(, $value)*)
    };
}

/// `info!(logger, value, ...)`
#[macro_export]
macro_rules! info {
    ($logger:expr $(, $value:expr)*) => {
        $crate::__log_values!(info, Info, $logger $(, $value)*)
    };
}

/// `warn!(logger, value, ...)`
#[macro_export]
macro_rules! warn {
    ($logger:expr $(, $value:expr)*) => {
        $crate::__log_values!(warn, Warn, $logger $(, $value)*)
    };
}

/// `error!(logger, value, ...)`
#[macro_export]
macro_rules! error {
    ($logger:expr $(, $value:expr)*) => {
        $crate::__log_values!(error, Error, $logger $(, $value)*)
    };
}

/// `log_panic!(logger, value, ...)`, named so because `panic!` belongs to std.
#[macro_export]
macro_rules! log_panic {
    ($logger:expr $(, $value:expr)*) => {
        $crate::__log_values!(panic, Panic, $logger $(, $value)*)
    };
}

/// `fatal!(logger, value, ...)`
#[macro_export]
macro_rules! fatal {
    ($logger:expr $(, $value:expr)*) => {
        $crate::__log_values!(fatal, Fatal, $logger $(, $value)*)
    };
}

/// `debugf!(logger, "template {}", value, ...)`
#[macro_export]
macro_rules! debugf {
    ($logger:expr, $($arg:tt)+) => {
        $logger.debugf(format_args!($($arg)+))
    };
}

/// `infof!(logger, "template {}", value, ...)`
#[macro_export]
macro_rules! infof {
    ($logger:expr, $($arg:tt)+) => {
        $logger.infof(format_args!($($arg)+))
    };
}

/// `warnf!(logger, "template {}", value, ...)`
#[macro_export]
macro_rules! warnf {
    ($logger:expr, $($arg:tt)+) => {
        $logger.warnf(format_args!($($arg)+))
    };
}

/// `errorf!(logger, "template {}", value, ...)`
#[macro_export]
macro_rules! errorf {
    ($logger:expr, $($arg:tt)+) => {
        $logger.errorf(format_args!($($arg)+))
    };
}

/// `log_panicf!(logger, "template {}", value, ...)`
#[macro_export]
macro_rules! log_panicf {
    ($logger:expr, $($arg:tt)+) => {
        $logger.panicf(format_args!($($arg)+))
    };
}

/// `fatalf!(logger, "template {}", value, ...)`
#[macro_export]
macro_rules! fatalf {
    ($logger:expr, $($arg:tt)+) => {
        $logger.fatalf(format_args!($($arg)+))
    };
}
