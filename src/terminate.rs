use std::process;

/// The exit status used after a fatal record.
pub const FATAL_EXIT_CODE: i32 = 1;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
/// What has to happen after a `Panic` or `Fatal` record is written.
pub enum Abort {
    /// Unwind the current thread with this message.
    Unrecoverable(String),
    /// End the process with this exit status.
    Terminate(i32),
}

/// The process-level harness which carries out an `Abort`.
///
/// `ProcessTerminator` is the only implementation a program needs. Tests can record aborts instead.
pub trait Terminator: Send + Sync {
    fn abort(&self, abort: Abort);
}

#[derive(Debug, Clone, Copy, Default)]
/// Panics for `Abort::Unrecoverable`, exits the process for `Abort::Terminate`.
pub struct ProcessTerminator;

impl Terminator for ProcessTerminator {
    fn abort(&self, abort: Abort) {
        match abort {
            Abort::Unrecoverable(message) => panic!("{}", message),
            Abort::Terminate(code) => process::exit(code),
        }
    }
}
