use std::error::Error;
use std::fmt::{self, Debug, Display, Formatter};
use std::io::{self, Write};
use std::path::PathBuf;

use crate::RotatingFile;

#[derive(Debug)]
/// A record could not be written to every sink.
pub enum LogError {
    /// The console write failed. The file write succeeded.
    Console(io::Error),
    /// The file write failed. The console write succeeded.
    File(io::Error),
    /// Both writes failed.
    Both { console: io::Error, file: io::Error },
}

impl LogError {
    fn from_results(console: io::Result<()>, file: io::Result<()>) -> Result<(), LogError> {
        match (console, file) {
            (Ok(()), Ok(())) => Ok(()),
            (Err(err), Ok(())) => Err(LogError::Console(err)),
            (Ok(()), Err(err)) => Err(LogError::File(err)),
            (Err(console), Err(file)) => {
                Err(LogError::Both {
                    console,
                    file,
                })
            }
        }
    }

    pub fn console_error(&self) -> Option<&io::Error> {
        match self {
            LogError::Console(err)
            | LogError::Both {
                console: err, ..
            } => Some(err),
            LogError::File(_) => None,
        }
    }

    pub fn file_error(&self) -> Option<&io::Error> {
        match self {
            LogError::File(err)
            | LogError::Both {
                file: err, ..
            } => Some(err),
            LogError::Console(_) => None,
        }
    }
}

impl Display for LogError {
    #[inline]
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self {
            LogError::Console(err) => {
                f.write_fmt(format_args!("Cannot write the log to the console: {}", err))
            }
            LogError::File(err) => {
                f.write_fmt(format_args!("Cannot write the log to the file: {}", err))
            }
            LogError::Both {
                console,
                file,
            } => {
                f.write_fmt(format_args!(
                    "Cannot write the log to the console: {}; nor to the file: {}",
                    console, file
                ))
            }
        }
    }
}

impl Error for LogError {
    #[inline]
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            LogError::Console(err) | LogError::File(err) => Some(err),
            LogError::Both {
                file, ..
            } => Some(file),
        }
    }
}

/// Writes every record to the console and to a `RotatingFile`.
pub(crate) struct FanoutWriter {
    console: Box<dyn Write + Send>,
    file: RotatingFile,
}

impl Debug for FanoutWriter {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        f.debug_struct("FanoutWriter").field("file", &self.file).finish()
    }
}

impl FanoutWriter {
    pub(crate) fn new(console: Box<dyn Write + Send>, file: RotatingFile) -> FanoutWriter {
        FanoutWriter {
            console,
            file,
        }
    }

    pub(crate) fn file(&self) -> &RotatingFile {
        &self.file
    }

    /// Write one whole record to both sinks. A failing sink does not stop the other one from being
    /// written. If the file is rotated, this method returns the path of the backup.
    pub(crate) fn write_record(&mut self, record: &[u8]) -> Result<Option<PathBuf>, LogError> {
        let console = self.console.write_all(record).and_then(|_| self.console.flush());

        let mut rotated_log_file = None;

        let file = self.file.write(record).map(|new_file| {
            rotated_log_file = new_file;
        });

        LogError::from_results(console, file).map(|_| rotated_log_file)
    }

    /// Flush the console, and flush then fsync the file.
    pub(crate) fn sync(&mut self) -> Result<(), LogError> {
        let console = self.console.flush();
        let file = self.file.sync();

        LogError::from_results(console, file)
    }
}
