use std::error::Error;
use std::fmt::{self, Debug, Display, Formatter};
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use chrono::prelude::*;
use path_absolutize::*;
use regex::Regex;

use crate::compress::{compress_file, COMPRESSED_EXTENSION};
use crate::RotationPolicy;

const FILE_WAIT_MILLI_SECONDS: u64 = 30;
const ROTATED_TIME_FORMAT: &str = "%Y-%m-%d-%H-%M-%S";
// -%Y-%m-%d-%H-%M-%S-%3f
const ROTATED_TIME_PATTERN: &str = r"-\d{4}-\d{2}-\d{2}-\d{2}-\d{2}-\d{2}-\d{3}";
const ROTATED_TIME_LEN: usize = 19;

#[derive(Debug)]
/// A failure while pruning or compressing backups. It never fails the write that triggered it.
pub enum MaintenanceError {
    /// A backup could not be deleted.
    Prune { path: PathBuf, source: io::Error },
    /// A backup could not be compressed.
    Compress { path: PathBuf, source: io::Error },
}

impl Display for MaintenanceError {
    #[inline]
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self {
            MaintenanceError::Prune {
                path,
                source,
            } => {
                f.write_fmt(format_args!(
                    "Cannot remove the rotated log file `{}`: {}",
                    path.to_string_lossy(),
                    source
                ))
            }
            MaintenanceError::Compress {
                path,
                source,
            } => {
                f.write_fmt(format_args!(
                    "Cannot compress the rotated log file `{}`: {}",
                    path.to_string_lossy(),
                    source
                ))
            }
        }
    }
}

impl Error for MaintenanceError {
    #[inline]
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            MaintenanceError::Prune {
                source, ..
            }
            | MaintenanceError::Compress {
                source, ..
            } => Some(source),
        }
    }
}

/// Receives the maintenance errors of a `RotatingFile`.
pub type ErrorHandler = Arc<dyn Fn(&MaintenanceError) + Send + Sync>;

fn print_err(err: &MaintenanceError) {
    eprintln!("{}", err);
}

#[derive(Debug)]
struct Target {
    file_path: PathBuf,
    folder_path: PathBuf,
    file_name: String,
    file_name_point_index: usize,
}

impl Target {
    fn resolve(path: &Path) -> io::Result<Target> {
        let file_path = path.absolutize()?.into_owned();

        let file_name = match file_path.file_name() {
            Some(file_name) => file_name.to_string_lossy().into_owned(),
            None => {
                return Err(io::Error::new(
                    io::ErrorKind::InvalidInput,
                    format!("`{}` is not a file path.", file_path.to_string_lossy()),
                ));
            }
        };

        let folder_path = match file_path.parent() {
            Some(parent) => parent.to_path_buf(),
            None => {
                return Err(io::Error::new(
                    io::ErrorKind::NotFound,
                    format!("`{}`'s parent does not exist.", file_path.to_string_lossy()),
                ));
            }
        };

        let file_name_point_index = match file_name.rfind('.') {
            Some(index) if index > 0 => index,
            _ => file_name.len(),
        };

        Ok(Target {
            file_path,
            folder_path,
            file_name,
            file_name_point_index,
        })
    }

    #[inline]
    fn stem(&self) -> &str {
        &self.file_name[..self.file_name_point_index]
    }

    #[inline]
    fn extension(&self) -> &str {
        &self.file_name[self.file_name_point_index..]
    }

    fn rotated_log_file_name(&self, time: &DateTime<Utc>) -> String {
        format!(
            "{}-{}{}",
            self.stem(),
            time.format("%Y-%m-%d-%H-%M-%S-%3f"),
            self.extension()
        )
    }

    /// The UTC time embedded in the name of a rotated log file.
    fn rotated_time(&self, rotated_log_file_name: &str) -> Option<DateTime<Utc>> {
        let start = self.stem().len() + 1;

        let s = rotated_log_file_name.get(start..start + ROTATED_TIME_LEN)?;

        NaiveDateTime::parse_from_str(s, ROTATED_TIME_FORMAT)
            .ok()
            .map(|time| Utc.from_utc_datetime(&time))
    }

    /// Find the rotated log files already in the folder, oldest first. Compressed ones are listed by their uncompressed names.
    fn scan(&self) -> io::Result<Vec<String>> {
        let compressed_extension = COMPRESSED_EXTENSION.map(regex::escape).unwrap_or_default();

        let re = Regex::new(&format!(
            "^{}{}{}(?:{})?$",
            regex::escape(self.stem()),
            ROTATED_TIME_PATTERN,
            regex::escape(self.extension()),
            compressed_extension
        ))
        .map_err(|err| io::Error::new(io::ErrorKind::InvalidInput, err.to_string()))?;

        let mut rotated_log_file_names = Vec::new();

        for entry in self.folder_path.read_dir()?.filter_map(|entry| entry.ok()) {
            let rotated_log_file_path = entry.path();

            if !rotated_log_file_path.is_file() {
                continue;
            }

            let rotated_log_file_name = entry.file_name().to_string_lossy().into_owned();

            if !re.is_match(&rotated_log_file_name) {
                continue;
            }

            let rotated_log_file_name = match COMPRESSED_EXTENSION {
                Some(ext) if rotated_log_file_name.ends_with(ext) => {
                    rotated_log_file_name[..rotated_log_file_name.len() - ext.len()].to_string()
                }
                _ => rotated_log_file_name,
            };

            rotated_log_file_names.push(rotated_log_file_name);
        }

        rotated_log_file_names.sort_unstable();
        rotated_log_file_names.dedup();

        Ok(rotated_log_file_names)
    }
}

/// A log file which rotates itself by size, keeps a bounded number of backups for a bounded number of days, and compresses the backups.
///
/// Nothing is touched on the filesystem until the first write.
pub struct RotatingFile {
    policy: RotationPolicy,
    target: Option<Target>,
    file: Option<File>,
    file_size: u64,
    rotated_log_file_names: Vec<String>,
    last_rotated_time: i64,
    error_handler: ErrorHandler,
    compressions: Vec<JoinHandle<()>>,
}

impl Debug for RotatingFile {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        f.debug_struct("RotatingFile")
            .field("policy", &self.policy)
            .field("file_size", &self.file_size)
            .field("rotated_log_file_names", &self.rotated_log_file_names)
            .finish()
    }
}

impl RotatingFile {
    pub fn new(policy: RotationPolicy) -> RotatingFile {
        RotatingFile {
            policy,
            target: None,
            file: None,
            file_size: 0,
            rotated_log_file_names: Vec::new(),
            last_rotated_time: 0,
            error_handler: Arc::new(print_err),
            compressions: Vec::new(),
        }
    }

    pub fn policy(&self) -> &RotationPolicy {
        &self.policy
    }

    /// Replace the default handler, which prints maintenance errors to stderr.
    pub fn set_error_handler(&mut self, error_handler: ErrorHandler) -> &mut Self {
        self.error_handler = error_handler;
        self
    }

    /// The size of the active file in bytes, as far as this instance knows.
    pub fn size(&self) -> u64 {
        self.file_size
    }

    /// The names of the retained backups, oldest first. Compressed backups are listed by their uncompressed names.
    pub fn backups(&self) -> &[String] {
        &self.rotated_log_file_names
    }

    /// Append bytes to the active file. If the file is rotated first, this method returns the path of the backup.
    pub fn write(&mut self, buf: &[u8]) -> io::Result<Option<PathBuf>> {
        let len = buf.len() as u64;

        if len == 0 {
            return Ok(None);
        }

        let mut file = match self.file.take() {
            Some(file) => file,
            None => self.open()?,
        };

        let mut new_file = None;

        if self.file_size > 0 && self.file_size.saturating_add(len) > self.policy.max_size() {
            let (file_r, rotated_log_file) = self.rotate_file(file)?;

            file = file_r;
            new_file = Some(rotated_log_file);
        }

        file.write_all(buf)?;

        self.file_size += len;

        self.file = Some(file);

        Ok(new_file)
    }

    /// Rotate right now, even if the active file is empty. This method returns the path of the backup.
    pub fn rotate(&mut self) -> io::Result<PathBuf> {
        let file = match self.file.take() {
            Some(file) => file,
            None => self.open()?,
        };

        let (file, rotated_log_file) = self.rotate_file(file)?;

        self.file = Some(file);

        Ok(rotated_log_file)
    }

    /// Flush and fsync the active file.
    pub fn sync(&mut self) -> io::Result<()> {
        match self.file.as_mut() {
            Some(file) => {
                file.flush()?;
                file.sync_all()
            }
            None => Ok(()),
        }
    }

    /// Close the active file. The next write opens it again.
    pub fn close(&mut self) -> io::Result<()> {
        match self.file.take() {
            Some(mut file) => file.flush(),
            None => Ok(()),
        }
    }

    /// Block until every running compression finishes.
    pub fn wait_for_compression(&mut self) {
        for handle in self.compressions.drain(..) {
            let _ = handle.join();
        }
    }

    fn open(&mut self) -> io::Result<File> {
        let first_open = self.target.is_none();

        if first_open {
            self.target = Some(Target::resolve(self.policy.path())?);
        }

        let target = match self.target.as_ref() {
            Some(target) => target,
            None => unreachable!(),
        };

        fs::create_dir_all(&target.folder_path)?;

        let file = OpenOptions::new().create(true).append(true).open(&target.file_path)?;

        let metadata = file.metadata()?;

        if metadata.is_dir() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!(
                    "A log file cannot be a directory. The path of that file is `{}`.",
                    target.file_path.to_string_lossy()
                ),
            ));
        }

        self.file_size = metadata.len();

        if first_open {
            self.rotated_log_file_names = target.scan()?;
        }

        Ok(file)
    }

    fn next_rotated_time(&mut self) -> DateTime<Utc> {
        let mut utc: DateTime<Utc> = Utc::now();
        let mut millisecond = utc.timestamp_millis();

        while self.last_rotated_time == millisecond {
            // Especially for Windows, because its time precision is about 15ms.
            thread::sleep(Duration::from_millis(FILE_WAIT_MILLI_SECONDS));
            utc = Utc::now();
            millisecond = utc.timestamp_millis();
        }

        self.last_rotated_time = millisecond;

        utc
    }

    fn rotate_file(&mut self, mut file: File) -> io::Result<(File, PathBuf)> {
        let utc = self.next_rotated_time();

        file.flush()?;
        file.sync_all()?;

        drop(file);

        let target = match self.target.as_ref() {
            Some(target) => target,
            None => unreachable!(),
        };

        let rotated_log_file_name = target.rotated_log_file_name(&utc);
        let rotated_log_file = target.folder_path.join(&rotated_log_file_name);

        fs::rename(&target.file_path, &rotated_log_file)?;

        // the backup exists from here on, even if the active file cannot be reopened
        self.rotated_log_file_names.push(rotated_log_file_name);

        let file = OpenOptions::new().create(true).append(true).open(&target.file_path)?;

        self.file_size = 0;

        self.prune(&utc);

        let rotated_log_file = match COMPRESSED_EXTENSION {
            Some(ext) if self.policy.compress() => self.spawn_compression(rotated_log_file, ext),
            _ => rotated_log_file,
        };

        Ok((file, rotated_log_file))
    }

    /// Delete backups older than the maximum age, then the oldest ones beyond the maximum count.
    fn prune(&mut self, now: &DateTime<Utc>) {
        let target = match self.target.as_ref() {
            Some(target) => target,
            None => return,
        };

        let mut removed = Vec::new();

        let max_age = self.policy.max_age();

        if max_age > 0 {
            let cutoff = *now - chrono::Duration::days(i64::from(max_age));

            let (expired, retained): (Vec<String>, Vec<String>) =
                self.rotated_log_file_names.drain(..).partition(|name| {
                    match target.rotated_time(name) {
                        Some(time) => time < cutoff,
                        None => false,
                    }
                });

            self.rotated_log_file_names = retained;
            removed.extend(expired);
        }

        let max_backups = self.policy.max_backups();

        if max_backups > 0 && self.rotated_log_file_names.len() > max_backups {
            let excess = self.rotated_log_file_names.len() - max_backups;

            removed.extend(self.rotated_log_file_names.drain(..excess));
        }

        for rotated_log_file_name in removed {
            let rotated_log_file = target.folder_path.join(&rotated_log_file_name);

            remove_if_exists(&rotated_log_file, &self.error_handler);

            if let Some(ext) = COMPRESSED_EXTENSION {
                let rotated_log_file_compressed =
                    target.folder_path.join(format!("{}{}", rotated_log_file_name, ext));

                remove_if_exists(&rotated_log_file_compressed, &self.error_handler);
            }
        }
    }

    fn spawn_compression(&mut self, rotated_log_file: PathBuf, ext: &str) -> PathBuf {
        let rotated_log_file_compressed = {
            let mut s = rotated_log_file.clone().into_os_string();
            s.push(ext);
            PathBuf::from(s)
        };

        self.compressions.retain(|handle| !handle.is_finished());

        let error_handler = self.error_handler.clone();
        let dst = rotated_log_file_compressed.clone();

        self.compressions.push(thread::spawn(move || {
            match compress_file(&rotated_log_file, &dst) {
                Ok(()) => {
                    match fs::remove_file(&rotated_log_file) {
                        Ok(()) => (),
                        Err(ref err) if err.kind() == io::ErrorKind::NotFound => {
                            // The rotated log file is deleted because of the count limit
                            let _ = fs::remove_file(&dst);
                        }
                        Err(err) => {
                            error_handler(&MaintenanceError::Prune {
                                path: rotated_log_file,
                                source: err,
                            })
                        }
                    }
                }
                Err(ref err) if err.kind() == io::ErrorKind::NotFound => {
                    // The rotated log file is deleted because of the count limit
                    let _ = fs::remove_file(&dst);
                }
                Err(err) => {
                    let _ = fs::remove_file(&dst);

                    error_handler(&MaintenanceError::Compress {
                        path: rotated_log_file,
                        source: err,
                    });
                }
            }
        }));

        rotated_log_file_compressed
    }
}

fn remove_if_exists(path: &Path, error_handler: &ErrorHandler) {
    match fs::remove_file(path) {
        Ok(()) => (),
        Err(ref err) if err.kind() == io::ErrorKind::NotFound => (),
        Err(err) => {
            error_handler(&MaintenanceError::Prune {
                path: path.to_path_buf(),
                source: err,
            })
        }
    }
}

impl Write for RotatingFile {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        RotatingFile::write(self, buf)?;

        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        match self.file.as_mut() {
            Some(file) => file.flush(),
            None => Ok(()),
        }
    }
}
