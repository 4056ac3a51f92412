use std::path::{Path, PathBuf};

/// One megabyte in bytes.
pub const MEGABYTE: u64 = 1024 * 1024;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
/// When and how a `RotatingFile` rotates, prunes and compresses its backups.
pub struct RotationPolicy {
    path: PathBuf,
    max_size: u64,
    max_backups: usize,
    max_age: u32,
    compress: bool,
}

impl RotationPolicy {
    /// Create a new RotationPolicy which never rotates.
    pub fn new<P: AsRef<Path>>(path: P) -> RotationPolicy {
        RotationPolicy {
            path: path.as_ref().to_path_buf(),
            max_size: u64::MAX,
            max_backups: 0,
            max_age: 0,
            compress: false,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The size threshold of the active file in bytes.
    pub fn max_size(&self) -> u64 {
        self.max_size
    }

    /// How many backups are retained. `0` means unlimited.
    pub fn max_backups(&self) -> usize {
        self.max_backups
    }

    /// How many days a backup is retained. `0` means unlimited.
    pub fn max_age(&self) -> u32 {
        self.max_age
    }

    /// Whether to compress the rotated log files.
    pub fn compress(&self) -> bool {
        self.compress
    }

    pub fn set_max_size(&mut self, bytes: u64) -> &mut Self {
        self.max_size = bytes;
        self
    }

    pub fn set_max_size_mb(&mut self, megabytes: u64) -> &mut Self {
        self.max_size = megabytes.saturating_mul(MEGABYTE);
        self
    }

    pub fn set_max_backups(&mut self, count: usize) -> &mut Self {
        self.max_backups = count;
        self
    }

    pub fn set_max_age(&mut self, days: u32) -> &mut Self {
        self.max_age = days;
        self
    }

    /// Whether to compress the rotated log files.
    pub fn set_compress(&mut self, compress: bool) -> &mut Self {
        self.compress = compress;
        self
    }
}
