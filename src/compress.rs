use std::fs::File;
use std::io::{self, BufReader, BufWriter};
use std::path::Path;

#[cfg(feature = "gzip")]
use libflate::gzip::Encoder as GzipEncoder;

#[cfg(all(feature = "xz", not(feature = "gzip")))]
use xz2::write::XzEncoder;

const BUFFER_SIZE: usize = 4096 * 4;

/// The suffix appended to compressed backups, or `None` when no compression feature is enabled.
#[cfg(feature = "gzip")]
pub const COMPRESSED_EXTENSION: Option<&str> = Some(".gz");
#[cfg(all(feature = "xz", not(feature = "gzip")))]
pub const COMPRESSED_EXTENSION: Option<&str> = Some(".xz");
#[cfg(not(any(feature = "xz", feature = "gzip")))]
pub const COMPRESSED_EXTENSION: Option<&str> = None;

/// Compress `src` into `dst`. `src` is left untouched.
pub(crate) fn compress_file(src: &Path, dst: &Path) -> io::Result<()> {
    let mut reader = BufReader::with_capacity(BUFFER_SIZE, File::open(src)?);
    let writer = BufWriter::with_capacity(BUFFER_SIZE, File::create(dst)?);

    encode(&mut reader, writer)
}

#[cfg(feature = "gzip")]
fn encode(reader: &mut BufReader<File>, writer: BufWriter<File>) -> io::Result<()> {
    let mut encoder = GzipEncoder::new(writer)?;

    io::copy(reader, &mut encoder)?;

    let writer = encoder.finish().into_result()?;

    finish(writer)
}

#[cfg(all(feature = "xz", not(feature = "gzip")))]
fn encode(reader: &mut BufReader<File>, writer: BufWriter<File>) -> io::Result<()> {
    let mut encoder = XzEncoder::new(writer, 9);

    io::copy(reader, &mut encoder)?;

    let writer = encoder.finish()?;

    finish(writer)
}

#[cfg(not(any(feature = "xz", feature = "gzip")))]
fn encode(_reader: &mut BufReader<File>, _writer: BufWriter<File>) -> io::Result<()> {
    Err(io::Error::new(io::ErrorKind::Other, "No compression feature is enabled."))
}

#[cfg(any(feature = "xz", feature = "gzip"))]
fn finish(writer: BufWriter<File>) -> io::Result<()> {
    let file = writer.into_inner().map_err(|err| err.into_error())?;

    file.sync_all()
}
