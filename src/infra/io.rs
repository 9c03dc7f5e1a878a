// ============================================================
// Layer 6 — File Readers and Writers
// ============================================================
// Every input of the pipeline may be plain text or gzipped.
// The decision is made from the file name alone: anything
// ending in "gz" is read through a gzip decoder.

use anyhow::{Context, Result};
use flate2::{read::GzDecoder, write::GzEncoder, Compression};
use std::{
    fs::File,
    io::{BufRead, BufReader, BufWriter, Write},
    path::Path,
};

/// Large embedding files are read line by line; a big buffer
/// keeps the number of read syscalls down.
const READ_BUFFER: usize = 8 * 1024 * 1024;

pub fn is_gzip(path: &Path) -> bool {
    path.to_string_lossy().ends_with("gz")
}

/// Open `path` for buffered reading, decompressing if needed.
pub fn open_reader(path: &Path) -> Result<Box<dyn BufRead>> {
    let file = File::open(path)
        .with_context(|| format!("Cannot open '{}'", path.display()))?;

    if is_gzip(path) {
        Ok(Box::new(BufReader::with_capacity(READ_BUFFER, GzDecoder::new(file))))
    } else {
        Ok(Box::new(BufReader::with_capacity(READ_BUFFER, file)))
    }
}

/// Create `path` for buffered writing, compressing if it ends in "gz".
pub fn create_writer(path: &Path) -> Result<Box<dyn Write>> {
    let file = File::create(path)
        .with_context(|| format!("Cannot create '{}'", path.display()))?;

    if is_gzip(path) {
        Ok(Box::new(BufWriter::new(GzEncoder::new(file, Compression::default()))))
    } else {
        Ok(Box::new(BufWriter::new(file)))
    }
}

/// Read every line of a (possibly gzipped) text file.
pub fn read_lines(path: &Path) -> Result<Vec<String>> {
    open_reader(path)?
        .lines()
        .collect::<std::io::Result<Vec<_>>>()
        .with_context(|| format!("Cannot read '{}'", path.display()))
}
