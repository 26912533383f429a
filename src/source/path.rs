//! Filesystem file source.

use std::fs::File;
use std::io::{self, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};
use std::time::UNIX_EPOCH;

use bytes::Bytes;
use parking_lot::Mutex;

use super::{ChunkSource, FileMetadata, checked_range_end};
use crate::chunk::ChunkRange;

/// A file on disk, read one range at a time.
///
/// The handle is opened once; reads seek to each range's offset. Only the
/// bytes of the requested range are ever held in memory.
#[derive(Debug)]
pub struct PathFile {
    file: Mutex<File>,
    path: PathBuf,
    size: u64,
    last_modified: Option<u64>,
}

impl PathFile {
    /// Opens `path` and records its size and modification time.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened or its metadata read.
    pub fn open(path: impl AsRef<Path>) -> io::Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = File::open(&path)?;
        let meta = file.metadata()?;

        let last_modified = meta
            .modified()
            .ok()
            .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
            .map(|d| d.as_millis() as u64);

        Ok(Self {
            file: Mutex::new(file),
            path,
            size: meta.len(),
            last_modified,
        })
    }

    /// Returns the path this file was opened from.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ChunkSource for PathFile {
    fn len(&self) -> u64 {
        self.size
    }

    fn read_chunk(&self, range: &ChunkRange) -> io::Result<Bytes> {
        checked_range_end(range, self.size)?;
        let mut buf = vec![0u8; range.len as usize];
        let mut file = self.file.lock();
        file.seek(SeekFrom::Start(range.offset))?;
        file.read_exact(&mut buf)?;
        Ok(Bytes::from(buf))
    }

    fn metadata(&self) -> FileMetadata {
        let name = self
            .path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let file_type = self
            .path
            .extension()
            .map(|e| format!(".{}", e.to_string_lossy()))
            .unwrap_or_default();

        FileMetadata {
            name,
            size: self.size,
            last_modified: self.last_modified,
            file_type,
        }
    }
}
