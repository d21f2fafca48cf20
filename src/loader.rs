//! Loading file contents into buffers, and writing buffers back
//!
//! All loads go through the allocation policy in `alloc`; reads are exact,
//! a short read is an error rather than a silently truncated buffer.

use crate::alloc::{allocate, check_size_limit};
use crate::buffer::ByteBuffer;
use crate::error::{Error, Result};
use std::fs::{File, OpenOptions};
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

/// A byte range of one file: `length <= 0` means "from `offset` to the end
/// of the file".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRegion {
    pub path: PathBuf,
    pub offset: u64,
    pub length: i64,
}

impl FileRegion {
    pub fn new<P: AsRef<Path>>(path: P, offset: u64, length: i64) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            offset,
            length,
        }
    }

    /// The whole file.
    pub fn whole<P: AsRef<Path>>(path: P) -> Self {
        Self::new(path, 0, -1)
    }
}

/// Resolve a region's effective byte count against the file size, clamped
/// to the 2^31 - 1 buffer bound.
pub(crate) fn effective_len(file_len: u64, offset: u64, length: i64) -> usize {
    let resolved = if length > 0 {
        length as u64
    } else {
        file_len.saturating_sub(offset)
    };
    resolved.min(i32::MAX as u64) as usize
}

fn exact_read_err(e: io::Error) -> Error {
    if e.kind() == io::ErrorKind::UnexpectedEof {
        Error::Eof
    } else {
        Error::System(e)
    }
}

/// Read a byte range of a file into a new buffer.
///
/// The buffer comes back positioned at 0 with limit = bytes read. Reading
/// fewer bytes than the resolved length is an error.
pub fn load_region(region: &FileRegion) -> Result<ByteBuffer> {
    let mut file = File::open(&region.path)?;
    let len = effective_len(file.metadata()?.len(), region.offset, region.length);
    let mut alloc = allocate(len)?;
    file.seek(SeekFrom::Start(region.offset))?;
    file.read_exact(alloc.as_mut_slice()).map_err(exact_read_err)?;
    Ok(alloc.into_buffer())
}

/// Read a whole file into a new buffer.
///
/// A file larger than 2^31 - 1 bytes is truncated to its first 2^31 - 1
/// bytes; this is the one intentionally clamping load path.
pub fn load<P: AsRef<Path>>(path: P) -> Result<ByteBuffer> {
    load_region(&FileRegion::whole(path))
}

/// Read several files into one contiguous buffer, in sequence order.
///
/// All files are opened and their sizes summed before anything is
/// allocated; a combined size beyond 2^31 - 1 bytes fails up front with
/// [`Error::Limit`]. Open handles are dropped on every exit path.
pub fn load_all<P: AsRef<Path>>(paths: &[P]) -> Result<ByteBuffer> {
    let mut files = Vec::with_capacity(paths.len());
    let mut total: u64 = 0;
    for path in paths {
        let file = File::open(path.as_ref())?;
        let len = file.metadata()?.len();
        total += len;
        files.push((file, len));
    }

    check_size_limit(total, "multi-file load")?;

    let mut alloc = allocate(total as usize)?;
    let out = alloc.as_mut_slice();
    let mut at = 0;
    for (file, len) in &mut files {
        let n = *len as usize;
        file.read_exact(&mut out[at..at + n]).map_err(exact_read_err)?;
        at += n;
    }
    Ok(alloc.into_buffer())
}

/// Write a buffer's remaining bytes to a file, truncating it to exactly
/// that many bytes. A destructive overwrite, not an append. The buffer is
/// consumed: its position ends up at its limit.
pub fn save<P: AsRef<Path>>(path: P, buffer: &mut ByteBuffer) -> Result<()> {
    let mut file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(false)
        .open(path)?;
    file.set_len(buffer.remaining() as u64)?;
    file.write_all(buffer.remaining_slice())?;
    let limit = buffer.limit();
    buffer.set_position(limit)?;
    Ok(())
}
