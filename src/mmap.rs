//! Memory-mapped views of file regions
//!
//! Mapping bypasses the allocation policy entirely; the pages are
//! OS-managed and released when the last referencing buffer is dropped. No
//! file handle is retained past the open call.

use crate::buffer::ByteBuffer;
use crate::buffer::core::Storage;
use crate::error::{Error, Result};
use crate::loader::{FileRegion, effective_len};
use memmap2::{MmapMut, MmapOptions};
use std::fs::{File, OpenOptions};
use std::path::Path;

/// Map a byte range of a file read-only.
///
/// The result is an ordinary buffer over OS-backed pages: it can be sliced
/// and concatenated like any other buffer. An empty resolved range yields
/// the shared sentinel.
pub fn open_read_only(region: &FileRegion) -> Result<ByteBuffer> {
    let file = File::open(&region.path)?;
    let file_len = file.metadata()?.len();
    let len = effective_len(file_len, region.offset, region.length);
    // pages past EOF are not readable; reject the range up front instead
    // of handing out a buffer that faults on access
    if region.offset.saturating_add(len as u64) > file_len {
        return Err(Error::argument(format!(
            "mapped region [{}, {}) passes end of file at {file_len}",
            region.offset,
            region.offset + len as u64
        )));
    }
    if len == 0 {
        return Ok(ByteBuffer::empty());
    }
    // SAFETY: the file is opened read-only and the mapping outlives no
    // borrow of it; external truncation of the file is documented as
    // undefined for any mapping.
    let map = unsafe {
        MmapOptions::new()
            .offset(region.offset)
            .len(len)
            .map(&file)?
    };
    Ok(ByteBuffer::from_storage(Storage::Mapped(map), len))
}

/// Map a whole file read-only.
pub fn open_read_only_path<P: AsRef<Path>>(path: P) -> Result<ByteBuffer> {
    open_read_only(&FileRegion::whole(path))
}

/// Map a byte range of a file read-write, creating the file if absent and
/// extending it to cover the requested range.
///
/// Mutations reach the file at an OS-determined time unless
/// [`MappedMut::flush`] is called.
pub fn open_read_write(region: &FileRegion) -> Result<MappedMut> {
    let file = OpenOptions::new()
        .read(true)
        .write(true)
        .create(true)
        .truncate(false)
        .open(&region.path)?;
    let file_len = file.metadata()?.len();
    let len = effective_len(file_len, region.offset, region.length);
    if len == 0 {
        return Err(Error::argument("cannot map an empty region for writing"));
    }
    let needed = region.offset + len as u64;
    if file_len < needed {
        file.set_len(needed)?;
    }
    // SAFETY: the file stays untouched by this process for the mapping's
    // lifetime; concurrent external modification is documented as
    // undefined for any mapping.
    let map = unsafe {
        MmapOptions::new()
            .offset(region.offset)
            .len(len)
            .map_mut(&file)?
    };
    Ok(MappedMut { map, position: 0 })
}

/// Map a whole file read-write.
pub fn open_read_write_path<P: AsRef<Path>>(path: P) -> Result<MappedMut> {
    open_read_write(&FileRegion::whole(path))
}

/// A writable memory-mapped view of a file region, with a write cursor.
pub struct MappedMut {
    map: MmapMut,
    position: usize,
}

impl MappedMut {
    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.len() == 0
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn set_position(&mut self, pos: usize) {
        self.position = pos.min(self.map.len());
    }

    pub fn remaining(&self) -> usize {
        self.map.len() - self.position
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.map[..]
    }

    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        &mut self.map[..]
    }

    /// Read `n` bytes at the cursor and advance.
    pub fn read_bytes(&mut self, n: usize) -> Option<&[u8]> {
        if self.remaining() < n {
            return None;
        }
        let at = self.position;
        self.position += n;
        Some(&self.map[at..at + n])
    }

    /// Write `data` at the cursor and advance. The mapping is fixed-size,
    /// so writing past its end is a bounds violation.
    pub fn write_bytes(&mut self, data: &[u8]) -> Result<()> {
        if self.remaining() < data.len() {
            return Err(Error::argument(format!(
                "write of {} bytes at {} passes mapping end {}",
                data.len(),
                self.position,
                self.map.len()
            )));
        }
        let at = self.position;
        self.map[at..at + data.len()].copy_from_slice(data);
        self.position += data.len();
        Ok(())
    }

    /// Synchronously flush outstanding modifications to the file.
    pub fn flush(&self) -> Result<()> {
        self.map.flush().map_err(Error::System)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_test_file(content: &[u8]) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_open_read_only_whole_file() {
        let temp = create_test_file(b"mapped content");
        let buf = open_read_only_path(temp.path()).unwrap();
        assert_eq!(buf.as_slice(), b"mapped content");
        assert_eq!(buf.position(), 0);
        assert_eq!(buf.limit(), 14);
    }

    #[test]
    fn test_open_read_only_region() {
        let temp = create_test_file(&[0x01, 0x02, 0x03]);
        let buf = open_read_only(&FileRegion::new(temp.path(), 1, -1)).unwrap();
        assert_eq!(buf.as_slice(), &[0x02, 0x03]);
    }

    #[test]
    fn test_open_read_only_length_past_eof_fails() {
        // a region reaching past EOF must be rejected, not mapped; reads
        // from pages beyond the file would fault the process
        let temp = create_test_file(&[0x01, 0x02, 0x03]);
        let result = open_read_only(&FileRegion::new(temp.path(), 0, 1_048_576));
        assert!(matches!(result, Err(Error::Argument(_))));

        let off_by_one = open_read_only(&FileRegion::new(temp.path(), 2, 2));
        assert!(matches!(off_by_one, Err(Error::Argument(_))));
    }

    #[test]
    fn test_open_read_only_offset_past_eof_fails() {
        let temp = create_test_file(&[0x01, 0x02, 0x03]);
        let result = open_read_only(&FileRegion::new(temp.path(), 4, -1));
        assert!(matches!(result, Err(Error::Argument(_))));
    }

    #[test]
    fn test_open_read_only_region_up_to_eof() {
        let temp = create_test_file(&[0x01, 0x02, 0x03]);
        let buf = open_read_only(&FileRegion::new(temp.path(), 1, 2)).unwrap();
        assert_eq!(buf.as_slice(), &[0x02, 0x03]);
    }

    #[test]
    fn test_open_read_only_empty_file_is_sentinel() {
        let temp = create_test_file(b"");
        let buf = open_read_only_path(temp.path()).unwrap();
        assert_eq!(buf.capacity(), 0);
    }

    #[test]
    fn test_mapped_buffer_slices_like_any_buffer() {
        let temp = create_test_file(b"abcdefgh");
        let buf = open_read_only_path(temp.path()).unwrap();
        let view = buf.slice(2, 3).unwrap();
        assert_eq!(view.as_slice(), b"cde");
        assert_eq!(buf.position(), 0);
    }

    #[test]
    fn test_open_read_write_creates_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("created.bin");
        let mut mapped = open_read_write(&FileRegion::new(&path, 0, 8)).unwrap();
        assert_eq!(mapped.len(), 8);
        mapped.write_bytes(&[0xAB; 8]).unwrap();
        mapped.flush().unwrap();
        drop(mapped);

        let content = std::fs::read(&path).unwrap();
        assert_eq!(content, vec![0xAB; 8]);
    }

    #[test]
    fn test_open_read_write_region_of_existing_file() {
        let temp = create_test_file(b"0123456789");
        let mut mapped = open_read_write(&FileRegion::new(temp.path(), 2, 4)).unwrap();
        assert_eq!(mapped.as_slice(), b"2345");
        mapped.write_bytes(b"XY").unwrap();
        mapped.flush().unwrap();
        drop(mapped);

        let content = std::fs::read(temp.path()).unwrap();
        assert_eq!(content, b"01XY456789");
    }

    #[test]
    fn test_open_read_write_extends_short_file() {
        let temp = create_test_file(b"ab");
        let mapped = open_read_write(&FileRegion::new(temp.path(), 0, 6)).unwrap();
        assert_eq!(mapped.len(), 6);
        assert_eq!(&mapped.as_slice()[..2], b"ab");
        drop(mapped);
        assert_eq!(std::fs::metadata(temp.path()).unwrap().len(), 6);
    }

    #[test]
    fn test_open_read_write_empty_region_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.bin");
        let result = open_read_write(&FileRegion::whole(&path));
        assert!(matches!(result, Err(Error::Argument(_))));
    }

    #[test]
    fn test_mapped_mut_cursor() {
        let temp = create_test_file(b"cursor");
        let mut mapped = open_read_write_path(temp.path()).unwrap();
        assert_eq!(mapped.read_bytes(3), Some(&b"cur"[..]));
        assert_eq!(mapped.position(), 3);
        assert_eq!(mapped.read_bytes(4), None);
        mapped.set_position(100);
        assert_eq!(mapped.position(), 6);
    }

    #[test]
    fn test_mapped_mut_write_past_end_fails() {
        let temp = create_test_file(b"abc");
        let mut mapped = open_read_write_path(temp.path()).unwrap();
        mapped.set_position(2);
        assert!(matches!(
            mapped.write_bytes(b"toolong"),
            Err(Error::Argument(_))
        ));
    }
}
