//! Output sinks - byte destinations with native-order primitive writes
//!
//! A [`DataSink`] emits primitives in its native order, big-endian, the
//! order the wrapping [`DataWriter`](crate::writer::DataWriter) assumes
//! when it pre-swaps values. A sink that owns a byte-order capability of
//! its own advertises it through [`DataSink::swap_control`].

use crate::error::{Error, Result};
use byteorder::{BigEndian, ByteOrder as _};
use bytes::{Bytes, BytesMut};
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::Path;

/// Byte-order capability of a sink: whether it can swap, and its current
/// swap state.
pub trait SwapCapable {
    fn is_swappable(&self) -> bool;
    fn is_swap(&self) -> bool;
    fn set_swap(&mut self, swap: bool);
}

/// An abstract byte destination with primitive write operations.
///
/// The primitive defaults encode in the sink's native order (big-endian)
/// and funnel through [`DataSink::write_bytes`]; implementors only have to
/// provide the raw byte write.
pub trait DataSink {
    /// Write raw bytes.
    fn write_bytes(&mut self, data: &[u8]) -> Result<()>;

    /// Flush any buffered data.
    fn flush(&mut self) -> Result<()> {
        Ok(())
    }

    /// The sink's own byte-order capability, if it has one.
    fn swap_control(&self) -> Option<&dyn SwapCapable> {
        None
    }

    /// Mutable access to the sink's byte-order capability, if it has one.
    fn swap_control_mut(&mut self) -> Option<&mut dyn SwapCapable> {
        None
    }

    fn write_u8(&mut self, v: u8) -> Result<()> {
        self.write_bytes(&[v])
    }

    fn write_i8(&mut self, v: i8) -> Result<()> {
        self.write_bytes(&[v as u8])
    }

    /// True as 1, false as 0.
    fn write_bool(&mut self, v: bool) -> Result<()> {
        self.write_u8(v as u8)
    }

    fn write_u16(&mut self, v: u16) -> Result<()> {
        let mut buf = [0u8; 2];
        BigEndian::write_u16(&mut buf, v);
        self.write_bytes(&buf)
    }

    fn write_i16(&mut self, v: i16) -> Result<()> {
        let mut buf = [0u8; 2];
        BigEndian::write_i16(&mut buf, v);
        self.write_bytes(&buf)
    }

    /// A UTF-16 code unit, always emitted in native order.
    fn write_char16(&mut self, v: u16) -> Result<()> {
        self.write_u16(v)
    }

    fn write_u32(&mut self, v: u32) -> Result<()> {
        let mut buf = [0u8; 4];
        BigEndian::write_u32(&mut buf, v);
        self.write_bytes(&buf)
    }

    fn write_i32(&mut self, v: i32) -> Result<()> {
        let mut buf = [0u8; 4];
        BigEndian::write_i32(&mut buf, v);
        self.write_bytes(&buf)
    }

    fn write_u64(&mut self, v: u64) -> Result<()> {
        let mut buf = [0u8; 8];
        BigEndian::write_u64(&mut buf, v);
        self.write_bytes(&buf)
    }

    fn write_i64(&mut self, v: i64) -> Result<()> {
        let mut buf = [0u8; 8];
        BigEndian::write_i64(&mut buf, v);
        self.write_bytes(&buf)
    }

    fn write_f32(&mut self, v: f32) -> Result<()> {
        let mut buf = [0u8; 4];
        BigEndian::write_f32(&mut buf, v);
        self.write_bytes(&buf)
    }

    fn write_f64(&mut self, v: f64) -> Result<()> {
        let mut buf = [0u8; 8];
        BigEndian::write_f64(&mut buf, v);
        self.write_bytes(&buf)
    }
}

// ============================================================================
// Memory Sink
// ============================================================================

/// A sink accumulating into memory.
pub struct MemorySink {
    inner: BytesMut,
}

impl MemorySink {
    pub fn new() -> Self {
        Self {
            inner: BytesMut::new(),
        }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            inner: BytesMut::with_capacity(capacity),
        }
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.inner
    }

    pub fn into_bytes(self) -> Bytes {
        self.inner.freeze()
    }
}

impl Default for MemorySink {
    fn default() -> Self {
        Self::new()
    }
}

impl DataSink for MemorySink {
    fn write_bytes(&mut self, data: &[u8]) -> Result<()> {
        self.inner.extend_from_slice(data);
        Ok(())
    }
}

// ============================================================================
// File Sink
// ============================================================================

/// A sink writing through a buffered file.
pub struct FileSink {
    inner: BufWriter<File>,
}

impl FileSink {
    /// Create (or truncate) the file at `path` for writing.
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(path)
            .map_err(Error::System)?;
        Ok(Self {
            inner: BufWriter::new(file),
        })
    }
}

impl DataSink for FileSink {
    fn write_bytes(&mut self, data: &[u8]) -> Result<()> {
        self.inner.write_all(data).map_err(Error::System)
    }

    fn flush(&mut self) -> Result<()> {
        self.inner.flush().map_err(Error::System)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    #[test]
    fn test_memory_sink_accumulates() {
        let mut sink = MemorySink::new();
        sink.write_bytes(b"Hello, ").unwrap();
        sink.write_bytes(b"sink!").unwrap();
        assert_eq!(sink.as_slice(), b"Hello, sink!");
        assert_eq!(sink.len(), 12);
    }

    #[test]
    fn test_native_order_is_big_endian() {
        let mut sink = MemorySink::new();
        sink.write_u16(0x1234).unwrap();
        sink.write_u32(0xDEADBEEF).unwrap();
        assert_eq!(
            sink.as_slice(),
            &[0x12, 0x34, 0xDE, 0xAD, 0xBE, 0xEF]
        );
    }

    #[test]
    fn test_write_scalars() {
        let mut sink = MemorySink::new();
        sink.write_bool(true).unwrap();
        sink.write_bool(false).unwrap();
        sink.write_i8(-1).unwrap();
        sink.write_i64(0x0102030405060708).unwrap();
        assert_eq!(
            sink.as_slice(),
            &[1, 0, 0xFF, 0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08]
        );
    }

    #[test]
    fn test_write_float_bit_patterns() {
        let mut sink = MemorySink::new();
        sink.write_f32(1.0).unwrap();
        sink.write_f64(-2.0).unwrap();
        assert_eq!(&sink.as_slice()[..4], &1.0f32.to_bits().to_be_bytes());
        assert_eq!(&sink.as_slice()[4..], &(-2.0f64).to_bits().to_be_bytes());
    }

    #[test]
    fn test_no_swap_control_by_default() {
        let sink = MemorySink::new();
        assert!(sink.swap_control().is_none());
    }

    #[test]
    fn test_into_bytes() {
        let mut sink = MemorySink::with_capacity(8);
        sink.write_u32(1).unwrap();
        let bytes = sink.into_bytes();
        assert_eq!(&bytes[..], &[0, 0, 0, 1]);
    }

    #[test]
    fn test_file_sink() {
        let temp = NamedTempFile::new().unwrap();
        let mut sink = FileSink::create(temp.path()).unwrap();
        sink.write_u32(0x00C0FFEE).unwrap();
        sink.write_bytes(b"tail").unwrap();
        sink.flush().unwrap();

        let content = std::fs::read(temp.path()).unwrap();
        assert_eq!(content, [&[0x00, 0xC0, 0xFF, 0xEE], &b"tail"[..]].concat());
    }
}
