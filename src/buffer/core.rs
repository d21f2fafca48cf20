//! Core ByteBuffer implementation
//!
//! A `ByteBuffer` is a fixed-capacity window onto shared backing memory with
//! an independent position/limit cursor pair and a byte-order tag. Backing
//! memory is a heap vector, an anonymous mapping, or a read-only file
//! mapping; slices share the backing storage but never the cursors.

use crate::error::{Error, Result};
use memmap2::{Mmap, MmapMut};
use std::fmt;
use std::sync::{Arc, LazyLock};

/// Byte order tag carried by every buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ByteOrder {
    BigEndian,
    LittleEndian,
}

/// Backing memory for a buffer.
pub(crate) enum Storage {
    /// Heap-allocated bytes
    Heap(Vec<u8>),
    /// Anonymous (off-heap) mapping
    Direct(MmapMut),
    /// Read-only file mapping; released with the last referencing buffer
    Mapped(Mmap),
}

impl Storage {
    pub(crate) fn as_bytes(&self) -> &[u8] {
        match self {
            Storage::Heap(v) => v,
            Storage::Direct(m) => &m[..],
            Storage::Mapped(m) => &m[..],
        }
    }
}

/// Shared zero-capacity sentinel, handed out for every zero-length result.
static EMPTY: LazyLock<ByteBuffer> = LazyLock::new(|| ByteBuffer {
    storage: Arc::new(Storage::Heap(Vec::new())),
    start: 0,
    cap: 0,
    position: 0,
    limit: 0,
    order: ByteOrder::BigEndian,
});

/// A contiguous byte region with position/limit cursors and a byte-order tag.
///
/// Invariant: `position <= limit <= capacity`. Cursor setters enforce it and
/// fail with [`Error::Argument`] instead of clamping silently.
#[derive(Clone)]
pub struct ByteBuffer {
    pub(crate) storage: Arc<Storage>,
    /// Window start within the storage
    start: usize,
    /// Window length (the buffer's capacity)
    cap: usize,
    position: usize,
    limit: usize,
    order: ByteOrder,
}

impl ByteBuffer {
    /// Wrap freshly produced storage; position 0, limit = capacity = `len`.
    pub(crate) fn from_storage(storage: Storage, len: usize) -> Self {
        Self {
            storage: Arc::new(storage),
            start: 0,
            cap: len,
            position: 0,
            limit: len,
            order: ByteOrder::BigEndian,
        }
    }

    /// Create a buffer owning `data` (zero-copy).
    pub fn from_vec(data: Vec<u8>) -> Self {
        let len = data.len();
        Self::from_storage(Storage::Heap(data), len)
    }

    /// Create a buffer from a byte slice (copies data).
    pub fn from_slice(data: &[u8]) -> Self {
        Self::from_vec(data.to_vec())
    }

    /// The shared zero-capacity sentinel buffer. Never freshly allocated;
    /// every call returns a view onto the same storage.
    pub fn empty() -> Self {
        EMPTY.clone()
    }

    /// Total addressable length of this buffer.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.cap
    }

    #[inline]
    pub fn position(&self) -> usize {
        self.position
    }

    #[inline]
    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Bytes between position and limit.
    #[inline]
    pub fn remaining(&self) -> usize {
        self.limit - self.position
    }

    #[inline]
    pub fn has_remaining(&self) -> bool {
        self.position < self.limit
    }

    /// Move the cursor; `pos` must not pass the limit.
    pub fn set_position(&mut self, pos: usize) -> Result<()> {
        if pos > self.limit {
            return Err(Error::argument(format!(
                "position {pos} beyond limit {}",
                self.limit
            )));
        }
        self.position = pos;
        Ok(())
    }

    /// Move the limit; `limit` must not pass the capacity. The position is
    /// pulled back if it would end up beyond the new limit.
    pub fn set_limit(&mut self, limit: usize) -> Result<()> {
        if limit > self.cap {
            return Err(Error::argument(format!(
                "limit {limit} beyond capacity {}",
                self.cap
            )));
        }
        self.limit = limit;
        if self.position > limit {
            self.position = limit;
        }
        Ok(())
    }

    /// Reset the position to the start of the buffer.
    pub fn rewind(&mut self) {
        self.position = 0;
    }

    pub fn order(&self) -> ByteOrder {
        self.order
    }

    pub fn set_order(&mut self, order: ByteOrder) {
        self.order = order;
    }

    /// The whole addressable window, ignoring the cursors.
    pub fn as_slice(&self) -> &[u8] {
        &self.storage.as_bytes()[self.start..self.start + self.cap]
    }

    /// The bytes between position and limit.
    pub fn remaining_slice(&self) -> &[u8] {
        &self.storage.as_bytes()[self.start + self.position..self.start + self.limit]
    }

    /// Copy the whole window into a vector.
    pub fn to_vec(&self) -> Vec<u8> {
        self.as_slice().to_vec()
    }

    // ------------------------------------------------------------------
    // Cursor reads (honor the byte-order tag)
    // ------------------------------------------------------------------

    fn take<const N: usize>(&mut self) -> Result<[u8; N]> {
        if self.remaining() < N {
            return Err(Error::Eof);
        }
        let at = self.start + self.position;
        let mut raw = [0u8; N];
        raw.copy_from_slice(&self.storage.as_bytes()[at..at + N]);
        self.position += N;
        Ok(raw)
    }

    pub fn get_u8(&mut self) -> Result<u8> {
        Ok(self.take::<1>()?[0])
    }

    pub fn get_i8(&mut self) -> Result<i8> {
        Ok(self.get_u8()? as i8)
    }

    pub fn get_u16(&mut self) -> Result<u16> {
        let raw = self.take::<2>()?;
        Ok(match self.order {
            ByteOrder::BigEndian => u16::from_be_bytes(raw),
            ByteOrder::LittleEndian => u16::from_le_bytes(raw),
        })
    }

    pub fn get_i16(&mut self) -> Result<i16> {
        Ok(self.get_u16()? as i16)
    }

    pub fn get_u32(&mut self) -> Result<u32> {
        let raw = self.take::<4>()?;
        Ok(match self.order {
            ByteOrder::BigEndian => u32::from_be_bytes(raw),
            ByteOrder::LittleEndian => u32::from_le_bytes(raw),
        })
    }

    pub fn get_i32(&mut self) -> Result<i32> {
        Ok(self.get_u32()? as i32)
    }

    pub fn get_u64(&mut self) -> Result<u64> {
        let raw = self.take::<8>()?;
        Ok(match self.order {
            ByteOrder::BigEndian => u64::from_be_bytes(raw),
            ByteOrder::LittleEndian => u64::from_le_bytes(raw),
        })
    }

    pub fn get_i64(&mut self) -> Result<i64> {
        Ok(self.get_u64()? as i64)
    }

    pub fn get_f32(&mut self) -> Result<f32> {
        Ok(f32::from_bits(self.get_u32()?))
    }

    pub fn get_f64(&mut self) -> Result<f64> {
        Ok(f64::from_bits(self.get_u64()?))
    }

    /// Read exactly `buf.len()` bytes from the cursor.
    pub fn read_exact(&mut self, buf: &mut [u8]) -> Result<()> {
        if self.remaining() < buf.len() {
            return Err(Error::Eof);
        }
        let at = self.start + self.position;
        buf.copy_from_slice(&self.storage.as_bytes()[at..at + buf.len()]);
        self.position += buf.len();
        Ok(())
    }

    // ------------------------------------------------------------------
    // Slicing
    // ------------------------------------------------------------------

    /// A sub-view over `[offset, offset + length)` of this buffer.
    ///
    /// The view shares the backing memory but owns its cursors; this
    /// buffer's position and limit are untouched. `length == 0` yields the
    /// shared sentinel; `length < 0` means "up to this buffer's current
    /// limit". `offset` must not pass the current limit, though an explicit
    /// length may carry the view beyond it, up to the capacity. The view
    /// inherits this buffer's byte order.
    pub fn slice(&self, offset: usize, length: i64) -> Result<ByteBuffer> {
        if length == 0 {
            return Ok(ByteBuffer::empty());
        }
        if offset > self.limit {
            return Err(Error::argument(format!(
                "slice offset {offset} beyond limit {}",
                self.limit
            )));
        }
        let upper = if length > 0 {
            offset
                .checked_add(length as usize)
                .ok_or_else(|| Error::argument("slice length overflows"))?
        } else {
            self.limit
        };
        if upper > self.cap {
            return Err(Error::argument(format!(
                "slice [{offset}, {upper}) outside capacity {}",
                self.cap
            )));
        }
        let cap = upper - offset;
        Ok(ByteBuffer {
            storage: Arc::clone(&self.storage),
            start: self.start + offset,
            cap,
            position: 0,
            limit: cap,
            order: self.order,
        })
    }

    /// A sub-view from `offset` up to this buffer's current limit.
    pub fn slice_from(&self, offset: usize) -> Result<ByteBuffer> {
        self.slice(offset, -1)
    }
}

impl fmt::Debug for ByteBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ByteBuffer")
            .field("position", &self.position)
            .field("limit", &self.limit)
            .field("capacity", &self.cap)
            .field("order", &self.order)
            .finish()
    }
}

impl PartialEq for ByteBuffer {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        self.as_slice() == other.as_slice()
    }
}

impl Eq for ByteBuffer {}

impl AsRef<[u8]> for ByteBuffer {
    fn as_ref(&self) -> &[u8] {
        self.as_slice()
    }
}
