//! Allocation policy for buffer storage
//!
//! Sizes above a fixed threshold are backed by anonymous memory mappings
//! (off-heap, no copy through the allocator on later I/O); small sizes use a
//! plain heap vector, which has far lower fixed cost. Heap exhaustion is
//! recovered locally by retrying as an anonymous mapping.

use crate::buffer::core::{ByteBuffer, Storage};
use crate::error::{Error, Result};
use memmap2::{MmapMut, MmapOptions};

/// Sizes above this many bytes are allocated as anonymous mappings (10 KiB).
pub(crate) const DIRECT_THRESHOLD: usize = 10 * 1024;

/// Freshly allocated, writable backing memory for a buffer.
pub(crate) enum Allocation {
    Heap(Vec<u8>),
    Direct(MmapMut),
}

impl Allocation {
    pub(crate) fn len(&self) -> usize {
        match self {
            Allocation::Heap(v) => v.len(),
            Allocation::Direct(m) => m.len(),
        }
    }

    pub(crate) fn is_direct(&self) -> bool {
        matches!(self, Allocation::Direct(_))
    }

    pub(crate) fn as_mut_slice(&mut self) -> &mut [u8] {
        match self {
            Allocation::Heap(v) => v,
            Allocation::Direct(m) => &mut m[..],
        }
    }

    /// Wrap the filled allocation as a buffer positioned at 0 with
    /// limit = capacity = allocation size.
    pub(crate) fn into_buffer(self) -> ByteBuffer {
        let len = self.len();
        let storage = match self {
            Allocation::Heap(v) => Storage::Heap(v),
            Allocation::Direct(m) => Storage::Direct(m),
        };
        ByteBuffer::from_storage(storage, len)
    }
}

/// Allocate zeroed backing memory of `size` bytes.
///
/// Heap for small sizes, anonymous mapping for large ones. A failed heap
/// reservation falls back to the anonymous mapping; only a failure of the
/// fallback itself reaches the caller.
pub(crate) fn allocate(size: usize) -> Result<Allocation> {
    if size > DIRECT_THRESHOLD {
        return Ok(Allocation::Direct(map_anon(size)?));
    }
    let mut data = Vec::new();
    match data.try_reserve_exact(size) {
        Ok(()) => {
            data.resize(size, 0);
            Ok(Allocation::Heap(data))
        }
        // not enough heap, retry off-heap
        Err(_) => Ok(Allocation::Direct(map_anon(size)?)),
    }
}

/// Allocate zeroed off-heap memory of `size` bytes unconditionally.
pub(crate) fn allocate_direct(size: usize) -> Result<Allocation> {
    Ok(Allocation::Direct(map_anon(size)?))
}

fn map_anon(size: usize) -> Result<MmapMut> {
    MmapOptions::new()
        .len(size)
        .map_anon()
        .map_err(Error::System)
}

/// Fail with [`Error::Limit`] if `total` exceeds the 2^31 - 1 byte bound
/// every buffer-producing operation is held to.
pub(crate) fn check_size_limit(total: u64, what: &str) -> Result<()> {
    if total > i32::MAX as u64 {
        return Err(Error::limit(format!(
            "{what}: {total} bytes exceeds the 2147483647 byte buffer bound"
        )));
    }
    Ok(())
}
