//! Buffer concatenation

use crate::alloc::{allocate_direct, check_size_limit};
use crate::buffer::core::ByteBuffer;
use crate::error::Result;

/// Concatenate the full contents of `buffers` into one new buffer.
///
/// Every input is rewound first and consumed fully; after the call the
/// inputs' positions sit at their limits. The combined size must not exceed
/// 2^31 - 1 bytes; that is checked before anything is allocated. A zero
/// combined size yields the shared sentinel. The result is off-heap
/// allocated, positioned at 0 with limit = total size.
pub fn concat(buffers: &mut [ByteBuffer]) -> Result<ByteBuffer> {
    let mut total: u64 = 0;
    for buf in buffers.iter_mut() {
        buf.rewind();
        total += buf.remaining() as u64;
    }

    check_size_limit(total, "buffer concatenation")?;

    if total == 0 {
        return Ok(ByteBuffer::empty());
    }

    let mut alloc = allocate_direct(total as usize)?;
    let out = alloc.as_mut_slice();
    let mut at = 0;
    for buf in buffers.iter_mut() {
        let n = buf.remaining();
        out[at..at + n].copy_from_slice(buf.remaining_slice());
        let limit = buf.limit();
        buf.set_position(limit)?;
        at += n;
    }

    Ok(alloc.into_buffer())
}
