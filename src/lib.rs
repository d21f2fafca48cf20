//! bytebuf - binary buffer and endian-aware I/O primitives
//!
//! Low-level building blocks for file-format readers:
//!
//! - `buffer` - fixed-capacity byte windows with independent
//!   position/limit cursors, slicing, and concatenation
//! - `loader` - loading files or file regions into buffers and writing
//!   buffers back, with exact-read semantics and a 2^31 - 1 byte bound
//! - `mmap` - read-only and read-write memory-mapped views of file regions
//! - `sink` / `writer` - an abstract output sink with native-order
//!   primitive writes, wrapped by a writer that conditionally byte-swaps
//!   multi-byte values
//!
//! # Example
//!
//! ```
//! use bytebuf::{ByteBuffer, DataWriter, MemorySink};
//!
//! let mut writer = DataWriter::new(MemorySink::new());
//! writer.set_swap(true);
//! writer.write_i32(0x12345678).unwrap();
//!
//! let buf = ByteBuffer::from_vec(writer.into_inner().into_bytes().to_vec());
//! assert_eq!(buf.as_slice(), &[0x78, 0x56, 0x34, 0x12]);
//!
//! let view = buf.slice_from(2).unwrap();
//! assert_eq!(view.as_slice(), &[0x34, 0x12]);
//! ```

mod alloc;
pub mod buffer;
pub mod error;
pub mod loader;
pub mod mmap;
pub mod sink;
pub mod writer;

pub use buffer::{ByteBuffer, ByteOrder, concat};
pub use error::{Error, Result};
pub use loader::FileRegion;
pub use mmap::MappedMut;
pub use sink::{DataSink, FileSink, MemorySink, SwapCapable};
pub use writer::DataWriter;
